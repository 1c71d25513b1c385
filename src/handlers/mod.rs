pub mod admin;
pub mod attendance;
pub mod auth;
pub mod records;
pub mod reports;
pub mod requests;
pub mod schedule;
pub mod shared;
