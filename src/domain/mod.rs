pub mod capture;
pub mod geo;
pub mod lifecycle;
pub mod reconcile;
pub mod report;
pub mod schedule;
pub mod status;
