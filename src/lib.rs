pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod store;

pub use auth::AuthService;
pub use config::Config;
pub use error::AppError;
pub use store::state::AppData;
