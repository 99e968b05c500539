pub mod api;
pub mod bootstrap;
pub mod config;
pub mod database;
pub mod models;
pub mod providers;
pub mod services;
pub mod workers;

pub use config::*;
pub use database::Database;
pub use models::*;
pub use services::*;
