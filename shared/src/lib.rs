pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod models;
pub mod redis;

pub use config::Config;
pub use database::get_db_connection;
pub use error::IngestError;
pub use models::*;
pub use crate::redis::{get_redis_client, Redis};
