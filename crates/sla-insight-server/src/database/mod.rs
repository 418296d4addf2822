pub mod connection;
pub mod models;
pub mod repository;

pub use connection::Database;
pub use models::*;
