pub mod analytics;
pub mod config;
pub mod database;
pub mod domain;
pub mod generator;
pub mod handlers;
pub mod ingestion;
pub mod logging;
pub mod prediction;
pub mod router;
pub mod state;
pub mod utils;

pub use router::build_router;
pub use state::AppState;
