pub mod health;
pub mod ingest;
pub mod model;
pub mod stats;
