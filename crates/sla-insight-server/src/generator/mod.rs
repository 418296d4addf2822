//! Synthetic dataset generation and the external regeneration hook.

pub mod command;
pub mod synthetic;

use thiserror::Error;

pub use command::regenerate;
pub use synthetic::{generate, generate_to_dir, write_dataset, GenerationSummary, SyntheticDataset};

#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Invalid generator config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Regeneration command exited with {status}: {stderr}")]
    CommandFailed { status: String, stderr: String },
}
