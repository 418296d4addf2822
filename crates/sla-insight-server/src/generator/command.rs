use std::path::PathBuf;
use tokio::process::Command;
use tracing::{info, warn};

use super::GeneratorError;
use crate::config::GeneratorConfig;

/// Run the configured regeneration program and wait for it.
///
/// Without an explicit `program` the running executable is re-invoked,
/// so the default is `<self> generate`.
pub async fn regenerate(config: &GeneratorConfig) -> Result<(), GeneratorError> {
    let program: PathBuf = match &config.program {
        Some(program) => program.clone(),
        None => std::env::current_exe()?,
    };

    info!(
        "Running data regeneration: {} {}",
        program.display(),
        config.args.join(" ")
    );

    let output = Command::new(&program)
        .args(&config.args)
        .output()
        .await
        .map_err(|e| GeneratorError::Spawn {
            program: program.display().to_string(),
            source: e,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        warn!("Regeneration exited with {}: {}", output.status, stderr);
        return Err(GeneratorError::CommandFailed {
            status: output.status.to_string(),
            stderr,
        });
    }

    Ok(())
}
