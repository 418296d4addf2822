use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub ingestion: IngestionConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5001,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite URL, e.g. `sqlite://support_tickets.db`
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://support_tickets.db".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct DataConfig {
    pub customers_csv: PathBuf,
    pub tickets_csv: PathBuf,
    pub sla_policy_path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            customers_csv: PathBuf::from("data/customers.csv"),
            tickets_csv: PathBuf::from("data/tickets.csv"),
            sla_policy_path: PathBuf::from("data/sla_policy.json"),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct IngestionConfig {
    /// Upper bound on issue strings kept in a diagnostics report
    pub max_issues: usize,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self { max_issues: 1000 }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ModelConfig {
    pub model_path: PathBuf,
    pub encoders_path: PathBuf,
    pub metrics_path: PathBuf,
    pub test_fraction: f64,
    pub seed: u64,
    pub n_estimators: usize,
    pub max_depth: usize,
    pub learning_rate: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("artifacts/model.json"),
            encoders_path: PathBuf::from("artifacts/encoders.json"),
            metrics_path: PathBuf::from("artifacts/metrics.json"),
            test_fraction: 0.2,
            seed: 42,
            n_estimators: 100,
            max_depth: 3,
            learning_rate: 0.1,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Program run by `/reingest`. Falls back to the running executable.
    pub program: Option<PathBuf>,
    pub args: Vec<String>,
    pub seed: u64,
    pub customers: usize,
    pub tickets: usize,
    pub start_date: String,
    pub days: u32,
    pub output_dir: PathBuf,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            program: None,
            args: vec!["generate".to_string()],
            seed: 42,
            customers: 250,
            tickets: 5000,
            start_date: "2025-01-01".to_string(),
            days: 180,
            output_dir: PathBuf::from("data"),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub directory: PathBuf,
    /// `pretty` or `json`
    pub format: String,
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("logs"),
            format: "pretty".to_string(),
            level: "info,sla_insight_server=debug".to_string(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("config/settings"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            // Example: APP_SERVER__PORT=8080
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;

        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.model.test_fraction <= 0.0 || self.model.test_fraction >= 1.0 {
            anyhow::bail!(
                "model.test_fraction must be in (0, 1), got {}",
                self.model.test_fraction
            );
        }

        if self.model.max_depth == 0 || self.model.n_estimators == 0 {
            anyhow::bail!("model.max_depth and model.n_estimators must be positive");
        }

        Ok(())
    }
}
