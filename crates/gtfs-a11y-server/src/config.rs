//! Configuration management

use serde::{Deserialize, Serialize};
use std::{path::PathBuf, str::FromStr, time::Duration};

// ============================================================================
// Server Configuration Constants
// ============================================================================

/// Default server host binding.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default server port.
pub const DEFAULT_SERVER_PORT: u16 = 8000;

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default CORS allowed origin for local development.
pub const DEFAULT_CORS_ALLOWED_ORIGIN: &str = "http://localhost:3000";

// ============================================================================
// Validation Configuration Constants
// ============================================================================

/// Execution budget for `POST /validate`.
pub const DEFAULT_URL_BUDGET_SECS: u64 = 60;

/// Execution budget for `POST /validate-with-tracking`.
pub const DEFAULT_TRACKED_BUDGET_SECS: u64 = 300;

/// Execution budget for `POST /validate-file`.
pub const DEFAULT_FILE_BUDGET_SECS: u64 = 300;

/// Largest accepted upload (20 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Program invoked by the process validator backend.
pub const DEFAULT_VALIDATOR_COMMAND: &str = "gtfs-accessibility-validator";

/// Upper bound on a single telemetry emission.
pub const DEFAULT_TELEMETRY_TIMEOUT_SECS: u64 = 5;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub validation: ValidationConfig,
    pub telemetry: TelemetryConfig,
}

/// Server-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

/// Which validation endpoint a request arrived on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Url,
    TrackedUrl,
    File,
}

/// How the external rule engine is reached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ValidatorBackend {
    /// Spawn a local program once per request
    Process { command: String, args: Vec<String> },
    /// POST to a remote rule-check service
    Http { url: String },
}

/// Limits and collaborators for the validation endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    pub url_budget_secs: u64,
    pub tracked_budget_secs: u64,
    pub file_budget_secs: u64,
    pub max_upload_bytes: usize,
    /// Cap on the summed uncompressed size of an uploaded archive; `None` disables the check
    pub max_uncompressed_bytes: Option<u64>,
    /// Parent directory for per-request staging directories
    pub staging_dir: PathBuf,
    pub backend: ValidatorBackend,
}

impl ValidationConfig {
    /// Execution budget applied around the rule engine for `endpoint`
    pub fn budget(&self, endpoint: Endpoint) -> Duration {
        let secs = match endpoint {
            Endpoint::Url => self.url_budget_secs,
            Endpoint::TrackedUrl => self.tracked_budget_secs,
            Endpoint::File => self.file_budget_secs,
        };
        Duration::from_secs(secs)
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Collector endpoint; events are only logged when unset
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let backend = match env_opt("VALIDATOR_BACKEND").as_deref() {
            None | Some("process") => ValidatorBackend::Process {
                command: env_opt("VALIDATOR_COMMAND")
                    .unwrap_or_else(|| DEFAULT_VALIDATOR_COMMAND.to_string()),
                args: env_opt("VALIDATOR_ARGS")
                    .map(|s| s.split_whitespace().map(str::to_string).collect())
                    .unwrap_or_default(),
            },
            Some("http") => ValidatorBackend::Http {
                url: env_opt("VALIDATOR_URL").unwrap_or_default(),
            },
            Some(other) => anyhow::bail!(
                "Unknown VALIDATOR_BACKEND '{}' (expected 'process' or 'http')",
                other
            ),
        };

        let config = Config {
            server: ServerConfig {
                host: env_opt("GTFS_A11Y_HOST").unwrap_or_else(|| DEFAULT_SERVER_HOST.to_string()),
                port: env_or("GTFS_A11Y_PORT", DEFAULT_SERVER_PORT),
                shutdown_timeout_secs: env_or(
                    "GTFS_A11Y_SHUTDOWN_TIMEOUT",
                    DEFAULT_SHUTDOWN_TIMEOUT_SECS,
                ),
            },
            cors: CorsConfig {
                allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| DEFAULT_CORS_ALLOWED_ORIGIN.to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                allow_credentials: env_or("CORS_ALLOW_CREDENTIALS", true),
            },
            validation: ValidationConfig {
                url_budget_secs: env_or("VALIDATE_URL_BUDGET_SECS", DEFAULT_URL_BUDGET_SECS),
                tracked_budget_secs: env_or(
                    "VALIDATE_TRACKED_BUDGET_SECS",
                    DEFAULT_TRACKED_BUDGET_SECS,
                ),
                file_budget_secs: env_or("VALIDATE_FILE_BUDGET_SECS", DEFAULT_FILE_BUDGET_SECS),
                max_upload_bytes: env_or("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES),
                max_uncompressed_bytes: env_opt("MAX_UNCOMPRESSED_BYTES")
                    .map(|s| s.parse::<u64>())
                    .transpose()
                    .map_err(|e| anyhow::anyhow!("Invalid MAX_UNCOMPRESSED_BYTES: {}", e))?,
                staging_dir: env_opt("STAGING_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(std::env::temp_dir),
                backend,
            },
            telemetry: TelemetryConfig {
                endpoint: env_opt("TELEMETRY_ENDPOINT"),
                timeout_secs: env_or("TELEMETRY_TIMEOUT_SECS", DEFAULT_TELEMETRY_TIMEOUT_SECS),
            },
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be greater than 0");
        }

        let validation = &self.validation;
        if validation.url_budget_secs == 0
            || validation.tracked_budget_secs == 0
            || validation.file_budget_secs == 0
        {
            anyhow::bail!("Validation budgets must be greater than 0 seconds");
        }

        if validation.max_upload_bytes == 0 {
            anyhow::bail!("MAX_UPLOAD_BYTES must be greater than 0");
        }

        match &validation.backend {
            ValidatorBackend::Process { command, .. } if command.trim().is_empty() => {
                anyhow::bail!("VALIDATOR_COMMAND cannot be empty");
            }
            ValidatorBackend::Http { url } => {
                let parsed = url::Url::parse(url).map_err(|e| {
                    anyhow::anyhow!("VALIDATOR_URL '{}' is not a valid URL: {}", url, e)
                })?;
                if !matches!(parsed.scheme(), "http" | "https") {
                    anyhow::bail!("VALIDATOR_URL must use http or https");
                }
            }
            ValidatorBackend::Process { .. } => {}
        }

        if self.cors.allowed_origins.is_empty() {
            tracing::warn!("No CORS origins configured - all origins will be allowed");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_SERVER_HOST.to_string(),
                port: DEFAULT_SERVER_PORT,
                shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            },
            cors: CorsConfig {
                allowed_origins: vec![DEFAULT_CORS_ALLOWED_ORIGIN.to_string()],
                allow_credentials: true,
            },
            validation: ValidationConfig::default(),
            telemetry: TelemetryConfig {
                endpoint: None,
                timeout_secs: DEFAULT_TELEMETRY_TIMEOUT_SECS,
            },
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            url_budget_secs: DEFAULT_URL_BUDGET_SECS,
            tracked_budget_secs: DEFAULT_TRACKED_BUDGET_SECS,
            file_budget_secs: DEFAULT_FILE_BUDGET_SECS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_uncompressed_bytes: None,
            staging_dir: std::env::temp_dir(),
            backend: ValidatorBackend::Process {
                command: DEFAULT_VALIDATOR_COMMAND.to_string(),
                args: Vec::new(),
            },
        }
    }
}
