//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for structured logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error) or a full
    /// `EnvFilter` directive such as `surety_engine=debug,info`
    pub log_level: String,

    /// Whether to emit JSON formatted logs
    pub json_logs: bool,

    /// Whether to include the module target in each line
    pub with_target: bool,

    /// Network identifier (devnet, testnet, mainnet)
    pub network: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "flight-surety".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            with_target: true,
            network: "devnet".to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `FS_SERVICE_NAME`: Service name (default: flight-surety)
    /// - `FS_LOG_LEVEL` or `RUST_LOG`: Log filter (default: info)
    /// - `FS_JSON_LOGS`: Enable JSON logs (default: false in dev, true in containers)
    /// - `FS_LOG_TARGET`: Include module targets (default: true)
    /// - `FS_NETWORK`: Network name (default: devnet)
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        Self {
            service_name: env::var("FS_SERVICE_NAME")
                .unwrap_or_else(|_| "flight-surety".to_string()),

            log_level: env::var("FS_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            json_logs: env::var("FS_JSON_LOGS")
                .map(|v| parse_flag(&v))
                .unwrap_or(is_container),

            with_target: env::var("FS_LOG_TARGET")
                .map(|v| parse_flag(&v))
                .unwrap_or(true),

            network: env::var("FS_NETWORK").unwrap_or_else(|_| "devnet".to_string()),
        }
    }

    /// Configuration for one named component of the runtime.
    pub fn for_component(component: &str) -> Self {
        let mut config = Self::from_env();
        config.service_name = format!("{}-{}", config.service_name, component);
        config
    }
}

/// `true`, `1`, `yes` and `on` (any case) are truthy.
fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}
