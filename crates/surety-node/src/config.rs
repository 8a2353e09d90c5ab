//! # Node Configuration
//!
//! Runtime parameters read from the environment. Every variable is optional;
//! unset variables keep the defaults below.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `FS_ADMIN` | `0x0101…01` |
//! | `FS_ORACLE_COUNT` | `20` |
//! | `FS_ORACLE_STATUS` | `20` (late-airline); `random` picks per response |
//! | `FS_REGISTRATION_FEE_WEI` | 1 ETHER |
//! | `FS_AIRLINE_MIN_FUNDING_WEI` | 10 ETHER |
//! | `FS_INDEX_SPACE` | `10` |
//! | `FS_MIN_RESPONSES` | `3` |
//! | `FS_RUN_DEMO` | `true` |
//! | `FS_POLL_INTERVAL_MS` | `50` |
//! | `FS_DEMO_TIMEOUT_SECS` | `10` |

use shared_types::{parse_address, Address, Amount, FlightStatus, ParseError};
use std::str::FromStr;
use std::time::Duration;
use surety_engine::SuretyConfig;
use surety_telemetry::TelemetryConfig;

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key}: cannot parse {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("{key}: invalid address: {source}")]
    InvalidAddress {
        key: &'static str,
        #[source]
        source: ParseError,
    },

    #[error("{key}: unknown status code {code}")]
    UnknownStatus { key: &'static str, code: u8 },

    #[error("engine configuration rejected: {0}")]
    Engine(#[from] surety_engine::ConfigError),
}

/// How simulated oracles answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OracleBehaviour {
    /// Always report this status.
    Fixed(FlightStatus),
    /// Report a uniformly random status per request.
    Random,
}

impl Default for OracleBehaviour {
    fn default() -> Self {
        Self::Fixed(FlightStatus::LateAirline)
    }
}

/// Complete node configuration.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Engine parameters.
    pub engine: SuretyConfig,
    /// Logging configuration.
    pub telemetry: TelemetryConfig,
    /// Number of simulated oracle workers.
    pub oracle_count: usize,
    /// Simulated oracle answers.
    pub oracle_behaviour: OracleBehaviour,
    /// Run the demonstration round at startup.
    pub run_demo: bool,
    /// Interval between status polls in the demo.
    pub poll_interval: Duration,
    /// Give up on a demo status request after this long.
    pub demo_timeout: Duration,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            engine: SuretyConfig::default(),
            telemetry: TelemetryConfig::default(),
            oracle_count: 20,
            oracle_behaviour: OracleBehaviour::default(),
            run_demo: true,
            poll_interval: Duration::from_millis(50),
            demo_timeout: Duration::from_secs(10),
        }
    }
}

impl NodeConfig {
    /// Load from process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to resolve variables.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self {
            telemetry: TelemetryConfig::from_env(),
            ..Self::default()
        };

        if let Some(raw) = lookup("FS_ADMIN") {
            let admin = parse_admin(&raw)?;
            config.engine.administrator = admin;
            config.engine.genesis_airline = admin;
        }
        if let Some(count) = parse_var(&lookup, "FS_ORACLE_COUNT")? {
            config.oracle_count = count;
        }
        if let Some(raw) = lookup("FS_ORACLE_STATUS") {
            config.oracle_behaviour = parse_behaviour(&raw)?;
        }
        if let Some(fee) = parse_var::<Amount, _>(&lookup, "FS_REGISTRATION_FEE_WEI")? {
            config.engine.registration_fee = fee;
        }
        if let Some(minimum) = parse_var::<Amount, _>(&lookup, "FS_AIRLINE_MIN_FUNDING_WEI")? {
            config.engine.airline_min_funding = minimum;
        }
        if let Some(space) = parse_var(&lookup, "FS_INDEX_SPACE")? {
            config.engine.index_space = space;
        }
        if let Some(min) = parse_var(&lookup, "FS_MIN_RESPONSES")? {
            config.engine.min_responses = min;
        }
        if let Some(raw) = lookup("FS_RUN_DEMO") {
            config.run_demo = parse_flag("FS_RUN_DEMO", &raw)?;
        }
        if let Some(ms) = parse_var(&lookup, "FS_POLL_INTERVAL_MS")? {
            config.poll_interval = Duration::from_millis(ms);
        }
        if let Some(secs) = parse_var(&lookup, "FS_DEMO_TIMEOUT_SECS")? {
            config.demo_timeout = Duration::from_secs(secs);
        }

        config.engine.validate()?;
        Ok(config)
    }

    pub fn administrator(&self) -> Address {
        self.engine.administrator
    }
}

fn parse_admin(raw: &str) -> Result<Address, ConfigError> {
    parse_address(raw).map_err(|source| ConfigError::InvalidAddress {
        key: "FS_ADMIN",
        source,
    })
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue { key, value })
        })
        .transpose()
}

fn parse_flag(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
        }),
    }
}

fn parse_behaviour(raw: &str) -> Result<OracleBehaviour, ConfigError> {
    const KEY: &str = "FS_ORACLE_STATUS";
    if raw.trim().eq_ignore_ascii_case("random") {
        return Ok(OracleBehaviour::Random);
    }
    let code: u8 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: KEY,
        value: raw.to_string(),
    })?;
    FlightStatus::from_code(code)
        .map(OracleBehaviour::Fixed)
        .ok_or(ConfigError::UnknownStatus { key: KEY, code })
}
