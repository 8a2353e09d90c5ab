//! # Flight Surety Node
//!
//! Runtime around the surety engine.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from the environment
//! 2. Initialize telemetry
//! 3. Build the engine over the shared bus
//! 4. Register the simulated oracle pool and start its workers
//! 5. Run the demonstration round (optional)
//! 6. Serve until Ctrl-C, then shut down gracefully

pub mod config;
pub mod demo;
pub mod oracles;
pub mod runtime;

pub use config::{ConfigError, NodeConfig, OracleBehaviour};
pub use demo::DemoReport;
pub use runtime::{NodeRuntime, NodeService};
