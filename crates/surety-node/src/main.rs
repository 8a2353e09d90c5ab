//! # Flight Surety Node
//!
//! Entry point: configuration, telemetry, runtime, Ctrl-C.

use anyhow::{Context, Result};
use surety_node::{demo, NodeConfig, NodeRuntime};
use surety_telemetry::init_telemetry;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config = NodeConfig::from_env().context("invalid node configuration")?;
    let _telemetry =
        init_telemetry(config.telemetry.clone()).context("failed to initialize telemetry")?;

    let runtime = NodeRuntime::new(config)?;
    runtime.start().await?;

    if runtime.config().run_demo {
        let api = runtime.api();
        let config = runtime.config();
        match demo::run(
            api.as_ref(),
            config.administrator(),
            config.poll_interval,
            config.demo_timeout,
        )
        .await
        {
            Ok(report) => info!(?report, "Demonstration finished"),
            Err(e) => error!("Demonstration failed: {e:#}"),
        }
    }

    info!("Node running. Press Ctrl-C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;

    runtime.shutdown().await;
    Ok(())
}
