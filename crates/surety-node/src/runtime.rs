//! # Node Runtime
//!
//! Wires the engine to the shared bus, starts the oracle pool and an event
//! logger, and coordinates shutdown through a watch channel.

use crate::config::NodeConfig;
use crate::oracles;
use anyhow::{Context, Result};
use shared_bus::{EventFilter, EventPublisher, EventTopic, InMemoryEventBus, SuretyEvent};
use shared_types::format_address;
use std::sync::Arc;
use std::time::Duration;
use surety_engine::{
    BusEventSink, KeccakIndexSource, NullPayout, SuretyApi, SuretyDependencies, SuretyService,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Concrete service type run by the node.
pub type NodeService = SuretyService<BusEventSink<InMemoryEventBus>, KeccakIndexSource, NullPayout>;

/// The running node.
pub struct NodeRuntime {
    config: NodeConfig,
    bus: Arc<InMemoryEventBus>,
    service: Arc<NodeService>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    tasks: parking_lot::Mutex<Vec<JoinHandle<()>>>,
}

impl NodeRuntime {
    /// Build the engine and bus from configuration.
    pub fn new(config: NodeConfig) -> Result<Self> {
        let bus = Arc::new(InMemoryEventBus::new());
        let salt: [u8; 32] = rand::random();
        let service = SuretyService::new(SuretyDependencies {
            events: Arc::new(BusEventSink::new(bus.clone())),
            index_source: Arc::new(KeccakIndexSource::new(salt)),
            payout: Arc::new(NullPayout),
            config: config.engine.clone(),
        })
        .context("failed to build surety engine")?;
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Ok(Self {
            config,
            bus,
            service: Arc::new(service),
            shutdown_tx,
            shutdown_rx,
            tasks: parking_lot::Mutex::new(Vec::new()),
        })
    }

    pub fn service(&self) -> Arc<NodeService> {
        self.service.clone()
    }

    pub fn api(&self) -> Arc<dyn SuretyApi> {
        self.service.clone()
    }

    pub fn bus(&self) -> &Arc<InMemoryEventBus> {
        &self.bus
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Start the event logger and the oracle pool.
    pub async fn start(&self) -> Result<()> {
        info!("===========================================");
        info!("  Flight Surety Node v{}", env!("CARGO_PKG_VERSION"));
        info!(
            "  Administrator: {}",
            format_address(&self.config.administrator())
        );
        info!("===========================================");

        let logger = self.spawn_event_logger();
        let workers = oracles::spawn_pool(
            self.api(),
            &self.bus,
            self.config.oracle_count,
            self.config.engine.registration_fee,
            self.config.oracle_behaviour,
            self.shutdown_rx.clone(),
        )
        .await
        .context("failed to register oracle pool")?;

        let mut tasks = self.tasks.lock();
        tasks.push(logger);
        tasks.extend(workers);
        info!(
            tasks = tasks.len(),
            subscribers = self.bus.subscriber_count(),
            "Node started"
        );
        Ok(())
    }

    fn spawn_event_logger(&self) -> JoinHandle<()> {
        let mut subscription = self.bus.subscribe(EventFilter::topics(vec![
            EventTopic::Governance,
            EventTopic::Flights,
            EventTopic::Insurance,
            EventTopic::DeadLetterQueue,
        ]));
        let mut shutdown = self.shutdown_rx.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    event = subscription.recv() => match event {
                        Some(event) => log_event(&event),
                        None => break,
                    },
                    _ = shutdown.changed() => break,
                }
            }
        })
    }

    /// Signal every task to stop and wait for them.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");
        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }

        let tasks: Vec<_> = std::mem::take(&mut *self.tasks.lock());
        let drained = tokio::time::timeout(Duration::from_secs(2), async {
            for task in tasks {
                let _ = task.await;
            }
        })
        .await;
        if drained.is_err() {
            warn!("Some tasks did not stop in time");
        }
        info!(events = self.bus.events_published(), "Shutdown complete");
    }
}

fn log_event(event: &SuretyEvent) {
    match event {
        SuretyEvent::AirlineRegistered { airline, name } => {
            info!(airline = %format_address(airline), %name, "[governance] airline registered")
        }
        SuretyEvent::FlightStatusInfo { flight, status } => {
            info!(flight = %flight, %status, "[flights] status agreed")
        }
        SuretyEvent::PassengerCredited {
            passenger, amount, ..
        } => {
            info!(passenger = %format_address(passenger), amount, "[insurance] passenger credited")
        }
        SuretyEvent::CriticalError { component, error } => {
            error!(?component, %error, "[dlq] critical error")
        }
        other => tracing::debug!(topic = ?other.topic(), event = ?other, "event"),
    }
}
