//! # End-to-End Choreography
//!
//! Engine, shared bus and simulated oracle workers wired together as the
//! node runs them. The test only triggers the request; everything after it
//! (oracle answers, consensus, crediting) happens through bus events.
//!
//! ```text
//! fetch_flight_status ──▶ OracleRequest ──▶ oracle workers
//!                                                 │
//!        FlightStatusInfo ◀── consensus ◀── submit_oracle_response
//!        PassengerCredited
//! ```

use shared_bus::{EventFilter, EventTopic, InMemoryEventBus, SuretyEvent, Subscription};
use shared_types::{Address, FlightStatus, ETHER};
use std::sync::Arc;
use std::time::Duration;
use surety_engine::{
    BusEventSink, KeccakIndexSource, NullPayout, SuretyApi, SuretyConfig, SuretyDependencies,
    SuretyService,
};
use surety_node::oracles::spawn_pool;
use surety_node::OracleBehaviour;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::timeout;

const ADMIN: Address = [0x01; 20];
const FLIGHT: &str = "E2E42";
const TIMESTAMP: u64 = 1_700_000_000;

/// Engine on a live bus with a running oracle pool.
struct Network {
    bus: Arc<InMemoryEventBus>,
    api: Arc<dyn SuretyApi>,
    shutdown: watch::Sender<bool>,
    workers: Vec<JoinHandle<()>>,
}

impl Network {
    async fn start(oracles: usize, behaviour: OracleBehaviour) -> Self {
        let bus = Arc::new(InMemoryEventBus::new());
        let service = SuretyService::new(SuretyDependencies {
            events: Arc::new(BusEventSink::new(bus.clone())),
            index_source: Arc::new(KeccakIndexSource::new(rand::random())),
            payout: Arc::new(NullPayout),
            config: SuretyConfig::with_administrator(ADMIN),
        })
        .unwrap();
        let api: Arc<dyn SuretyApi> = Arc::new(service);
        let (shutdown, rx) = watch::channel(false);
        let workers = spawn_pool(api.clone(), &bus, oracles, ETHER, behaviour, rx)
            .await
            .unwrap();

        api.fund(ADMIN, 10 * ETHER).await.unwrap();
        api.register_flight(ADMIN, FLIGHT.into(), TIMESTAMP)
            .await
            .unwrap();

        Self {
            bus,
            api,
            shutdown,
            workers,
        }
    }

    fn watch(&self, topics: Vec<EventTopic>) -> Subscription {
        self.bus.subscribe(EventFilter::topics(topics))
    }

    async fn stop(self) {
        self.shutdown.send(true).unwrap();
        for worker in self.workers {
            timeout(Duration::from_secs(1), worker)
                .await
                .expect("worker stops on shutdown")
                .unwrap();
        }
    }
}

/// Request status until one round settles the flight.
async fn settle(network: &Network, flights: &mut Subscription) -> FlightStatus {
    for _ in 0..10 {
        network
            .api
            .fetch_flight_status([0xEE; 20], ADMIN, FLIGHT.into(), TIMESTAMP)
            .await
            .unwrap();
        while let Ok(Some(event)) = timeout(Duration::from_millis(500), flights.recv()).await {
            if let SuretyEvent::FlightStatusInfo { status, .. } = event {
                if status.is_resolved() {
                    return status;
                }
            }
        }
    }
    panic!("flight never settled");
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Oracle workers answer requests published on the bus and the
    /// resulting consensus credits the passenger.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_oracle_pool_settles_late_flight() {
        let network = Network::start(40, OracleBehaviour::Fixed(FlightStatus::LateAirline)).await;
        let mut flights = network.watch(vec![EventTopic::Flights]);
        let mut insurance = network.watch(vec![EventTopic::Insurance]);
        let passenger: Address = [0x77; 20];
        network
            .api
            .buy(passenger, FLIGHT.into(), ETHER)
            .await
            .unwrap();

        let status = settle(&network, &mut flights).await;
        assert_eq!(status, FlightStatus::LateAirline);

        let mut credited = None;
        while let Ok(Some(event)) = timeout(Duration::from_millis(500), insurance.recv()).await {
            if let SuretyEvent::PassengerCredited { amount, .. } = event {
                credited = Some(amount);
                break;
            }
        }
        assert_eq!(credited, Some(3 * ETHER / 2));
        assert_eq!(network.api.withdraw(passenger).await, Ok(3 * ETHER / 2));

        network.stop().await;
    }

    /// On-time answers settle the flight and nobody is credited.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_oracle_pool_settles_on_time_flight() {
        let network = Network::start(40, OracleBehaviour::Fixed(FlightStatus::OnTime)).await;
        let mut flights = network.watch(vec![EventTopic::Flights]);
        let passenger: Address = [0x78; 20];
        network
            .api
            .buy(passenger, FLIGHT.into(), ETHER)
            .await
            .unwrap();

        assert_eq!(settle(&network, &mut flights).await, FlightStatus::OnTime);
        assert_eq!(network.api.get_passenger_credit(passenger).await, 0);

        network.stop().await;
    }

    /// Every oracle registered by the pool is visible through the API.
    #[tokio::test]
    async fn test_pool_registers_every_oracle() {
        let network = Network::start(25, OracleBehaviour::Random).await;
        for n in 0..25 {
            let address = surety_node::oracles::oracle_address(n);
            let indexes = network.api.get_my_indexes(address).await.unwrap();
            assert!(indexes.iter().all(|i| *i < 10));
        }
        assert_eq!(network.api.pool_balance().await, 25 * ETHER + 10 * ETHER);
        network.stop().await;
    }

    /// The node runtime runs the demonstration round to completion.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_node_runtime_demo_round() {
        let mut config = surety_node::NodeConfig::default();
        config.oracle_count = 40;
        config.poll_interval = Duration::from_millis(10);
        config.demo_timeout = Duration::from_secs(1);

        let runtime = surety_node::NodeRuntime::new(config).unwrap();
        runtime.start().await.unwrap();

        let report = surety_node::demo::run(
            runtime.api().as_ref(),
            runtime.config().administrator(),
            runtime.config().poll_interval,
            runtime.config().demo_timeout,
        )
        .await
        .unwrap();

        assert_eq!(report.status, FlightStatus::LateAirline);
        assert_eq!(report.credit, 3 * ETHER / 2);
        assert_eq!(report.withdrawn, report.credit);
        assert!(report.requests >= 1);

        runtime.shutdown().await;
    }
}
