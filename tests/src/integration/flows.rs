//! # Integration Test Flows
//!
//! Drives the engine through [`SuretyApi`] only, the way a front end would:
//!
//! 1. **Governance**: bootstrap admission, then multi-party consensus
//! 2. **Insurance**: premiums escrowed against the latest flight by code
//! 3. **Oracle round**: request, matching reports, credit, withdrawal

#[cfg(test)]
mod tests {
    use super::super::{airline, new_service, oracle, passenger, TestService, OWNER};
    use shared_bus::SuretyEvent;
    use shared_types::{Amount, FlightKey, FlightStatus, ETHER};
    use std::sync::Arc;
    use surety_engine::{Admission, RequestTicket, ResponseOutcome, SuretyApi, SuretyError};

    const FLIGHT: &str = "ND1309";
    const TIMESTAMP: u64 = 1_700_000_000;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    async fn funded_owner() -> Arc<TestService> {
        let (service, _) = new_service();
        service.fund(OWNER, 10 * ETHER).await.unwrap();
        service
    }

    async fn with_flight() -> (Arc<TestService>, FlightKey) {
        let service = funded_owner().await;
        let key = service
            .register_flight(OWNER, FLIGHT.into(), TIMESTAMP)
            .await
            .unwrap();
        (service, key)
    }

    async fn register_oracles(service: &TestService, count: u8) {
        for n in 0..count {
            service.register_oracle(oracle(n), ETHER).await.unwrap();
        }
    }

    /// Oracles (by number) that hold `index`.
    async fn holders(service: &TestService, count: u8, index: u8) -> Vec<u8> {
        let mut found = Vec::new();
        for n in 0..count {
            if service.get_my_indexes(oracle(n)).await.unwrap().contains(&index) {
                found.push(n);
            }
        }
        found
    }

    /// Open requests until one lands on an index with at least `needed`
    /// holders.
    async fn answerable_request(
        service: &TestService,
        oracles: u8,
        needed: usize,
    ) -> (RequestTicket, Vec<u8>) {
        for _ in 0..50 {
            let ticket = service
                .fetch_flight_status(passenger(0), OWNER, FLIGHT.into(), TIMESTAMP)
                .await
                .unwrap();
            let found = holders(service, oracles, ticket.index).await;
            if found.len() >= needed {
                return (ticket, found);
            }
        }
        panic!("no index with {needed} holders among {oracles} oracles");
    }

    async fn report(
        service: &TestService,
        n: u8,
        ticket: &RequestTicket,
        status: FlightStatus,
    ) -> Result<ResponseOutcome, SuretyError> {
        service
            .submit_oracle_response(
                oracle(n),
                ticket.index,
                OWNER,
                FLIGHT.into(),
                TIMESTAMP,
                status.code(),
            )
            .await
    }

    // =============================================================================
    // GOVERNANCE
    // =============================================================================

    /// An airline that has not funded cannot nominate another.
    #[tokio::test]
    async fn test_unfunded_airline_cannot_nominate() {
        let (service, _) = new_service();

        let result = service
            .register_airline(OWNER, airline(2), "Second Air".into())
            .await;

        assert_eq!(result, Err(SuretyError::NominatorNotFunded));
        assert!(!service.is_airline_registered(airline(2)).await);
    }

    /// Bootstrap admits the first four, the fifth needs half the members.
    #[tokio::test]
    async fn test_governance_bootstrap_then_consensus() {
        let service = funded_owner().await;
        for n in 2..=4 {
            let admission = service
                .register_airline(OWNER, airline(n), format!("Airline {n}"))
                .await
                .unwrap();
            assert_eq!(admission, Admission::Registered);
        }
        assert_eq!(service.airline_count().await, 4);

        let first_vote = service
            .register_airline(OWNER, airline(5), "Airline 5".into())
            .await
            .unwrap();
        assert_eq!(
            first_vote,
            Admission::VoteRecorded {
                votes: 1,
                required: 2
            }
        );
        assert!(!service.is_airline_registered(airline(5)).await);
        // The nominee is known but not yet a member.
        assert_eq!(service.airline_count().await, 5);
        assert_eq!(service.member_count(), 4);

        // The same voter twice does not count.
        let repeat = service
            .register_airline(OWNER, airline(5), "Airline 5".into())
            .await
            .unwrap();
        assert_eq!(repeat, Admission::AlreadyVoted);

        // Airline 2 must fund before its vote counts.
        assert_eq!(
            service
                .register_airline(airline(2), airline(5), "Airline 5".into())
                .await,
            Err(SuretyError::NominatorNotFunded)
        );
        service.fund(airline(2), 10 * ETHER).await.unwrap();
        let second_vote = service
            .register_airline(airline(2), airline(5), "Airline 5".into())
            .await
            .unwrap();
        assert_eq!(second_vote, Admission::Registered);
        assert_eq!(service.airline_count().await, 5);

        // Five members: the sixth needs three votes.
        let vote = service
            .register_airline(OWNER, airline(6), "Airline 6".into())
            .await
            .unwrap();
        assert_eq!(
            vote,
            Admission::VoteRecorded {
                votes: 1,
                required: 3
            }
        );
        assert_eq!(service.airline_count().await, 6);
        assert_eq!(service.member_count(), 5);
    }

    /// Admitted candidates keep the name from their nomination.
    #[tokio::test]
    async fn test_admitted_airline_keeps_nomination_name() {
        let service = funded_owner().await;
        service
            .register_airline(OWNER, airline(2), "Second Air".into())
            .await
            .unwrap();
        let record = service.airline(&airline(2)).unwrap();
        assert_eq!(record.name, "Second Air");
        assert!(record.registered);
        assert!(!record.funded);
    }

    // =============================================================================
    // INSURANCE
    // =============================================================================

    /// Buying 0.8 ether is recorded and escrowed in the pool.
    #[tokio::test]
    async fn test_passenger_buys_insurance() {
        let (service, _) = with_flight().await;
        let premium: Amount = 8 * ETHER / 10;

        let total = service
            .buy(passenger(1), FLIGHT.into(), premium)
            .await
            .unwrap();

        assert_eq!(total, premium);
        assert_eq!(
            service.get_insured_amount(FLIGHT.into(), passenger(1)).await,
            premium
        );
        assert_eq!(service.pool_balance().await, 10 * ETHER + premium);
    }

    /// Purchases accumulate; each one is capped separately.
    #[tokio::test]
    async fn test_premiums_accumulate_per_flight() {
        let (service, _) = with_flight().await;
        service
            .buy(passenger(1), FLIGHT.into(), ETHER / 2)
            .await
            .unwrap();
        let total = service
            .buy(passenger(1), FLIGHT.into(), ETHER / 2)
            .await
            .unwrap();
        assert_eq!(total, ETHER);

        assert_eq!(
            service.buy(passenger(1), FLIGHT.into(), ETHER + 1).await,
            Err(SuretyError::PremiumExceedsCap {
                amount: ETHER + 1,
                cap: ETHER
            })
        );
        assert_eq!(
            service.get_insured_amount(FLIGHT.into(), passenger(1)).await,
            ETHER
        );
    }

    /// A flight code re-registered later points at the newer flight.
    #[tokio::test]
    async fn test_flight_code_resolves_to_latest_registration() {
        let (service, first) = with_flight().await;
        service
            .buy(passenger(1), FLIGHT.into(), ETHER)
            .await
            .unwrap();

        let second = service
            .register_flight(OWNER, FLIGHT.into(), TIMESTAMP + 86_400)
            .await
            .unwrap();
        assert_ne!(first, second);
        assert_eq!(service.flight_key_for(FLIGHT), Some(second));
        assert_eq!(
            service.get_insured_amount(FLIGHT.into(), passenger(1)).await,
            0
        );
    }

    // =============================================================================
    // ORACLE ROUND
    // =============================================================================

    /// Twenty oracles each receive three distinct in-range indexes.
    #[tokio::test]
    async fn test_twenty_oracles_register() {
        let (service, _) = new_service();
        register_oracles(&service, 20).await;

        for n in 0..20 {
            let indexes = service.get_my_indexes(oracle(n)).await.unwrap();
            assert!(indexes.iter().all(|i| *i < 10));
            assert_ne!(indexes[0], indexes[1]);
            assert_ne!(indexes[1], indexes[2]);
            assert_ne!(indexes[0], indexes[2]);
        }
        assert_eq!(service.oracle_count(), 20);
        assert_eq!(service.pool_balance().await, 20 * ETHER);
    }

    /// Full round: late-airline consensus credits 1.5x and pays once.
    #[tokio::test]
    async fn test_late_airline_round_credits_and_pays() {
        let (service, key) = with_flight().await;
        service
            .buy(passenger(1), FLIGHT.into(), ETHER)
            .await
            .unwrap();
        service
            .buy(passenger(2), FLIGHT.into(), ETHER / 2)
            .await
            .unwrap();
        register_oracles(&service, 30).await;

        let (ticket, holders) = answerable_request(&service, 30, 3).await;
        for (i, n) in holders.iter().take(3).enumerate() {
            let outcome = report(&service, *n, &ticket, FlightStatus::LateAirline)
                .await
                .unwrap();
            if i < 2 {
                assert!(matches!(outcome, ResponseOutcome::Recorded { .. }));
            } else {
                assert_eq!(outcome, ResponseOutcome::Resolved(FlightStatus::LateAirline));
            }
        }

        assert_eq!(
            service.check_flight_status(FLIGHT.into()).await,
            FlightStatus::LateAirline
        );
        assert_eq!(
            service.get_passenger_credit(passenger(1)).await,
            3 * ETHER / 2
        );
        assert_eq!(
            service.get_passenger_credit(passenger(2)).await,
            3 * ETHER / 4
        );

        let before = service.pool_balance().await;
        assert_eq!(service.withdraw(passenger(1)).await, Ok(3 * ETHER / 2));
        assert_eq!(service.withdraw(passenger(1)).await, Err(SuretyError::NoCredit));
        assert_eq!(service.pool_balance().await, before - 3 * ETHER / 2);

        // Settled flights take no more premiums or reports.
        assert_eq!(
            service.buy(passenger(3), FLIGHT.into(), ETHER).await,
            Err(SuretyError::FlightResolved)
        );
        if let Some(late) = holders.get(3) {
            assert_eq!(
                report(&service, *late, &ticket, FlightStatus::OnTime).await,
                Err(SuretyError::RequestNotOpen)
            );
        }
        assert_eq!(service.flight_status(&key), Some(FlightStatus::LateAirline));
    }

    /// On-time consensus resolves the flight without crediting anyone.
    #[tokio::test]
    async fn test_on_time_round_credits_nobody() {
        let (service, events) = {
            let (service, events) = new_service();
            service.fund(OWNER, 10 * ETHER).await.unwrap();
            service
                .register_flight(OWNER, FLIGHT.into(), TIMESTAMP)
                .await
                .unwrap();
            (service, events)
        };
        service
            .buy(passenger(1), FLIGHT.into(), ETHER)
            .await
            .unwrap();
        register_oracles(&service, 30).await;

        let (ticket, holders) = answerable_request(&service, 30, 3).await;
        for n in holders.iter().take(3) {
            report(&service, *n, &ticket, FlightStatus::OnTime)
                .await
                .unwrap();
        }

        assert_eq!(
            service.check_flight_status(FLIGHT.into()).await,
            FlightStatus::OnTime
        );
        assert_eq!(service.get_passenger_credit(passenger(1)).await, 0);
        assert_eq!(
            events.count_where(|e| matches!(e, SuretyEvent::PassengerCredited { .. })),
            0
        );
        assert_eq!(
            events.count_where(|e| matches!(e, SuretyEvent::FlightStatusInfo { .. })),
            1
        );
    }

    /// Agreement on "unknown" closes the request but leaves the flight open
    /// for a fresh request.
    #[tokio::test]
    async fn test_unknown_consensus_allows_new_request() {
        let (service, _) = with_flight().await;
        service
            .buy(passenger(1), FLIGHT.into(), ETHER)
            .await
            .unwrap();
        register_oracles(&service, 30).await;

        let (ticket, holders) = answerable_request(&service, 30, 3).await;
        for n in holders.iter().take(3) {
            report(&service, *n, &ticket, FlightStatus::Unknown)
                .await
                .unwrap();
        }
        assert_eq!(
            service.check_flight_status(FLIGHT.into()).await,
            FlightStatus::Unknown
        );
        assert_eq!(
            report(&service, holders[0], &ticket, FlightStatus::Unknown).await,
            Err(SuretyError::RequestNotOpen)
        );

        // Passengers may still buy and a new round can settle.
        service
            .buy(passenger(1), FLIGHT.into(), ETHER / 2)
            .await
            .unwrap();
        let (ticket, holders) = answerable_request(&service, 30, 3).await;
        for n in holders.iter().take(3) {
            report(&service, *n, &ticket, FlightStatus::LateAirline)
                .await
                .unwrap();
        }
        assert_eq!(
            service.get_passenger_credit(passenger(1)).await,
            9 * ETHER / 4
        );
    }

    /// An oracle that does not hold the request's index is refused.
    #[tokio::test]
    async fn test_oracle_outside_index_rejected() {
        let (service, _) = with_flight().await;
        register_oracles(&service, 30).await;
        let ticket = service
            .fetch_flight_status(passenger(0), OWNER, FLIGHT.into(), TIMESTAMP)
            .await
            .unwrap();

        let mut outsider = None;
        for n in 0..30 {
            let indexes = service.get_my_indexes(oracle(n)).await.unwrap();
            if !indexes.contains(&ticket.index) {
                outsider = Some(n);
                break;
            }
        }
        let outsider = outsider.expect("some oracle misses the index");
        assert_eq!(
            report(&service, outsider, &ticket, FlightStatus::OnTime).await,
            Err(SuretyError::IndexMismatch {
                index: ticket.index
            })
        );
    }
}
