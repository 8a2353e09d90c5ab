//! # Concurrency
//!
//! Many callers racing against the same airline, flight or passenger.
//! Each test checks the invariant that must survive the race rather than
//! any particular interleaving.

#[cfg(test)]
mod tests {
    use super::super::{airline, new_service, oracle, passenger, TestService, OWNER};
    use futures::future::join_all;
    use shared_bus::SuretyEvent;
    use shared_types::{FlightStatus, ETHER};
    use std::sync::Arc;
    use surety_engine::{Admission, ResponseOutcome, SuretyApi, SuretyError};

    const FLIGHT: &str = "RACE1";
    const TIMESTAMP: u64 = 1_700_000_000;

    /// Owner plus three bootstrap members, all funded.
    async fn four_funded_members() -> Arc<TestService> {
        let (service, _) = new_service();
        service.fund(OWNER, 10 * ETHER).await.unwrap();
        for n in 2..=4 {
            service
                .register_airline(OWNER, airline(n), format!("Airline {n}"))
                .await
                .unwrap();
            service.fund(airline(n), 10 * ETHER).await.unwrap();
        }
        service
    }

    /// Concurrent votes for one candidate are all counted and admit it once.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_votes_admit_once() {
        let service = four_funded_members().await;
        let voters = [OWNER, airline(2), airline(3), airline(4)];

        let results = join_all(voters.iter().map(|voter| {
            let service = service.clone();
            let voter = *voter;
            tokio::spawn(async move {
                service
                    .register_airline(voter, airline(9), "Late Joiner".into())
                    .await
            })
        }))
        .await;

        let admissions: Vec<Admission> = results
            .into_iter()
            .map(|joined| joined.unwrap().unwrap())
            .collect();
        let registered = admissions
            .iter()
            .filter(|a| **a == Admission::Registered)
            .count();
        assert_eq!(registered, 1);
        assert!(service.is_airline_registered(airline(9)).await);
        assert_eq!(service.airline_count().await, 5);
    }

    /// Racing oracle responses finalize the flight and credit exactly once.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_reports_credit_once() {
        let (service, events) = new_service();
        service.fund(OWNER, 10 * ETHER).await.unwrap();
        service
            .register_flight(OWNER, FLIGHT.into(), TIMESTAMP)
            .await
            .unwrap();
        service
            .buy(passenger(1), FLIGHT.into(), ETHER)
            .await
            .unwrap();
        for n in 0..40 {
            service.register_oracle(oracle(n), ETHER).await.unwrap();
        }
        let ticket = service
            .fetch_flight_status(passenger(1), OWNER, FLIGHT.into(), TIMESTAMP)
            .await
            .unwrap();

        let mut holders = Vec::new();
        for n in 0..40 {
            if service
                .get_my_indexes(oracle(n))
                .await
                .unwrap()
                .contains(&ticket.index)
            {
                holders.push(n);
            }
        }

        let results = join_all(holders.iter().map(|n| {
            let service = service.clone();
            let n = *n;
            let index = ticket.index;
            tokio::spawn(async move {
                service
                    .submit_oracle_response(
                        oracle(n),
                        index,
                        OWNER,
                        FLIGHT.into(),
                        TIMESTAMP,
                        FlightStatus::LateAirline.code(),
                    )
                    .await
            })
        }))
        .await;

        let resolved = results
            .into_iter()
            .map(|joined| joined.unwrap())
            .filter(|r| matches!(r, Ok(ResponseOutcome::Resolved(_))))
            .count();
        if holders.len() >= 3 {
            assert_eq!(resolved, 1);
            assert_eq!(
                service.get_passenger_credit(passenger(1)).await,
                3 * ETHER / 2
            );
            assert_eq!(
                events.count_where(|e| matches!(e, SuretyEvent::PassengerCredited { .. })),
                1
            );
        } else {
            assert_eq!(resolved, 0);
            assert_eq!(service.get_passenger_credit(passenger(1)).await, 0);
        }
    }

    /// Concurrent withdrawals of one credit pay it out exactly once.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_withdrawals_pay_once() {
        let (service, _) = new_service();
        service.fund(OWNER, 10 * ETHER).await.unwrap();
        service
            .register_flight(OWNER, FLIGHT.into(), TIMESTAMP)
            .await
            .unwrap();
        service
            .buy(passenger(1), FLIGHT.into(), ETHER)
            .await
            .unwrap();
        let key = service.flight_key_for(FLIGHT).unwrap();
        let store = service.store();
        store.flights.finalize(&key, FlightStatus::LateAirline).unwrap();
        store.ledger.on_flight_resolved(&key, FlightStatus::LateAirline);

        let results = join_all((0..8).map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.withdraw(passenger(1)).await })
        }))
        .await;

        let mut paid = 0;
        for result in results {
            match result.unwrap() {
                Ok(amount) => paid += amount,
                Err(err) => assert_eq!(err, SuretyError::NoCredit),
            }
        }
        assert_eq!(paid, 3 * ETHER / 2);
        assert_eq!(service.get_passenger_credit(passenger(1)).await, 0);
    }

    /// Concurrent purchases by one passenger all land in the total.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_purchases_accumulate() {
        let (service, _) = new_service();
        service.fund(OWNER, 10 * ETHER).await.unwrap();
        service
            .register_flight(OWNER, FLIGHT.into(), TIMESTAMP)
            .await
            .unwrap();

        join_all((0..10).map(|_| {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .buy(passenger(1), FLIGHT.into(), ETHER / 10)
                    .await
                    .unwrap()
            })
        }))
        .await;

        assert_eq!(
            service.get_insured_amount(FLIGHT.into(), passenger(1)).await,
            ETHER
        );
        assert_eq!(service.pool_balance().await, 11 * ETHER);
    }

    /// Simultaneous registrations of one oracle: one wins.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_duplicate_oracle_registration_race() {
        let (service, _) = new_service();
        let results = join_all((0..6).map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.register_oracle(oracle(0), ETHER).await })
        }))
        .await;

        let (won, lost): (Vec<_>, Vec<_>) = results
            .into_iter()
            .map(|joined| joined.unwrap())
            .partition(Result::is_ok);
        assert_eq!(won.len(), 1);
        assert!(lost
            .iter()
            .all(|r| *r == Err(SuretyError::AlreadyRegistered)));
        assert_eq!(service.pool_balance().await, ETHER);
    }
}
