//! Integration tests for the booking ledger.
//!
//! These run against a real PostgreSQL pointed to by DATABASE_URL and are
//! ignored by default:
//!
//!     cargo test -p railbook-db -- --ignored
//!
//! Single-connection tests run inside a diesel test transaction and leave no
//! rows behind. The seat-race test needs two committing connections and
//! cleans up explicitly.

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::NaiveDate;
use diesel::prelude::*;
use dotenv::dotenv;

use railbook_db::connection::{create_connection_pool, Conn, PgPool};
use railbook_db::error::LedgerError;
use railbook_db::models::journey::{CapacityMode, Journey, NewJourney};
use railbook_db::models::order::{NewOrder, Order, TicketSpec};
use railbook_db::models::route::{NewRoute, Route};
use railbook_db::models::station::{NewStation, Station};
use railbook_db::models::ticket::Ticket;
use railbook_db::models::train::{NewTrain, Train};
use railbook_db::models::train_type::{NewTrainType, TrainType};

fn pool() -> PgPool {
    dotenv().ok();
    let pool = create_connection_pool();
    railbook_db::run_migrations(&pool);
    pool
}

fn uniq(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}-{}", prefix, nanos)
}

struct Fixture {
    station_a: Station,
    station_b: Station,
    train_type: TrainType,
    train: Train,
    route: Route,
    journey: Journey,
}

/// Stations, a 50-seat 8-car train, one route and one journey.
fn book_fixture(conn: &Conn) -> Fixture {
    let station_a = NewStation {
        name: uniq("Alpha"),
        latitude: 50.45,
        longitude: 30.52,
    }
    .create(conn)
    .unwrap();
    let station_b = NewStation {
        name: uniq("Beta"),
        latitude: 49.84,
        longitude: 24.03,
    }
    .create(conn)
    .unwrap();
    let train_type = NewTrainType {
        name: uniq("Intercity"),
    }
    .create(conn)
    .unwrap();
    let train = NewTrain {
        name: uniq("Express"),
        cargo_num: 8,
        places_in_cargo: 50,
        train_type_id: train_type.id,
    }
    .create(conn)
    .unwrap();
    let route = NewRoute::new(station_a.id, station_b.id, 540_000)
        .create(conn)
        .unwrap();
    let journey = NewJourney {
        route_id: route.id,
        train_id: Some(train.id),
        departure_time: NaiveDate::from_ymd(2026, 9, 1).and_hms(8, 0, 0),
        arrival_time: NaiveDate::from_ymd(2026, 9, 1).and_hms(14, 30, 0),
    }
    .create(conn)
    .unwrap();
    Fixture {
        station_a,
        station_b,
        train_type,
        train,
        route,
        journey,
    }
}

fn spec(cargo: i32, seat: i32, journey_id: i32) -> TicketSpec {
    TicketSpec {
        cargo,
        seat,
        journey_id,
    }
}

#[test]
#[ignore = "needs a PostgreSQL instance via DATABASE_URL"]
fn self_loop_route_never_persists() {
    let pool = pool();
    let conn = pool.get().unwrap();
    conn.begin_test_transaction().unwrap();
    let fx = book_fixture(&conn);

    let err = NewRoute::new(fx.station_a.id, fx.station_a.id, 1_000)
        .create(&conn)
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation { .. }));

    let with_loop = Route::filter(&[fx.station_a.id], &[fx.station_a.id], &conn).unwrap();
    assert!(with_loop.is_empty());
}

#[test]
#[ignore = "needs a PostgreSQL instance via DATABASE_URL"]
fn duplicate_route_triple_is_rejected() {
    let pool = pool();
    let conn = pool.get().unwrap();
    conn.begin_test_transaction().unwrap();
    let fx = book_fixture(&conn);

    let err = NewRoute::new(fx.station_a.id, fx.station_b.id, 540_000)
        .create(&conn)
        .unwrap_err();
    assert!(matches!(err, LedgerError::UniqueViolation(_)));

    // Same endpoints with a different distance is a distinct route.
    assert!(NewRoute::new(fx.station_a.id, fx.station_b.id, 541_000)
        .create(&conn)
        .is_ok());
}

#[test]
#[ignore = "needs a PostgreSQL instance via DATABASE_URL"]
fn seats_available_tracks_committed_tickets() {
    let pool = pool();
    let conn = pool.get().unwrap();
    conn.begin_test_transaction().unwrap();
    let fx = book_fixture(&conn);

    assert_eq!(
        fx.journey.seats_available(CapacityMode::PerCargo, &conn).unwrap(),
        50
    );

    let specs = vec![
        spec(1, 1, fx.journey.id),
        spec(1, 2, fx.journey.id),
        spec(2, 1, fx.journey.id),
    ];
    NewOrder::create_with_tickets("rider-1", &specs, &conn).unwrap();

    assert_eq!(
        fx.journey.seats_available(CapacityMode::PerCargo, &conn).unwrap(),
        47
    );
    assert_eq!(
        fx.journey
            .seats_available(CapacityMode::WholeTrain, &conn)
            .unwrap(),
        8 * 50 - 3
    );
    let mut taken = fx.journey.taken_seats(&conn).unwrap();
    taken.sort();
    assert_eq!(taken, vec![(1, 1), (1, 2), (2, 1)]);
}

#[test]
#[ignore = "needs a PostgreSQL instance via DATABASE_URL"]
fn seat_range_boundaries_against_storage() {
    let pool = pool();
    let conn = pool.get().unwrap();
    conn.begin_test_transaction().unwrap();
    let fx = book_fixture(&conn);

    for bad in [0, 51] {
        let err = NewOrder::create_with_tickets("rider-1", &[spec(1, bad, fx.journey.id)], &conn)
            .unwrap_err();
        match err {
            LedgerError::SeatOutOfRange { seat, max } => {
                assert_eq!(seat, bad);
                assert_eq!(max, 50);
            }
            other => panic!("expected SeatOutOfRange, got {}", other),
        }
    }
    for good in [1, 50] {
        NewOrder::create_with_tickets("rider-1", &[spec(2, good, fx.journey.id)], &conn).unwrap();
    }
}

#[test]
#[ignore = "needs a PostgreSQL instance via DATABASE_URL"]
fn mixed_order_rolls_back_entirely() {
    let pool = pool();
    let conn = pool.get().unwrap();
    conn.begin_test_transaction().unwrap();
    let fx = book_fixture(&conn);

    let specs = vec![spec(1, 10, fx.journey.id), spec(1, 99, fx.journey.id)];
    let err = NewOrder::create_with_tickets("rider-1", &specs, &conn).unwrap_err();
    assert!(matches!(err, LedgerError::SeatOutOfRange { .. }));

    // The valid first ticket must not survive its sibling's failure.
    assert_eq!(Ticket::count_for_journey(fx.journey.id, &conn).unwrap(), 0);
    assert!(Order::list_for_user("rider-1", None, None, &conn)
        .unwrap()
        .is_empty());
}

#[test]
#[ignore = "needs a PostgreSQL instance via DATABASE_URL"]
fn empty_order_is_rejected_before_any_write() {
    let pool = pool();
    let conn = pool.get().unwrap();
    conn.begin_test_transaction().unwrap();

    let err = NewOrder::create_with_tickets("rider-1", &[], &conn).unwrap_err();
    assert!(matches!(err, LedgerError::EmptyOrder));
}

#[test]
#[ignore = "needs a PostgreSQL instance via DATABASE_URL"]
fn journey_without_train_cannot_be_booked() {
    let pool = pool();
    let conn = pool.get().unwrap();
    conn.begin_test_transaction().unwrap();
    let fx = book_fixture(&conn);

    let bare = NewJourney {
        route_id: fx.route.id,
        train_id: None,
        departure_time: fx.journey.departure_time,
        arrival_time: fx.journey.arrival_time,
    }
    .create(&conn)
    .unwrap();

    let err = NewOrder::create_with_tickets("rider-1", &[spec(1, 1, bare.id)], &conn).unwrap_err();
    assert!(matches!(err, LedgerError::NoTrainAssigned { .. }));
    let err = bare.seats_available(CapacityMode::PerCargo, &conn).unwrap_err();
    assert!(matches!(err, LedgerError::NoTrainAssigned { .. }));
}

#[test]
#[ignore = "needs a PostgreSQL instance via DATABASE_URL"]
fn order_listing_is_scoped_and_paginated() {
    let pool = pool();
    let conn = pool.get().unwrap();
    conn.begin_test_transaction().unwrap();
    let fx = book_fixture(&conn);

    for seat_no in 1..=12 {
        NewOrder::create_with_tickets("rider-a", &[spec(1, seat_no, fx.journey.id)], &conn)
            .unwrap();
    }
    NewOrder::create_with_tickets("rider-b", &[spec(2, 1, fx.journey.id)], &conn).unwrap();

    let first_page = Order::list_for_user("rider-a", None, None, &conn).unwrap();
    assert_eq!(first_page.len(), 10);
    assert!(first_page.iter().all(|o| o.user_id == "rider-a"));

    let second_page = Order::list_for_user("rider-a", Some(2), None, &conn).unwrap();
    assert_eq!(second_page.len(), 2);

    // rider-b sees only their own order, whatever paging they ask for.
    let other = Order::list_for_user("rider-b", Some(1), Some(100), &conn).unwrap();
    assert_eq!(other.len(), 1);
    assert!(other.iter().all(|o| o.user_id == "rider-b"));

    let foreign = Order::find_for_user(first_page[0].id, "rider-b", &conn);
    assert!(foreign.is_err());
}

#[test]
#[ignore = "needs a PostgreSQL instance via DATABASE_URL"]
fn concurrent_same_seat_has_exactly_one_winner() {
    let pool = pool();
    let conn = pool.get().unwrap();
    let fx = book_fixture(&conn);
    drop(conn);

    let barrier = Arc::new(Barrier::new(2));
    let mut handles = Vec::new();
    for rider in ["racer-a", "racer-b"] {
        let pool = pool.clone();
        let barrier = barrier.clone();
        let journey_id = fx.journey.id;
        handles.push(thread::spawn(move || {
            let conn = pool.get().unwrap();
            barrier.wait();
            NewOrder::create_with_tickets(rider, &[spec(1, 1, journey_id)], &conn)
        }));
    }
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let conn = pool.get().unwrap();
    let winners = results.iter().filter(|r| r.is_ok()).count();
    let losers = results
        .iter()
        .filter(|r| matches!(r.as_ref().err(), Some(LedgerError::SeatTaken { cargo: 1, seat: 1 })))
        .count();
    assert_eq!(winners, 1);
    assert_eq!(losers, 1);
    assert_eq!(Ticket::count_for_journey(fx.journey.id, &conn).unwrap(), 1);

    // Committed rows need explicit cleanup: route delete cascades journeys
    // and tickets, then the orphaned orders and fixture rows go.
    Route::delete(fx.route.id, &conn).unwrap();
    for order in Order::list_for_user("racer-a", None, None, &conn)
        .unwrap()
        .into_iter()
        .chain(Order::list_for_user("racer-b", None, None, &conn).unwrap())
    {
        Order::delete(order.id, &conn).unwrap();
    }
    Train::delete(fx.train.id, &conn).unwrap();
    TrainType::delete(fx.train_type.id, &conn).unwrap();
    Station::delete(fx.station_a.id, &conn).unwrap();
    Station::delete(fx.station_b.id, &conn).unwrap();
}
