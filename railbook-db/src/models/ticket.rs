use crate::error::LedgerError;
use crate::schema::tickets;
use crate::schema::tickets::dsl::*;
use diesel::prelude::*;
use diesel::PgConnection;
use serde::{Deserialize, Serialize};

use super::journey::Journey;
use super::order::Order;

#[derive(
    Queryable, Debug, Serialize, Deserialize, AsChangeset, Clone, Identifiable, Associations,
)]
#[belongs_to(Journey)]
#[belongs_to(Order)]
#[table_name = "tickets"]
pub struct Ticket {
    pub id: i32,
    pub cargo: i32,
    pub seat: i32,
    pub journey_id: i32,
    pub order_id: i32,
}

/// Range rule for one ticket: seats are 1-based and bounded by the per-cargo
/// capacity of the journey's train. Pure over plain values; the caller is
/// responsible for fetching `places_in_cargo` from storage.
pub fn validate_seat_range(seat_no: i32, places_in_cargo: i32) -> Result<(), LedgerError> {
    if seat_no < 1 || seat_no > places_in_cargo {
        return Err(LedgerError::SeatOutOfRange {
            seat: seat_no,
            max: places_in_cargo,
        });
    }
    Ok(())
}

impl Ticket {
    pub fn find(tid: i32, conn: &PgConnection) -> QueryResult<Self> {
        tickets.find(tid).first(conn)
    }

    pub fn for_order(oid: i32, conn: &PgConnection) -> QueryResult<Vec<Self>> {
        tickets.filter(order_id.eq(oid)).order(seat.asc()).load(conn)
    }

    pub fn for_journey(jid: i32, conn: &PgConnection) -> QueryResult<Vec<Self>> {
        tickets
            .filter(journey_id.eq(jid))
            .order(seat.asc())
            .load(conn)
    }

    /// Live ticket count for a journey; never read from a cached counter.
    pub fn count_for_journey(jid: i32, conn: &PgConnection) -> QueryResult<i64> {
        tickets.filter(journey_id.eq(jid)).count().get_result(conn)
    }
}

#[derive(Debug, Serialize, Deserialize, Insertable)]
#[table_name = "tickets"]
pub struct NewTicket {
    pub cargo: i32,
    pub seat: i32,
    pub journey_id: i32,
    pub order_id: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seat_range_boundaries() {
        // 0 and max+1 fail, 1 and max succeed.
        assert!(validate_seat_range(0, 50).is_err());
        assert!(validate_seat_range(1, 50).is_ok());
        assert!(validate_seat_range(50, 50).is_ok());
        assert!(validate_seat_range(51, 50).is_err());
    }

    #[test]
    fn out_of_range_error_names_the_valid_range() {
        let err = validate_seat_range(51, 50).unwrap_err();
        assert_eq!(err.to_string(), "seat 51 must be in range [1, 50]");
    }

    #[test]
    fn negative_seat_is_rejected() {
        assert!(validate_seat_range(-3, 10).is_err());
    }
}
