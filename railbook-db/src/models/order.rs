//! Order/Ticket ledger.
//!
//! An order and all its tickets are written in one transaction. Per-ticket
//! validation runs inside that transaction against live storage state, and
//! the (cargo, seat, journey) unique constraint is the final arbiter: of two
//! concurrent transactions targeting the same seat, the storage engine
//! commits exactly one and the loser surfaces `SeatTaken`.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::PgConnection;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::schema::orders;
use crate::schema::orders::dsl::*;

use super::journey::Journey;
use super::ticket::{validate_seat_range, NewTicket, Ticket};

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(
    Queryable, Debug, Serialize, Deserialize, AsChangeset, Clone, Identifiable, Associations,
)]
#[table_name = "orders"]
pub struct Order {
    pub id: i32,
    pub created_at: NaiveDateTime,
    pub user_id: String,
}

/// One requested seat: client input for `create_with_tickets`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketSpec {
    pub cargo: i32,
    pub seat: i32,
    pub journey_id: i32,
}

/// Turns (1-based page, requested size) into (offset, limit). Size defaults
/// to 10 and is clamped to [1, 100].
pub fn page_window(page: Option<i64>, page_size: Option<i64>) -> (i64, i64) {
    let size = page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1).min(MAX_PAGE_SIZE);
    let page_no = page.unwrap_or(1).max(1);
    ((page_no - 1) * size, size)
}

impl Order {
    pub fn find(oid: i32, conn: &PgConnection) -> QueryResult<Self> {
        orders.find(oid).first(conn)
    }

    /// Only the caller's orders, newest first, paginated. `uid` is the
    /// authenticated identity passed down explicitly; there is no ambient
    /// current-user state.
    pub fn list_for_user(
        uid: &str,
        page: Option<i64>,
        page_size: Option<i64>,
        conn: &PgConnection,
    ) -> QueryResult<Vec<Self>> {
        let (offset, limit) = page_window(page, page_size);
        orders
            .filter(user_id.eq(uid))
            .order(created_at.desc())
            .offset(offset)
            .limit(limit)
            .load(conn)
    }

    /// Retrieval scoped to the owner: another caller's order id behaves like
    /// a missing row.
    pub fn find_for_user(oid: i32, uid: &str, conn: &PgConnection) -> QueryResult<Self> {
        orders.find(oid).filter(user_id.eq(uid)).first(conn)
    }

    pub fn tickets(&self, conn: &PgConnection) -> QueryResult<Vec<Ticket>> {
        Ticket::for_order(self.id, conn)
    }

    pub fn delete(oid: i32, conn: &PgConnection) -> QueryResult<usize> {
        diesel::delete(orders.find(oid)).execute(conn)
    }
}

#[derive(Debug, Serialize, Deserialize, Insertable)]
#[table_name = "orders"]
pub struct NewOrder {
    pub user_id: String,
}

impl NewOrder {
    /// Atomic create path: order row plus every requested ticket, or nothing.
    ///
    /// Empty requests are rejected before a transaction is opened. Inside
    /// the transaction each ticket is validated against a fresh capacity
    /// lookup, then inserted; a unique-constraint collision on the
    /// (cargo, seat, journey) triple aborts the whole order with `SeatTaken`.
    pub fn create_with_tickets(
        uid: &str,
        specs: &[TicketSpec],
        conn: &PgConnection,
    ) -> Result<(Order, Vec<Ticket>), LedgerError> {
        if specs.is_empty() {
            return Err(LedgerError::EmptyOrder);
        }
        conn.transaction::<(Order, Vec<Ticket>), LedgerError, _>(|| {
            let order: Order = diesel::insert_into(orders::table)
                .values(&NewOrder {
                    user_id: uid.to_string(),
                })
                .get_result(conn)?;

            let mut issued = Vec::with_capacity(specs.len());
            for spec in specs {
                let (_, places_in_cargo) = Journey::train_capacity(spec.journey_id, conn)?;
                validate_seat_range(spec.seat, places_in_cargo)?;
                let ticket: Ticket = diesel::insert_into(crate::schema::tickets::table)
                    .values(&NewTicket {
                        cargo: spec.cargo,
                        seat: spec.seat,
                        journey_id: spec.journey_id,
                        order_id: order.id,
                    })
                    .get_result(conn)
                    .map_err(|e| LedgerError::seat_conflict(e, spec.cargo, spec.seat))?;
                issued.push(ticket);
            }
            log::info!(
                "order {} committed with {} ticket(s) for user {}",
                order.id,
                issued.len(),
                uid
            );
            Ok((order, issued))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_window_defaults() {
        assert_eq!(page_window(None, None), (0, 10));
    }

    #[test]
    fn page_window_offsets_by_page() {
        assert_eq!(page_window(Some(3), Some(10)), (20, 10));
    }

    #[test]
    fn page_size_is_clamped_to_hundred() {
        assert_eq!(page_window(Some(1), Some(500)), (0, 100));
    }

    #[test]
    fn nonsense_pages_normalize() {
        assert_eq!(page_window(Some(0), Some(0)), (0, 1));
        assert_eq!(page_window(Some(-2), Some(-5)), (0, 1));
    }
}
