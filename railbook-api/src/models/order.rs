use async_graphql::*;
use chrono::NaiveDateTime;

use railbook_db::models::journey::Journey as JourneyData;
use railbook_db::models::order::{Order as OrderData, TicketSpec};
use railbook_db::models::ticket::Ticket as TicketData;

use crate::get_conn_from_ctx;

use super::get_capacity_mode;
use super::journey::JourneyView;

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct OrderView {
    pub id: i32,
    pub created_at: NaiveDateTime,
    #[graphql(skip)]
    pub user_id: String,
}

#[ComplexObject]
impl OrderView {
    async fn tickets(&self, ctx: &Context<'_>) -> Result<Vec<TicketView>> {
        let conn = get_conn_from_ctx(ctx);
        Ok(TicketData::for_order(self.id, &conn)?
            .iter()
            .map(|t| t.into())
            .collect())
    }
}

impl From<&OrderData> for OrderView {
    fn from(order: &OrderData) -> Self {
        OrderView {
            id: order.id,
            created_at: order.created_at,
            user_id: order.user_id.clone(),
        }
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct TicketView {
    pub id: i32,
    pub cargo: i32,
    pub seat: i32,
    #[graphql(skip)]
    pub journey_id: i32,
}

#[ComplexObject]
impl TicketView {
    async fn journey(&self, ctx: &Context<'_>) -> Result<JourneyView> {
        let conn = get_conn_from_ctx(ctx);
        let journey = JourneyData::find(self.journey_id, &conn)?;
        Ok(JourneyView::read(&journey, get_capacity_mode(ctx), &conn)?)
    }
}

impl From<&TicketData> for TicketView {
    fn from(ticket: &TicketData) -> Self {
        TicketView {
            id: ticket.id,
            cargo: ticket.cargo,
            seat: ticket.seat,
            journey_id: ticket.journey_id,
        }
    }
}

/// One seat request inside `createOrder`. The journey field carries the id,
/// mirroring the wire shape `{cargo, seat, journey}`.
#[derive(InputObject)]
pub struct TicketInput {
    pub cargo: i32,
    pub seat: i32,
    pub journey: i32,
}

impl From<&TicketInput> for TicketSpec {
    fn from(input: &TicketInput) -> Self {
        TicketSpec {
            cargo: input.cargo,
            seat: input.seat,
            journey_id: input.journey,
        }
    }
}
