use async_graphql::*;
use chrono::NaiveDateTime;
use diesel::PgConnection;

use railbook_db::error::LedgerError;
use railbook_db::models::journey::{CapacityMode, Journey as JourneyData, NewJourney};

use super::route::RouteView;
use super::train::Train;

/// Availability renders as null for a journey whose train reference was
/// nullified; everything else propagates as an error.
fn seats_or_none(
    data: &JourneyData,
    mode: CapacityMode,
    conn: &PgConnection,
) -> Result<Option<i64>, LedgerError> {
    match data.seats_available(mode, conn) {
        Ok(seats) => Ok(Some(seats)),
        Err(LedgerError::NoTrainAssigned { .. }) => Ok(None),
        Err(other) => Err(other),
    }
}

/// List projection: nested route/train summaries plus live availability.
#[derive(SimpleObject, Clone)]
pub struct JourneyView {
    pub id: i32,
    pub route: RouteView,
    pub train: Option<Train>,
    pub seats_available: Option<i64>,
    pub departure_time: NaiveDateTime,
    pub arrival_time: NaiveDateTime,
}

impl JourneyView {
    pub fn read(
        data: &JourneyData,
        mode: CapacityMode,
        conn: &PgConnection,
    ) -> Result<Self, LedgerError> {
        let route = data.route(conn)?;
        Ok(JourneyView {
            id: data.id,
            route: RouteView::read(&route, conn)?,
            train: data.train(conn)?.as_ref().map(Train::from),
            seats_available: seats_or_none(data, mode, conn)?,
            departure_time: data.departure_time,
            arrival_time: data.arrival_time,
        })
    }
}

#[derive(SimpleObject, Clone)]
pub struct TakenSeat {
    pub cargo: i32,
    pub seat: i32,
}

/// Detail projection: flattened endpoint names, crew full names and the
/// list of already-claimed seats.
#[derive(SimpleObject, Clone)]
pub struct JourneyDetail {
    pub id: i32,
    pub source: String,
    pub destination: String,
    pub departure_time: NaiveDateTime,
    pub arrival_time: NaiveDateTime,
    pub train_name: Option<String>,
    pub cargo_num: Option<i32>,
    pub seats_available: Option<i64>,
    pub crew: Vec<String>,
    pub taken_seats: Vec<TakenSeat>,
}

impl JourneyDetail {
    pub fn read(
        data: &JourneyData,
        mode: CapacityMode,
        conn: &PgConnection,
    ) -> Result<Self, LedgerError> {
        let route = data.route(conn)?;
        let summary = RouteView::read(&route, conn)?;
        let train = data.train(conn)?;
        let crew = data
            .crews(conn)?
            .iter()
            .map(|member| member.full_name())
            .collect();
        let taken_seats = data
            .taken_seats(conn)?
            .into_iter()
            .map(|(cargo, seat)| TakenSeat { cargo, seat })
            .collect();
        Ok(JourneyDetail {
            id: data.id,
            source: summary.source,
            destination: summary.destination,
            departure_time: data.departure_time,
            arrival_time: data.arrival_time,
            train_name: train.as_ref().map(|t| t.name.clone()),
            cargo_num: train.as_ref().map(|t| t.cargo_num),
            seats_available: seats_or_none(data, mode, conn)?,
            crew,
            taken_seats,
        })
    }
}

#[derive(InputObject)]
pub struct JourneyInput {
    pub route_id: i32,
    pub train_id: Option<i32>,
    pub departure_time: NaiveDateTime,
    pub arrival_time: NaiveDateTime,
    #[graphql(default)]
    pub crew_ids: Vec<i32>,
}

impl From<&JourneyInput> for NewJourney {
    fn from(input: &JourneyInput) -> Self {
        NewJourney {
            route_id: input.route_id,
            train_id: input.train_id,
            departure_time: input.departure_time,
            arrival_time: input.arrival_time,
        }
    }
}
