use std::str::FromStr;

use chrono::NaiveDateTime;
use diesel::{dsl::any, prelude::*};
use diesel::PgConnection;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::schema::{crews, journeys, journeys_crews};
use crate::schema::journeys::dsl::*;

use super::crew::Crew;
use super::route::Route;
use super::ticket::Ticket;
use super::train::Train;

/// Which capacity formula `seats_available` uses.
///
/// `PerCargo` reproduces the historical contract: total journey capacity is
/// `places_in_cargo`, ignoring the number of cars. `WholeTrain` is the
/// corrected formula (`cargo_num * places_in_cargo`), selectable via the
/// `CAPACITY_MODE` environment variable.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityMode {
    PerCargo,
    WholeTrain,
}

impl CapacityMode {
    pub fn capacity(self, cargo_count: i32, places_in_cargo: i32) -> i64 {
        match self {
            CapacityMode::PerCargo => i64::from(places_in_cargo),
            CapacityMode::WholeTrain => i64::from(cargo_count) * i64::from(places_in_cargo),
        }
    }

    pub fn from_env() -> Self {
        match std::env::var("CAPACITY_MODE") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                log::warn!("unknown CAPACITY_MODE `{}`, falling back to per_cargo", raw);
                CapacityMode::PerCargo
            }),
            Err(_) => CapacityMode::PerCargo,
        }
    }
}

impl FromStr for CapacityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "per_cargo" => Ok(CapacityMode::PerCargo),
            "whole_train" => Ok(CapacityMode::WholeTrain),
            other => Err(format!("bad capacity mode given : `{}`", other)),
        }
    }
}

impl std::fmt::Display for CapacityMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CapacityMode::PerCargo => write!(f, "per_cargo"),
            CapacityMode::WholeTrain => write!(f, "whole_train"),
        }
    }
}

#[derive(
    Queryable, Debug, Serialize, Deserialize, AsChangeset, Clone, Identifiable, Associations,
)]
#[belongs_to(Route)]
#[table_name = "journeys"]
pub struct Journey {
    pub id: i32,
    pub route_id: i32,
    pub train_id: Option<i32>,
    pub departure_time: NaiveDateTime,
    pub arrival_time: NaiveDateTime,
}

#[derive(Queryable, Debug, Identifiable, Associations)]
#[belongs_to(Journey)]
#[belongs_to(Crew)]
#[table_name = "journeys_crews"]
pub struct JourneyCrew {
    pub id: i32,
    pub journey_id: i32,
    pub crew_id: i32,
}

#[derive(Debug, Insertable)]
#[table_name = "journeys_crews"]
struct NewJourneyCrew {
    journey_id: i32,
    crew_id: i32,
}

impl Journey {
    pub fn find(jid: i32, conn: &PgConnection) -> QueryResult<Self> {
        journeys.find(jid).first(conn)
    }

    pub fn list_all(conn: &PgConnection) -> QueryResult<Vec<Self>> {
        journeys.order(departure_time.asc()).load(conn)
    }

    /// Any-of filtering by route and train ids; empty sets mean no
    /// restriction.
    pub fn filter(
        route_ids: &[i32],
        train_ids: &[i32],
        conn: &PgConnection,
    ) -> QueryResult<Vec<Self>> {
        let mut query = journeys.into_boxed();
        if !route_ids.is_empty() {
            query = query.filter(route_id.eq(any(route_ids.to_vec())));
        }
        if !train_ids.is_empty() {
            let wanted: Vec<Option<i32>> = train_ids.iter().map(|&tid| Some(tid)).collect();
            query = query.filter(train_id.eq_any(wanted));
        }
        query.order(departure_time.asc()).load(conn)
    }

    pub fn route(&self, conn: &PgConnection) -> QueryResult<Route> {
        Route::find(self.route_id, conn)
    }

    pub fn train(&self, conn: &PgConnection) -> QueryResult<Option<Train>> {
        match self.train_id {
            Some(tid) => Train::find(tid, conn).map(Some),
            None => Ok(None),
        }
    }

    /// (cargo_num, places_in_cargo) of the assigned train, fetched per call.
    /// No hydrated object graph: every validation step looks the numbers up.
    pub fn train_capacity(jid: i32, conn: &PgConnection) -> Result<(i32, i32), LedgerError> {
        let assigned: Option<i32> = journeys.find(jid).select(train_id).first(conn)?;
        let tid = assigned.ok_or(LedgerError::NoTrainAssigned { journey_id: jid })?;
        let train = Train::find(tid, conn)?;
        Ok((train.cargo_num, train.places_in_cargo))
    }

    /// Live availability: capacity minus a fresh ticket count. Decreases by
    /// exactly one per committed ticket, with no cached counter to go stale.
    pub fn seats_available(&self, mode: CapacityMode, conn: &PgConnection) -> Result<i64, LedgerError> {
        let (cargo_count, places) = Journey::train_capacity(self.id, conn)?;
        let taken = Ticket::count_for_journey(self.id, conn)?;
        Ok(mode.capacity(cargo_count, places) - taken)
    }

    /// (cargo, seat) pairs already claimed on this journey, seat order.
    pub fn taken_seats(&self, conn: &PgConnection) -> QueryResult<Vec<(i32, i32)>> {
        use crate::schema::tickets::dsl as t;
        t::tickets
            .filter(t::journey_id.eq(self.id))
            .order(t::seat.asc())
            .select((t::cargo, t::seat))
            .load(conn)
    }

    pub fn crews(&self, conn: &PgConnection) -> QueryResult<Vec<Crew>> {
        journeys_crews::table
            .inner_join(crews::table)
            .filter(journeys_crews::journey_id.eq(self.id))
            .select(crews::all_columns)
            .load(conn)
    }

    pub fn add_crew(&self, cid: i32, conn: &PgConnection) -> QueryResult<usize> {
        diesel::insert_into(journeys_crews::table)
            .values(&NewJourneyCrew {
                journey_id: self.id,
                crew_id: cid,
            })
            .execute(conn)
    }

    pub fn remove_crew(&self, cid: i32, conn: &PgConnection) -> QueryResult<usize> {
        diesel::delete(
            journeys_crews::table
                .filter(journeys_crews::journey_id.eq(self.id))
                .filter(journeys_crews::crew_id.eq(cid)),
        )
        .execute(conn)
    }

    pub fn update(&self, changes: &NewJourney, conn: &PgConnection) -> QueryResult<Self> {
        diesel::update(self).set(changes).get_result(conn)
    }

    pub fn delete(jid: i32, conn: &PgConnection) -> QueryResult<usize> {
        diesel::delete(journeys.find(jid)).execute(conn)
    }
}

#[derive(Debug, Serialize, Deserialize, Insertable, AsChangeset)]
#[table_name = "journeys"]
pub struct NewJourney {
    pub route_id: i32,
    pub train_id: Option<i32>,
    pub departure_time: NaiveDateTime,
    pub arrival_time: NaiveDateTime,
}

impl NewJourney {
    pub fn create(&self, conn: &PgConnection) -> QueryResult<Journey> {
        diesel::insert_into(journeys::table)
            .values(self)
            .get_result(conn)
    }
}
