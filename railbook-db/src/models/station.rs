use crate::schema::stations;
use crate::schema::stations::dsl::*;
use diesel::prelude::*;
use diesel::PgConnection;
use serde::{Deserialize, Serialize};

#[derive(
    Queryable, Debug, Serialize, Deserialize, AsChangeset, Clone, Identifiable, Associations,
)]
#[table_name = "stations"]
pub struct Station {
    pub id: i32,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Station {
    pub fn find(sid: i32, conn: &PgConnection) -> QueryResult<Self> {
        stations.find(sid).first(conn)
    }

    pub fn find_by_name(station_name: &str, conn: &PgConnection) -> QueryResult<Self> {
        stations.filter(name.eq(station_name)).first(conn)
    }

    pub fn list_all(conn: &PgConnection) -> QueryResult<Vec<Self>> {
        stations.order(name.asc()).load(conn)
    }

    pub fn update(&self, changes: &NewStation, conn: &PgConnection) -> QueryResult<Self> {
        diesel::update(self).set(changes).get_result(conn)
    }

    // Routes referencing the station keep their rows; the endpoint is
    // nullified by the FK action.
    pub fn delete(sid: i32, conn: &PgConnection) -> QueryResult<usize> {
        diesel::delete(stations.find(sid)).execute(conn)
    }
}

#[derive(Debug, Serialize, Deserialize, Insertable, AsChangeset)]
#[table_name = "stations"]
pub struct NewStation {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl NewStation {
    pub fn create(&self, conn: &PgConnection) -> QueryResult<Station> {
        diesel::insert_into(stations::table)
            .values(self)
            .get_result(conn)
    }
}
