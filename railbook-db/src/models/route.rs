use crate::error::LedgerError;
use crate::schema::routes;
use crate::schema::routes::dsl::*;
use diesel::prelude::*;
use diesel::PgConnection;
use serde::{Deserialize, Serialize};

use super::station::Station;

#[derive(
    Queryable, Debug, Serialize, Deserialize, AsChangeset, Clone, Identifiable, Associations,
)]
#[table_name = "routes"]
pub struct Route {
    pub id: i32,
    pub source_id: Option<i32>,
    pub destination_id: Option<i32>,
    pub distance: i32,
}

/// Rejects self-loop routes. Pure over the already-fetched endpoint names so
/// it can run before anything touches the table.
pub fn validate_route_endpoints(source_name: &str, destination_name: &str) -> Result<(), LedgerError> {
    if source_name == destination_name {
        return Err(LedgerError::validation(
            "source",
            "source and destination names must differ",
        ));
    }
    Ok(())
}

impl Route {
    pub fn find(rid: i32, conn: &PgConnection) -> QueryResult<Self> {
        routes.find(rid).first(conn)
    }

    pub fn list_all(conn: &PgConnection) -> QueryResult<Vec<Self>> {
        routes.order(distance.desc()).load(conn)
    }

    /// Any-of filtering by endpoint station ids. Endpoints are nullable
    /// (station deletion nullifies them), hence the Option-wrapped match set.
    pub fn filter(
        source_ids: &[i32],
        destination_ids: &[i32],
        conn: &PgConnection,
    ) -> QueryResult<Vec<Self>> {
        let mut query = routes.into_boxed();
        if !source_ids.is_empty() {
            let wanted: Vec<Option<i32>> = source_ids.iter().map(|&sid| Some(sid)).collect();
            query = query.filter(source_id.eq_any(wanted));
        }
        if !destination_ids.is_empty() {
            let wanted: Vec<Option<i32>> = destination_ids.iter().map(|&did| Some(did)).collect();
            query = query.filter(destination_id.eq_any(wanted));
        }
        query.order(distance.desc()).load(conn)
    }

    pub fn source(&self, conn: &PgConnection) -> QueryResult<Option<Station>> {
        match self.source_id {
            Some(sid) => Station::find(sid, conn).map(Some),
            None => Ok(None),
        }
    }

    pub fn destination(&self, conn: &PgConnection) -> QueryResult<Option<Station>> {
        match self.destination_id {
            Some(did) => Station::find(did, conn).map(Some),
            None => Ok(None),
        }
    }

    /// Denormalized "Source - Destination" label for list views. A nullified
    /// endpoint renders as "?".
    pub fn full_way_name(&self, conn: &PgConnection) -> QueryResult<String> {
        let src = self.source(conn)?;
        let dst = self.destination(conn)?;
        let src_name = src.map(|s| s.name).unwrap_or_else(|| "?".to_string());
        let dst_name = dst.map(|s| s.name).unwrap_or_else(|| "?".to_string());
        Ok(format!("{} - {}", src_name, dst_name))
    }

    /// Validate-then-update; same endpoint rule as on create.
    pub fn update(&self, changes: &NewRoute, conn: &PgConnection) -> Result<Self, LedgerError> {
        changes.validate(conn)?;
        let updated = diesel::update(self).set(changes).get_result(conn)?;
        Ok(updated)
    }

    pub fn delete(rid: i32, conn: &PgConnection) -> QueryResult<usize> {
        diesel::delete(routes.find(rid)).execute(conn)
    }
}

#[derive(Debug, Serialize, Deserialize, Insertable, AsChangeset)]
#[table_name = "routes"]
pub struct NewRoute {
    pub source_id: Option<i32>,
    pub destination_id: Option<i32>,
    pub distance: i32,
}

impl NewRoute {
    pub fn new(src: i32, dst: i32, dist: i32) -> Self {
        NewRoute {
            source_id: Some(src),
            destination_id: Some(dst),
            distance: dist,
        }
    }

    fn validate(&self, conn: &PgConnection) -> Result<(), LedgerError> {
        let src = self
            .source_id
            .ok_or_else(|| LedgerError::validation("source", "source station is required"))?;
        let dst = self.destination_id.ok_or_else(|| {
            LedgerError::validation("destination", "destination station is required")
        })?;
        // Explicit lookups; a missing station surfaces as NotFound.
        let src_station = Station::find(src, conn)?;
        let dst_station = Station::find(dst, conn)?;
        validate_route_endpoints(&src_station.name, &dst_station.name)
    }

    /// Validate-then-insert. A duplicate (source, destination, distance)
    /// triple is rejected by the storage-level unique constraint and maps to
    /// `LedgerError::UniqueViolation`.
    pub fn create(&self, conn: &PgConnection) -> Result<Route, LedgerError> {
        self.validate(conn)?;
        let created = diesel::insert_into(routes::table)
            .values(self)
            .get_result(conn)?;
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_endpoint_names_are_rejected() {
        let err = validate_route_endpoints("Kyiv", "Kyiv").unwrap_err();
        assert!(matches!(err, LedgerError::Validation { .. }));
    }

    #[test]
    fn distinct_endpoint_names_pass() {
        assert!(validate_route_endpoints("Kyiv", "Lviv").is_ok());
    }
}
