use async_graphql::*;
use diesel::PgConnection;

use railbook_db::error::LedgerError;
use railbook_db::models::route::{NewRoute as NewRouteData, Route as RouteData};

use super::station::Station;

/// List projection: endpoint ids are replaced by station names; a nullified
/// endpoint (its station was deleted) renders as "?".
#[derive(SimpleObject, Clone)]
pub struct RouteView {
    pub id: i32,
    pub source: String,
    pub destination: String,
    pub distance: i32,
}

impl RouteView {
    pub fn read(data: &RouteData, conn: &PgConnection) -> Result<Self, LedgerError> {
        let source = data
            .source(conn)?
            .map(|s| s.name)
            .unwrap_or_else(|| "?".to_string());
        let destination = data
            .destination(conn)?
            .map(|s| s.name)
            .unwrap_or_else(|| "?".to_string());
        Ok(RouteView {
            id: data.id,
            source,
            destination,
            distance: data.distance,
        })
    }
}

/// Detail projection: full nested endpoint stations.
#[derive(SimpleObject, Clone)]
pub struct RouteDetail {
    pub id: i32,
    pub source: Option<Station>,
    pub destination: Option<Station>,
    pub distance: i32,
}

impl RouteDetail {
    pub fn read(data: &RouteData, conn: &PgConnection) -> Result<Self, LedgerError> {
        Ok(RouteDetail {
            id: data.id,
            source: data.source(conn)?.as_ref().map(Station::from),
            destination: data.destination(conn)?.as_ref().map(Station::from),
            distance: data.distance,
        })
    }
}

#[derive(InputObject)]
pub struct RouteInput {
    pub source_id: i32,
    pub destination_id: i32,
    pub distance: i32,
}

impl From<&RouteInput> for NewRouteData {
    fn from(input: &RouteInput) -> Self {
        NewRouteData::new(input.source_id, input.destination_id, input.distance)
    }
}
