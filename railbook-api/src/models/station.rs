use async_graphql::*;

use railbook_db::models::station::{NewStation as NewStationData, Station as StationData};

#[derive(SimpleObject, Clone)]
pub struct Station {
    pub id: i32,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<&StationData> for Station {
    fn from(station: &StationData) -> Self {
        Station {
            id: station.id,
            name: station.name.clone(),
            latitude: station.latitude,
            longitude: station.longitude,
        }
    }
}

#[derive(InputObject)]
pub struct StationInput {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<&StationInput> for NewStationData {
    fn from(input: &StationInput) -> Self {
        NewStationData {
            name: input.name.clone(),
            latitude: input.latitude,
            longitude: input.longitude,
        }
    }
}
