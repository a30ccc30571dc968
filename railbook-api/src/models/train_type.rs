use async_graphql::*;

use railbook_db::models::train_type::TrainType as TrainTypeData;

#[derive(SimpleObject, Clone)]
pub struct TrainType {
    pub id: i32,
    pub name: String,
}

impl From<&TrainTypeData> for TrainType {
    fn from(kind: &TrainTypeData) -> Self {
        TrainType {
            id: kind.id,
            name: kind.name.clone(),
        }
    }
}

#[derive(InputObject)]
pub struct TrainTypeInput {
    pub name: String,
}
