use async_graphql::*;

use railbook_db::models::train::{NewTrain as NewTrainData, Train as TrainData};

use crate::get_conn_from_ctx;

use super::train_type::TrainType;

/// List projection: the type is denormalized to its name, as booking clients
/// only need the label.
#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct Train {
    pub id: i32,
    pub name: String,
    pub cargo_num: i32,
    pub places_in_cargo: i32,
    #[graphql(skip)]
    pub train_type_id: i32,
}

#[ComplexObject]
impl Train {
    async fn train_type(&self, ctx: &Context<'_>) -> Result<TrainType> {
        let conn = get_conn_from_ctx(ctx);
        let kind = railbook_db::models::train_type::TrainType::find(self.train_type_id, &conn)?;
        Ok((&kind).into())
    }
}

impl From<&TrainData> for Train {
    fn from(train: &TrainData) -> Self {
        Train {
            id: train.id,
            name: train.name.clone(),
            cargo_num: train.cargo_num,
            places_in_cargo: train.places_in_cargo,
            train_type_id: train.train_type_id,
        }
    }
}

#[derive(InputObject)]
pub struct TrainInput {
    pub name: String,
    pub cargo_num: i32,
    pub places_in_cargo: i32,
    pub train_type_id: i32,
}

impl From<&TrainInput> for NewTrainData {
    fn from(input: &TrainInput) -> Self {
        NewTrainData {
            name: input.name.clone(),
            cargo_num: input.cargo_num,
            places_in_cargo: input.places_in_cargo,
            train_type_id: input.train_type_id,
        }
    }
}
