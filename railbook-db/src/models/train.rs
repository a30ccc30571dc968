use crate::schema::trains;
use crate::schema::trains::dsl::*;
use diesel::{dsl::any, prelude::*};
use diesel::PgConnection;
use serde::{Deserialize, Serialize};

use super::train_type::TrainType;

#[derive(
    Queryable, Debug, Serialize, Deserialize, AsChangeset, Clone, Identifiable, Associations,
)]
#[belongs_to(TrainType)]
#[table_name = "trains"]
pub struct Train {
    pub id: i32,
    pub name: String,
    pub cargo_num: i32,
    pub places_in_cargo: i32,
    pub train_type_id: i32,
}

impl Train {
    pub fn find(tid: i32, conn: &PgConnection) -> QueryResult<Self> {
        trains.find(tid).first(conn)
    }

    pub fn list_all(conn: &PgConnection) -> QueryResult<Vec<Self>> {
        trains.order(name.asc()).load(conn)
    }

    /// Any-of filtering over cargo counts and type ids; an empty set means
    /// "no restriction" for that field.
    pub fn filter(
        cargo_nums: &[i32],
        type_ids: &[i32],
        conn: &PgConnection,
    ) -> QueryResult<Vec<Self>> {
        let mut query = trains.into_boxed();
        if !cargo_nums.is_empty() {
            query = query.filter(cargo_num.eq(any(cargo_nums.to_vec())));
        }
        if !type_ids.is_empty() {
            query = query.filter(train_type_id.eq(any(type_ids.to_vec())));
        }
        query.order(name.asc()).load(conn)
    }

    pub fn train_type(&self, conn: &PgConnection) -> QueryResult<TrainType> {
        TrainType::find(self.train_type_id, conn)
    }

    pub fn update(&self, changes: &NewTrain, conn: &PgConnection) -> QueryResult<Self> {
        diesel::update(self).set(changes).get_result(conn)
    }

    pub fn delete(tid: i32, conn: &PgConnection) -> QueryResult<usize> {
        diesel::delete(trains.find(tid)).execute(conn)
    }
}

#[derive(Debug, Serialize, Deserialize, Insertable, AsChangeset)]
#[table_name = "trains"]
pub struct NewTrain {
    pub name: String,
    pub cargo_num: i32,
    pub places_in_cargo: i32,
    pub train_type_id: i32,
}

impl NewTrain {
    pub fn create(&self, conn: &PgConnection) -> QueryResult<Train> {
        diesel::insert_into(trains::table)
            .values(self)
            .get_result(conn)
    }
}
