use crate::schema::train_types;
use crate::schema::train_types::dsl::*;
use diesel::prelude::*;
use diesel::PgConnection;
use serde::{Deserialize, Serialize};

#[derive(
    Queryable, Debug, Serialize, Deserialize, AsChangeset, Clone, Identifiable, Associations,
)]
#[table_name = "train_types"]
pub struct TrainType {
    pub id: i32,
    pub name: String,
}

impl TrainType {
    pub fn find(tid: i32, conn: &PgConnection) -> QueryResult<Self> {
        train_types.find(tid).first(conn)
    }

    pub fn list_all(conn: &PgConnection) -> QueryResult<Vec<Self>> {
        train_types.load(conn)
    }

    pub fn update_name(&self, new_name: &str, conn: &PgConnection) -> QueryResult<Self> {
        diesel::update(self).set(name.eq(new_name)).get_result(conn)
    }

    // Deleting a type cascades to its trains at the storage layer.
    pub fn delete(tid: i32, conn: &PgConnection) -> QueryResult<usize> {
        diesel::delete(train_types.find(tid)).execute(conn)
    }
}

#[derive(Debug, Serialize, Deserialize, Insertable)]
#[table_name = "train_types"]
pub struct NewTrainType {
    pub name: String,
}

impl NewTrainType {
    pub fn create(&self, conn: &PgConnection) -> QueryResult<TrainType> {
        diesel::insert_into(train_types::table)
            .values(self)
            .get_result(conn)
    }
}
