use crate::schema::crews;
use crate::schema::crews::dsl::*;
use diesel::prelude::*;
use diesel::PgConnection;
use serde::{Deserialize, Serialize};

#[derive(
    Queryable, Debug, Serialize, Deserialize, AsChangeset, Clone, Identifiable, Associations,
)]
#[table_name = "crews"]
pub struct Crew {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
}

impl Crew {
    pub fn find(cid: i32, conn: &PgConnection) -> QueryResult<Self> {
        crews.find(cid).first(conn)
    }

    pub fn list_all(conn: &PgConnection) -> QueryResult<Vec<Self>> {
        crews.order(first_name.asc()).load(conn)
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn update(&self, changes: &NewCrew, conn: &PgConnection) -> QueryResult<Self> {
        diesel::update(self).set(changes).get_result(conn)
    }

    pub fn delete(cid: i32, conn: &PgConnection) -> QueryResult<usize> {
        diesel::delete(crews.find(cid)).execute(conn)
    }
}

#[derive(Debug, Serialize, Deserialize, Insertable, AsChangeset)]
#[table_name = "crews"]
pub struct NewCrew {
    pub first_name: String,
    pub last_name: String,
}

impl NewCrew {
    pub fn create(&self, conn: &PgConnection) -> QueryResult<Crew> {
        diesel::insert_into(crews::table)
            .values(self)
            .get_result(conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_joins_first_and_last() {
        let member = Crew {
            id: 1,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
        };
        assert_eq!(member.full_name(), "Ada Lovelace");
    }
}
