use async_graphql::*;

use railbook_db::models::crew::{Crew as CrewData, NewCrew as NewCrewData};

#[derive(SimpleObject, Clone)]
pub struct Crew {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
}

impl From<&CrewData> for Crew {
    fn from(member: &CrewData) -> Self {
        Crew {
            id: member.id,
            first_name: member.first_name.clone(),
            last_name: member.last_name.clone(),
            full_name: member.full_name(),
        }
    }
}

#[derive(InputObject)]
pub struct CrewInput {
    pub first_name: String,
    pub last_name: String,
}

impl From<&CrewInput> for NewCrewData {
    fn from(input: &CrewInput) -> Self {
        NewCrewData {
            first_name: input.first_name.clone(),
            last_name: input.last_name.clone(),
        }
    }
}
