use std::str::FromStr;

use async_graphql::{async_trait, guard::Guard, Context, Object, Result};
use async_graphql::{EmptySubscription, Error, Schema};

use railbook_common::utils::{Claims, Role as AuthRole};
use railbook_db::models::crew::{Crew as CrewData, NewCrew as NewCrewData};
use railbook_db::models::journey::{CapacityMode, Journey as JourneyData};
use railbook_db::models::order::{NewOrder as NewOrderData, Order as OrderData};
use railbook_db::models::route::{NewRoute as NewRouteData, Route as RouteData};
use railbook_db::models::station::{NewStation as NewStationData, Station as StationData};
use railbook_db::models::train::{NewTrain as NewTrainData, Train as TrainData};
use railbook_db::models::train_type::{NewTrainType as NewTrainTypeData, TrainType as TrainTypeData};

use crate::get_conn_from_ctx;

use self::crew::{Crew, CrewInput};
use self::journey::{JourneyDetail, JourneyInput, JourneyView};
use self::order::{OrderView, TicketInput};
use self::route::{RouteDetail, RouteInput, RouteView};
use self::station::{Station, StationInput};
use self::train::{Train, TrainInput};
use self::train_type::{TrainType, TrainTypeInput};

pub mod crew;
pub mod journey;
pub mod order;
pub mod route;
pub mod station;
pub mod train;
pub mod train_type;

pub type AppSchema = Schema<Query, Mutation, EmptySubscription>;

pub struct Query;

#[Object]
impl Query {
    async fn crews(&self, ctx: &Context<'_>) -> Result<Vec<Crew>> {
        Ok(CrewData::list_all(&get_conn_from_ctx(ctx))?
            .iter()
            .map(|c| c.into())
            .collect())
    }

    async fn crew(&self, ctx: &Context<'_>, id: i32) -> Result<Crew> {
        let ref member = CrewData::find(id, &get_conn_from_ctx(ctx))?;
        Ok(member.into())
    }

    async fn train_types(&self, ctx: &Context<'_>) -> Result<Vec<TrainType>> {
        Ok(TrainTypeData::list_all(&get_conn_from_ctx(ctx))?
            .iter()
            .map(|t| t.into())
            .collect())
    }

    async fn train_type(&self, ctx: &Context<'_>, id: i32) -> Result<TrainType> {
        let ref kind = TrainTypeData::find(id, &get_conn_from_ctx(ctx))?;
        Ok(kind.into())
    }

    /// Both filters take comma-separated id lists with any-of semantics.
    async fn trains(
        &self,
        ctx: &Context<'_>,
        cargo_nums: Option<String>,
        train_type_ids: Option<String>,
    ) -> Result<Vec<Train>> {
        let cargo_nums = id_filter(&cargo_nums)?;
        let type_ids = id_filter(&train_type_ids)?;
        Ok(TrainData::filter(&cargo_nums, &type_ids, &get_conn_from_ctx(ctx))?
            .iter()
            .map(|t| t.into())
            .collect())
    }

    async fn train(&self, ctx: &Context<'_>, id: i32) -> Result<Train> {
        let ref train = TrainData::find(id, &get_conn_from_ctx(ctx))?;
        Ok(train.into())
    }

    async fn stations(&self, ctx: &Context<'_>) -> Result<Vec<Station>> {
        Ok(StationData::list_all(&get_conn_from_ctx(ctx))?
            .iter()
            .map(|s| s.into())
            .collect())
    }

    async fn station(&self, ctx: &Context<'_>, id: i32) -> Result<Station> {
        let ref station = StationData::find(id, &get_conn_from_ctx(ctx))?;
        Ok(station.into())
    }

    async fn routes(
        &self,
        ctx: &Context<'_>,
        source_ids: Option<String>,
        destination_ids: Option<String>,
    ) -> Result<Vec<RouteView>> {
        let source_ids = id_filter(&source_ids)?;
        let destination_ids = id_filter(&destination_ids)?;
        let conn = get_conn_from_ctx(ctx);
        RouteData::filter(&source_ids, &destination_ids, &conn)?
            .iter()
            .map(|r| RouteView::read(r, &conn).map_err(Error::from))
            .collect()
    }

    async fn route(&self, ctx: &Context<'_>, id: i32) -> Result<RouteDetail> {
        let conn = get_conn_from_ctx(ctx);
        let route = RouteData::find(id, &conn)?;
        Ok(RouteDetail::read(&route, &conn)?)
    }

    async fn journeys(
        &self,
        ctx: &Context<'_>,
        route_ids: Option<String>,
        train_ids: Option<String>,
    ) -> Result<Vec<JourneyView>> {
        let route_ids = id_filter(&route_ids)?;
        let train_ids = id_filter(&train_ids)?;
        let conn = get_conn_from_ctx(ctx);
        let mode = get_capacity_mode(ctx);
        JourneyData::filter(&route_ids, &train_ids, &conn)?
            .iter()
            .map(|j| JourneyView::read(j, mode, &conn).map_err(Error::from))
            .collect()
    }

    async fn journey(&self, ctx: &Context<'_>, id: i32) -> Result<JourneyDetail> {
        let conn = get_conn_from_ctx(ctx);
        let journey = JourneyData::find(id, &conn)?;
        Ok(JourneyDetail::read(&journey, get_capacity_mode(ctx), &conn)?)
    }

    /// The caller's own orders, newest first. Page size defaults to 10 and
    /// is capped at 100.
    #[graphql(guard(LoginGuard()))]
    async fn orders(
        &self,
        ctx: &Context<'_>,
        page: Option<i64>,
        page_size: Option<i64>,
    ) -> Result<Vec<OrderView>> {
        let uid = get_id_from_ctx(ctx).ok_or("Invalid token")?;
        Ok(
            OrderData::list_for_user(&uid, page, page_size, &get_conn_from_ctx(ctx))?
                .iter()
                .map(|o| o.into())
                .collect(),
        )
    }

    #[graphql(guard(LoginGuard()))]
    async fn order(&self, ctx: &Context<'_>, id: i32) -> Result<OrderView> {
        let uid = get_id_from_ctx(ctx).ok_or("Invalid token")?;
        let ref order = OrderData::find_for_user(id, &uid, &get_conn_from_ctx(ctx))?;
        Ok(order.into())
    }
}

pub struct Mutation;

#[Object]
impl Mutation {
    #[graphql(guard(RoleGuard(role = "AuthRole::Admin")))]
    async fn create_crew(&self, ctx: &Context<'_>, input: CrewInput) -> Result<Crew> {
        let new_crew: NewCrewData = (&input).into();
        let ref created = new_crew.create(&get_conn_from_ctx(ctx))?;
        Ok(created.into())
    }

    #[graphql(guard(RoleGuard(role = "AuthRole::Admin")))]
    async fn update_crew(&self, ctx: &Context<'_>, id: i32, input: CrewInput) -> Result<Crew> {
        let conn = get_conn_from_ctx(ctx);
        let member = CrewData::find(id, &conn)?;
        let ref updated = member.update(&(&input).into(), &conn)?;
        Ok(updated.into())
    }

    #[graphql(guard(RoleGuard(role = "AuthRole::Admin")))]
    async fn delete_crew(&self, ctx: &Context<'_>, id: i32) -> Result<bool> {
        Ok(CrewData::delete(id, &get_conn_from_ctx(ctx))? > 0)
    }

    #[graphql(guard(RoleGuard(role = "AuthRole::Admin")))]
    async fn create_train_type(&self, ctx: &Context<'_>, input: TrainTypeInput) -> Result<TrainType> {
        let new_type = NewTrainTypeData { name: input.name };
        let ref created = new_type.create(&get_conn_from_ctx(ctx))?;
        Ok(created.into())
    }

    #[graphql(guard(RoleGuard(role = "AuthRole::Admin")))]
    async fn update_train_type(
        &self,
        ctx: &Context<'_>,
        id: i32,
        input: TrainTypeInput,
    ) -> Result<TrainType> {
        let conn = get_conn_from_ctx(ctx);
        let kind = TrainTypeData::find(id, &conn)?;
        let ref updated = kind.update_name(&input.name, &conn)?;
        Ok(updated.into())
    }

    /// Cascades to the type's trains at the storage layer.
    #[graphql(guard(RoleGuard(role = "AuthRole::Admin")))]
    async fn delete_train_type(&self, ctx: &Context<'_>, id: i32) -> Result<bool> {
        Ok(TrainTypeData::delete(id, &get_conn_from_ctx(ctx))? > 0)
    }

    #[graphql(guard(RoleGuard(role = "AuthRole::Admin")))]
    async fn create_train(&self, ctx: &Context<'_>, input: TrainInput) -> Result<Train> {
        let new_train: NewTrainData = (&input).into();
        let ref created = new_train.create(&get_conn_from_ctx(ctx))?;
        Ok(created.into())
    }

    #[graphql(guard(RoleGuard(role = "AuthRole::Admin")))]
    async fn update_train(&self, ctx: &Context<'_>, id: i32, input: TrainInput) -> Result<Train> {
        let conn = get_conn_from_ctx(ctx);
        let train = TrainData::find(id, &conn)?;
        let ref updated = train.update(&(&input).into(), &conn)?;
        Ok(updated.into())
    }

    #[graphql(guard(RoleGuard(role = "AuthRole::Admin")))]
    async fn delete_train(&self, ctx: &Context<'_>, id: i32) -> Result<bool> {
        Ok(TrainData::delete(id, &get_conn_from_ctx(ctx))? > 0)
    }

    #[graphql(guard(RoleGuard(role = "AuthRole::Admin")))]
    async fn create_station(&self, ctx: &Context<'_>, input: StationInput) -> Result<Station> {
        let new_station: NewStationData = (&input).into();
        let ref created = new_station.create(&get_conn_from_ctx(ctx))?;
        Ok(created.into())
    }

    #[graphql(guard(RoleGuard(role = "AuthRole::Admin")))]
    async fn update_station(&self, ctx: &Context<'_>, id: i32, input: StationInput) -> Result<Station> {
        let conn = get_conn_from_ctx(ctx);
        let station = StationData::find(id, &conn)?;
        let ref updated = station.update(&(&input).into(), &conn)?;
        Ok(updated.into())
    }

    /// Routes referencing the station survive with a nullified endpoint.
    #[graphql(guard(RoleGuard(role = "AuthRole::Admin")))]
    async fn delete_station(&self, ctx: &Context<'_>, id: i32) -> Result<bool> {
        Ok(StationData::delete(id, &get_conn_from_ctx(ctx))? > 0)
    }

    /// Endpoint validation runs before the insert; the storage-level unique
    /// constraint on (source, destination, distance) has the final say.
    #[graphql(guard(RoleGuard(role = "AuthRole::Admin")))]
    async fn create_route(&self, ctx: &Context<'_>, input: RouteInput) -> Result<RouteView> {
        let conn = get_conn_from_ctx(ctx);
        let new_route: NewRouteData = (&input).into();
        let created = new_route.create(&conn)?;
        Ok(RouteView::read(&created, &conn)?)
    }

    #[graphql(guard(RoleGuard(role = "AuthRole::Admin")))]
    async fn update_route(&self, ctx: &Context<'_>, id: i32, input: RouteInput) -> Result<RouteView> {
        let conn = get_conn_from_ctx(ctx);
        let route = RouteData::find(id, &conn)?;
        let updated = route.update(&(&input).into(), &conn)?;
        Ok(RouteView::read(&updated, &conn)?)
    }

    #[graphql(guard(RoleGuard(role = "AuthRole::Admin")))]
    async fn delete_route(&self, ctx: &Context<'_>, id: i32) -> Result<bool> {
        Ok(RouteData::delete(id, &get_conn_from_ctx(ctx))? > 0)
    }

    #[graphql(guard(RoleGuard(role = "AuthRole::Admin")))]
    async fn create_journey(&self, ctx: &Context<'_>, input: JourneyInput) -> Result<JourneyView> {
        let conn = get_conn_from_ctx(ctx);
        let new_journey: railbook_db::models::journey::NewJourney = (&input).into();
        let created = new_journey.create(&conn)?;
        for crew_id in &input.crew_ids {
            created.add_crew(*crew_id, &conn)?;
        }
        Ok(JourneyView::read(&created, get_capacity_mode(ctx), &conn)?)
    }

    #[graphql(guard(RoleGuard(role = "AuthRole::Admin")))]
    async fn update_journey(&self, ctx: &Context<'_>, id: i32, input: JourneyInput) -> Result<JourneyView> {
        let conn = get_conn_from_ctx(ctx);
        let journey = JourneyData::find(id, &conn)?;
        let updated = journey.update(&(&input).into(), &conn)?;
        // Crew set is replaced wholesale.
        for member in updated.crews(&conn)? {
            updated.remove_crew(member.id, &conn)?;
        }
        for crew_id in &input.crew_ids {
            updated.add_crew(*crew_id, &conn)?;
        }
        Ok(JourneyView::read(&updated, get_capacity_mode(ctx), &conn)?)
    }

    #[graphql(guard(RoleGuard(role = "AuthRole::Admin")))]
    async fn delete_journey(&self, ctx: &Context<'_>, id: i32) -> Result<bool> {
        Ok(JourneyData::delete(id, &get_conn_from_ctx(ctx))? > 0)
    }

    #[graphql(guard(RoleGuard(role = "AuthRole::Admin")))]
    async fn add_crew_to_journey(&self, ctx: &Context<'_>, journey_id: i32, crew_id: i32) -> Result<bool> {
        let conn = get_conn_from_ctx(ctx);
        let journey = JourneyData::find(journey_id, &conn)?;
        Ok(journey.add_crew(crew_id, &conn)? > 0)
    }

    #[graphql(guard(RoleGuard(role = "AuthRole::Admin")))]
    async fn remove_crew_from_journey(
        &self,
        ctx: &Context<'_>,
        journey_id: i32,
        crew_id: i32,
    ) -> Result<bool> {
        let conn = get_conn_from_ctx(ctx);
        let journey = JourneyData::find(journey_id, &conn)?;
        Ok(journey.remove_crew(crew_id, &conn)? > 0)
    }

    /// The whole order commits or nothing does. The owner is always the
    /// authenticated caller; `created_at` is stamped by the storage layer.
    #[graphql(guard(LoginGuard()))]
    async fn create_order(&self, ctx: &Context<'_>, tickets: Vec<TicketInput>) -> Result<OrderView> {
        let uid = get_id_from_ctx(ctx).ok_or("Invalid token")?;
        let conn = get_conn_from_ctx(ctx);
        let specs: Vec<_> = tickets.iter().map(|t| t.into()).collect();
        let (order, _issued) =
            NewOrderData::create_with_tickets(&uid, &specs, &conn).map_err(|e| {
                log::warn!("order rejected for {}: {}", uid, e);
                e
            })?;
        Ok((&order).into())
    }
}

pub(crate) struct RoleGuard {
    role: AuthRole,
}

#[async_trait::async_trait]
impl Guard for RoleGuard {
    async fn check(&self, ctx: &Context<'_>) -> Result<()> {
        match get_role_from_ctx(ctx) {
            Some(role) => {
                if role == self.role {
                    Ok(())
                } else {
                    Err("Forbidden".into())
                }
            }
            None => Err("Not Login".into()),
        }
    }
}

pub(crate) struct LoginGuard;

#[async_trait::async_trait]
impl Guard for LoginGuard {
    async fn check(&self, ctx: &Context<'_>) -> Result<()> {
        get_id_from_ctx(ctx).ok_or("Not Login".into()).map(|_| ())
    }
}

fn get_id_from_ctx(ctx: &Context<'_>) -> Option<String> {
    ctx.data_opt::<Claims>().map(|c| c.sub.clone())
}

fn get_role_from_ctx(ctx: &Context<'_>) -> Option<AuthRole> {
    ctx.data_opt::<Claims>()
        .and_then(|c| AuthRole::from_str(&c.role).ok())
}

pub(crate) fn get_capacity_mode(ctx: &Context<'_>) -> CapacityMode {
    ctx.data::<CapacityMode>()
        .map(|mode| *mode)
        .unwrap_or(CapacityMode::PerCargo)
}

/// Parses a comma-separated id list: blanks are skipped, duplicates
/// dropped, anything non-numeric rejects the whole filter.
pub(crate) fn parse_id_list(raw: &str) -> Result<Vec<i32>, String> {
    let mut ids = Vec::new();
    for part in raw.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let id = part
            .parse::<i32>()
            .map_err(|_| format!("invalid id `{}` in filter", part))?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}

fn id_filter(raw: &Option<String>) -> Result<Vec<i32>> {
    match raw {
        Some(s) => parse_id_list(s).map_err(Error::new),
        None => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::parse_id_list;

    #[test]
    fn parses_comma_separated_ids() {
        assert_eq!(parse_id_list("1,2,3").unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn skips_blanks_and_dedupes() {
        assert_eq!(parse_id_list(" 1, ,2,1,").unwrap(), vec![1, 2]);
    }

    #[test]
    fn rejects_non_numeric_parts() {
        assert!(parse_id_list("1,two,3").is_err());
    }

    #[test]
    fn empty_string_means_no_filter() {
        assert_eq!(parse_id_list("").unwrap(), Vec::<i32>::new());
    }
}
