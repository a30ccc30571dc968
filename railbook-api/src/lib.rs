use std::sync::Arc;

use actix_web::web;
use async_graphql::{Context, EmptySubscription, Schema};
use models::{AppSchema, Mutation, Query};

use railbook_db::connection::{Conn, PgPool};
use railbook_db::models::journey::CapacityMode;

pub fn configure_service(cfg: &mut web::ServiceConfig) {
    cfg.service(handlers::index_playground)
        .service(handlers::index);
}

pub fn create_schema_with_context(pool: PgPool, capacity_mode: CapacityMode) -> AppSchema {
    Schema::build(Query, Mutation, EmptySubscription)
        .data(Arc::new(pool))
        .data(capacity_mode)
        .finish()
}

pub fn get_conn_from_ctx(ctx: &Context<'_>) -> Conn {
    ctx.data::<Arc<PgPool>>()
        .expect("Can't get pool")
        .get()
        .expect("Can't get DB connection")
}

mod handlers;
pub mod models;
