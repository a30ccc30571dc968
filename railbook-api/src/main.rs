use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;

use railbook_api::{configure_service, create_schema_with_context};
use railbook_db::connection::create_connection_pool;
use railbook_db::models::journey::CapacityMode;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let pool = create_connection_pool();
    railbook_db::run_migrations(&pool);

    let capacity_mode = CapacityMode::from_env();
    let schema = web::Data::new(create_schema_with_context(pool, capacity_mode));

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
    log::info!(
        "railbook listening on {} (capacity mode: {})",
        bind_addr,
        capacity_mode
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .app_data(schema.clone())
            .configure(configure_service)
    })
    .bind(bind_addr)?
    .run()
    .await
}
