use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use stock_screener::config::AppConfig;
use stock_screener::db;
use stock_screener::routes;
use stock_screener::services::dashboard::Dashboard;
use stock_screener::services::market_data::YahooFinanceClient;
use stock_screener::services::refresh_service::RefreshQueue;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    let config = AppConfig::from_env();
    env_logger::init_from_env(Env::default().default_filter_or(config.log_level.as_str()));

    log::info!("Connecting to database...");
    let db = db::establish_connection(&config.database)
        .await
        .expect("Failed to connect to database");
    log::info!("Database connected");

    let market_data = YahooFinanceClient::new(&config.market_data.base_url, config.market_data.timeout)
        .expect("Failed to build market data client");
    let refresh_queue = web::Data::new(RefreshQueue::start(db.clone(), Arc::new(market_data)));

    let dashboard = web::Data::new(Dashboard::new().expect("Failed to load templates"));

    let (host, port) = config.bind_addr();
    log::info!("Starting server on http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(db.clone()))
            .app_data(refresh_queue.clone())
            .app_data(dashboard.clone())
            .configure(routes::configure_routes)
    })
        .bind((host, port))?
        .run()
        .await
}
