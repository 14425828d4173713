pub mod dashboard;
pub mod health;
pub mod stocks;

use actix_web::web;

use crate::error::AppError;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    // corps ou query string illisibles => 400 {"detail": ...}
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::InvalidInput(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::InvalidInput(err.to_string()).into()),
    )
    .service(dashboard::home)
    .service(health::health_check)
    .configure(stocks::stocks_routes);
}
