use actix_web::{get, post, web, HttpResponse};
use sea_orm::DatabaseConnection;
use validator::Validate;

use crate::error::AppError;
use crate::models::dto::{CreateStockResponse, StockRequest};
use crate::services::refresh_service::RefreshQueue;
use crate::services::stock_service::StockService;

/// GET /stock - Tous les stocks, sans filtre
#[get("")]
pub async fn get_stocks(db: web::Data<DatabaseConnection>) -> Result<HttpResponse, AppError> {
    let stocks = StockService::list_all(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(stocks))
}

/// POST /stock - Ajoute un symbole puis planifie le refresh de ses métriques
#[post("")]
pub async fn create_stock(
    body: web::Json<StockRequest>,
    db: web::Data<DatabaseConnection>,
    refresh_queue: web::Data<RefreshQueue>,
) -> Result<HttpResponse, AppError> {
    body.validate()
        .map_err(|e| AppError::InvalidInput(e.to_string()))?;

    // 1. Insérer le stock (métriques à 0), refus si le symbole existe déjà
    let stock = StockService::insert(db.get_ref(), &body.symbol).await?;
    log::info!("Stock {} created with id={}", stock.symbol, stock.id);

    // 2. Le refresh tourne détaché, la réponse n'attend pas
    refresh_queue.schedule(stock.id);

    Ok(HttpResponse::Ok().json(CreateStockResponse::created()))
}

pub fn stocks_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/stock")
            .service(get_stocks)
            .service(create_stock)
    );
}
