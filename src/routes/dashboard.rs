use actix_web::{get, web, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::error::AppError;
use crate::models::dto::ScreenerQuery;
use crate::services::dashboard::Dashboard;
use crate::services::stock_service::StockService;

/// GET / - Dashboard du screener
/// forward_pe / dividend_yield : seuils stricts, ma50 / ma200 : prix au-dessus de la moyenne
#[get("/")]
pub async fn home(
    query: web::Query<ScreenerQuery>,
    db: web::Data<DatabaseConnection>,
    dashboard: web::Data<Dashboard>,
) -> Result<HttpResponse, AppError> {
    // paramètre invalide => 400 avant toute requête en base
    let filter = query.to_filter()?;

    let stocks = StockService::list_filtered(db.get_ref(), &filter).await?;
    let html = dashboard.render(&stocks, &query)?;

    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html))
}
