// connexion BD

use log::LevelFilter;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

use crate::config::DatabaseConfig;
use crate::services::stock_service::StockService;

/// Ouvre le pool et crée la table stock si besoin
pub async fn establish_connection(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .sqlx_logging(config.sql_echo)
        .sqlx_logging_level(LevelFilter::Info);

    let db = Database::connect(options).await?;
    StockService::create_schema(&db).await?;

    Ok(db)
}
