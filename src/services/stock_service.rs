use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::*;

use crate::error::{AppError, AppResult};
use crate::models::stock;

/// Critères du screener, combinés en ET
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StockFilter {
    pub forward_pe_above: Option<Decimal>,
    pub dividend_yield_above: Option<Decimal>,
    pub above_ma50: bool,
    pub above_ma200: bool,
}

impl StockFilter {
    fn condition(&self) -> Condition {
        let mut condition = Condition::all();

        if let Some(threshold) = self.forward_pe_above {
            condition = condition.add(stock::Column::ForwardPe.gt(threshold));
        }
        if let Some(threshold) = self.dividend_yield_above {
            condition = condition.add(stock::Column::DividendYield.gt(threshold));
        }
        if self.above_ma50 {
            condition = condition.add(Expr::col(stock::Column::Price).gt(Expr::col(stock::Column::Ma50)));
        }
        if self.above_ma200 {
            condition = condition.add(Expr::col(stock::Column::Price).gt(Expr::col(stock::Column::Ma200)));
        }

        condition
    }
}

/// Accès à la table stock. Chaque appel emprunte une connexion au pool
/// le temps d'une requête.
pub struct StockService;

impl StockService {
    /// Crée la table et l'index unique sur le symbole s'ils n'existent pas
    pub async fn create_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
        let backend = db.get_database_backend();
        let schema = Schema::new(backend);

        let mut table = schema.create_table_from_entity(stock::Entity);
        table.if_not_exists();
        db.execute(backend.build(&table)).await?;

        for mut index in schema.create_index_from_entity(stock::Entity) {
            index.if_not_exists();
            db.execute(backend.build(&index)).await?;
        }

        Ok(())
    }

    pub async fn find_by_symbol(db: &DatabaseConnection, symbol: &str) -> Result<Option<stock::Model>, DbErr> {
        stock::Entity::find()
            .filter(stock::Column::Symbol.eq(symbol))
            .one(db)
            .await
    }

    pub async fn find_by_id(db: &DatabaseConnection, id: i32) -> Result<Option<stock::Model>, DbErr> {
        stock::Entity::find_by_id(id).one(db).await
    }

    /// Insère un stock avec toutes les métriques à 0.
    /// Un doublon passé entre la vérification et l'insert remonte aussi en Duplicate.
    pub async fn insert(db: &DatabaseConnection, symbol: &str) -> AppResult<stock::Model> {
        if Self::find_by_symbol(db, symbol).await?.is_some() {
            return Err(duplicate());
        }

        stock::ActiveModel::from_symbol(symbol)
            .insert(db)
            .await
            .map_err(map_insert_error)
    }

    pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<stock::Model>, DbErr> {
        stock::Entity::find().all(db).await
    }

    pub async fn list_filtered(db: &DatabaseConnection, filter: &StockFilter) -> Result<Vec<stock::Model>, DbErr> {
        stock::Entity::find()
            .filter(filter.condition())
            .all(db)
            .await
    }

    /// Persiste les métriques d'un stock existant
    pub async fn save(db: &DatabaseConnection, stock: stock::ActiveModel) -> Result<stock::Model, DbErr> {
        stock.update(db).await
    }
}

fn map_insert_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => duplicate(),
        _ => AppError::Database(err),
    }
}

fn duplicate() -> AppError {
    AppError::Duplicate("Stock symbol already exists.".to_string())
}
