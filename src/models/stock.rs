use serde::Serialize;
use sea_orm::entity::prelude::*;

// Les métriques valent 0 tant que le refresh n'a pas tourné
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "stock")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique, indexed)]
    pub symbol: String,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    #[serde(with = "rust_decimal::serde::float")]
    pub forward_pe: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    #[serde(with = "rust_decimal::serde::float")]
    pub forward_eps: Decimal,
    // en pourcentage (fraction du fournisseur x 100)
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    #[serde(with = "rust_decimal::serde::float")]
    pub dividend_yield: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    #[serde(with = "rust_decimal::serde::float")]
    pub ma50: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    #[serde(with = "rust_decimal::serde::float")]
    pub ma200: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    /// Nouveau stock : seul le symbole est renseigné, toutes les métriques à 0
    pub fn from_symbol(symbol: &str) -> Self {
        Self {
            symbol: sea_orm::Set(symbol.to_string()),
            price: sea_orm::Set(Decimal::ZERO),
            forward_pe: sea_orm::Set(Decimal::ZERO),
            forward_eps: sea_orm::Set(Decimal::ZERO),
            dividend_yield: sea_orm::Set(Decimal::ZERO),
            ma50: sea_orm::Set(Decimal::ZERO),
            ma200: sea_orm::Set(Decimal::ZERO),
            ..Default::default()
        }
    }
}
