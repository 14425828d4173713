//pour les corps de requête et réponses de l'API
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppError;
use crate::services::stock_service::StockFilter;

// POST /stock
// Aucune contrainte de casse ou de format sur le symbole, seulement sa présence
#[derive(Debug, Deserialize, Validate)]
pub struct StockRequest {
    #[validate(length(min = 1, message = "symbol is required"))]
    pub symbol: String,
}

#[derive(Debug, Serialize)]
pub struct CreateStockResponse {
    pub code: &'static str,
    pub message: &'static str,
}

impl CreateStockResponse {
    pub fn created() -> Self {
        Self {
            code: "success",
            message: "Stock created",
        }
    }
}

// GET / : les paramètres restent bruts pour pouvoir les renvoyer au template
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ScreenerQuery {
    pub forward_pe: Option<String>,
    pub dividend_yield: Option<String>,
    pub ma50: Option<String>,
    pub ma200: Option<String>,
}

impl ScreenerQuery {
    /// Construit les critères de filtre. Échoue avant toute requête en base
    /// si un seuil ou un drapeau n'est pas interprétable.
    pub fn to_filter(&self) -> Result<StockFilter, AppError> {
        Ok(StockFilter {
            forward_pe_above: parse_threshold("forward_pe", self.forward_pe.as_deref())?,
            dividend_yield_above: parse_threshold("dividend_yield", self.dividend_yield.as_deref())?,
            above_ma50: parse_flag("ma50", self.ma50.as_deref())?.unwrap_or(false),
            above_ma200: parse_flag("ma200", self.ma200.as_deref())?.unwrap_or(false),
        })
    }

    pub fn ma50_flag(&self) -> Option<bool> {
        parse_flag("ma50", self.ma50.as_deref()).ok().flatten()
    }

    pub fn ma200_flag(&self) -> Option<bool> {
        parse_flag("ma200", self.ma200.as_deref()).ok().flatten()
    }
}

// Chaîne vide = pas de filtre
fn parse_threshold(name: &str, raw: Option<&str>) -> Result<Option<Decimal>, AppError> {
    let raw = match raw {
        Some(r) if !r.is_empty() => r,
        _ => return Ok(None),
    };

    let value = raw
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| AppError::InvalidInput(format!("Invalid value for {}", name)))?;

    // au-delà de la plage Decimal : on borne, les métriques stockées restent < 10^10
    let threshold = Decimal::from_f64_retain(value).unwrap_or(if value.is_sign_negative() {
        Decimal::MIN
    } else {
        Decimal::MAX
    });

    Ok(Some(threshold))
}

fn parse_flag(name: &str, raw: Option<&str>) -> Result<Option<bool>, AppError> {
    let raw = match raw {
        Some(r) => r.trim().to_ascii_lowercase(),
        None => return Ok(None),
    };

    match raw.as_str() {
        "true" | "1" | "yes" | "on" => Ok(Some(true)),
        "false" | "0" | "no" | "off" => Ok(Some(false)),
        _ => Err(AppError::InvalidInput(format!("Invalid value for {}", name))),
    }
}
