/*
Refresh des métriques après la création d'un stock

POST /stock ──► RefreshQueue::schedule(id) ──► dispatcher ──► tokio::spawn(refresh)
                (retourne tout de suite)                       │
                                                               ├─ find_by_id
                                                               ├─ MarketData::fetch_metrics
                                                               └─ save (une seule écriture)

Au plus une exécution par création, pas de retry, pas d'ordre entre les jobs.
Toute erreur est loguée puis abandonnée : le stock garde ses valeurs (0 au départ).
*/
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, Set};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::error::{AppError, AppResult};
use crate::models::stock;
use crate::services::market_data::{MarketData, Metrics};
use crate::services::stock_service::StockService;

// decimal(12, 2) : au plus 10 chiffres avant la virgule
const MAX_METRIC: Decimal = Decimal::from_parts(1_410_065_408, 2, 0, false, 0); // 10^10

pub struct RefreshService;

impl RefreshService {
    /// Charge le stock, interroge le fournisseur et écrase les six métriques
    pub async fn refresh(
        db: &DatabaseConnection,
        market_data: &dyn MarketData,
        id: i32,
    ) -> AppResult<stock::Model> {
        let stock = StockService::find_by_id(db, id)
            .await?
            .ok_or(AppError::NotFound(id))?;

        let metrics = market_data.fetch_metrics(&stock.symbol).await?;

        // on valide tout avant d'écrire quoi que ce soit
        let mut active: stock::ActiveModel = stock.into();
        apply_metrics(&mut active, &metrics)?;

        Ok(StockService::save(db, active).await?)
    }

    /// Variante détachée : ne remonte jamais d'erreur
    pub async fn run(db: &DatabaseConnection, market_data: &dyn MarketData, id: i32) {
        match Self::refresh(db, market_data, id).await {
            Ok(stock) => log::info!(
                "Refreshed {} (id={}): price={} forward_pe={} dividend_yield={}",
                stock.symbol,
                stock.id,
                stock.price,
                stock.forward_pe,
                stock.dividend_yield
            ),
            Err(AppError::NotFound(id)) => log::warn!("Refresh skipped, stock {} not found", id),
            Err(e) => log::error!("Error fetching stock data for id={}: {}", id, e),
        }
    }
}

fn apply_metrics(stock: &mut stock::ActiveModel, metrics: &Metrics) -> AppResult<()> {
    stock.ma200 = Set(to_decimal("twoHundredDayAverage", metrics.two_hundred_day_average)?);
    stock.ma50 = Set(to_decimal("fiftyDayAverage", metrics.fifty_day_average)?);
    stock.price = Set(to_decimal("previousClose", metrics.previous_close)?);
    stock.forward_pe = Set(to_decimal("forwardPE", metrics.forward_pe)?);
    stock.forward_eps = Set(to_decimal("forwardEps", metrics.forward_eps)?);

    // fraction -> pourcentage
    let dividend_yield = match metrics.dividend_yield {
        Some(fraction) => checked(
            "dividendYield",
            to_raw_decimal("dividendYield", fraction)? * Decimal::ONE_HUNDRED,
        )?,
        None => Decimal::ZERO,
    };
    stock.dividend_yield = Set(dividend_yield);

    Ok(())
}

// champ absent = 0
fn to_decimal(field: &str, value: Option<f64>) -> AppResult<Decimal> {
    match value {
        Some(v) => checked(field, to_raw_decimal(field, v)?),
        None => Ok(Decimal::ZERO),
    }
}

fn to_raw_decimal(field: &str, value: f64) -> AppResult<Decimal> {
    Decimal::from_f64_retain(value)
        .ok_or_else(|| AppError::MalformedData(format!("{} is not a finite number: {}", field, value)))
}

fn checked(field: &str, value: Decimal) -> AppResult<Decimal> {
    let rounded = value.round_dp(2);
    if rounded.abs() >= MAX_METRIC {
        return Err(AppError::MalformedData(format!("{} out of range: {}", field, rounded)));
    }
    Ok(rounded)
}

// ============================================================================
// File de refresh
// ============================================================================

/// Handle partagé par les handlers HTTP. `schedule` ne bloque jamais.
#[derive(Clone)]
pub struct RefreshQueue {
    sender: mpsc::UnboundedSender<i32>,
}

impl RefreshQueue {
    /// Démarre le dispatcher sur le runtime courant
    pub fn start(db: DatabaseConnection, market_data: Arc<dyn MarketData>) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<i32>();

        tokio::spawn(async move {
            while let Some(id) = receiver.recv().await {
                let db = db.clone();
                let market_data = Arc::clone(&market_data);

                tokio::spawn(async move {
                    RefreshService::run(&db, market_data.as_ref(), id).await;
                });
            }
            log::debug!("Refresh queue closed");
        });

        Self { sender }
    }

    pub fn schedule(&self, id: i32) {
        if self.sender.send(id).is_err() {
            log::error!("Refresh queue is closed, stock {} will keep its current metrics", id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::market_data::MarketDataError;
    use crate::services::stock_service::tests::test_db;
    use async_trait::async_trait;
    use std::str::FromStr;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeMarketData {
        metrics: Option<Metrics>,
        calls: AtomicUsize,
    }

    impl FakeMarketData {
        fn returning(metrics: Metrics) -> Self {
            Self { metrics: Some(metrics), calls: AtomicUsize::new(0) }
        }

        fn failing() -> Self {
            Self { metrics: None, calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl MarketData for FakeMarketData {
        async fn fetch_metrics(&self, symbol: &str) -> Result<Metrics, MarketDataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.metrics
                .clone()
                .ok_or_else(|| MarketDataError::Provider(format!("no quote for {}", symbol)))
        }
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[tokio::test]
    async fn test_refresh_overwrites_metrics() {
        let db = test_db().await;
        let stock = StockService::insert(&db, "KO").await.unwrap();

        let market_data = FakeMarketData::returning(Metrics {
            two_hundred_day_average: Some(58.25),
            fifty_day_average: Some(60.5),
            previous_close: Some(61.75),
            forward_pe: Some(21.5),
            forward_eps: Some(2.875),
            dividend_yield: Some(0.025),
        });

        let refreshed = RefreshService::refresh(&db, &market_data, stock.id).await.unwrap();
        assert_eq!(refreshed.dividend_yield, dec("2.5"));

        let stored = StockService::find_by_id(&db, stock.id).await.unwrap().unwrap();
        assert_eq!(stored.ma200, dec("58.25"));
        assert_eq!(stored.ma50, dec("60.5"));
        assert_eq!(stored.price, dec("61.75"));
        assert_eq!(stored.forward_pe, dec("21.5"));
        assert_eq!(stored.dividend_yield, dec("2.5"));
        assert_eq!(market_data.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_fields_stored_as_zero() {
        let db = test_db().await;
        let stock = StockService::insert(&db, "BRK-B").await.unwrap();

        let market_data = FakeMarketData::returning(Metrics {
            previous_close: Some(400.5),
            ..Default::default()
        });

        RefreshService::refresh(&db, &market_data, stock.id).await.unwrap();

        let stored = StockService::find_by_id(&db, stock.id).await.unwrap().unwrap();
        assert_eq!(stored.price, dec("400.5"));
        assert_eq!(stored.dividend_yield, Decimal::ZERO);
        assert_eq!(stored.forward_pe, Decimal::ZERO);
        assert_eq!(stored.ma50, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_gateway_failure_keeps_zeroes() {
        let db = test_db().await;
        let stock = StockService::insert(&db, "ZZZZ").await.unwrap();
        let market_data = FakeMarketData::failing();

        let err = RefreshService::refresh(&db, &market_data, stock.id).await.unwrap_err();
        assert!(matches!(err, AppError::MarketData(_)));

        // la variante détachée avale l'erreur
        RefreshService::run(&db, &market_data, stock.id).await;

        let stored = StockService::find_by_id(&db, stock.id).await.unwrap().unwrap();
        assert_eq!(stored, stock);
    }

    #[tokio::test]
    async fn test_malformed_value_not_persisted() {
        let db = test_db().await;
        let stock = StockService::insert(&db, "NAN").await.unwrap();

        let market_data = FakeMarketData::returning(Metrics {
            previous_close: Some(12.5),
            forward_pe: Some(f64::INFINITY),
            ..Default::default()
        });

        let err = RefreshService::refresh(&db, &market_data, stock.id).await.unwrap_err();
        assert!(matches!(err, AppError::MalformedData(_)));

        let stored = StockService::find_by_id(&db, stock.id).await.unwrap().unwrap();
        assert_eq!(stored.price, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let db = test_db().await;
        let market_data = FakeMarketData::returning(Metrics::default());

        let err = RefreshService::refresh(&db, &market_data, 42).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(42)));
        assert_eq!(market_data.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(checked("price", dec("9999999999.99")).is_ok());
        assert!(checked("price", dec("10000000000")).is_err());
        assert_eq!(checked("price", dec("1.239")).unwrap(), dec("1.24"));
    }
}
