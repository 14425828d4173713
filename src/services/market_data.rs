use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;

/// Métriques brutes renvoyées par le fournisseur, chaque champ peut manquer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub two_hundred_day_average: Option<f64>,
    pub fifty_day_average: Option<f64>,
    pub previous_close: Option<f64>,
    #[serde(rename = "forwardPE")]
    pub forward_pe: Option<f64>,
    pub forward_eps: Option<f64>,
    // fraction (0.025 = 2.5 %)
    pub dividend_yield: Option<f64>,
}

#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider returned HTTP {0}")]
    Status(u16),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("no data for symbol {0}")]
    Empty(String),

    #[error("invalid provider url: {0}")]
    Url(String),
}

//trait = Interface vers le fournisseur de données de marché
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Un seul appel, pas de retry
    async fn fetch_metrics(&self, symbol: &str) -> Result<Metrics, MarketDataError>;
}

// ============================================================================
// Yahoo Finance (quoteSummary)
// ============================================================================

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";
const COOKIE_URL: &str = "https://fc.yahoo.com";
const MODULES: &str = "summaryDetail,defaultKeyStatistics";

pub struct YahooFinanceClient {
    client: reqwest::Client,
    base_url: String,
    // crumb récupéré une fois puis réutilisé
    crumb: Mutex<Option<String>>,
}

impl YahooFinanceClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, MarketDataError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            crumb: Mutex::new(None),
        })
    }

    async fn crumb(&self) -> Result<String, MarketDataError> {
        let mut cached = self.crumb.lock().await;
        if let Some(crumb) = cached.as_ref() {
            return Ok(crumb.clone());
        }

        // fc.yahoo.com répond souvent en 404 mais pose le cookie de session
        self.client.get(COOKIE_URL).send().await?;

        let response = self
            .client
            .get(format!("{}/v1/test/getcrumb", self.base_url))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MarketDataError::Status(response.status().as_u16()));
        }

        let crumb = response.text().await?.trim().to_string();
        if crumb.is_empty() {
            return Err(MarketDataError::Provider("empty crumb".to_string()));
        }

        *cached = Some(crumb.clone());
        Ok(crumb)
    }

    // crumb refusé ou cookie expiré : le prochain appel en redemande un
    async fn forget_crumb(&self) {
        *self.crumb.lock().await = None;
    }

    /// `{base}/v10/finance/quoteSummary/{symbol}`, symbole encodé comme un segment
    fn quote_url(&self, symbol: &str) -> Result<Url, MarketDataError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| MarketDataError::Url(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| MarketDataError::Url(self.base_url.clone()))?
            .pop_if_empty()
            .extend(["v10", "finance", "quoteSummary"])
            .push(symbol);
        Ok(url)
    }
}

fn rejects_session(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

#[async_trait]
impl MarketData for YahooFinanceClient {
    async fn fetch_metrics(&self, symbol: &str) -> Result<Metrics, MarketDataError> {
        let url = self.quote_url(symbol)?;
        let crumb = self.crumb().await?;

        let response = self
            .client
            .get(url)
            .query(&[("modules", MODULES), ("crumb", crumb.as_str())])
            .send()
            .await?;

        let status = response.status();
        if rejects_session(status) {
            self.forget_crumb().await;
            return Err(MarketDataError::Status(status.as_u16()));
        }

        let body: QuoteSummaryResponse = match response.json().await {
            Ok(body) => body,
            Err(_) if !status.is_success() => return Err(MarketDataError::Status(status.as_u16())),
            Err(e) => return Err(e.into()),
        };

        let metrics = body.into_metrics(symbol)?;

        if !status.is_success() {
            return Err(MarketDataError::Status(status.as_u16()));
        }

        Ok(metrics)
    }
}

// Format de réponse : {"quoteSummary": {"result": [...], "error": null}}
// Chaque valeur est un objet {"raw": 1.23, "fmt": "1.23"}, ou {} si absente.

#[derive(Debug, Deserialize)]
struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummary,
}

#[derive(Debug, Deserialize)]
struct QuoteSummary {
    result: Option<Vec<QuoteResult>>,
    error: Option<ProviderError>,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteResult {
    #[serde(default)]
    summary_detail: SummaryDetail,
    #[serde(default)]
    default_key_statistics: KeyStatistics,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDetail {
    previous_close: Option<RawValue>,
    fifty_day_average: Option<RawValue>,
    two_hundred_day_average: Option<RawValue>,
    dividend_yield: Option<RawValue>,
    #[serde(rename = "forwardPE")]
    forward_pe: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyStatistics {
    forward_eps: Option<RawValue>,
    #[serde(rename = "forwardPE")]
    forward_pe: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
struct RawValue {
    raw: Option<f64>,
}

fn raw(value: Option<RawValue>) -> Option<f64> {
    value.and_then(|v| v.raw)
}

impl QuoteSummaryResponse {
    fn into_metrics(self, symbol: &str) -> Result<Metrics, MarketDataError> {
        if let Some(error) = self.quote_summary.error {
            let message = error
                .description
                .or(error.code)
                .unwrap_or_else(|| "unknown error".to_string());
            return Err(MarketDataError::Provider(message));
        }

        let result = self
            .quote_summary
            .result
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| MarketDataError::Empty(symbol.to_string()))?;

        let detail = result.summary_detail;
        let stats = result.default_key_statistics;

        Ok(Metrics {
            two_hundred_day_average: raw(detail.two_hundred_day_average),
            fifty_day_average: raw(detail.fifty_day_average),
            previous_close: raw(detail.previous_close),
            forward_pe: raw(detail.forward_pe).or(raw(stats.forward_pe)),
            forward_eps: raw(stats.forward_eps),
            dividend_yield: raw(detail.dividend_yield),
        })
    }
}
