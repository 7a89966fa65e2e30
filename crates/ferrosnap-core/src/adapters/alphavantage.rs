use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use super::{status_error, transport_error};
use crate::data_source::{BarsRequest, DataSource, SourceError};
use crate::http_client::{HttpClient, HttpRequest};
use crate::provider_policy::ProviderPolicy;
use crate::throttling::QuotaGuard;
use crate::{Bar, BarSeries, Interval, ProviderId, Symbol, UtcDateTime};

const QUERY_ENDPOINT: &str = "https://www.alphavantage.co/query";
/// `outputsize=compact` returns the latest 100 sessions.
const COMPACT_SIZE: usize = 100;
const PROVIDER: ProviderId = ProviderId::AlphavantageDaily;

/// Alpha Vantage `TIME_SERIES_DAILY` adapter.
///
/// Enforces the free-tier quota locally so an exhausted budget is reported
/// as a rate limit without spending a network round trip.
#[derive(Clone)]
pub struct AlphaVantageAdapter {
    http_client: Arc<dyn HttpClient>,
    api_key: String,
    timeout_ms: u64,
    quota: Option<QuotaGuard>,
}

impl AlphaVantageAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>, api_key: impl Into<String>) -> Self {
        let quota = ProviderPolicy::alphavantage_daily_default()
            .quota
            .as_ref()
            .map(QuotaGuard::from_policy);
        Self {
            http_client,
            api_key: api_key.into(),
            timeout_ms: 5_000,
            quota,
        }
    }

    /// Replaces the local quota; `None` disables local throttling.
    pub fn with_quota(mut self, quota: Option<QuotaGuard>) -> Self {
        self.quota = quota;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn series_url(&self, req: &BarsRequest) -> String {
        let output_size = if req.lookback <= COMPACT_SIZE {
            "compact"
        } else {
            "full"
        };
        format!(
            "{QUERY_ENDPOINT}?function=TIME_SERIES_DAILY&symbol={}&outputsize={output_size}&apikey={}",
            urlencoding::encode(req.symbol.as_str()),
            urlencoding::encode(&self.api_key),
        )
    }

    async fn fetch_daily(&self, req: BarsRequest) -> Result<BarSeries, SourceError> {
        if let Some(quota) = &self.quota {
            if let Err(wait) = quota.acquire() {
                return Err(SourceError::rate_limited_for(
                    format!(
                        "{PROVIDER} free-tier quota exhausted; retry in {:.2}s",
                        wait.as_secs_f64()
                    ),
                    wait,
                ));
            }
        }

        let request = HttpRequest::get(self.series_url(&req)).with_timeout_ms(self.timeout_ms);
        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|error| transport_error(PROVIDER, &error))?;

        if !response.is_success() {
            return Err(status_error(PROVIDER, &response));
        }

        normalize_daily(&req.symbol, req.lookback, &response.body)
    }
}

impl DataSource for AlphaVantageAdapter {
    fn id(&self) -> ProviderId {
        PROVIDER
    }

    fn interval(&self) -> Interval {
        Interval::OneDay
    }

    fn fetch<'a>(
        &'a self,
        req: BarsRequest,
    ) -> Pin<Box<dyn Future<Output = Result<BarSeries, SourceError>> + Send + 'a>> {
        Box::pin(self.fetch_daily(req))
    }
}

fn normalize_daily(symbol: &Symbol, lookback: usize, body: &str) -> Result<BarSeries, SourceError> {
    let payload: Map<String, Value> = serde_json::from_str(body).map_err(|e| {
        SourceError::malformed_payload(format!("failed to parse {PROVIDER} payload: {e}"))
    })?;

    if let Some(message) = payload.get("Error Message").and_then(Value::as_str) {
        return Err(SourceError::empty_series(format!(
            "{PROVIDER} rejected {symbol}: {message}"
        )));
    }

    for key in ["Note", "Information"] {
        if let Some(message) = payload.get(key).and_then(Value::as_str) {
            return Err(if mentions_rate_limit(message) {
                SourceError::rate_limited(format!("{PROVIDER} throttled: {message}"))
            } else {
                SourceError::malformed_payload(format!("{PROVIDER} notice: {message}"))
            });
        }
    }

    let series = payload
        .iter()
        .find(|(key, _)| key.starts_with("Time Series"))
        .map(|(_, value)| value)
        .ok_or_else(|| {
            SourceError::malformed_payload(format!("{PROVIDER} payload has no time series"))
        })?;

    // Keys are ISO dates, so map order is chronological.
    let rows = BTreeMap::<String, DailyRow>::deserialize(series).map_err(|e| {
        SourceError::malformed_payload(format!("{PROVIDER} time series has unexpected shape: {e}"))
    })?;

    let mut bars = Vec::with_capacity(rows.len().min(lookback));
    for (date, row) in rows.iter().rev().take(lookback) {
        match row.to_bar(date) {
            Some(bar) => bars.push(bar),
            None => debug!(source = %PROVIDER, %symbol, %date, "dropping unparseable daily row"),
        }
    }
    bars.reverse();

    if bars.is_empty() {
        return Err(SourceError::empty_series(format!(
            "{PROVIDER} returned no usable bars for {symbol}"
        )));
    }

    BarSeries::new(symbol.clone(), Interval::OneDay, bars)
        .map_err(|e| SourceError::malformed_payload(format!("{PROVIDER} series invalid: {e}")))
}

fn mentions_rate_limit(message: &str) -> bool {
    let lowered = message.to_ascii_lowercase();
    ["rate limit", "call frequency", "requests per"]
        .iter()
        .any(|needle| lowered.contains(needle))
}

/// Alpha Vantage encodes every number as a string.
#[derive(Debug, Deserialize)]
struct DailyRow {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
    #[serde(rename = "5. volume", default)]
    volume: Option<String>,
}

impl DailyRow {
    fn to_bar(&self, date: &str) -> Option<Bar> {
        let ts = UtcDateTime::parse_date(date).ok()?;
        let open = parse_price(&self.open)?;
        let high = parse_price(&self.high)?;
        let low = parse_price(&self.low)?;
        let close = parse_price(&self.close)?;
        let volume = self.volume.as_deref().map_or(0, parse_volume);
        Bar::new(ts, open, high, low, close, volume).ok()
    }
}

fn parse_price(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok()
}

fn parse_volume(raw: &str) -> u64 {
    let raw = raw.trim();
    raw.parse::<u64>().unwrap_or_else(|_| {
        raw.parse::<f64>()
            .ok()
            .filter(|value| value.is_finite() && *value > 0.0)
            .map_or(0, |value| value as u64)
    })
}
