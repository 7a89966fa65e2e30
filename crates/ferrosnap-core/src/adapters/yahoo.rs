use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use super::{status_error, transport_error};
use crate::data_source::{BarsRequest, DataSource, SourceError};
use crate::http_client::{HttpClient, HttpRequest};
use crate::{Bar, BarSeries, Interval, ProviderId, Symbol, UtcDateTime};

const CHART_ENDPOINT: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// `(max sessions covered, range token)`, narrowest first.
const CHART_RANGES: [(usize, &str); 9] = [
    (1, "1d"),
    (5, "5d"),
    (21, "1mo"),
    (63, "3mo"),
    (126, "6mo"),
    (252, "1y"),
    (504, "2y"),
    (1_260, "5y"),
    (usize::MAX, "max"),
];

/// Yahoo Finance chart adapter.
///
/// The same upstream serves every granularity, so one type backs both the
/// intraday and the daily slot of the fallback chain.
#[derive(Clone)]
pub struct YahooAdapter {
    provider_id: ProviderId,
    interval: Interval,
    http_client: Arc<dyn HttpClient>,
    timeout_ms: u64,
}

impl YahooAdapter {
    /// Five-minute bars, registered as `yahoo_intraday`.
    pub fn intraday(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            provider_id: ProviderId::YahooIntraday,
            interval: Interval::FiveMinutes,
            http_client,
            timeout_ms: 5_000,
        }
    }

    /// Daily bars, registered as `yahoo_daily`.
    pub fn daily(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            provider_id: ProviderId::YahooDaily,
            interval: Interval::OneDay,
            ..Self::intraday(http_client)
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn chart_url(&self, req: &BarsRequest) -> String {
        format!(
            "{CHART_ENDPOINT}/{}?range={}&interval={}&includePrePost=false",
            urlencoding::encode(req.symbol.as_str()),
            chart_range(self.interval, req.lookback),
            self.interval.as_str(),
        )
    }

    async fn fetch_chart(&self, req: BarsRequest) -> Result<BarSeries, SourceError> {
        let request = HttpRequest::get(self.chart_url(&req))
            .with_header("referer", "https://finance.yahoo.com/")
            .with_timeout_ms(self.timeout_ms);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|error| transport_error(self.provider_id, &error))?;

        if !response.is_success() {
            return Err(status_error(self.provider_id, &response));
        }

        normalize_chart(
            self.provider_id,
            &req.symbol,
            self.interval,
            req.lookback,
            &response.body,
        )
    }
}

impl DataSource for YahooAdapter {
    fn id(&self) -> ProviderId {
        self.provider_id
    }

    fn interval(&self) -> Interval {
        self.interval
    }

    fn fetch<'a>(
        &'a self,
        req: BarsRequest,
    ) -> Pin<Box<dyn Future<Output = Result<BarSeries, SourceError>> + Send + 'a>> {
        Box::pin(self.fetch_chart(req))
    }
}

/// Smallest chart range that covers `lookback` bars, capped at the widest
/// range Yahoo serves for the interval.
fn chart_range(interval: Interval, lookback: usize) -> &'static str {
    let sessions = lookback.div_ceil(interval.bars_per_session()).max(1);
    let widest = match interval {
        Interval::FiveMinutes => 3,
        Interval::OneDay => CHART_RANGES.len(),
    };

    let allowed = &CHART_RANGES[..widest];
    allowed
        .iter()
        .find(|(covered, _)| sessions <= *covered)
        .or(allowed.last())
        .map_or("max", |(_, range)| *range)
}

fn normalize_chart(
    provider: ProviderId,
    symbol: &Symbol,
    interval: Interval,
    lookback: usize,
    body: &str,
) -> Result<BarSeries, SourceError> {
    let envelope: ChartEnvelope = serde_json::from_str(body).map_err(|e| {
        SourceError::malformed_payload(format!("failed to parse {provider} chart: {e}"))
    })?;

    if let Some(error) = envelope.chart.error {
        let detail = error.description.unwrap_or_default();
        return Err(if error.code.eq_ignore_ascii_case("Not Found") {
            SourceError::empty_series(format!("{provider} has no data for {symbol}: {detail}"))
        } else {
            SourceError::malformed_payload(format!(
                "{provider} chart error '{}': {detail}",
                error.code
            ))
        });
    }

    let Some(result) = envelope.chart.result.and_then(|results| results.into_iter().next())
    else {
        return Err(SourceError::empty_series(format!(
            "{provider} returned no chart result for {symbol}"
        )));
    };

    let timestamps = result.timestamp.unwrap_or_default();
    let Some(quote) = result.indicators.quote.into_iter().next() else {
        return Err(SourceError::empty_series(format!(
            "{provider} returned no quote arrays for {symbol}"
        )));
    };

    let mut by_time = BTreeMap::new();
    let mut skipped = 0_usize;
    for (index, &seconds) in timestamps.iter().enumerate() {
        let prices = (
            value_at(&quote.open, index),
            value_at(&quote.high, index),
            value_at(&quote.low, index),
            value_at(&quote.close, index),
        );
        let (Some(open), Some(high), Some(low), Some(close)) = prices else {
            skipped += 1;
            continue;
        };
        let volume = value_at(&quote.volume, index).map_or(0, volume_from_f64);

        let bar = UtcDateTime::from_unix_timestamp(seconds)
            .and_then(|ts| Bar::new(ts, open, high, low, close, volume));
        match bar {
            Ok(bar) => {
                by_time.insert(seconds, bar);
            }
            Err(error) => {
                skipped += 1;
                debug!(source = %provider, %symbol, index, %error, "dropping invalid bar");
            }
        }
    }

    if skipped > 0 {
        debug!(source = %provider, %symbol, skipped, "skipped incomplete chart rows");
    }

    let mut bars = by_time.into_values().collect::<Vec<_>>();
    if bars.is_empty() {
        return Err(SourceError::empty_series(format!(
            "{provider} returned no usable bars for {symbol}"
        )));
    }
    if bars.len() > lookback {
        bars.drain(..bars.len() - lookback);
    }

    BarSeries::new(symbol.clone(), interval, bars)
        .map_err(|e| SourceError::malformed_payload(format!("{provider} series invalid: {e}")))
}

fn value_at(values: &[Option<f64>], index: usize) -> Option<f64> {
    values.get(index).copied().flatten()
}

fn volume_from_f64(volume: f64) -> u64 {
    if volume.is_finite() && volume > 0.0 {
        volume as u64
    } else {
        0
    }
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}
