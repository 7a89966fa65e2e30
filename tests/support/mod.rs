#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ferrosnap_core::data_source::{BarsRequest, DataSource, SourceError};
use ferrosnap_core::http_client::{HttpClient, HttpError, HttpRequest, HttpResponse};
use ferrosnap_core::{Bar, BarSeries, Interval, ProviderId, ProviderPolicy, Symbol, UtcDateTime};

pub const JAN_1_2024: i64 = 1_704_067_200;
pub const DAY: i64 = 86_400;

/// HTTP client answering by URL fragment and recording every request.
#[derive(Default)]
pub struct ScriptedHttpClient {
    routes: Vec<(String, Result<HttpResponse, HttpError>)>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// First registered fragment contained in the URL wins.
    pub fn respond_when(
        mut self,
        url_fragment: &str,
        response: Result<HttpResponse, HttpError>,
    ) -> Self {
        self.routes.push((url_fragment.to_owned(), response));
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let response = self
            .routes
            .iter()
            .find(|(fragment, _)| request.url.contains(fragment.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| Err(HttpError::new(format!("no scripted response for {}", request.url))));
        self.requests.lock().expect("requests lock").push(request);
        Box::pin(async move { response })
    }
}

/// In-memory source replaying scripted outcomes; the last one repeats.
pub struct StaticSource {
    id: ProviderId,
    interval: Interval,
    outcomes: Mutex<VecDeque<Result<BarSeries, SourceError>>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    lookbacks: Mutex<Vec<usize>>,
}

impl StaticSource {
    pub fn new(id: ProviderId, outcomes: Vec<Result<BarSeries, SourceError>>) -> Arc<Self> {
        Self::build(id, outcomes, None)
    }

    /// Sleeps for `delay` before answering.
    pub fn slow(
        id: ProviderId,
        delay: Duration,
        outcome: Result<BarSeries, SourceError>,
    ) -> Arc<Self> {
        Self::build(id, vec![outcome], Some(delay))
    }

    fn build(
        id: ProviderId,
        outcomes: Vec<Result<BarSeries, SourceError>>,
        delay: Option<Duration>,
    ) -> Arc<Self> {
        let interval = match id {
            ProviderId::YahooIntraday => Interval::FiveMinutes,
            ProviderId::AlphavantageDaily | ProviderId::YahooDaily => Interval::OneDay,
        };
        Arc::new(Self {
            id,
            interval,
            outcomes: Mutex::new(outcomes.into()),
            delay,
            calls: AtomicUsize::new(0),
            lookbacks: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn lookbacks(&self) -> Vec<usize> {
        self.lookbacks.lock().expect("lookbacks lock").clone()
    }

    fn next_outcome(&self) -> Result<BarSeries, SourceError> {
        let mut outcomes = self.outcomes.lock().expect("outcomes lock");
        if outcomes.len() > 1 {
            outcomes.pop_front().expect("non-empty outcomes")
        } else {
            outcomes
                .front()
                .cloned()
                .unwrap_or_else(|| Err(SourceError::empty_series("no scripted outcome")))
        }
    }
}

impl DataSource for StaticSource {
    fn id(&self) -> ProviderId {
        self.id
    }

    fn interval(&self) -> Interval {
        self.interval
    }

    fn fetch<'a>(
        &'a self,
        req: BarsRequest,
    ) -> Pin<Box<dyn Future<Output = Result<BarSeries, SourceError>> + Send + 'a>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.lookbacks
            .lock()
            .expect("lookbacks lock")
            .push(req.lookback);
        let outcome = self.next_outcome();
        let delay = self.delay;
        Box::pin(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            outcome
        })
    }
}

pub fn as_chain(sources: &[&Arc<StaticSource>]) -> Vec<(Arc<dyn DataSource>, ProviderPolicy)> {
    sources
        .iter()
        .map(|source| {
            let adapter: Arc<dyn DataSource> = Arc::clone(*source) as Arc<dyn DataSource>;
            let policy = ProviderPolicy::default_for(adapter.id());
            (adapter, policy)
        })
        .collect()
}

pub fn symbol(raw: &str) -> Symbol {
    Symbol::parse(raw).expect("valid symbol")
}

pub fn bars_request(raw_symbol: &str, lookback: usize) -> BarsRequest {
    BarsRequest {
        symbol: symbol(raw_symbol),
        lookback,
    }
}

/// Daily bars with `high = close + 1`, `low = close - 1` and `open = close`.
pub fn daily_series(raw_symbol: &str, closes: &[f64], volume: u64) -> BarSeries {
    let bars = closes
        .iter()
        .enumerate()
        .map(|(index, &close)| {
            let ts = UtcDateTime::from_unix_timestamp(JAN_1_2024 + index as i64 * DAY)
                .expect("valid ts");
            Bar::new(ts, close, close + 1.0, close - 1.0, close, volume).expect("valid bar")
        })
        .collect();
    BarSeries::new(symbol(raw_symbol), Interval::OneDay, bars).expect("valid series")
}

/// Closes 101..=120, each bar spanning one point either side of its close.
pub fn ascending_twenty(raw_symbol: &str) -> BarSeries {
    let closes = (101..=120).map(f64::from).collect::<Vec<_>>();
    daily_series(raw_symbol, &closes, 1_000)
}

/// Yahoo chart payload with `high = close + 1`, `low = close - 1`.
pub fn yahoo_chart_body(timestamps: &[i64], closes: &[f64], volume: u64) -> String {
    let list = |values: Vec<String>| values.join(",");
    let ts = list(timestamps.iter().map(i64::to_string).collect());
    let close = list(closes.iter().map(f64::to_string).collect());
    let high = list(closes.iter().map(|c| (c + 1.0).to_string()).collect());
    let low = list(closes.iter().map(|c| (c - 1.0).to_string()).collect());
    let volume = list(closes.iter().map(|_| volume.to_string()).collect());
    format!(
        r#"{{"chart":{{"result":[{{"timestamp":[{ts}],"indicators":{{"quote":[{{"open":[{close}],"high":[{high}],"low":[{low}],"close":[{close}],"volume":[{volume}]}}]}}}}],"error":null}}}}"#
    )
}
