use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::adapters::{AlphaVantageAdapter, YahooAdapter};
use crate::config::Settings;
use crate::cooldown::EligibilityClock;
use crate::data_source::{BarsRequest, DataSource, SourceError, SourceErrorKind};
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::provider_policy::ProviderPolicy;
use crate::throttling::QuotaGuard;
use crate::{BarSeries, ConfigError, Interval, ProviderId, Symbol, ValidationError};

/// Which adapter satisfied a request and where it sat in the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Provenance {
    pub source: ProviderId,
    /// Zero-based position in the fallback chain (0 = primary).
    pub attempt_index: usize,
    pub interval: Interval,
}

/// One adapter that did not produce a series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptFailure {
    pub source: ProviderId,
    pub attempt_index: usize,
    pub error: SourceError,
    /// True when the adapter was not called because it was cooling down.
    pub skipped: bool,
}

/// Successful routed call.
#[derive(Debug, Clone)]
pub struct RouteSuccess {
    pub data: BarSeries,
    pub provenance: Provenance,
    /// Earlier adapters that failed, in chain order.
    pub failures: Vec<AttemptFailure>,
    pub warnings: Vec<String>,
    pub latency_ms: u64,
}

/// Failed routed call after exhausting the chain.
#[derive(Debug, Clone)]
pub struct RouteFailure {
    pub symbol: Symbol,
    /// One entry per adapter, in chain order.
    pub failures: Vec<AttemptFailure>,
    pub latency_ms: u64,
}

pub type RouteResult = Result<RouteSuccess, RouteFailure>;

/// Per-request routing input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRequest {
    pub symbol: Symbol,
    /// Replaces every adapter's policy lookback for this request only.
    pub lookback_override: Option<usize>,
}

impl RouteRequest {
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            lookback_override: None,
        }
    }

    pub fn with_lookback(mut self, lookback: usize) -> Result<Self, ValidationError> {
        if lookback == 0 {
            return Err(ValidationError::InvalidLookback);
        }
        self.lookback_override = Some(lookback);
        Ok(self)
    }
}

/// Adapter state reported by the `sources` command.
#[derive(Debug, Clone, Serialize)]
pub struct SourceSnapshot {
    pub id: ProviderId,
    pub position: usize,
    pub interval: Interval,
    pub policy: ProviderPolicy,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooldown_remaining_ms: Option<u64>,
}

struct RoutedSource {
    adapter: Arc<dyn DataSource>,
    policy: ProviderPolicy,
}

/// Ordered fallback chain with a shared per-adapter eligibility clock.
pub struct SourceRouter {
    chain: Vec<RoutedSource>,
    clock: Arc<EligibilityClock>,
}

impl SourceRouter {
    /// Builds a router over `chain`, in priority order.
    ///
    /// # Errors
    ///
    /// Rejects an empty chain, a duplicated adapter, or a zero policy
    /// lookback.
    pub fn new(chain: Vec<(Arc<dyn DataSource>, ProviderPolicy)>) -> Result<Self, ConfigError> {
        if chain.is_empty() {
            return Err(ConfigError::EmptyChain);
        }

        let mut seen = HashSet::new();
        let mut routed = Vec::with_capacity(chain.len());
        for (adapter, policy) in chain {
            let id = adapter.id();
            if !seen.insert(id) {
                return Err(ConfigError::DuplicateSource(id));
            }
            if policy.lookback == 0 {
                return Err(ValidationError::InvalidLookback.into());
            }
            routed.push(RoutedSource { adapter, policy });
        }

        Ok(Self {
            chain: routed,
            clock: Arc::new(EligibilityClock::new()),
        })
    }

    /// Shares an eligibility clock with other routers over the same adapters.
    pub fn with_clock(mut self, clock: Arc<EligibilityClock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn clock(&self) -> &Arc<EligibilityClock> {
        &self.clock
    }

    pub fn source_chain(&self) -> Vec<ProviderId> {
        self.chain.iter().map(|entry| entry.adapter.id()).collect()
    }

    pub fn sources(&self) -> Vec<SourceSnapshot> {
        self.chain
            .iter()
            .enumerate()
            .map(|(position, entry)| {
                let id = entry.adapter.id();
                let remaining = self.clock.remaining(id);
                SourceSnapshot {
                    id,
                    position,
                    interval: entry.adapter.interval(),
                    policy: entry.policy.clone(),
                    status: if remaining.is_some() {
                        "cooling_down"
                    } else {
                        "eligible"
                    },
                    cooldown_remaining_ms: remaining.map(duration_ms),
                }
            })
            .collect()
    }

    /// Walks the chain in order and returns the first non-empty series.
    ///
    /// Adapters are called one at a time. An adapter still cooling down from
    /// an earlier rate limit is skipped without being called. Dropping the
    /// returned future cancels the in-flight call; the eligibility clock is
    /// only updated after a call has returned.
    pub async fn route_bars(&self, request: &RouteRequest) -> RouteResult {
        let started = Instant::now();
        let symbol = &request.symbol;
        let mut failures = Vec::new();

        for (attempt_index, entry) in self.chain.iter().enumerate() {
            let source = entry.adapter.id();

            if let Some(wait) = self.clock.remaining(source) {
                debug!(%source, attempt_index, wait_ms = duration_ms(wait), "skipping source in cooldown");
                failures.push(AttemptFailure {
                    source,
                    attempt_index,
                    error: SourceError::rate_limited_for(
                        format!(
                            "{source} is cooling down; eligible again in {:.1}s",
                            wait.as_secs_f64()
                        ),
                        wait,
                    ),
                    skipped: true,
                });
                continue;
            }

            let lookback = request.lookback_override.unwrap_or(entry.policy.lookback);
            let bars_request = BarsRequest {
                symbol: symbol.clone(),
                lookback,
            };

            debug!(%source, attempt_index, %symbol, lookback, "requesting bars");
            let outcome =
                match tokio::time::timeout(entry.policy.timeout, entry.adapter.fetch(bars_request))
                    .await
                {
                    Ok(outcome) => outcome,
                    Err(_) => Err(SourceError::network(format!(
                        "{source} did not respond within {}ms",
                        duration_ms(entry.policy.timeout)
                    ))),
                };

            match outcome {
                Ok(data) => {
                    let mut warnings = Vec::new();
                    if !failures.is_empty() {
                        info!(
                            %source,
                            attempt_index,
                            %symbol,
                            failed = failures.len(),
                            "fallback source satisfied request"
                        );
                        warnings.push(format!(
                            "source fallback succeeded with '{source}' after {} failed attempt(s)",
                            failures.len()
                        ));
                    }

                    return Ok(RouteSuccess {
                        provenance: Provenance {
                            source,
                            attempt_index,
                            interval: data.interval(),
                        },
                        data,
                        failures,
                        warnings,
                        latency_ms: elapsed_ms(started),
                    });
                }
                Err(error) => {
                    if error.kind() == SourceErrorKind::RateLimited {
                        let cooldown = error
                            .retry_after()
                            .map_or(entry.policy.cooldown, |hint| hint.max(entry.policy.cooldown));
                        self.clock.defer(source, cooldown);
                        warn!(%source, cooldown_ms = duration_ms(cooldown), "source rate limited; deferring");
                    }
                    warn!(%source, attempt_index, %symbol, code = error.code(), %error, "source attempt failed");
                    failures.push(AttemptFailure {
                        source,
                        attempt_index,
                        error,
                        skipped: false,
                    });
                }
            }
        }

        warn!(%symbol, attempts = failures.len(), "all sources failed");
        Err(RouteFailure {
            symbol: symbol.clone(),
            failures,
            latency_ms: elapsed_ms(started),
        })
    }
}

/// Builder for a [`SourceRouter`] backed by real HTTP clients.
///
/// Adapters are created in the order of [`Settings::chain`]. An adapter
/// that needs an API key is left out, with a warning, when no key is
/// configured.
pub struct SourceRouterBuilder {
    settings: Settings,
    http_client: Option<Arc<dyn HttpClient>>,
    clock: Option<Arc<EligibilityClock>>,
}

impl SourceRouterBuilder {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            http_client: None,
            clock: None,
        }
    }

    /// Overrides the transport shared by every adapter.
    pub fn with_http_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(http_client);
        self
    }

    pub fn with_clock(mut self, clock: Arc<EligibilityClock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> Result<SourceRouter, ConfigError> {
        let http_client = self
            .http_client
            .unwrap_or_else(|| Arc::new(ReqwestHttpClient::new()));
        let timeout_ms = duration_ms(self.settings.timeout);

        let mut chain: Vec<(Arc<dyn DataSource>, ProviderPolicy)> = Vec::new();
        for &provider in &self.settings.chain {
            let policy = ProviderPolicy::default_for(provider)
                .with_timeout(self.settings.timeout)
                .with_cooldown(self.settings.rate_limit_cooldown);

            let adapter: Arc<dyn DataSource> = match provider {
                ProviderId::YahooIntraday => Arc::new(
                    YahooAdapter::intraday(Arc::clone(&http_client)).with_timeout_ms(timeout_ms),
                ),
                ProviderId::YahooDaily => Arc::new(
                    YahooAdapter::daily(Arc::clone(&http_client)).with_timeout_ms(timeout_ms),
                ),
                ProviderId::AlphavantageDaily => {
                    let Some(key) = &self.settings.alphavantage_api_key else {
                        warn!(source = %provider, "no API key configured; leaving source out of the chain");
                        continue;
                    };
                    Arc::new(
                        AlphaVantageAdapter::new(Arc::clone(&http_client), key.clone())
                            .with_quota(policy.quota.as_ref().map(QuotaGuard::from_policy))
                            .with_timeout_ms(timeout_ms),
                    )
                }
            };
            chain.push((adapter, policy));
        }

        let router = SourceRouter::new(chain)?;
        Ok(match self.clock {
            Some(clock) => router.with_clock(clock),
            None => router,
        })
    }
}

fn duration_ms(value: Duration) -> u64 {
    value.as_millis().min(u128::from(u64::MAX)) as u64
}

fn elapsed_ms(started: Instant) -> u64 {
    duration_ms(started.elapsed())
}
