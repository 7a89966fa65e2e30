//! Request-level entry point: symbol in, [`MarketSnapshot`] or a status-coded
//! [`SnapshotError`] out.

use thiserror::Error;
use tracing::{info, warn};

use crate::indicators::IndicatorConfig;
use crate::routing::{AttemptFailure, RouteRequest, SourceRouter};
use crate::snapshot::{assemble, MarketSnapshot};
use crate::{Symbol, ValidationError};

/// Per-request knobs layered over the service defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotOptions {
    /// RSI window for this request; the service default when `None`.
    pub rsi_lookback: Option<usize>,
    /// Bars requested from every adapter; each policy's own lookback when `None`.
    pub lookback_override: Option<usize>,
}

/// Validates the raw symbol of a request before any source is consulted.
pub fn parse_request_symbol(raw_symbol: &str) -> Result<Symbol, SnapshotError> {
    if raw_symbol.trim().is_empty() {
        return Err(SnapshotError::MissingSymbol);
    }

    Symbol::parse(raw_symbol).map_err(|source| SnapshotError::InvalidSymbol {
        raw: raw_symbol.trim().to_owned(),
        source,
    })
}

/// Request-level failure with a suggested HTTP status.
#[derive(Debug, Clone, Error)]
pub enum SnapshotError {
    #[error("Symbol parameter is required.")]
    MissingSymbol,
    #[error("Invalid symbol '{raw}': {source}")]
    InvalidSymbol {
        raw: String,
        source: ValidationError,
    },
    #[error("Invalid lookback: {0}")]
    InvalidLookback(ValidationError),
    #[error("No price data found for {symbol}.")]
    NoData {
        symbol: Symbol,
        failures: Vec<AttemptFailure>,
    },
    #[error("Failed to get ticker '{symbol}' reason: {detail}")]
    Internal { symbol: String, detail: String },
}

impl SnapshotError {
    pub fn internal(symbol: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Internal {
            symbol: symbol.into(),
            detail: detail.into(),
        }
    }

    pub const fn status(&self) -> u16 {
        match self {
            Self::MissingSymbol | Self::InvalidSymbol { .. } | Self::InvalidLookback(_) => 400,
            Self::NoData { .. } => 404,
            Self::Internal { .. } => 500,
        }
    }

    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingSymbol => "request.missing_symbol",
            Self::InvalidSymbol { .. } => "request.invalid_symbol",
            Self::InvalidLookback(_) => "request.invalid_lookback",
            Self::NoData { .. } => "snapshot.no_data",
            Self::Internal { .. } => "snapshot.internal",
        }
    }

    /// Per-adapter failures behind a `NoData` error.
    pub fn failures(&self) -> &[AttemptFailure] {
        match self {
            Self::NoData { failures, .. } => failures,
            _ => &[],
        }
    }
}

/// Successful snapshot plus routing diagnostics.
#[derive(Debug, Clone)]
pub struct SnapshotReport {
    pub snapshot: MarketSnapshot,
    pub warnings: Vec<String>,
    /// Adapters that failed before one succeeded.
    pub failures: Vec<AttemptFailure>,
    pub latency_ms: u64,
}

/// Fetches bars through the fallback chain and assembles a snapshot.
pub struct SnapshotService {
    router: SourceRouter,
    indicators: IndicatorConfig,
}

impl SnapshotService {
    pub fn new(router: SourceRouter, indicators: IndicatorConfig) -> Self {
        Self { router, indicators }
    }

    pub fn router(&self) -> &SourceRouter {
        &self.router
    }

    pub const fn indicators(&self) -> IndicatorConfig {
        self.indicators
    }

    pub async fn snapshot(
        &self,
        raw_symbol: &str,
        options: SnapshotOptions,
    ) -> Result<SnapshotReport, SnapshotError> {
        let symbol = parse_request_symbol(raw_symbol)?;

        let mut request = RouteRequest::new(symbol.clone());
        if let Some(lookback) = options.lookback_override {
            request = request
                .with_lookback(lookback)
                .map_err(SnapshotError::InvalidLookback)?;
        }

        let indicators = options
            .rsi_lookback
            .map_or(self.indicators, |lookback| {
                self.indicators.with_rsi_lookback(lookback)
            });

        let routed = match self.router.route_bars(&request).await {
            Ok(routed) => routed,
            Err(failure) => {
                warn!(%symbol, attempts = failure.failures.len(), "no source produced bars");
                return Err(SnapshotError::NoData {
                    symbol,
                    failures: failure.failures,
                });
            }
        };

        if routed.data.symbol() != &symbol {
            return Err(SnapshotError::internal(
                symbol.as_str(),
                format!(
                    "{} returned bars for '{}'",
                    routed.provenance.source,
                    routed.data.symbol()
                ),
            ));
        }

        let snapshot = assemble(&routed.data, routed.provenance, &indicators);
        info!(
            %symbol,
            source = %routed.provenance.source,
            attempt_index = routed.provenance.attempt_index,
            bars = snapshot.bar_count(),
            latency_ms = routed.latency_ms,
            "snapshot assembled"
        );

        Ok(SnapshotReport {
            snapshot,
            warnings: routed.warnings,
            failures: routed.failures,
            latency_ms: routed.latency_ms,
        })
    }
}
