//! Data source trait and adapter error taxonomy.
//!
//! Every upstream provider is wrapped in an adapter implementing
//! [`DataSource`]. An adapter owns its response-shape normalization and
//! never panics or leaks transport errors: each failure is folded into one
//! of the four [`SourceErrorKind`] variants so the router can decide how to
//! fall back.
//!
//! | Kind | Typical cause | Router reaction |
//! |------|---------------|-----------------|
//! | `Network` | transport failure, timeout, 5xx | try next source |
//! | `RateLimited` | HTTP 429, quota note, local quota | defer source, try next |
//! | `EmptySeries` | unknown symbol, no bars in window | try next source |
//! | `MalformedPayload` | unexpected status or shape | try next source |

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::{BarSeries, Interval, ProviderId, Symbol};

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Network,
    RateLimited,
    EmptySeries,
    MalformedPayload,
}

/// Structured source error used by router fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retry_after: Option<Duration>,
}

impl SourceError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::with_kind(SourceErrorKind::Network, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::with_kind(SourceErrorKind::RateLimited, message)
    }

    /// Rate limit carrying the upstream's (or local quota's) retry hint.
    pub fn rate_limited_for(message: impl Into<String>, retry_after: Duration) -> Self {
        Self {
            retry_after: Some(retry_after),
            ..Self::rate_limited(message)
        }
    }

    pub fn empty_series(message: impl Into<String>) -> Self {
        Self::with_kind(SourceErrorKind::EmptySeries, message)
    }

    pub fn malformed_payload(message: impl Into<String>) -> Self {
        Self::with_kind(SourceErrorKind::MalformedPayload, message)
    }

    fn with_kind(kind: SourceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            retry_after: None,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retry_after(&self) -> Option<Duration> {
        self.retry_after
    }

    /// Whether the same request may succeed later against this source.
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            SourceErrorKind::Network | SourceErrorKind::RateLimited
        )
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Network => "source.network",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::EmptySeries => "source.empty_series",
            SourceErrorKind::MalformedPayload => "source.malformed_payload",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Request payload for a bar fetch: which symbol, and how many of the most
/// recent bars the caller wants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarsRequest {
    pub symbol: Symbol,
    pub lookback: usize,
}

/// Source adapter contract.
///
/// Implementations must be `Send + Sync`; the router shares them behind
/// `Arc<dyn DataSource>` across concurrent requests.
pub trait DataSource: Send + Sync {
    /// Returns the unique provider identifier.
    fn id(&self) -> ProviderId;

    /// Granularity of the bars this adapter returns.
    fn interval(&self) -> Interval;

    /// Fetches up to `req.lookback` of the most recent bars.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the upstream is unreachable, throttled,
    /// has no bars for the symbol, or answers with an unexpected shape. A
    /// successful result is never empty.
    fn fetch<'a>(
        &'a self,
        req: BarsRequest,
    ) -> Pin<Box<dyn Future<Output = Result<BarSeries, SourceError>> + Send + 'a>>;
}
