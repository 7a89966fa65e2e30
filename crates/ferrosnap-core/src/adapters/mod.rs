//! Upstream provider adapters.
//!
//! | Adapter | Identifier(s) | Granularity | Auth |
//! |---------|---------------|-------------|------|
//! | [`YahooAdapter`] | `yahoo_intraday`, `yahoo_daily` | 5m, 1d | none |
//! | [`AlphaVantageAdapter`] | `alphavantage_daily` | 1d | API key |
//!
//! Failure classification shared by both adapters lives here so the two
//! cannot drift apart.

mod alphavantage;
mod yahoo;

pub use alphavantage::AlphaVantageAdapter;
pub use yahoo::YahooAdapter;

use crate::data_source::SourceError;
use crate::http_client::{HttpError, HttpResponse};
use crate::ProviderId;

/// Maps a transport failure (no HTTP status) to a source error.
pub(crate) fn transport_error(provider: ProviderId, error: &HttpError) -> SourceError {
    if error.timed_out() {
        SourceError::network(format!("{provider} request timed out: {}", error.message()))
    } else {
        SourceError::network(format!("{provider} transport error: {}", error.message()))
    }
}

/// Maps a non-2xx response to a source error.
pub(crate) fn status_error(provider: ProviderId, response: &HttpResponse) -> SourceError {
    match response.status {
        429 => SourceError::rate_limited(format!("{provider} returned HTTP 429")),
        404 => SourceError::empty_series(format!("{provider} has no data for the symbol (HTTP 404)")),
        408 | 500..=599 => {
            SourceError::network(format!("{provider} upstream returned HTTP {}", response.status))
        }
        status => SourceError::malformed_payload(format!(
            "{provider} returned unexpected HTTP {status}"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::SourceErrorKind;

    #[test]
    fn classifies_statuses() {
        let cases = [
            (429, SourceErrorKind::RateLimited),
            (404, SourceErrorKind::EmptySeries),
            (408, SourceErrorKind::Network),
            (502, SourceErrorKind::Network),
            (401, SourceErrorKind::MalformedPayload),
            (302, SourceErrorKind::MalformedPayload),
        ];

        for (status, expected) in cases {
            let error = status_error(ProviderId::YahooDaily, &HttpResponse::new(status, ""));
            assert_eq!(error.kind(), expected, "status {status}");
        }
    }

    #[test]
    fn timeouts_are_network_errors() {
        let error = transport_error(ProviderId::YahooIntraday, &HttpError::timeout("deadline"));
        assert_eq!(error.kind(), SourceErrorKind::Network);
        assert!(error.message().contains("timed out"));
    }
}
