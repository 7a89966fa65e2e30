use serde::{Deserialize, Serialize};

use crate::routing::AttemptFailure;
use crate::service::SnapshotError;
use crate::{ProviderId, UtcDateTime, ValidationError};

pub const SCHEMA_VERSION: &str = "v1.0.0";

/// Standard response envelope for all `ferrosnap` machine-readable outputs.
///
/// `data` is `null` when the request failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub meta: EnvelopeMeta,
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<EnvelopeError>,
}

impl<T> Envelope<T> {
    pub fn success(meta: EnvelopeMeta, data: T) -> Self {
        Self {
            meta,
            data: Some(data),
            errors: Vec::new(),
        }
    }

    pub fn failure(meta: EnvelopeMeta, errors: Vec<EnvelopeError>) -> Result<Self, ValidationError> {
        Self::with_errors(meta, None, errors)
    }

    pub fn with_errors(
        meta: EnvelopeMeta,
        data: Option<T>,
        errors: Vec<EnvelopeError>,
    ) -> Result<Self, ValidationError> {
        meta.validate_schema_compliance()?;
        for error in &errors {
            error.validate()?;
        }

        Ok(Self { meta, data, errors })
    }

    pub fn push_error(&mut self, error: EnvelopeError) -> Result<(), ValidationError> {
        error.validate()?;
        self.errors.push(error);
        Ok(())
    }
}

/// Metadata attached to every envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeMeta {
    pub request_id: String,
    pub schema_version: String,
    pub generated_at: UtcDateTime,
    pub source_chain: Vec<ProviderId>,
    pub latency_ms: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl EnvelopeMeta {
    pub fn new(
        request_id: impl Into<String>,
        source_chain: Vec<ProviderId>,
        latency_ms: u64,
    ) -> Result<Self, ValidationError> {
        let meta = Self {
            request_id: request_id.into(),
            schema_version: String::from(SCHEMA_VERSION),
            generated_at: UtcDateTime::now(),
            source_chain,
            latency_ms,
            warnings: Vec::new(),
        };
        meta.validate_schema_compliance()?;
        Ok(meta)
    }

    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn validate_schema_compliance(&self) -> Result<(), ValidationError> {
        if self.request_id.trim().len() < 8 {
            return Err(ValidationError::InvalidRequestId);
        }

        if !is_valid_schema_version(&self.schema_version) {
            return Err(ValidationError::InvalidSchemaVersion {
                value: self.schema_version.clone(),
            });
        }

        if self.source_chain.is_empty() {
            return Err(ValidationError::EmptySourceChain);
        }

        Ok(())
    }
}

/// Structured error payload for failed responses and failed source attempts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ProviderId>,
}

impl EnvelopeError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let error = Self {
            code: code.into(),
            message: message.into(),
            status: None,
            retryable: None,
            source: None,
        };
        error.validate()?;
        Ok(error)
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = Some(retryable);
        self
    }

    pub fn with_source(mut self, source: ProviderId) -> Self {
        self.source = Some(source);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.code.trim().is_empty() {
            return Err(ValidationError::EmptyErrorCode);
        }

        if self.message.trim().is_empty() {
            return Err(ValidationError::EmptyErrorMessage);
        }

        Ok(())
    }
}

impl From<&SnapshotError> for EnvelopeError {
    fn from(error: &SnapshotError) -> Self {
        Self {
            code: error.code().to_owned(),
            message: error.to_string(),
            status: Some(error.status()),
            retryable: None,
            source: None,
        }
    }
}

impl From<&AttemptFailure> for EnvelopeError {
    fn from(failure: &AttemptFailure) -> Self {
        Self {
            code: failure.error.code().to_owned(),
            message: failure.error.message().to_owned(),
            status: None,
            retryable: Some(failure.error.is_retryable()),
            source: Some(failure.source),
        }
    }
}

fn is_valid_schema_version(value: &str) -> bool {
    let Some(version) = value.strip_prefix('v') else {
        return false;
    };

    let mut parts = version.split('.');
    let major = parts.next();
    let minor = parts.next();
    let patch = parts.next();

    if parts.next().is_some() {
        return false;
    }

    [major, minor, patch].iter().all(|part| {
        part.is_some_and(|segment| {
            !segment.is_empty() && segment.chars().all(|ch| ch.is_ascii_digit())
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::SourceError;

    #[test]
    fn validates_meta() {
        let meta = EnvelopeMeta::new("request-12345", vec![ProviderId::YahooIntraday], 11)
            .expect("meta should be valid");

        assert_eq!(meta.schema_version, "v1.0.0");
        assert!(is_valid_schema_version("v12.0.3"));
        assert!(!is_valid_schema_version("1.0.0"));
    }

    #[test]
    fn rejects_short_request_id_and_empty_chain() {
        let err = EnvelopeMeta::new("req", vec![ProviderId::YahooDaily], 1).expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidRequestId));

        let err = EnvelopeMeta::new("request-12345", Vec::new(), 1).expect_err("must fail");
        assert!(matches!(err, ValidationError::EmptySourceChain));
    }

    #[test]
    fn rejects_empty_error_code() {
        let err = EnvelopeError::new("", "message").expect_err("must fail");
        assert!(matches!(err, ValidationError::EmptyErrorCode));
    }

    #[test]
    fn failure_envelope_serializes_null_data() {
        let meta = EnvelopeMeta::new("request-12345", vec![ProviderId::YahooDaily], 3)
            .expect("meta should be valid");
        let envelope = Envelope::<()>::failure(
            meta,
            vec![EnvelopeError::from(&SnapshotError::MissingSymbol)],
        )
        .expect("valid envelope");

        let json = serde_json::to_value(&envelope).expect("serialize");
        assert!(json["data"].is_null());
        assert_eq!(json["errors"][0]["status"], 400);
        assert_eq!(json["errors"][0]["message"], "Symbol parameter is required.");
    }

    #[test]
    fn attempt_failures_carry_source_and_retryability() {
        let failure = AttemptFailure {
            source: ProviderId::AlphavantageDaily,
            attempt_index: 1,
            error: SourceError::rate_limited("quota"),
            skipped: false,
        };

        let error = EnvelopeError::from(&failure);
        assert_eq!(error.code, "source.rate_limited");
        assert_eq!(error.source, Some(ProviderId::AlphavantageDaily));
        assert_eq!(error.retryable, Some(true));
    }
}
