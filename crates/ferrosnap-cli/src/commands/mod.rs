mod health;
mod snapshot;
mod sources;

use std::time::Duration;

use ferrosnap_core::config::parse_chain;
use ferrosnap_core::{ConfigError, Envelope, EnvelopeError, ProviderId, Settings};
use serde_json::Value;
use tracing::debug;

use crate::cli::{Cli, Command};
use crate::error::{exit_code_for_status, CliError};
use crate::metadata::Metadata;
use crate::output;

pub struct CommandResult {
    pub data: Option<Value>,
    pub warnings: Vec<String>,
    pub errors: Vec<EnvelopeError>,
    pub latency_ms: u64,
    pub source_chain: Vec<ProviderId>,
    /// Suggested HTTP status of a failed request; `None` on success.
    pub status: Option<u16>,
}

impl CommandResult {
    pub fn ok(data: Value, source_chain: Vec<ProviderId>) -> Self {
        Self {
            data: Some(data),
            warnings: Vec::new(),
            errors: Vec::new(),
            latency_ms: 0,
            source_chain,
            status: None,
        }
    }

    pub fn failed(status: u16, errors: Vec<EnvelopeError>, source_chain: Vec<ProviderId>) -> Self {
        Self {
            data: None,
            warnings: Vec::new(),
            errors,
            latency_ms: 0,
            source_chain,
            status: Some(status),
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_errors(mut self, errors: Vec<EnvelopeError>) -> Self {
        self.errors.extend(errors);
        self
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }
}

/// Runs the selected command, renders its output and returns the exit code.
pub async fn run(cli: &Cli) -> Result<u8, CliError> {
    let command_result = match &cli.command {
        Command::Health => {
            output::render(&health::run(), cli.pretty)?;
            return Ok(0);
        }
        Command::Snapshot(args) => snapshot::run(args, settings(cli)).await?,
        Command::Sources => sources::run(settings(cli)?)?,
    };

    let CommandResult {
        data,
        warnings,
        errors,
        latency_ms,
        source_chain,
        status,
    } = command_result;

    let mut metadata = Metadata::new(source_chain, latency_ms)?;
    for warning in warnings {
        metadata.push_warning(warning);
    }

    let envelope = Envelope::with_errors(metadata.into_envelope_meta()?, data, errors)?;
    output::render(&envelope, cli.pretty)?;

    Ok(exit_code_for_status(status))
}

/// Environment settings with command-line overrides applied.
fn settings(cli: &Cli) -> Result<Settings, ConfigError> {
    let mut settings = Settings::from_env()?;

    if let Some(key) = &cli.alphavantage_key {
        settings = settings.with_alphavantage_key(Some(key.clone()));
    }
    if let Some(raw) = &cli.chain {
        settings = settings.with_chain(parse_chain(raw)?);
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        if timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "--timeout-ms",
                value: timeout_ms.to_string(),
                reason: String::from("must be greater than zero"),
            });
        }
        settings = settings.with_timeout(Duration::from_millis(timeout_ms));
    }

    debug!(?settings, "resolved settings");
    Ok(settings)
}
