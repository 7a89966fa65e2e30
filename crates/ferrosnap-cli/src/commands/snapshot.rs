use std::time::Instant;

use ferrosnap_core::{
    parse_request_symbol, ConfigError, EnvelopeError, IndicatorConfig, ProviderId, Settings,
    SnapshotError, SnapshotOptions, SnapshotService, SourceRouterBuilder,
};

use crate::cli::SnapshotArgs;
use crate::error::CliError;

use super::CommandResult;

/// Runs one snapshot request.
///
/// The symbol is checked before configuration is touched, so a malformed
/// request is a 400 even when the configuration is broken. Configuration
/// faults are reported as 500 envelopes naming the requested symbol.
pub async fn run(
    args: &SnapshotArgs,
    settings: Result<Settings, ConfigError>,
) -> Result<CommandResult, CliError> {
    let started = Instant::now();
    let raw_symbol = args.symbol.as_deref().unwrap_or_default();
    let configured_chain = settings
        .as_ref()
        .map(|settings| settings.chain.clone())
        .unwrap_or_default();

    if let Err(rejection) = parse_request_symbol(raw_symbol) {
        return Ok(failed(&rejection, configured_chain, started));
    }

    let service = match settings.and_then(build_service) {
        Ok(service) => service,
        Err(error) => {
            let failure = SnapshotError::internal(raw_symbol.trim(), error.to_string());
            return Ok(failed(&failure, configured_chain, started));
        }
    };

    let source_chain = service.router().source_chain();
    let options = SnapshotOptions {
        rsi_lookback: args.rsi_lookback,
        lookback_override: args.lookback,
    };

    let result = match service.snapshot(raw_symbol, options).await {
        Ok(report) => {
            let attempts = report.failures.iter().map(EnvelopeError::from).collect();
            CommandResult::ok(serde_json::to_value(&report.snapshot)?, source_chain)
                .with_warnings(report.warnings)
                .with_errors(attempts)
                .with_latency(report.latency_ms)
        }
        Err(failure) => failed(&failure, source_chain, started),
    };

    Ok(result)
}

fn build_service(settings: Settings) -> Result<SnapshotService, ConfigError> {
    let indicators = IndicatorConfig::default().with_rsi_lookback(settings.rsi_lookback);
    let router = SourceRouterBuilder::new(settings).build()?;
    Ok(SnapshotService::new(router, indicators))
}

fn failed(failure: &SnapshotError, source_chain: Vec<ProviderId>, started: Instant) -> CommandResult {
    let mut errors = vec![EnvelopeError::from(failure)];
    errors.extend(failure.failures().iter().map(EnvelopeError::from));
    CommandResult::failed(failure.status(), errors, source_chain).with_latency(elapsed_ms(started))
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis().min(u128::from(u64::MAX)) as u64
}
