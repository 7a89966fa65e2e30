use serde::Serialize;

use ferrosnap_core::{ProviderId, Settings, SourceRouterBuilder, SourceSnapshot};

use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct SourcesResponseData {
    sources: Vec<SourceSnapshot>,
    rsi_lookback: usize,
}

pub fn run(settings: Settings) -> Result<CommandResult, CliError> {
    let omitted = settings
        .chain
        .iter()
        .filter(|id| id.requires_api_key() && settings.alphavantage_api_key.is_none())
        .copied()
        .collect::<Vec<ProviderId>>();
    let rsi_lookback = settings.rsi_lookback;

    let router = SourceRouterBuilder::new(settings).build()?;
    let data = serde_json::to_value(SourcesResponseData {
        sources: router.sources(),
        rsi_lookback,
    })?;

    let warnings = omitted
        .into_iter()
        .map(|id| format!("source '{id}' omitted from the chain: no API key configured"))
        .collect();

    Ok(CommandResult::ok(data, router.source_chain()).with_warnings(warnings))
}
