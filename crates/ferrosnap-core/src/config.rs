//! Process configuration.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `FERROSNAP_ALPHAVANTAGE_API_KEY` (or `ALPHAVANTAGE_API_KEY`) | unset |
//! | `FERROSNAP_CHAIN` | `yahoo_intraday,alphavantage_daily,yahoo_daily` |
//! | `FERROSNAP_TIMEOUT_MS` | `5000` |
//! | `FERROSNAP_RATE_LIMIT_COOLDOWN_SECS` | `60` |
//! | `FERROSNAP_RSI_LOOKBACK` | `14` |

use std::collections::HashSet;
use std::env;
use std::fmt::{Debug, Formatter};
use std::str::FromStr;
use std::time::Duration;

use crate::indicators::DEFAULT_RSI_LOOKBACK;
use crate::provider_policy::{DEFAULT_COOLDOWN, DEFAULT_TIMEOUT};
use crate::{ConfigError, ProviderId};

const ENV_API_KEY: &str = "FERROSNAP_ALPHAVANTAGE_API_KEY";
const ENV_API_KEY_FALLBACK: &str = "ALPHAVANTAGE_API_KEY";
const ENV_CHAIN: &str = "FERROSNAP_CHAIN";
const ENV_TIMEOUT_MS: &str = "FERROSNAP_TIMEOUT_MS";
const ENV_COOLDOWN_SECS: &str = "FERROSNAP_RATE_LIMIT_COOLDOWN_SECS";
const ENV_RSI_LOOKBACK: &str = "FERROSNAP_RSI_LOOKBACK";

/// Immutable settings shared by the router and the snapshot service.
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    pub alphavantage_api_key: Option<String>,
    /// Fallback order, primary first.
    pub chain: Vec<ProviderId>,
    pub timeout: Duration,
    pub rate_limit_cooldown: Duration,
    pub rsi_lookback: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            alphavantage_api_key: None,
            chain: ProviderId::ALL.to_vec(),
            timeout: DEFAULT_TIMEOUT,
            rate_limit_cooldown: DEFAULT_COOLDOWN,
            rsi_lookback: DEFAULT_RSI_LOOKBACK,
        }
    }
}

impl Debug for Settings {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field(
                "alphavantage_api_key",
                &self.alphavantage_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("chain", &self.chain)
            .field("timeout", &self.timeout)
            .field("rate_limit_cooldown", &self.rate_limit_cooldown)
            .field("rsi_lookback", &self.rsi_lookback)
            .finish()
    }
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads settings through `lookup`, which returns the raw value of a
    /// variable if it is set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let mut settings = Self::default();
        settings.alphavantage_api_key = read(ENV_API_KEY).or_else(|| read(ENV_API_KEY_FALLBACK));

        if let Some(raw) = read(ENV_CHAIN) {
            settings.chain = parse_chain(&raw)?;
        }
        if let Some(raw) = read(ENV_TIMEOUT_MS) {
            settings.timeout = Duration::from_millis(parse_positive(ENV_TIMEOUT_MS, &raw)?);
        }
        if let Some(raw) = read(ENV_COOLDOWN_SECS) {
            settings.rate_limit_cooldown = Duration::from_secs(parse_number(ENV_COOLDOWN_SECS, &raw)?);
        }
        if let Some(raw) = read(ENV_RSI_LOOKBACK) {
            settings.rsi_lookback = parse_positive(ENV_RSI_LOOKBACK, &raw)?;
        }

        Ok(settings)
    }

    pub fn with_alphavantage_key(mut self, api_key: Option<String>) -> Self {
        self.alphavantage_api_key = api_key.filter(|key| !key.trim().is_empty());
        self
    }

    pub fn with_chain(mut self, chain: Vec<ProviderId>) -> Self {
        self.chain = chain;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_rate_limit_cooldown(mut self, cooldown: Duration) -> Self {
        self.rate_limit_cooldown = cooldown;
        self
    }

    pub fn with_rsi_lookback(mut self, rsi_lookback: usize) -> Self {
        self.rsi_lookback = rsi_lookback;
        self
    }
}

/// Parses a comma-separated chain such as `yahoo_daily,alphavantage_daily`.
pub fn parse_chain(raw: &str) -> Result<Vec<ProviderId>, ConfigError> {
    let mut seen = HashSet::new();
    let mut chain = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|part| !part.is_empty()) {
        let provider = ProviderId::from_str(part)?;
        if !seen.insert(provider) {
            return Err(ConfigError::DuplicateSource(provider));
        }
        chain.push(provider);
    }

    if chain.is_empty() {
        return Err(ConfigError::EmptyChain);
    }
    Ok(chain)
}

fn parse_number<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|error| ConfigError::InvalidValue {
        key,
        value: raw.to_owned(),
        reason: error.to_string(),
    })
}

fn parse_positive<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr + Default + PartialEq,
    T::Err: std::fmt::Display,
{
    let value = parse_number::<T>(key, raw)?;
    if value == T::default() {
        return Err(ConfigError::InvalidValue {
            key,
            value: raw.to_owned(),
            reason: String::from("must be greater than zero"),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars = pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect::<HashMap<_, _>>();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let settings = Settings::from_lookup(lookup(&[])).expect("defaults are valid");
        assert_eq!(settings, Settings::default());
        assert_eq!(
            settings.chain,
            vec![
                ProviderId::YahooIntraday,
                ProviderId::AlphavantageDaily,
                ProviderId::YahooDaily
            ]
        );
        assert_eq!(settings.timeout, Duration::from_millis(5_000));
        assert_eq!(settings.rsi_lookback, 14);
    }

    #[test]
    fn prefixed_key_wins_over_plain_key() {
        let settings = Settings::from_lookup(lookup(&[
            ("ALPHAVANTAGE_API_KEY", "plain"),
            ("FERROSNAP_ALPHAVANTAGE_API_KEY", "prefixed"),
        ]))
        .expect("valid settings");
        assert_eq!(settings.alphavantage_api_key.as_deref(), Some("prefixed"));

        let settings = Settings::from_lookup(lookup(&[("ALPHAVANTAGE_API_KEY", "plain")]))
            .expect("valid settings");
        assert_eq!(settings.alphavantage_api_key.as_deref(), Some("plain"));
    }

    #[test]
    fn reads_numeric_overrides() {
        let settings = Settings::from_lookup(lookup(&[
            ("FERROSNAP_TIMEOUT_MS", "750"),
            ("FERROSNAP_RATE_LIMIT_COOLDOWN_SECS", "0"),
            ("FERROSNAP_RSI_LOOKBACK", "9"),
            ("FERROSNAP_CHAIN", "yahoo-daily, yahoo_intraday"),
        ]))
        .expect("valid settings");

        assert_eq!(settings.timeout, Duration::from_millis(750));
        assert_eq!(settings.rate_limit_cooldown, Duration::ZERO);
        assert_eq!(settings.rsi_lookback, 9);
        assert_eq!(
            settings.chain,
            vec![ProviderId::YahooDaily, ProviderId::YahooIntraday]
        );
    }

    #[test]
    fn rejects_invalid_values() {
        let error = Settings::from_lookup(lookup(&[("FERROSNAP_RSI_LOOKBACK", "0")]))
            .expect_err("zero lookback is invalid");
        assert!(matches!(
            error,
            ConfigError::InvalidValue { key: "FERROSNAP_RSI_LOOKBACK", .. }
        ));

        let error = Settings::from_lookup(lookup(&[("FERROSNAP_TIMEOUT_MS", "soon")]))
            .expect_err("non-numeric timeout is invalid");
        assert!(matches!(error, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn chain_parsing_rejects_unknown_duplicate_and_empty() {
        assert!(matches!(
            parse_chain("yahoo_daily,bloomberg"),
            Err(ConfigError::Validation(_))
        ));
        assert_eq!(
            parse_chain("yahoo_daily,yahoo_daily"),
            Err(ConfigError::DuplicateSource(ProviderId::YahooDaily))
        );
        assert_eq!(parse_chain(" , "), Err(ConfigError::EmptyChain));
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let settings = Settings::default().with_alphavantage_key(Some(String::from("secret")));
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
