use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Canonical identifiers for the adapters a fallback chain can hold.
///
/// One upstream provider may appear under several identifiers when it is
/// queried at different granularities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    YahooIntraday,
    AlphavantageDaily,
    YahooDaily,
}

impl ProviderId {
    /// Default fallback order: intraday first, then the daily providers.
    pub const ALL: [Self; 3] = [Self::YahooIntraday, Self::AlphavantageDaily, Self::YahooDaily];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::YahooIntraday => "yahoo_intraday",
            Self::AlphavantageDaily => "alphavantage_daily",
            Self::YahooDaily => "yahoo_daily",
        }
    }

    pub const fn requires_api_key(self) -> bool {
        matches!(self, Self::AlphavantageDaily)
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "yahoo_intraday" => Ok(Self::YahooIntraday),
            "alphavantage_daily" => Ok(Self::AlphavantageDaily),
            "yahoo_daily" => Ok(Self::YahooDaily),
            other => Err(ValidationError::InvalidSource {
                value: other.to_owned(),
            }),
        }
    }
}
