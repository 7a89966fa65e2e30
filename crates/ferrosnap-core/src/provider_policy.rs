use std::time::Duration;

use serde::Serialize;

use crate::ProviderId;

/// Per-adapter routing policy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderPolicy {
    pub provider_id: ProviderId,
    /// Number of most recent bars requested from the adapter.
    pub lookback: usize,
    /// Minimum wait before a rate-limited adapter is tried again.
    #[serde(rename = "cooldown_ms", serialize_with = "serialize_duration_ms")]
    pub cooldown: Duration,
    #[serde(rename = "timeout_ms", serialize_with = "serialize_duration_ms")]
    pub timeout: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quota: Option<QuotaPolicy>,
}

/// Local request budget enforced before the adapter touches the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuotaPolicy {
    #[serde(rename = "window_ms", serialize_with = "serialize_duration_ms")]
    pub window: Duration,
    pub limit: u32,
}

pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(60);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

impl ProviderPolicy {
    /// 100 five-minute bars spans a little over one regular session.
    pub fn yahoo_intraday_default() -> Self {
        Self {
            provider_id: ProviderId::YahooIntraday,
            lookback: 100,
            cooldown: DEFAULT_COOLDOWN,
            timeout: DEFAULT_TIMEOUT,
            quota: None,
        }
    }

    /// Free tier: 5 requests per minute.
    pub fn alphavantage_daily_default() -> Self {
        Self {
            provider_id: ProviderId::AlphavantageDaily,
            lookback: 30,
            cooldown: DEFAULT_COOLDOWN,
            timeout: DEFAULT_TIMEOUT,
            quota: Some(QuotaPolicy {
                window: Duration::from_secs(60),
                limit: 5,
            }),
        }
    }

    pub fn yahoo_daily_default() -> Self {
        Self {
            provider_id: ProviderId::YahooDaily,
            lookback: 30,
            cooldown: DEFAULT_COOLDOWN,
            timeout: DEFAULT_TIMEOUT,
            quota: None,
        }
    }

    pub fn default_for(provider_id: ProviderId) -> Self {
        match provider_id {
            ProviderId::YahooIntraday => Self::yahoo_intraday_default(),
            ProviderId::AlphavantageDaily => Self::alphavantage_daily_default(),
            ProviderId::YahooDaily => Self::yahoo_daily_default(),
        }
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn serialize_duration_ms<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u64(value.as_millis().min(u128::from(u64::MAX)) as u64)
}
