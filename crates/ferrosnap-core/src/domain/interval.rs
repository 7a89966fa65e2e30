use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Bar granularities produced by the configured sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "1d")]
    OneDay,
}

impl Interval {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FiveMinutes => "5m",
            Self::OneDay => "1d",
        }
    }

    /// Bars produced by one regular US equity session (09:30-16:00).
    pub const fn bars_per_session(self) -> usize {
        match self {
            Self::FiveMinutes => 78,
            Self::OneDay => 1,
        }
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
