use serde::Serialize;

use super::{IndicatorValue, UnavailableReason};
use crate::presentation::serialize_round2;
use crate::Bar;

/// Classic floor-trader pivots derived from one bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PivotLevels {
    pub pivot: f64,
    pub r1: f64,
    pub r2: f64,
    pub s1: f64,
    pub s2: f64,
}

impl PivotLevels {
    pub fn support(&self) -> LevelPair {
        LevelPair::levels(self.s1, self.s2)
    }

    pub fn resistance(&self) -> LevelPair {
        LevelPair::levels(self.r1, self.r2)
    }
}

/// Ordered pair of levels, nearest to the pivot first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LevelPair {
    Levels {
        #[serde(serialize_with = "serialize_round2")]
        near: f64,
        #[serde(serialize_with = "serialize_round2")]
        far: f64,
    },
    Unavailable {
        reason: UnavailableReason,
    },
}

impl LevelPair {
    fn levels(near: f64, far: f64) -> Self {
        Self::Levels { near, far }
    }

    pub const fn unavailable(reason: UnavailableReason) -> Self {
        Self::Unavailable { reason }
    }

    pub fn near(&self) -> Option<f64> {
        match self {
            Self::Levels { near, .. } => Some(*near),
            Self::Unavailable { .. } => None,
        }
    }

    pub fn far(&self) -> Option<f64> {
        match self {
            Self::Levels { far, .. } => Some(*far),
            Self::Unavailable { .. } => None,
        }
    }
}

/// Pivot, support and resistance from the latest bar.
///
/// `Err` only when the arithmetic overflows to a non-finite value.
pub fn pivot_levels(bar: &Bar) -> Result<PivotLevels, UnavailableReason> {
    let pivot = bar.typical_price();
    let range = bar.high - bar.low;
    let levels = PivotLevels {
        pivot,
        r1: 2.0 * pivot - bar.low,
        r2: pivot + range,
        s1: 2.0 * pivot - bar.high,
        s2: pivot - range,
    };

    let all_finite = [levels.pivot, levels.r1, levels.r2, levels.s1, levels.s2]
        .iter()
        .all(|value| value.is_finite());
    if all_finite {
        Ok(levels)
    } else {
        Err(UnavailableReason::NonFinitePrice)
    }
}

impl From<&PivotLevels> for IndicatorValue {
    fn from(levels: &PivotLevels) -> Self {
        IndicatorValue::numeric(levels.pivot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UtcDateTime;

    fn bar(high: f64, low: f64, close: f64) -> Bar {
        let ts = UtcDateTime::parse("2024-03-01T00:00:00Z").expect("valid ts");
        Bar::new(ts, close, high, low, close, 1_000).expect("valid bar")
    }

    #[test]
    fn computes_floor_pivots() {
        let levels = pivot_levels(&bar(121.0, 119.0, 120.0)).expect("finite levels");

        assert_eq!(levels.pivot, 120.0);
        assert_eq!(levels.r1, 121.0);
        assert_eq!(levels.s1, 119.0);
        assert_eq!(levels.r2, 122.0);
        assert_eq!(levels.s2, 118.0);
        assert_eq!(levels.support(), LevelPair::Levels { near: 119.0, far: 118.0 });
        assert_eq!(levels.resistance(), LevelPair::Levels { near: 121.0, far: 122.0 });
    }

    #[test]
    fn overflowing_prices_are_non_finite() {
        let result = pivot_levels(&bar(f64::MAX, f64::MAX / 2.0, f64::MAX));
        assert_eq!(result, Err(UnavailableReason::NonFinitePrice));
    }

    #[test]
    fn serializes_level_pairs() {
        let json = serde_json::to_value(LevelPair::Levels { near: 119.004, far: 117.996 })
            .expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({"status": "levels", "near": 119.0, "far": 118.0})
        );
    }
}
