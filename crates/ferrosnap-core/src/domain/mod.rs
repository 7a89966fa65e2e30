//! # Domain Models
//!
//! Canonical domain types for ferrosnap market data.
//!
//! All models validate their invariants at construction time, so a value of
//! one of these types is always well-formed:
//!
//! | Type | Invariant |
//! |------|-----------|
//! | [`Symbol`] | trimmed, upper-cased, 1-15 ticker characters |
//! | [`Bar`] | finite non-negative prices, `low <= open, close <= high` |
//! | [`BarSeries`] | non-empty, strictly ascending timestamps |
//! | [`Interval`] | one of 1m, 5m, 15m, 1h, 1d |
//! | [`UtcDateTime`] | UTC offset |
//!
//! ```rust
//! use ferrosnap_core::{Bar, UtcDateTime, ValidationError};
//!
//! let ts = UtcDateTime::parse("2024-01-01T00:00:00Z").unwrap();
//! let bar = Bar::new(ts, 100.0, 105.0, 95.0, 102.0, 1_000).unwrap();
//! assert_eq!(bar.volume, 1_000);
//!
//! let invalid = Bar::new(ts, 100.0, 95.0, 105.0, 102.0, 1_000);
//! assert!(matches!(invalid, Err(ValidationError::InvalidBarRange)));
//! ```

mod interval;
mod models;
mod symbol;
mod timestamp;

pub use interval::Interval;
pub use models::{Bar, BarSeries};
pub use symbol::Symbol;
pub use timestamp::UtcDateTime;
