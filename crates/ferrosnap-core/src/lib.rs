//! Core contracts for ferrosnap.
//!
//! This crate contains:
//! - Canonical domain models and validation
//! - Provider adapters behind the [`DataSource`] trait
//! - The fallback router with per-adapter cooldowns
//! - RSI, VWAP and pivot indicators, assembled into a [`MarketSnapshot`]
//! - Response envelope and structured errors

pub mod adapters;
pub mod config;
pub mod cooldown;
pub mod data_source;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod http_client;
pub mod indicators;
pub mod presentation;
pub mod provider_policy;
pub mod routing;
pub mod service;
pub mod snapshot;
pub mod source;
pub mod throttling;

pub use adapters::{AlphaVantageAdapter, YahooAdapter};
pub use config::Settings;
pub use cooldown::EligibilityClock;
pub use data_source::{BarsRequest, DataSource, SourceError, SourceErrorKind};
pub use domain::{Bar, BarSeries, Interval, Symbol, UtcDateTime};
pub use envelope::{Envelope, EnvelopeError, EnvelopeMeta, SCHEMA_VERSION};
pub use error::{ConfigError, ValidationError};
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};
pub use indicators::{IndicatorConfig, IndicatorValue, LevelPair, PivotLevels, UnavailableReason};
pub use provider_policy::{ProviderPolicy, QuotaPolicy};
pub use routing::{
    AttemptFailure, Provenance, RouteFailure, RouteRequest, RouteResult, RouteSuccess,
    SourceRouter, SourceRouterBuilder, SourceSnapshot,
};
pub use service::{
    parse_request_symbol, SnapshotError, SnapshotOptions, SnapshotReport, SnapshotService,
};
pub use snapshot::{assemble, MarketSnapshot};
pub use source::ProviderId;
pub use throttling::QuotaGuard;
