//! CLI argument definitions for ferrosnap.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `snapshot` | RSI, VWAP and pivot levels for one symbol |
//! | `sources` | Configured fallback chain and policies (cooldowns are per process) |
//! | `health` | Liveness probe |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--timeout-ms` | `FERROSNAP_TIMEOUT_MS` or `5000` | Per-call timeout |
//! | `--chain` | `FERROSNAP_CHAIN` or all sources | Fallback order |
//! | `--alphavantage-key` | `FERROSNAP_ALPHAVANTAGE_API_KEY` | Alpha Vantage key |
//! | `-v`, `--verbose` | off | Raise log verbosity (repeatable) |
//!
//! # Examples
//!
//! ```bash
//! ferrosnap snapshot AAPL --pretty
//! ferrosnap snapshot MSFT --rsi-lookback 9 --lookback 60
//! ferrosnap --chain yahoo_daily snapshot ^GSPC
//! ```

use clap::{ArgAction, Args, Parser, Subcommand};

/// Market snapshot CLI: technical indicators with provider fallback.
#[derive(Debug, Parser)]
#[command(
    name = "ferrosnap",
    author,
    version,
    about = "Point-in-time technical snapshot for a ticker"
)]
pub struct Cli {
    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Per-call timeout in milliseconds.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Comma-separated fallback chain, primary first.
    ///
    /// Known sources: yahoo_intraday, alphavantage_daily, yahoo_daily.
    #[arg(long, global = true, value_name = "SOURCES")]
    pub chain: Option<String>,

    /// Alpha Vantage API key; the source is skipped when none is configured.
    #[arg(long, global = true, value_name = "KEY")]
    pub alphavantage_key: Option<String>,

    /// Log more detail to stderr (-v debug for ferrosnap, -vv everything).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute a market snapshot for one symbol.
    ///
    /// # Examples
    ///
    ///   ferrosnap snapshot AAPL
    ///   ferrosnap snapshot EURUSD=X --rsi-lookback 21
    Snapshot(SnapshotArgs),

    /// List the configured sources with their policies and cooldown state.
    ///
    /// Cooldowns live in the running process only. A fresh invocation starts
    /// with an empty eligibility clock, so every source reports `eligible`.
    Sources,

    /// Print a fixed liveness payload.
    Health,
}

#[derive(Debug, Args)]
pub struct SnapshotArgs {
    /// Ticker symbol, e.g. AAPL, ^GSPC, BRK.B.
    pub symbol: Option<String>,

    /// RSI window length.
    #[arg(long)]
    pub rsi_lookback: Option<usize>,

    /// Bars requested from every source, replacing each source's default.
    #[arg(long)]
    pub lookback: Option<usize>,
}
