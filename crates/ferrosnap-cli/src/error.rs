use thiserror::Error;

/// Exit code when the request is cancelled with Ctrl-C.
pub const EXIT_INTERRUPTED: u8 = 130;

/// Exit code for argument, configuration and output faults.
pub const EXIT_USAGE: u8 = 1;

/// CLI-level faults. Request outcomes are rendered as envelopes instead and
/// mapped through [`exit_code_for_status`].
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ferrosnap_core::ValidationError),

    #[error("configuration error: {0}")]
    Config(#[from] ferrosnap_core::ConfigError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) | Self::Config(_) | Self::Serialization(_) => EXIT_USAGE,
        }
    }
}

/// Maps a request's suggested HTTP status to the process exit code.
pub const fn exit_code_for_status(status: Option<u16>) -> u8 {
    match status {
        None => 0,
        Some(404) => 3,
        Some(400..=499) => 2,
        Some(_) => 4,
    }
}

/// Exit code after clap has printed a parse outcome.
///
/// `--help` and `--version` exit 0 once written; a usage error, or any
/// output that could not be written, exits with [`EXIT_USAGE`].
pub fn exit_code_for_parse_outcome(printed: std::io::Result<()>, is_usage_error: bool) -> u8 {
    match printed {
        Ok(()) if !is_usage_error => 0,
        _ => EXIT_USAGE,
    }
}
