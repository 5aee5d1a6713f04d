//! Domain error types.

/// Top-level error type for trendscan.
#[derive(Debug, thiserror::Error)]
pub enum TrendscanError {
    #[error("no data for {ticker}: {reason}")]
    DataUnavailable { ticker: String, reason: String },

    #[error("insufficient history for {ticker}: have {bars} bars, need {required}")]
    InsufficientHistory {
        ticker: String,
        bars: usize,
        required: usize,
    },

    #[error("malformed series for {ticker}: {reason}")]
    MalformedSeries { ticker: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("position store error: {reason}")]
    Store { reason: String },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&TrendscanError> for std::process::ExitCode {
    fn from(err: &TrendscanError) -> Self {
        let code: u8 = match err {
            TrendscanError::Io(_) => 1,
            TrendscanError::ConfigParse { .. }
            | TrendscanError::ConfigMissing { .. }
            | TrendscanError::ConfigInvalid { .. } => 2,
            TrendscanError::Store { .. } | TrendscanError::Report { .. } => 3,
            TrendscanError::MalformedSeries { .. } => 4,
            TrendscanError::DataUnavailable { .. } | TrendscanError::InsufficientHistory { .. } => {
                5
            }
        };
        std::process::ExitCode::from(code)
    }
}
