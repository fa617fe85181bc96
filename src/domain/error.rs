//! Domain error types.
//!
//! Only configuration problems and malformed input data are reported as
//! errors. An indicator that lacks enough bars returns an empty series (or
//! `None`), and a backtest over an empty series returns `None`.

/// Top-level error type for barsmith.
#[derive(Debug, thiserror::Error)]
pub enum BarsmithError {
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

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("invalid indicator {indicator}: {reason}")]
    InvalidIndicator { indicator: String, reason: String },

    #[error("unknown strategy: {name}")]
    UnknownStrategy { name: String },

    #[error("invalid bar at index {index}: {reason}")]
    InvalidSeries { index: usize, reason: String },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("export error: {reason}")]
    Export { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BarsmithError {
    pub(crate) fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        BarsmithError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<csv::Error> for BarsmithError {
    fn from(err: csv::Error) -> Self {
        BarsmithError::Export {
            reason: err.to_string(),
        }
    }
}

impl From<&BarsmithError> for std::process::ExitCode {
    fn from(err: &BarsmithError) -> Self {
        let code: u8 = match err {
            BarsmithError::Io(_) => 1,
            BarsmithError::ConfigParse { .. }
            | BarsmithError::ConfigMissing { .. }
            | BarsmithError::ConfigInvalid { .. }
            | BarsmithError::InvalidParameter { .. } => 2,
            BarsmithError::InvalidSeries { .. } | BarsmithError::Data { .. } => 3,
            BarsmithError::InvalidIndicator { .. } | BarsmithError::UnknownStrategy { .. } => 4,
            BarsmithError::Export { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
