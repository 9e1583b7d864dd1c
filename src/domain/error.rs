//! Domain error types.

/// Top-level error type for reversion.
#[derive(Debug, thiserror::Error)]
pub enum ReversionError {
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

    #[error("insufficient data: have {bars} bars, need at least {minimum}")]
    InsufficientData { bars: usize, minimum: usize },

    #[error("invalid input: {reason}")]
    Input { reason: String },

    #[error("invalid price {price} for asset {asset} at index {index}")]
    InvalidPrice { asset: usize, index: usize, price: f64 },

    #[error("domain error: {reason}")]
    Domain { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ReversionError {
    pub fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        ReversionError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub fn input(reason: impl Into<String>) -> Self {
        ReversionError::Input {
            reason: reason.into(),
        }
    }

    pub fn domain(reason: impl Into<String>) -> Self {
        ReversionError::Domain {
            reason: reason.into(),
        }
    }

    /// Raised before any simulation step runs.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ReversionError::ConfigParse { .. }
                | ReversionError::ConfigMissing { .. }
                | ReversionError::ConfigInvalid { .. }
                | ReversionError::InsufficientData { .. }
        )
    }

    pub fn is_input(&self) -> bool {
        matches!(self, ReversionError::Input { .. })
    }

    pub fn is_domain(&self) -> bool {
        matches!(
            self,
            ReversionError::Domain { .. } | ReversionError::InvalidPrice { .. }
        )
    }
}

impl From<&ReversionError> for std::process::ExitCode {
    fn from(err: &ReversionError) -> Self {
        let code: u8 = match err {
            ReversionError::Io(_) => 1,
            ReversionError::ConfigParse { .. }
            | ReversionError::ConfigMissing { .. }
            | ReversionError::ConfigInvalid { .. }
            | ReversionError::InsufficientData { .. } => 2,
            ReversionError::Input { .. } => 3,
            ReversionError::Domain { .. } | ReversionError::InvalidPrice { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
