use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The feature key violates the lowercase `[a-z0-9-]` contract. The
    /// only error a diagnostic run ever returns; remote-system failures
    /// are folded into the report instead.
    #[error("invalid feature key \"{feature}\"")]
    InvalidFeature { feature: String },

    #[error("{message}")]
    Message { message: String },
}

impl Error {
    #[must_use]
    pub fn invalid_feature(feature: impl Into<String>) -> Self {
        Self::InvalidFeature {
            feature: feature.into(),
        }
    }

    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
