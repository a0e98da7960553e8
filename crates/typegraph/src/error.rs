use crate::def::Def;
use thiserror::Error as ThisError;

///
/// Error
///
/// Construction-time failure. Raised while compiling a definition into a
/// schema or model; validation and linking findings never use this type.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("invalid definition ({shape}): {reason}: {fragment}")]
    InvalidDefinition {
        fragment: String,
        shape: &'static str,
        reason: String,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("entity '{0}' is defined more than once")]
    DuplicateEntity(String),
}

impl Error {
    /// Construct an `InvalidDefinition` error for the offending fragment.
    pub fn invalid_definition(def: &Def, reason: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            fragment: def.to_string(),
            shape: def.shape(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub const fn is_invalid_definition(&self) -> bool {
        matches!(self, Self::InvalidDefinition { .. })
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
