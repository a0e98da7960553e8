use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

///
/// LinkConfig
///
/// Options for model linking. Every key is optional in TOML:
///
/// ```toml
/// bootstrap_entity = "Identifier"
/// internal_prefix = "."
/// log_warnings = true
/// ```
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinkConfig {
    /// Entity seeded first into the processing order, when present.
    pub bootstrap_entity: String,

    /// Entities whose names start with this prefix are never ordered or
    /// consistency-checked.
    pub internal_prefix: String,

    pub log_warnings: bool,
}

impl LinkConfig {
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.internal_prefix.is_empty() {
            return Err(Error::Config("internal_prefix must not be empty".to_string()));
        }

        Ok(())
    }

    #[must_use]
    pub fn is_internal(&self, name: &str) -> bool {
        name.starts_with(&self.internal_prefix)
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            bootstrap_entity: "Identifier".to_string(),
            internal_prefix: ".".to_string(),
            log_warnings: true,
        }
    }
}
