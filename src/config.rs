//! Engine configuration.
//!
//! The only tunables the engine itself consumes: the clause-count bound
//! that keeps pathological query expansions from eating memory, and the
//! default for coordination scoring. The configuration value is passed
//! explicitly into query construction and cursor creation; there is no
//! process-wide mutable setting.

use serde::Deserialize;

use crate::error::{Result, SylvaError};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound on the number of clauses a single boolean or twig
    /// composition may hold; exceeding it fails clause addition eagerly.
    pub max_clauses: usize,
    /// Whether coordination scoring is enabled. Individual queries can
    /// still opt out of coordination on their own.
    pub coordination: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_clauses: 1024,
            coordination: true,
        }
    }
}

impl EngineConfig {
    /// Loads configuration from an optional `sylva` config file in the
    /// working directory, overlaid with `SYLVA_*` environment variables.
    /// Missing sources fall back to the compiled defaults.
    pub fn load() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("sylva").required(false))
            .add_source(config::Environment::with_prefix("SYLVA"))
            .build()
            .map_err(|e| SylvaError::Config(e.to_string()))?;
        let loaded: EngineConfig = settings
            .try_deserialize()
            .map_err(|e| SylvaError::Config(e.to_string()))?;
        loaded.validate()?;
        Ok(loaded)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_clauses == 0 {
            return Err(SylvaError::Config(
                "max_clauses must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
