//! Solver configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// How draw outcomes are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawEnumeration {
    /// One outcome per distinct multiset of drawn cards.
    #[default]
    Combinations,
    /// One outcome per ordered sequence of drawn card identities.
    Sequences,
}

/// Search parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Cache values of states reached along different lines.
    pub memoize: bool,

    /// Evaluate the root's candidate plays on the rayon pool.
    pub parallel: bool,

    /// Maximum action plays along one line (None = unlimited).
    /// A line that hits the budget is valued as if the turn ended there.
    pub max_plays: Option<u32>,

    pub enumeration: DrawEnumeration,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            memoize: true,
            parallel: false,
            max_plays: None,
            enumeration: DrawEnumeration::Combinations,
        }
    }
}

impl SolverConfig {
    /// Load a config from a JSON file; missing fields take defaults
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn with_memoize(mut self, memoize: bool) -> Self {
        self.memoize = memoize;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_max_plays(mut self, max_plays: Option<u32>) -> Self {
        self.max_plays = max_plays;
        self
    }

    pub fn with_enumeration(mut self, enumeration: DrawEnumeration) -> Self {
        self.enumeration = enumeration;
        self
    }
}
