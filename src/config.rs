// model = "claude-opus-4-5"
// created = "2026-10-16"
// modified = "2026-10-16"
// driver = "Isaac Clayton"

//! Backend configuration.

use serde::Deserialize;
use serde::Serialize;

use crate::error::Result;

/// What to do with a change whose `seq` has already been applied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Ignore it. Redelivery is common with at-least-once transports.
    #[default]
    Skip,
    /// Fail the batch with `Error::DuplicateChange`.
    Reject,
}

/// Tunables for a `Backend`.
///
/// ```
/// use accord::config::{Config, DuplicatePolicy};
///
/// let config = Config::from_json(r#"{"duplicates": "reject"}"#).unwrap();
/// assert_eq!(config.duplicates, DuplicatePolicy::Reject);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub duplicates: DuplicatePolicy,
}

impl Config {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Config> {
        return Ok(serde_json::from_str(json)?);
    }
}
