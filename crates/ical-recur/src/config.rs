//! Engine configuration.
//!
//! A [`RecurConfig`] is handed to [`Recur::parse_with`](crate::Recur::parse_with)
//! or [`RecurBuilder::config`](crate::recur::RecurBuilder::config) and travels
//! with the rule from then on. There is no process-wide state.

use serde::{Deserialize, Serialize};

use crate::dst::DstPolicy;
use crate::error::Result;

/// Default number of consecutive empty frequency increments tolerated before an
/// expansion gives up.
pub const DEFAULT_MAX_INCREMENT_COUNT: i32 = 1000;

/// Tunables for rule parsing and expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct RecurConfig {
    /// Consecutive increments yielding no candidate before expansion stops.
    /// Zero or a negative value disables the guard.
    pub max_increment_count: i32,
    /// Accept temporal strings with trailing data or minute precision.
    pub relaxed_parsing: bool,
    /// Keep unrecognised rule parts as experimental values instead of failing.
    pub tolerate_unknown_parts: bool,
    /// Resolution of zoned candidates that land in a DST gap.
    pub dst_policy: DstPolicy,
}

impl Default for RecurConfig {
    fn default() -> Self {
        Self {
            max_increment_count: DEFAULT_MAX_INCREMENT_COUNT,
            relaxed_parsing: false,
            tolerate_unknown_parts: false,
            dst_policy: DstPolicy::default(),
        }
    }
}

impl RecurConfig {
    /// Decode a configuration document. Missing fields take their defaults.
    ///
    /// # Errors
    /// Returns [`RecurError::InvalidConfig`](crate::RecurError::InvalidConfig)
    /// if the document is not valid JSON or a field has the wrong type.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The guard limit, or `None` when disabled.
    pub fn increment_guard(&self) -> Option<u32> {
        u32::try_from(self.max_increment_count)
            .ok()
            .filter(|limit| *limit > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = RecurConfig::from_json("{}").unwrap();
        assert_eq!(config, RecurConfig::default());
        assert_eq!(config.increment_guard(), Some(1000));
    }

    #[test]
    fn negative_limit_disables_guard() {
        let config = RecurConfig::from_json(r#"{"max_increment_count": -1}"#).unwrap();
        assert_eq!(config.increment_guard(), None);
    }

    #[test]
    fn dst_policy_is_snake_case() {
        let config = RecurConfig::from_json(r#"{"dst_policy": "skip"}"#).unwrap();
        assert_eq!(config.dst_policy, DstPolicy::Skip);
    }

    #[test]
    fn malformed_document_is_rejected() {
        assert!(RecurConfig::from_json(r#"{"relaxed_parsing": "yes"}"#).is_err());
    }
}
