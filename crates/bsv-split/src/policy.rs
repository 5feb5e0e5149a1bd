//! Engine policy that outlives a single request.

use serde::{Deserialize, Serialize};

use crate::error::SplitError;

/// BSV node relay policy accepts any output of at least one satoshi.
pub const DEFAULT_DUST_LIMIT: u64 = 1;

/// Policy knobs, loadable from a TOML fragment.
///
/// ```toml
/// dust_limit = 546
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitPolicy {
    /// Smallest change output worth creating. Smaller leftovers go to fee.
    pub dust_limit: u64,
}

impl Default for SplitPolicy {
    fn default() -> Self {
        SplitPolicy {
            dust_limit: DEFAULT_DUST_LIMIT,
        }
    }
}

impl SplitPolicy {
    /// Parse a policy from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, SplitError> {
        let policy: SplitPolicy =
            toml::from_str(s).map_err(|e| SplitError::InvalidConfig(e.to_string()))?;
        if policy.dust_limit == 0 {
            return Err(SplitError::InvalidConfig(
                "dust_limit must be at least 1 satoshi".to_string(),
            ));
        }
        Ok(policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_overrides() {
        assert_eq!(SplitPolicy::from_toml_str("").unwrap(), SplitPolicy::default());
        assert_eq!(SplitPolicy::from_toml_str("dust_limit = 546").unwrap().dust_limit, 546);
    }

    #[test]
    fn test_rejects_bad_toml() {
        assert!(SplitPolicy::from_toml_str("dust_limit = 0").is_err());
        assert!(SplitPolicy::from_toml_str("dust_limit = \"many\"").is_err());
        assert!(SplitPolicy::from_toml_str("dust_limit = -3").is_err());
    }
}
