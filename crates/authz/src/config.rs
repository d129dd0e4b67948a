//! Engine configuration.
//!
//! Constructed once and injected into [`crate::AuthorizationEngine`]; there
//! are no global configuration lookups inside the decision logic.

use serde::{Deserialize, Serialize};

use rolegate_core::{DomainResult, SlugNormalizer};

use crate::PretendConfig;

fn default_separator() -> char {
    '.'
}

/// Authorization core configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthzConfig {
    /// Separator used by slug normalization.
    pub separator: char,
    /// Pretend (simulation) mode.
    pub pretend: PretendConfig,
}

impl Default for AuthzConfig {
    fn default() -> Self {
        Self {
            separator: default_separator(),
            pretend: PretendConfig::default(),
        }
    }
}

impl AuthzConfig {
    /// Validate the configuration and build the slug normalizer.
    ///
    /// An unusable separator is a fatal configuration error, surfaced here
    /// (engine construction) rather than per-check.
    pub fn normalizer(&self) -> DomainResult<SlugNormalizer> {
        SlugNormalizer::new(self.separator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolegate_core::DomainError;

    #[test]
    fn default_config_is_valid() {
        let config = AuthzConfig::default();
        assert_eq!(config.separator, '.');
        let normalizer = config.normalizer().unwrap();
        assert_eq!(normalizer.separator(), '.');
    }

    #[test]
    fn bad_separator_fails_fast() {
        let config = AuthzConfig {
            separator: 'a',
            ..Default::default()
        };
        assert!(matches!(
            config.normalizer(),
            Err(DomainError::Configuration(_))
        ));
    }

    #[test]
    fn deserializes_from_json() {
        let config: AuthzConfig = serde_json::from_str(
            r#"{"separator":"-","pretend":{"enabled":true,"options":{"is":true}}}"#,
        )
        .unwrap();
        assert_eq!(config.separator, '-');
        assert!(config.pretend.enabled);
    }
}
