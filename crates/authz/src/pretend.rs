//! Pretend mode: canned authorization answers for test harnesses.
//!
//! When enabled, every top-level decision entry point returns a statically
//! configured boolean keyed by entry-point name, bypassing the store and
//! cache entirely. Intended for deterministic authorization outcomes in
//! tests without a backing store.

use serde::{Deserialize, Serialize};

/// The four top-level decision entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    /// Role rule check (`is`).
    Is,
    /// Permission rule check (`can`).
    Can,
    /// Entity-scoped rule check (`allowed`).
    Allowed,
    /// Mixed role/permission rule check (`has`).
    Has,
}

impl core::fmt::Display for CheckKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            CheckKind::Is => "is",
            CheckKind::Can => "can",
            CheckKind::Allowed => "allowed",
            CheckKind::Has => "has",
        };
        f.write_str(name)
    }
}

/// Canned answer per entry point. Unconfigured entry points answer `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PretendOptions {
    pub is: bool,
    pub can: bool,
    pub allowed: bool,
    pub has: bool,
}

/// Pretend-mode configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PretendConfig {
    pub enabled: bool,
    pub options: PretendOptions,
}

impl PretendConfig {
    /// The canned answer for an entry point, or `None` when pretend mode is
    /// disabled and real evaluation should run.
    pub fn answer(&self, kind: CheckKind) -> Option<bool> {
        if !self.enabled {
            return None;
        }
        Some(match kind {
            CheckKind::Is => self.options.is,
            CheckKind::Can => self.options.can,
            CheckKind::Allowed => self.options.allowed,
            CheckKind::Has => self.options.has,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_yields_no_answer() {
        let pretend = PretendConfig::default();
        assert_eq!(pretend.answer(CheckKind::Is), None);
    }

    #[test]
    fn enabled_yields_configured_answer() {
        let pretend = PretendConfig {
            enabled: true,
            options: PretendOptions {
                can: true,
                ..Default::default()
            },
        };
        assert_eq!(pretend.answer(CheckKind::Can), Some(true));
        assert_eq!(pretend.answer(CheckKind::Is), Some(false));
    }

    #[test]
    fn deserializes_with_defaults() {
        let pretend: PretendConfig =
            serde_json::from_str(r#"{"enabled":true,"options":{"allowed":true}}"#).unwrap();
        assert_eq!(pretend.answer(CheckKind::Allowed), Some(true));
        assert_eq!(pretend.answer(CheckKind::Has), Some(false));
    }
}
