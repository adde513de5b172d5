//! Engine settings
//!
//! Knobs an embedder or the CLI can set without touching code.

use serde::{Deserialize, Serialize};

/// Behavioural settings for the template engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Reject malformed placeholder syntax instead of rendering it as text.
    pub strict_syntax: bool,

    /// Add a `now` timestamp to the system layer of layered resolution.
    pub inject_now: bool,

    /// Poll the cancellation flag between batch variables.
    pub check_cancellation: bool,

    /// Treat `if`, `/if` and `else` as keywords only when followed by
    /// whitespace or the end of the placeholder.
    pub keyword_boundary: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            strict_syntax: false,
            inject_now: true,
            check_cancellation: true,
            keyword_boundary: false,
        }
    }
}

impl EngineSettings {
    /// Returns settings with strict syntax enabled.
    #[must_use]
    pub const fn strict(mut self) -> Self {
        self.strict_syntax = true;
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = EngineSettings::default();
        assert!(!settings.strict_syntax);
        assert!(settings.inject_now);
        assert!(settings.check_cancellation);
        assert!(!settings.keyword_boundary);
    }

    #[test]
    fn test_partial_deserialization_uses_defaults() {
        let settings: EngineSettings = serde_json::from_str(r#"{"strict_syntax": true}"#).unwrap();
        assert!(settings.strict_syntax);
        assert!(settings.inject_now);
    }
}
