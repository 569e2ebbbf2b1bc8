//! Autosave configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Longest accepted debounce window.
pub const MAX_DEBOUNCE: Duration = Duration::from_secs(60);

/// Configuration for the autosave debounce.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutosaveConfig {
    /// Quiet period after the last edit before the content is saved.
    /// Every new edit restarts it.
    ///
    /// Default: 1 second. Zero saves on the next scheduler turn.
    pub debounce: Duration,
}

impl AutosaveConfig {
    /// Clamps the debounce into `0..=MAX_DEBOUNCE`.
    pub fn validated(mut self) -> Self {
        if self.debounce > MAX_DEBOUNCE {
            tracing::warn!(
                requested_ms = self.debounce.as_millis() as u64,
                "autosave debounce clamped to {}s",
                MAX_DEBOUNCE.as_secs()
            );
            self.debounce = MAX_DEBOUNCE;
        }
        self
    }
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_secs(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_debounce_is_one_second() {
        assert_eq!(AutosaveConfig::default().debounce, Duration::from_secs(1));
    }

    #[test]
    fn test_validated_clamps_long_debounce() {
        let config = AutosaveConfig {
            debounce: Duration::from_secs(3600),
        }
        .validated();
        assert_eq!(config.debounce, MAX_DEBOUNCE);
    }
}
