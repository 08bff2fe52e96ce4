use std::env;

use tracing::info;

/// Default minutes between periodic sync passes.
const DEFAULT_SYNC_INTERVAL_MINUTES: u64 = 15;

/// Default reconciliation window in seconds.
const DEFAULT_MATCH_WINDOW_SECONDS: i64 = 300;

/// Application configuration loaded from environment variables.
///
/// Provider credentials are optional: a missing (or empty) key disables that
/// provider's feed, which then reports empty pages instead of failing
/// startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub eleven_labs_api_key: Option<String>,
    pub voximplant_account_id: Option<String>,
    pub voximplant_api_key: Option<String>,
    pub sync_interval_minutes: u64,
    pub match_window_seconds: i64,
}

impl Config {
    /// Load configuration from environment variables. Never panics: absent
    /// credentials degrade, malformed numeric knobs fall back to defaults.
    pub fn from_env() -> Self {
        Self {
            eleven_labs_api_key: optional_env("ELEVEN_LABS_API_KEY"),
            voximplant_account_id: optional_env("VOXIMPLANT_ACCOUNT_ID"),
            voximplant_api_key: optional_env("VOXIMPLANT_API_KEY"),
            sync_interval_minutes: numeric_env(
                "SYNC_INTERVAL_MINUTES",
                DEFAULT_SYNC_INTERVAL_MINUTES,
            ),
            match_window_seconds: numeric_env(
                "MATCH_WINDOW_SECONDS",
                DEFAULT_MATCH_WINDOW_SECONDS,
            ),
        }
    }

    /// Log which credentials are present without exposing their values.
    pub fn log_redacted(&self) {
        info!(
            eleven_labs_key = self.eleven_labs_api_key.is_some(),
            voximplant_account = self.voximplant_account_id.is_some(),
            voximplant_key = self.voximplant_api_key.is_some(),
            sync_interval_minutes = self.sync_interval_minutes,
            match_window_seconds = self.match_window_seconds,
            "Configuration loaded"
        );
    }
}

/// Empty values count as unset.
fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

fn numeric_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test uses its own variable name so parallel tests never race.

    #[test]
    fn empty_env_value_counts_as_unset() {
        env::set_var("CALLWATCH_TEST_EMPTY_KEY", "");
        assert_eq!(optional_env("CALLWATCH_TEST_EMPTY_KEY"), None);
    }

    #[test]
    fn set_env_value_is_returned() {
        env::set_var("CALLWATCH_TEST_SET_KEY", "abc123");
        assert_eq!(
            optional_env("CALLWATCH_TEST_SET_KEY"),
            Some("abc123".to_string())
        );
    }

    #[test]
    fn malformed_numeric_falls_back_to_default() {
        env::set_var("CALLWATCH_TEST_BAD_NUMBER", "soon");
        assert_eq!(numeric_env("CALLWATCH_TEST_BAD_NUMBER", 15u64), 15);
    }

    #[test]
    fn valid_numeric_overrides_default() {
        env::set_var("CALLWATCH_TEST_GOOD_NUMBER", "30");
        assert_eq!(numeric_env("CALLWATCH_TEST_GOOD_NUMBER", 15u64), 30);
    }
}
