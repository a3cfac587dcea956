// config.rs

pub const DEFAULT_PROMPT: &str = "osc> ";
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Settings read from the environment at start-up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// `OSC_PROMPT`
    pub prompt: String,
    /// `OSC_LOG`, a tracing filter directive such as `osc_shell=debug`.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let defaults = Self::default();
        Self {
            prompt: lookup("OSC_PROMPT").unwrap_or(defaults.prompt),
            log_filter: lookup("OSC_LOG")
                .filter(|f| !f.trim().is_empty())
                .unwrap_or(defaults.log_filter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_when_unset() {
        assert_eq!(Config::from_lookup(|_| None), Config::default());
        assert_eq!(Config::default().prompt, "osc> ");
    }

    #[test]
    fn environment_overrides() {
        let vars: HashMap<&str, &str> =
            [("OSC_PROMPT", "$ "), ("OSC_LOG", "osc_shell=debug")].into_iter().collect();
        let config = Config::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.prompt, "$ ");
        assert_eq!(config.log_filter, "osc_shell=debug");
    }

    #[test]
    fn blank_log_filter_falls_back() {
        let config = Config::from_lookup(|k| (k == "OSC_LOG").then(|| " ".to_string()));
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    }
}
