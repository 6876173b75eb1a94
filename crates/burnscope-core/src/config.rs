use std::env;
use std::time::Duration;

pub const DEFAULT_MONTE_CARLO_TRIALS: u32 = 2_000;
pub const MAX_MONTE_CARLO_TRIALS: u32 = 1_000_000;
pub const DEFAULT_MONTE_CARLO_TIME_CAP_MS: u64 = 250;
pub const DEFAULT_MONTE_CARLO_SEED: u64 = 0x6275_726e;

/// Engine-level switches. Every knob has a safe default; `from_env` lets an
/// operator override them without a rebuild.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub ml_enabled: bool,
    pub monte_carlo_trials: u32,
    /// Zero disables the deadline.
    pub monte_carlo_time_cap_ms: u64,
    pub monte_carlo_seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ml_enabled: true,
            monte_carlo_trials: DEFAULT_MONTE_CARLO_TRIALS,
            monte_carlo_time_cap_ms: DEFAULT_MONTE_CARLO_TIME_CAP_MS,
            monte_carlo_seed: DEFAULT_MONTE_CARLO_SEED,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`EngineConfig::from_env`] but reading from an arbitrary source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = Self::default();
        let ml_enabled = parse_flag(lookup("BURNSCOPE_ML_ENABLED"), base.ml_enabled);
        let trials = parse_env(lookup("BURNSCOPE_MC_TRIALS"), base.monte_carlo_trials);
        let time_cap = parse_env(lookup("BURNSCOPE_MC_TIME_CAP_MS"), base.monte_carlo_time_cap_ms);
        let seed = parse_env(lookup("BURNSCOPE_MC_SEED"), base.monte_carlo_seed);

        Self {
            ml_enabled,
            monte_carlo_trials: trials.min(MAX_MONTE_CARLO_TRIALS),
            monte_carlo_time_cap_ms: time_cap.min(60_000),
            monte_carlo_seed: seed,
        }
    }

    pub fn monte_carlo_time_cap(&self) -> Option<Duration> {
        (self.monte_carlo_time_cap_ms > 0).then(|| Duration::from_millis(self.monte_carlo_time_cap_ms))
    }
}

fn parse_env<T: std::str::FromStr>(raw: Option<String>, fallback: T) -> T {
    raw.and_then(|value| value.trim().parse::<T>().ok())
        .unwrap_or(fallback)
}

fn parse_flag(raw: Option<String>, fallback: bool) -> bool {
    match raw.as_deref().map(str::trim) {
        Some("1") | Some("true") | Some("on") | Some("yes") => true,
        Some("0") | Some("false") | Some("off") | Some("no") => false,
        _ => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        assert_eq!(EngineConfig::from_lookup(|_| None), EngineConfig::default());
    }

    #[test]
    fn overrides_are_parsed_and_clamped() {
        let config = EngineConfig::from_lookup(lookup(&[
            ("BURNSCOPE_ML_ENABLED", "off"),
            ("BURNSCOPE_MC_TRIALS", "99999999"),
            ("BURNSCOPE_MC_TIME_CAP_MS", "0"),
            ("BURNSCOPE_MC_SEED", "7"),
        ]));
        assert!(!config.ml_enabled);
        assert_eq!(config.monte_carlo_trials, MAX_MONTE_CARLO_TRIALS);
        assert_eq!(config.monte_carlo_time_cap(), None);
        assert_eq!(config.monte_carlo_seed, 7);
    }

    #[test]
    fn garbage_values_fall_back() {
        let config = EngineConfig::from_lookup(lookup(&[
            ("BURNSCOPE_ML_ENABLED", "maybe"),
            ("BURNSCOPE_MC_TRIALS", "-3"),
        ]));
        assert!(config.ml_enabled);
        assert_eq!(config.monte_carlo_trials, DEFAULT_MONTE_CARLO_TRIALS);
    }
}
