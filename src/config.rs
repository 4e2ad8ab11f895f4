//! Process configuration from the environment.
//!
//! Read once at startup (after loading `.env`, if present) and then passed
//! explicitly into each estimation call. CLI flags override these values.
//!
//! | variable              | meaning                                   | default |
//! |-----------------------|-------------------------------------------|---------|
//! | `USE_EXPERIMENTAL_ML` | publish the experimental blend            | false   |
//! | `BF_RULES_NOISE`      | rule-estimate noise amplitude             | 0       |
//! | `BF_NOISE_SEED`       | RNG seed for the noise                    | entropy |

use crate::domain::{EstimateConfig, NoiseConfig};
use crate::error::AppError;

pub const ENV_EXPERIMENTAL: &str = "USE_EXPERIMENTAL_ML";
pub const ENV_NOISE: &str = "BF_RULES_NOISE";
pub const ENV_SEED: &str = "BF_NOISE_SEED";

impl EstimateConfig {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (tests use a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let use_experimental_ml = lookup(ENV_EXPERIMENTAL).is_some_and(|raw| is_truthy(&raw));

        let amplitude = match lookup(ENV_NOISE) {
            Some(raw) => {
                raw.trim().parse::<f64>().map_err(|_| {
                    AppError::new(2, format!("{ENV_NOISE} must be a number, got '{raw}'"))
                })?
            }
            None => 0.0,
        };

        let seed = lookup(ENV_SEED)
            .map(|raw| {
                raw.trim().parse::<u64>().map_err(|_| {
                    AppError::new(2, format!("{ENV_SEED} must be an unsigned integer, got '{raw}'"))
                })
            })
            .transpose()?;

        let noise = NoiseConfig { amplitude, seed };
        noise
            .validate()
            .map_err(|e| AppError::new(2, format!("{ENV_NOISE}: {e}")))?;

        Ok(Self {
            use_experimental_ml,
            noise,
        })
    }
}

/// Only `true` and `1` enable a flag; anything else leaves it off.
fn is_truthy(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "true" | "1")
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
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_are_safe_and_noiseless() {
        let config = EstimateConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, EstimateConfig::default());
        assert!(!config.noise.is_enabled());
    }

    #[test]
    fn reads_all_variables() {
        let config = EstimateConfig::from_lookup(lookup(&[
            (ENV_EXPERIMENTAL, "True"),
            (ENV_NOISE, "0.5"),
            (ENV_SEED, "42"),
        ]))
        .unwrap();
        assert!(config.use_experimental_ml);
        assert_eq!(config.noise.amplitude, 0.5);
        assert_eq!(config.noise.seed, Some(42));
    }

    #[test]
    fn unknown_flag_values_mean_off() {
        let config = EstimateConfig::from_lookup(lookup(&[(ENV_EXPERIMENTAL, "maybe")])).unwrap();
        assert!(!config.use_experimental_ml);
        let config = EstimateConfig::from_lookup(lookup(&[(ENV_EXPERIMENTAL, "1")])).unwrap();
        assert!(config.use_experimental_ml);
    }

    #[test]
    fn invalid_numbers_are_input_errors() {
        let err = EstimateConfig::from_lookup(lookup(&[(ENV_NOISE, "-1")])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        let err = EstimateConfig::from_lookup(lookup(&[(ENV_SEED, "abc")])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn oversized_noise_is_an_input_error() {
        let err = EstimateConfig::from_lookup(lookup(&[(ENV_NOISE, "1e308")])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("Invalid noise amplitude"));

        let config = EstimateConfig::from_lookup(lookup(&[(ENV_NOISE, "5")])).unwrap();
        assert_eq!(config.noise.amplitude, 5.0);
    }
}
