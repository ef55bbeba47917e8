//! Engine configuration and seeding

use crate::error::ComposeError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Consecutive insertions without new coverage before a forced rewind
pub const DEFAULT_DROUGHT_LIMIT: usize = 50;

/// Iterations allowed per search pass
pub const DEFAULT_MAX_ITERATIONS: usize = 100_000;

/// How the random generator is seeded
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SeedOption {
    /// Unseeded; the run cannot be reproduced
    None,
    /// Fresh seed, reported with the result so the run can be replayed
    #[default]
    New,
    /// Fixed seed text
    Value(String),
}

impl SeedOption {
    /// Parse `none`, `new` (any case) or any other text as a fixed seed
    #[must_use]
    pub fn parse(text: &str) -> Self {
        match text.trim().to_ascii_lowercase().as_str() {
            "none" => Self::None,
            "new" => Self::New,
            _ => Self::Value(text.trim().to_string()),
        }
    }

    /// Random generator for one run, plus the seed text to report
    ///
    /// Numeric seeds map directly onto a 64-bit seed; any other text is
    /// hashed into a full 256-bit seed.
    #[must_use]
    pub fn build_rng(&self) -> (StdRng, Option<String>) {
        match self {
            Self::None => (StdRng::from_entropy(), None),
            Self::New => {
                let seed = rand::thread_rng().gen::<u64>().to_string();
                (seeded(&seed), Some(seed))
            }
            Self::Value(text) => (seeded(text), Some(text.clone())),
        }
    }
}

fn seeded(text: &str) -> StdRng {
    match text.parse::<u64>() {
        Ok(n) => StdRng::seed_from_u64(n),
        Err(_) => StdRng::from_seed(Sha256::digest(text.as_bytes()).into()),
    }
}

impl From<String> for SeedOption {
    fn from(text: String) -> Self {
        Self::parse(&text)
    }
}

impl From<SeedOption> for String {
    fn from(seed: SeedOption) -> Self {
        seed.to_string()
    }
}

impl fmt::Display for SeedOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::New => f.write_str("new"),
            Self::Value(text) => f.write_str(text),
        }
    }
}

/// Search engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposeConfig {
    /// Random seed
    pub seed: SeedOption,

    /// Drought length that forces a rewind to the last coverage gain
    pub drought_limit: usize,

    /// Upper bound on iterations per pass
    pub max_iterations: usize,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            seed: SeedOption::default(),
            drought_limit: DEFAULT_DROUGHT_LIMIT,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl ComposeConfig {
    /// Set the seed
    #[inline]
    #[must_use]
    pub fn with_seed(mut self, seed: SeedOption) -> Self {
        self.seed = seed;
        self
    }

    /// Set the drought limit
    #[inline]
    #[must_use]
    pub fn with_drought_limit(mut self, limit: usize) -> Self {
        self.drought_limit = limit;
        self
    }

    /// Set the iteration bound
    #[inline]
    #[must_use]
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(text: &str) -> Result<Self, ComposeError> {
        let config: Self = toml::from_str(text).map_err(|e| ComposeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the search cannot run with
    pub fn validate(&self) -> Result<(), ComposeError> {
        if self.max_iterations == 0 {
            return Err(ComposeError::Config("max_iterations must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;

    #[test]
    fn seed_keywords() {
        assert_eq!(SeedOption::parse("NONE"), SeedOption::None);
        assert_eq!(SeedOption::parse(" new "), SeedOption::New);
        assert_eq!(SeedOption::parse("42"), SeedOption::Value("42".into()));
        assert_eq!(SeedOption::parse("apple-pie").to_string(), "apple-pie");
    }

    #[test]
    fn fixed_seeds_are_reproducible() {
        for text in ["42", "apple-pie"] {
            let (mut a, reported) = SeedOption::parse(text).build_rng();
            let (mut b, _) = SeedOption::parse(text).build_rng();
            assert_eq!(reported.as_deref(), Some(text));
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn new_seed_is_reported_and_replayable() {
        let (mut rng, reported) = SeedOption::New.build_rng();
        let reported = reported.unwrap();
        let (mut replay, _) = SeedOption::Value(reported).build_rng();
        assert_eq!(rng.next_u64(), replay.next_u64());
        assert!(SeedOption::None.build_rng().1.is_none());
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = ComposeConfig::from_toml_str("seed = \"7\"\ndrought_limit = 3\n").unwrap();
        assert_eq!(config.seed, SeedOption::Value("7".into()));
        assert_eq!(config.drought_limit, 3);
        assert_eq!(config.max_iterations, DEFAULT_MAX_ITERATIONS);
    }

    #[test]
    fn invalid_config_is_rejected() {
        assert!(matches!(
            ComposeConfig::from_toml_str("max_iterations = 0"),
            Err(ComposeError::Config(_))
        ));
        assert!(ComposeConfig::from_toml_str("drought_limit = \"many\"").is_err());
    }

    #[test]
    fn builders() {
        let config = ComposeConfig::default()
            .with_seed(SeedOption::None)
            .with_drought_limit(5)
            .with_max_iterations(10);
        assert_eq!(config.seed, SeedOption::None);
        assert_eq!(config.drought_limit, 5);
        assert_eq!(config.max_iterations, 10);
    }
}
