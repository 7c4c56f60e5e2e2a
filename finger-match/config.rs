use crate::error::ConfigError;
use crate::ratio::{RatioTest, DEFAULT_RATIO_THRESHOLD};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const DEFAULT_EARLY_EXIT_SCORE: f32 = 100.0;
pub const DEFAULT_MAX_CANDIDATES: usize = 1000;

/// Matching and scanning parameters
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MatchConfig {
    /// Lowe ratio, in (0, 1]
    pub ratio_threshold: f32,
    /// Stop scanning once the best score reaches `early_exit_score`
    pub early_exit: bool,
    /// In (0, 100]; scores never exceed 100, so use `early_exit = false` to scan everything
    pub early_exit_score: f32,
    /// Upper bound on candidates examined per scan
    pub max_candidates: usize,
    /// 1 scans sequentially, more runs a worker pool
    pub workers: usize,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub name: Option<String>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            ratio_threshold: DEFAULT_RATIO_THRESHOLD,
            early_exit: true,
            early_exit_score: DEFAULT_EARLY_EXIT_SCORE,
            max_candidates: DEFAULT_MAX_CANDIDATES,
            workers: 1,
            name: None,
        }
    }
}

impl MatchConfig {
    /// Scan every candidate; never stop early
    pub fn exhaustive() -> Self {
        Self {
            early_exit: false,
            name: Some("Exhaustive".to_string()),
            ..Self::default()
        }
    }

    /// Spread candidates over one worker per CPU
    pub fn parallel() -> Self {
        Self {
            workers: num_cpus::get().max(1),
            name: Some("Parallel".to_string()),
            ..Self::default()
        }
    }

    pub fn builder() -> MatchConfigBuilder {
        MatchConfigBuilder::new()
    }

    /// Score at which scanning stops, if early exit is enabled
    pub fn early_exit_threshold(&self) -> Option<f32> {
        self.early_exit.then_some(self.early_exit_score)
    }

    pub fn early_exit_reached(&self, best_score: f32) -> bool {
        self.early_exit_threshold()
            .is_some_and(|threshold| best_score >= threshold)
    }

    pub fn ratio_test(&self) -> Result<RatioTest, ConfigError> {
        RatioTest::new(self.ratio_threshold)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ratio_test()?;
        if !(self.early_exit_score > 0.0 && self.early_exit_score <= 100.0) {
            return Err(ConfigError::EarlyExitScore(self.early_exit_score));
        }
        if self.max_candidates == 0 {
            return Err(ConfigError::MaxCandidates);
        }
        if self.workers == 0 {
            return Err(ConfigError::Workers);
        }
        Ok(())
    }

    /// Generate human-readable summary
    pub fn summary(&self) -> String {
        let early_exit = match self.early_exit_threshold() {
            Some(score) => format!("{:.1}", score),
            None => "off".to_string(),
        };
        format!(
            "MatchConfig: ratio={:.2}, early_exit={}, max_candidates={}, workers={}",
            self.ratio_threshold, early_exit, self.max_candidates, self.workers
        )
    }

    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "serde")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    #[cfg(feature = "serde")]
    pub fn from_toml(toml_str: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }
}

/// Fluent builder for `MatchConfig`
#[derive(Debug, Clone, Default)]
pub struct MatchConfigBuilder {
    config: MatchConfig,
}

impl MatchConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: MatchConfig) -> Self {
        Self { config }
    }

    pub fn ratio_threshold(mut self, threshold: f32) -> Self {
        self.config.ratio_threshold = threshold;
        self
    }

    /// Enable early exit at the given score
    pub fn early_exit_score(mut self, score: f32) -> Self {
        self.config.early_exit = true;
        self.config.early_exit_score = score;
        self
    }

    pub fn no_early_exit(mut self) -> Self {
        self.config.early_exit = false;
        self
    }

    pub fn max_candidates(mut self, max: usize) -> Self {
        self.config.max_candidates = max;
        self
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.config.name = Some(name.to_string());
        self
    }

    pub fn build(self) -> Result<MatchConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
