//! Scheduler configuration.
//!
//! Everything a single generation run needs besides the sections
//! themselves: hard bounds (credits, conflicts, mandatory and excluded
//! groups, day limits), soft preferences and their weights, the result
//! cap, the search strategy, and the time budget.
//!
//! A config is a plain value passed into every call; nothing is kept in
//! process-wide state.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::models::Day;

/// Search strategy selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchStrategy {
    /// Exhaustive backtracking with pruning.
    #[default]
    Exhaustive,
    /// Simulated-annealing local search.
    Annealing,
}

/// Weights of the five preference terms.
///
/// Every term is normalized to 0..100 before weighting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferenceWeights {
    /// Desired free days actually free.
    pub free_days: f64,
    /// Fewer active days.
    pub compression: f64,
    /// Fewer breaks between classes on the same day.
    pub gaps: f64,
    /// Longer back-to-back blocks.
    pub consecutive: f64,
    /// Penalty per tolerated conflict (subtracted).
    pub conflict_penalty: f64,
}

impl Default for PreferenceWeights {
    fn default() -> Self {
        Self {
            free_days: 1.0,
            compression: 1.0,
            gaps: 1.0,
            consecutive: 1.0,
            conflict_penalty: 1.0,
        }
    }
}

impl PreferenceWeights {
    pub fn with_free_days(mut self, w: f64) -> Self {
        self.free_days = w;
        self
    }

    pub fn with_compression(mut self, w: f64) -> Self {
        self.compression = w;
        self
    }

    pub fn with_gaps(mut self, w: f64) -> Self {
        self.gaps = w;
        self
    }

    pub fn with_consecutive(mut self, w: f64) -> Self {
        self.consecutive = w;
        self
    }

    pub fn with_conflict_penalty(mut self, w: f64) -> Self {
        self.conflict_penalty = w;
        self
    }

    /// Validates that every weight is finite and non-negative.
    pub fn validate(&self) -> Result<(), String> {
        let named = [
            ("free_days", self.free_days),
            ("compression", self.compression),
            ("gaps", self.gaps),
            ("consecutive", self.consecutive),
            ("conflict_penalty", self.conflict_penalty),
        ];
        for (name, w) in named {
            if !w.is_finite() || w < 0.0 {
                return Err(format!("weight {name} must be finite and non-negative, got {w}"));
            }
        }
        Ok(())
    }
}

/// Parameters of the annealing strategy.
///
/// # Examples
///
/// ```
/// use u_timetable::config::AnnealingConfig;
///
/// let config = AnnealingConfig::default()
///     .with_initial_temperature(50.0)
///     .with_cooling_rate(0.99)
///     .with_max_iterations(5_000)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnealingConfig {
    /// Starting temperature.
    pub initial_temperature: f64,
    /// The walk stops once the temperature drops below this.
    pub min_temperature: f64,
    /// Geometric cooling factor in (0, 1), applied every iteration.
    pub cooling_rate: f64,
    /// Iteration budget.
    pub max_iterations: usize,
    /// Probability that an optional group starts out skipped.
    pub skip_probability: f64,
    /// Random seed. `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for AnnealingConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 100.0,
            min_temperature: 0.01,
            cooling_rate: 0.995,
            max_iterations: 20_000,
            skip_probability: 0.8,
            seed: None,
        }
    }
}

impl AnnealingConfig {
    pub fn with_initial_temperature(mut self, t: f64) -> Self {
        self.initial_temperature = t;
        self
    }

    pub fn with_min_temperature(mut self, t: f64) -> Self {
        self.min_temperature = t;
        self
    }

    pub fn with_cooling_rate(mut self, alpha: f64) -> Self {
        self.cooling_rate = alpha;
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_skip_probability(mut self, p: f64) -> Self {
        self.skip_probability = p;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.initial_temperature <= 0.0 {
            return Err("initial_temperature must be positive".into());
        }
        if self.min_temperature <= 0.0 {
            return Err("min_temperature must be positive".into());
        }
        if self.min_temperature >= self.initial_temperature {
            return Err("min_temperature must be less than initial_temperature".into());
        }
        if self.cooling_rate <= 0.0 || self.cooling_rate >= 1.0 {
            return Err(format!(
                "cooling_rate must be in (0, 1), got {}",
                self.cooling_rate
            ));
        }
        if !(0.0..=1.0).contains(&self.skip_probability) {
            return Err(format!(
                "skip_probability must be in [0, 1], got {}",
                self.skip_probability
            ));
        }
        Ok(())
    }
}

/// Configuration for one timetable generation run.
///
/// # Examples
///
/// ```
/// use u_timetable::config::{PreferenceWeights, SchedulerConfig, SearchStrategy};
/// use u_timetable::models::Day;
///
/// let config = SchedulerConfig::default()
///     .with_max_credits(30)
///     .with_mandatory("MATH101")
///     .with_desired_free_day(Day::Friday)
///     .with_weights(PreferenceWeights::default().with_gaps(2.0))
///     .with_strategy(SearchStrategy::Exhaustive)
///     .with_timeout_ms(5_000);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Credit ceiling (inclusive).
    pub max_credits: i32,
    /// Maximum tolerated conflicting slots.
    pub max_conflicts: usize,
    /// Groups that must appear with a selection.
    pub mandatory_groups: BTreeSet<String>,
    /// Groups removed from the search entirely.
    pub excluded_groups: BTreeSet<String>,
    /// Result cap. 0 yields an empty, successful run.
    pub max_results: usize,
    /// Preference weights. `None` ranks by (fewer conflicts, more credits).
    pub weights: Option<PreferenceWeights>,
    /// Days the student would like to keep free.
    pub desired_free_days: Vec<Day>,
    /// Strict: a free day has zero classes. Relaxed: at most one.
    pub strict_free_days: bool,
    /// Turn desired free days into a hard constraint.
    pub require_free_days: bool,
    /// Reward schedules using fewer days.
    pub compress_days: bool,
    /// Hard limit on occupied periods per day.
    pub max_periods_per_day: Option<usize>,
    /// Search strategy.
    pub strategy: SearchStrategy,
    /// Annealing parameters (used by `SearchStrategy::Annealing`).
    pub annealing: AnnealingConfig,
    /// Wall-clock budget (ms). `None` = unbounded.
    pub timeout_ms: Option<u64>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_credits: 30,
            max_conflicts: 0,
            mandatory_groups: BTreeSet::new(),
            excluded_groups: BTreeSet::new(),
            max_results: 10,
            weights: None,
            desired_free_days: Vec::new(),
            strict_free_days: true,
            require_free_days: false,
            compress_days: false,
            max_periods_per_day: None,
            strategy: SearchStrategy::default(),
            annealing: AnnealingConfig::default(),
            timeout_ms: Some(30_000),
        }
    }
}

impl SchedulerConfig {
    pub fn with_max_credits(mut self, credits: i32) -> Self {
        self.max_credits = credits;
        self
    }

    pub fn with_max_conflicts(mut self, conflicts: usize) -> Self {
        self.max_conflicts = conflicts;
        self
    }

    /// Marks a group as mandatory.
    pub fn with_mandatory(mut self, group_id: impl Into<String>) -> Self {
        self.mandatory_groups.insert(group_id.into());
        self
    }

    /// Excludes a group from the search.
    pub fn with_excluded(mut self, group_id: impl Into<String>) -> Self {
        self.excluded_groups.insert(group_id.into());
        self
    }

    pub fn with_max_results(mut self, n: usize) -> Self {
        self.max_results = n;
        self
    }

    pub fn with_weights(mut self, weights: PreferenceWeights) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn with_desired_free_day(mut self, day: Day) -> Self {
        if !self.desired_free_days.contains(&day) {
            self.desired_free_days.push(day);
        }
        self
    }

    pub fn with_strict_free_days(mut self, strict: bool) -> Self {
        self.strict_free_days = strict;
        self
    }

    pub fn with_required_free_days(mut self, required: bool) -> Self {
        self.require_free_days = required;
        self
    }

    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress_days = enabled;
        self
    }

    pub fn with_max_periods_per_day(mut self, limit: usize) -> Self {
        self.max_periods_per_day = Some(limit);
        self
    }

    pub fn with_strategy(mut self, strategy: SearchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_annealing(mut self, annealing: AnnealingConfig) -> Self {
        self.annealing = annealing;
        self
    }

    pub fn with_timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = Some(ms);
        self
    }

    pub fn without_timeout(mut self) -> Self {
        self.timeout_ms = None;
        self
    }

    /// Whether a group must appear.
    pub fn is_mandatory(&self, group_id: &str) -> bool {
        self.mandatory_groups.contains(group_id)
    }

    /// Slots a desired free day may still hold.
    pub fn free_day_allowance(&self) -> usize {
        if self.strict_free_days {
            0
        } else {
            1
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_credits < 0 {
            return Err(format!(
                "max_credits must be non-negative, got {}",
                self.max_credits
            ));
        }
        if let Some(id) = self
            .mandatory_groups
            .intersection(&self.excluded_groups)
            .next()
        {
            return Err(format!("group {id} is both mandatory and excluded"));
        }
        if self.max_periods_per_day == Some(0) && !self.mandatory_groups.is_empty() {
            return Err("max_periods_per_day of 0 leaves no room for mandatory groups".into());
        }
        if let Some(weights) = &self.weights {
            weights.validate()?;
        }
        if self.strategy == SearchStrategy::Annealing {
            self.annealing.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SchedulerConfig::default();
        assert_eq!(config.max_credits, 30);
        assert_eq!(config.max_conflicts, 0);
        assert_eq!(config.max_results, 10);
        assert!(config.weights.is_none());
        assert_eq!(config.strategy, SearchStrategy::Exhaustive);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_weights_are_baseline() {
        let w = PreferenceWeights::default();
        assert_eq!(w.free_days, 1.0);
        assert_eq!(w.compression, 1.0);
        assert_eq!(w.gaps, 1.0);
        assert_eq!(w.consecutive, 1.0);
        assert_eq!(w.conflict_penalty, 1.0);
    }

    #[test]
    fn test_validate_negative_weight() {
        let config =
            SchedulerConfig::default().with_weights(PreferenceWeights::default().with_gaps(-1.0));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_mandatory_and_excluded() {
        let config = SchedulerConfig::default()
            .with_mandatory("A")
            .with_excluded("A");
        let err = config.validate().unwrap_err();
        assert!(err.contains("both mandatory and excluded"));
    }

    #[test]
    fn test_validate_negative_ceiling() {
        let config = SchedulerConfig::default().with_max_credits(-1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_annealing_validated_only_when_selected() {
        let bad = AnnealingConfig::default().with_cooling_rate(1.5);
        let config = SchedulerConfig::default().with_annealing(bad.clone());
        assert!(config.validate().is_ok());

        let config = config.with_strategy(SearchStrategy::Annealing);
        assert!(config.validate().is_err());
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_annealing_validate_temperatures() {
        let config = AnnealingConfig::default()
            .with_initial_temperature(1.0)
            .with_min_temperature(2.0);
        assert!(config.validate().is_err());

        let config = AnnealingConfig::default().with_skip_probability(1.5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_free_day_allowance() {
        let config = SchedulerConfig::default();
        assert_eq!(config.free_day_allowance(), 0);
        assert_eq!(config.with_strict_free_days(false).free_day_allowance(), 1);
    }

    #[test]
    fn test_desired_free_day_dedup() {
        let config = SchedulerConfig::default()
            .with_desired_free_day(Day::Friday)
            .with_desired_free_day(Day::Friday);
        assert_eq!(config.desired_free_days, vec![Day::Friday]);
    }

    #[test]
    fn test_partial_json_config() {
        let json = r#"{
            "max_credits": 24,
            "mandatory_groups": ["CS101"],
            "desired_free_days": ["Friday"],
            "strategy": "Annealing",
            "annealing": { "seed": 11 }
        }"#;
        let config: SchedulerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.max_credits, 24);
        assert!(config.is_mandatory("CS101"));
        assert_eq!(config.desired_free_days, vec![Day::Friday]);
        assert_eq!(config.strategy, SearchStrategy::Annealing);
        assert_eq!(config.annealing.seed, Some(11));
        assert_eq!(config.annealing.max_iterations, 20_000);
        assert_eq!(config.max_results, 10);
        assert!(config.validate().is_ok());
    }
}
