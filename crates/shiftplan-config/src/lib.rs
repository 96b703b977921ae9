//! Configuration system for shiftplan.
//!
//! Load planner configuration from TOML or YAML to control rest rules,
//! night limits, segment thresholds and the objective weight table without
//! code changes. Every section is optional and falls back to its defaults.
//!
//! # Examples
//!
//! Load configuration from a TOML string:
//!
//! ```
//! use shiftplan_config::{PlannerConfig, WeightMode};
//! use shiftplan_core::PenaltyTier;
//! use std::time::Duration;
//!
//! let config = PlannerConfig::from_toml_str(r#"
//!     [rest]
//!     min_hours = 11
//!
//!     [penalties]
//!     unmet_window = 3.0
//!     preferences = 0.0
//!
//!     [objective]
//!     mode = "checked"
//!
//!     [solver]
//!     time_limit_secs = 30
//! "#).unwrap();
//!
//! assert_eq!(config.rest.min_minutes(), 660);
//! assert_eq!(config.penalties.per_hour(PenaltyTier::UnmetWindow), 3.0);
//! assert_eq!(config.objective.mode, WeightMode::Checked);
//! assert_eq!(config.solver.time_limit(), Some(Duration::from_secs(30)));
//! ```
//!
//! Use the default config when the file is missing:
//!
//! ```
//! use shiftplan_config::PlannerConfig;
//!
//! let config = PlannerConfig::load("planner.toml").unwrap_or_default();
//! assert!(config.validate().is_ok());
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use shiftplan_core::{parse_hhmm, PenaltyTier, ShiftplanError};
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<ConfigError> for ShiftplanError {
    fn from(err: ConfigError) -> Self {
        ShiftplanError::Config(err.to_string())
    }
}

/// Converts fractional hours to whole minutes, rounding to nearest.
pub fn hours_to_minutes(hours: f64) -> u32 {
    (hours.max(0.0) * 60.0).round() as u32
}

/// Main planner configuration.
///
/// Threaded by reference through every pipeline stage; no stage mutates it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct PlannerConfig {
    #[serde(default)]
    pub rest: RestConfig,

    #[serde(default)]
    pub nights: NightConfig,

    #[serde(default)]
    pub hours: HoursConfig,

    #[serde(default)]
    pub segments: SegmentConfig,

    #[serde(default)]
    pub skills: SkillConfig,

    #[serde(default)]
    pub coverage: CoverageConfig,

    #[serde(default)]
    pub penalties: PenaltyWeights,

    #[serde(default)]
    pub objective: ObjectiveConfig,

    #[serde(default)]
    pub solver: SolverLimits,
}

impl PlannerConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist or contains invalid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Sets the global minimum rest between two shifts.
    pub fn with_min_rest_hours(mut self, hours: f64) -> Self {
        self.rest.min_hours = hours;
        self
    }

    /// Sets the time-of-day window that classifies a shift as a night.
    pub fn with_night_window(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.nights.window_start = start.into();
        self.nights.window_end = end.into();
        self
    }

    pub fn with_max_nights_per_week(mut self, nights: u32) -> Self {
        self.nights.max_per_week = nights;
        self
    }

    /// Sets the per-group segment warning and hard thresholds.
    pub fn with_segment_thresholds(mut self, warn: usize, hard: usize) -> Self {
        self.segments.warn_threshold = warn;
        self.segments.hard_threshold = hard;
        self
    }

    pub fn with_midnight_policy(mut self, policy: MidnightPolicy) -> Self {
        self.segments.midnight_policy = policy;
        self
    }

    pub fn with_strict_windows(mut self, strict: bool) -> Self {
        self.segments.strict_windows = strict;
        self
    }

    pub fn with_skill_aggregation(mut self, aggregation: SkillAggregation) -> Self {
        self.skills.aggregation = aggregation;
        self
    }

    /// Sets the per-hour weight of one penalty tier.
    pub fn with_weight(mut self, tier: PenaltyTier, per_hour: f64) -> Self {
        self.penalties.set(tier, per_hour);
        self
    }

    /// Sets the tier priority order, highest first.
    pub fn with_priority(mut self, priority: Vec<PenaltyTier>) -> Self {
        self.objective.priority = priority;
        self
    }

    pub fn with_weight_mode(mut self, mode: WeightMode) -> Self {
        self.objective.mode = mode;
        self
    }

    /// Makes weight dominance violations fatal.
    pub fn with_strict_objective(mut self, strict: bool) -> Self {
        self.objective.strict = strict;
        self
    }

    /// Sets the solve time limit.
    /// Sets the overtime cost multiplier of one role.
    pub fn with_overtime_cost(mut self, role: impl Into<String>, multiplier: f64) -> Self {
        self.hours.overtime_costs.insert(role.into(), multiplier);
        self
    }

    pub fn with_time_limit_secs(mut self, seconds: u64) -> Self {
        self.solver.time_limit_secs = Some(seconds);
        self
    }

    /// Checks cross-field consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.coverage.shift_integrity {
            return Err(ConfigError::Invalid(
                "coverage.shift_integrity must be true; fractional shift coverage is unsupported"
                    .to_string(),
            ));
        }

        non_negative("rest.min_hours", self.rest.min_hours)?;
        non_negative("hours.max_weekly", self.hours.max_weekly)?;
        non_negative("hours.max_overtime", self.hours.max_overtime)?;
        if let Some(cap) = self.hours.global_overtime_cap {
            non_negative("hours.global_overtime_cap", cap)?;
        }
        non_negative("hours.default_overtime_cost", self.hours.default_overtime_cost)?;
        for (role, cost) in &self.hours.overtime_costs {
            non_negative(&format!("hours.overtime_costs.{role}"), *cost)?;
        }
        if self.hours.max_shifts_per_day == 0 {
            return Err(ConfigError::Invalid(
                "hours.max_shifts_per_day must be at least 1".to_string(),
            ));
        }

        self.nights.window()?;
        if self.nights.spacing_days == 0 {
            return Err(ConfigError::Invalid(
                "nights.spacing_days must be at least 1".to_string(),
            ));
        }

        if self.segments.hard_threshold < self.segments.warn_threshold {
            return Err(ConfigError::Invalid(format!(
                "segments.hard_threshold ({}) is below segments.warn_threshold ({})",
                self.segments.hard_threshold, self.segments.warn_threshold
            )));
        }

        for tier in PenaltyTier::ALL {
            non_negative(&format!("penalties.{tier}"), self.penalties.per_hour(tier))?;
        }

        let mut seen = HashSet::new();
        for tier in &self.objective.priority {
            if !seen.insert(*tier) {
                return Err(ConfigError::Invalid(format!(
                    "objective.priority lists '{tier}' more than once"
                )));
            }
        }
        non_negative("objective.tolerance", self.objective.tolerance)?;
        let ratio = self.objective.max_weight_ratio;
        if ratio.is_nan() || ratio <= 1.0 {
            return Err(ConfigError::Invalid(
                "objective.max_weight_ratio must be greater than 1".to_string(),
            ));
        }

        if self.solver.time_limit_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "solver.time_limit_secs must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

fn non_negative(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{field} must be a non-negative number, got {value}"
        )))
    }
}

/// Rest rule between two shifts of the same employee.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct RestConfig {
    /// Global minimum rest in hours; employees may override it.
    pub min_hours: f64,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self { min_hours: 8.0 }
    }
}

impl RestConfig {
    pub fn min_minutes(&self) -> u32 {
        hours_to_minutes(self.min_hours)
    }
}

/// Night shift classification and limits.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct NightConfig {
    /// Start of the night window, `HH:MM`.
    pub window_start: String,

    /// End of the night window, `HH:MM`; may wrap past midnight.
    pub window_end: String,

    /// Maximum night shifts per employee per ISO week.
    pub max_per_week: u32,

    /// Two nights whose start days are at most this many days apart may not
    /// both go to the same employee.
    pub spacing_days: u32,
}

impl Default for NightConfig {
    fn default() -> Self {
        Self {
            window_start: "22:00".to_string(),
            window_end: "06:00".to_string(),
            max_per_week: 3,
            spacing_days: 1,
        }
    }
}

impl NightConfig {
    /// Returns the night window as `(start, end)` minutes of day.
    pub fn window(&self) -> Result<(u32, u32), ConfigError> {
        let parse = |field: &str, text: &str| {
            parse_hhmm(text).map_err(|_| {
                ConfigError::Invalid(format!("nights.{field} '{text}' is not HH:MM"))
            })
        };
        let start = parse("window_start", &self.window_start)?;
        let end = parse("window_end", &self.window_end)?;
        if start == end {
            return Err(ConfigError::Invalid(
                "nights.window_start and nights.window_end must differ".to_string(),
            ));
        }
        Ok((start, end))
    }
}

/// Contractual hour limits.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct HoursConfig {
    /// Default contractual hours per ISO week.
    pub max_weekly: f64,

    /// Default overtime ceiling in hours per ISO week.
    pub max_overtime: f64,

    /// Cap on total overtime hours across all employees.
    pub global_overtime_cap: Option<f64>,

    /// Maximum shifts starting on the same calendar day per employee.
    pub max_shifts_per_day: u32,

    /// Overtime cost multiplier per role.
    pub overtime_costs: BTreeMap<String, f64>,

    /// Multiplier for employees holding no role listed in `overtime_costs`.
    pub default_overtime_cost: f64,
}

impl HoursConfig {
    /// Overtime cost multiplier of an employee holding `roles`.
    ///
    /// The cheapest listed role wins.
    pub fn overtime_cost<'a>(&self, roles: impl IntoIterator<Item = &'a String>) -> f64 {
        roles
            .into_iter()
            .filter_map(|role| self.overtime_costs.get(role).copied())
            .reduce(f64::min)
            .unwrap_or(self.default_overtime_cost)
    }
}

impl Default for HoursConfig {
    fn default() -> Self {
        Self {
            max_weekly: 40.0,
            max_overtime: 0.0,
            global_overtime_cap: None,
            max_shifts_per_day: 1,
            overtime_costs: BTreeMap::new(),
            default_overtime_cost: 1.0,
        }
    }
}

/// How overnight intervals are attributed to calendar days when segmenting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MidnightPolicy {
    /// The part after midnight is indexed under the next day.
    #[default]
    Split,

    /// The whole interval stays on its start day, together with every
    /// interval of the same role it overlaps.
    Extend,
}

/// Temporal indexer settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SegmentConfig {
    pub midnight_policy: MidnightPolicy,

    /// Segment count per role and day above which a warning is logged.
    pub warn_threshold: usize,

    /// Segment count per role and day above which the run fails.
    pub hard_threshold: usize,

    /// Fail when a window segment has no covering shift.
    pub strict_windows: bool,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            midnight_policy: MidnightPolicy::Split,
            warn_threshold: 500,
            hard_threshold: 2000,
            strict_windows: false,
        }
    }
}

/// How overlapping windows combine their skill requirements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillAggregation {
    /// Per-skill maximum across covering windows.
    #[default]
    Max,

    /// Per-skill sum across covering windows.
    Sum,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SkillConfig {
    pub aggregation: SkillAggregation,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct CoverageConfig {
    /// Shifts are indivisible. Only `true` is supported.
    pub shift_integrity: bool,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            shift_integrity: true,
        }
    }
}

/// Per-hour penalty weight of each tier. Zero disables a tier.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct PenaltyWeights {
    pub unmet_window: f64,
    pub unmet_demand: f64,
    pub unmet_skill: f64,
    pub unmet_shift: f64,
    pub overstaff: f64,
    pub overtime: f64,
    pub fairness: f64,
    pub preferences: f64,
}

impl Default for PenaltyWeights {
    fn default() -> Self {
        Self {
            unmet_window: 2.0,
            unmet_demand: 1.0,
            unmet_skill: 0.8,
            unmet_shift: 1.0,
            overstaff: 0.15,
            overtime: 0.30,
            fairness: 0.05,
            preferences: 0.33,
        }
    }
}

impl PenaltyWeights {
    pub fn per_hour(&self, tier: PenaltyTier) -> f64 {
        match tier {
            PenaltyTier::UnmetWindow => self.unmet_window,
            PenaltyTier::UnmetDemand => self.unmet_demand,
            PenaltyTier::UnmetSkill => self.unmet_skill,
            PenaltyTier::UnmetShift => self.unmet_shift,
            PenaltyTier::Overstaff => self.overstaff,
            PenaltyTier::Overtime => self.overtime,
            PenaltyTier::Fairness => self.fairness,
            PenaltyTier::Preferences => self.preferences,
        }
    }

    pub fn set(&mut self, tier: PenaltyTier, per_hour: f64) {
        let slot = match tier {
            PenaltyTier::UnmetWindow => &mut self.unmet_window,
            PenaltyTier::UnmetDemand => &mut self.unmet_demand,
            PenaltyTier::UnmetSkill => &mut self.unmet_skill,
            PenaltyTier::UnmetShift => &mut self.unmet_shift,
            PenaltyTier::Overstaff => &mut self.overstaff,
            PenaltyTier::Overtime => &mut self.overtime,
            PenaltyTier::Fairness => &mut self.fairness,
            PenaltyTier::Preferences => &mut self.preferences,
        };
        *slot = per_hour;
    }
}

/// How per-hour weights become the per-minute weight table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightMode {
    /// Lift each tier above the worst case of every lower tier.
    #[default]
    Lexicographic,

    /// Use weights as given and verify dominance.
    Checked,

    /// Use weights as given; tiers intentionally trade off.
    Blended,
}

/// Objective construction settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ObjectiveConfig {
    /// Tier priority, highest first. Unlisted tiers follow in default order.
    pub priority: Vec<PenaltyTier>,

    pub mode: WeightMode,

    /// Treat dominance violations as fatal.
    pub strict: bool,

    /// Relative slack allowed when checking dominance.
    pub tolerance: f64,

    /// Largest allowed ratio between the highest and lowest weight.
    pub max_weight_ratio: f64,
}

impl Default for ObjectiveConfig {
    fn default() -> Self {
        Self {
            priority: PenaltyTier::ALL.to_vec(),
            mode: WeightMode::Lexicographic,
            strict: false,
            tolerance: 1e-9,
            max_weight_ratio: 1e12,
        }
    }
}

impl ObjectiveConfig {
    /// Full priority order: listed tiers first, then the rest in default order.
    pub fn resolved_priority(&self) -> Vec<PenaltyTier> {
        let mut order = Vec::with_capacity(PenaltyTier::ALL.len());
        for tier in self.priority.iter().chain(PenaltyTier::ALL.iter()) {
            if !order.contains(tier) {
                order.push(*tier);
            }
        }
        order
    }
}

/// Limits handed to the external engine.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SolverLimits {
    /// Maximum seconds to spend solving.
    pub time_limit_secs: Option<u64>,
}

impl SolverLimits {
    /// Returns the time limit as a Duration, if any.
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_secs.map(Duration::from_secs)
    }
}
