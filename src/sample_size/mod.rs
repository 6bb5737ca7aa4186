//! Respondent sizing and power analysis.
//!
//! [`SampleSizeAdvisor`] answers "how many respondents?" for a grid with the
//! Johnson–Orme rule of thumb, `n ≥ 500·c / (t·a)`, where `c` is the largest
//! level count (or the largest pairwise product of level counts when sizing
//! for interactions), `t` the screens per respondent and `a` the options per
//! screen. A quality buffer, practical bounds and a commercial floor are then
//! applied; see [`SampleSizeConfig`].
//!
//! The power searches (`optimize_*`) use [`statistical_power`], which is
//! monotone in every count, so each can binary-search its parameter.
//!
//! ## Example
//!
//! ```
//! use conjoint::{Attribute, Grid};
//! use conjoint::sample_size::{SampleSizeAdvisor, SampleSizeConfig};
//!
//! let grid = Grid::new(vec![
//!     Attribute::new("Brand", ["A", "B", "C", "D"]),
//!     Attribute::new("Price", ["$1", "$2", "$3"]),
//! ]);
//!
//! let advisor = SampleSizeAdvisor::new(&grid);
//! // 500·4 / (8·3) = 83.3, ×1.15 = 95.8 → 96, floor 300
//! assert_eq!(advisor.suggest_respondents(8, 3).unwrap(), 300);
//!
//! let academic = SampleSizeAdvisor::new(&grid).with_config(SampleSizeConfig {
//!     default_commercial: false,
//!     ..Default::default()
//! });
//! assert_eq!(academic.suggest_respondents(8, 3).unwrap(), 96);
//! ```

mod power;
mod search;

pub use power::{erf, expected_power, normal_cdf, statistical_power, z_alpha};
pub use search::{optimize_parameters, OptimizationRequest, PowerTarget, StudyPlan};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::grid::Grid;

/// Tuning for [`SampleSizeAdvisor::suggest_respondents`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SampleSizeConfig {
    /// Multiplicative safety margin on the rule-of-thumb base.
    pub quality_buffer: f64,
    /// Size for pairwise interactions instead of main effects.
    pub include_interactions: bool,
    /// Apply the commercial floor.
    pub default_commercial: bool,
    /// Lower bound.
    pub min_respondents: usize,
    /// Lower bound for small grids with many observations per respondent.
    pub reduced_min_respondents: usize,
    /// Upper bound.
    pub max_respondents: usize,
    /// Commercial minimum.
    pub commercial_floor: usize,
}

impl Default for SampleSizeConfig {
    fn default() -> Self {
        Self {
            quality_buffer: 0.15,
            include_interactions: false,
            default_commercial: true,
            min_respondents: 30,
            reduced_min_respondents: 20,
            max_respondents: 2000,
            commercial_floor: 300,
        }
    }
}

/// Sample-size and power questions about one grid.
#[derive(Debug, Clone)]
pub struct SampleSizeAdvisor<'a> {
    grid: &'a Grid,
    config: SampleSizeConfig,
}

impl<'a> SampleSizeAdvisor<'a> {
    /// Advisor with the default [`SampleSizeConfig`].
    #[must_use]
    pub fn new(grid: &'a Grid) -> Self {
        Self {
            grid,
            config: SampleSizeConfig::default(),
        }
    }

    /// Replace the configuration.
    #[must_use]
    pub fn with_config(mut self, config: SampleSizeConfig) -> Self {
        self.config = config;
        self
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &SampleSizeConfig {
        &self.config
    }

    /// Largest level count, or the largest pairwise product of level counts
    /// when sizing for interactions.
    ///
    /// A single-attribute grid has no pairs and uses its level count.
    #[must_use]
    pub fn max_levels(&self) -> usize {
        let counts = self.grid.level_counts();
        if !self.config.include_interactions || counts.len() < 2 {
            return counts.iter().copied().max().unwrap_or(0);
        }

        let mut max = 0;
        for (i, &a) in counts.iter().enumerate() {
            for &b in &counts[i + 1..] {
                max = max.max(a.saturating_mul(b));
            }
        }
        max
    }

    /// Suggested respondent count for `num_screens` tasks of
    /// `options_per_screen` options.
    ///
    /// Johnson–Orme base `500·c / (t·a)`, buffered to
    /// `ceil(base·(1 + quality_buffer))`, clamped to the configured bounds
    /// (the reduced minimum applies when `c ≤ 2` and `t·a ≥ 10`), then raised
    /// to the commercial floor when enabled.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParams`] if either count is zero or the
    /// quality buffer is negative.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn suggest_respondents(&self, num_screens: usize, options_per_screen: usize) -> Result<usize> {
        let observations = num_screens.saturating_mul(options_per_screen);
        if observations == 0 {
            return Err(Error::invalid_params(
                "num_screens and options_per_screen must both be at least 1",
            ));
        }
        if !(self.config.quality_buffer.is_finite() && self.config.quality_buffer >= 0.0) {
            return Err(Error::invalid_params(format!(
                "quality_buffer must be non-negative, got {}",
                self.config.quality_buffer
            )));
        }

        let c = self.max_levels();
        let base = 500.0 * c as f64 / observations as f64;
        let buffered = (base * (1.0 + self.config.quality_buffer)).ceil() as usize;

        let min = if c <= 2 && observations >= 10 {
            self.config.reduced_min_respondents
        } else {
            self.config.min_respondents
        };
        let clamped = buffered.min(self.config.max_respondents).max(min);

        if self.config.default_commercial {
            Ok(clamped.max(self.config.commercial_floor))
        } else {
            Ok(clamped)
        }
    }

    /// Smooth power estimate; see [`expected_power`].
    #[must_use]
    pub fn calculate_expected_power(
        &self,
        num_respondents: usize,
        num_screens: usize,
        options_per_screen: usize,
        effect_size: f64,
        alpha: f64,
    ) -> f64 {
        expected_power(num_respondents, num_screens, options_per_screen, effect_size, alpha)
    }

    /// Main-effect parameters: `Σ (levels − 1)`.
    #[must_use]
    pub fn estimate_parameter_count(&self) -> usize {
        self.grid.parameter_count()
    }

    /// Power of a study plan under [`statistical_power`].
    #[must_use]
    pub fn statistical_power(
        &self,
        num_respondents: usize,
        num_screens: usize,
        options_per_screen: usize,
        target: &PowerTarget,
    ) -> f64 {
        statistical_power(
            num_respondents,
            num_screens,
            options_per_screen,
            self.estimate_parameter_count(),
            target.effect_size,
            target.alpha,
        )
    }

    /// Smallest respondent count in `1..=max_respondents` reaching the target
    /// power, or `max_respondents` when none does.
    #[must_use]
    pub fn optimize_respondent_size(
        &self,
        num_screens: usize,
        options_per_screen: usize,
        target: &PowerTarget,
        max_respondents: usize,
    ) -> usize {
        search::smallest_meeting(1, max_respondents, target.target_power, |n| {
            self.statistical_power(n, num_screens, options_per_screen, target)
        })
    }

    /// Smallest screen count in `1..=max_screens` reaching the target power,
    /// or `max_screens` when none does.
    #[must_use]
    pub fn optimize_screen_count(
        &self,
        num_respondents: usize,
        options_per_screen: usize,
        target: &PowerTarget,
        max_screens: usize,
    ) -> usize {
        search::smallest_meeting(1, max_screens, target.target_power, |t| {
            self.statistical_power(num_respondents, t, options_per_screen, target)
        })
    }

    /// Smallest option count in `2..=max_options` reaching the target power,
    /// or `max_options` when none does.
    #[must_use]
    pub fn optimize_options_per_screen(
        &self,
        num_respondents: usize,
        num_screens: usize,
        target: &PowerTarget,
        max_options: usize,
    ) -> usize {
        search::smallest_meeting(2, max_options, target.target_power, |a| {
            self.statistical_power(num_respondents, num_screens, a, target)
        })
    }
}
