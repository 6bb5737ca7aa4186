//! Builder for generating choice designs.
//!
//! The builder is the single entry point that ties the pieces together:
//! validation, limits, respondent sizing, generation, scoring and optional
//! constraint checking.
//!
//! # Example
//!
//! ```
//! use conjoint::{Attribute, DesignBuilder, Grid, Method};
//!
//! let grid = Grid::new(vec![
//!     Attribute::new("Color", ["Red", "Blue"]),
//!     Attribute::new("Size", ["S", "L"]),
//! ]);
//!
//! let result = DesignBuilder::new(grid)
//!     .method(Method::Random)
//!     .options_per_screen(2)
//!     .num_screens(3)
//!     .seed(42)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(result.design.num_screens(), 3);
//! assert!((0.0..=1.0).contains(&result.efficiency.score));
//! assert_eq!(result.num_respondents, 300); // commercial floor
//! ```
//!
//! # Fallbacks
//!
//! `Method::Orthogonal` on a grid where some attribute does not have exactly
//! two levels produces the balanced-rotation design. This is not an error;
//! [`GeneratedDesign::fallback`] records the substitution.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::{debug, info};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::Limits;
use crate::constraints::{ConstraintManager, ConstraintReport, ConstraintSpec};
use crate::design::Design;
use crate::efficiency::{Efficiency, EfficiencyMetric};
use crate::error::{Error, Result};
use crate::generate::{AnnealingConfig, DOptimalGenerator, Method, OrthogonalGenerator};
use crate::grid::Grid;
use crate::sample_size::{SampleSizeAdvisor, SampleSizeConfig};
use crate::timing::timed;

/// A generated design with its score and study metadata.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeneratedDesign {
    /// The design.
    pub design: Design,
    /// Score and the metric behind it.
    pub efficiency: Efficiency,
    /// Method requested.
    pub method: Method,
    /// Method actually used, when it differs from the request.
    pub fallback: Option<Method>,
    /// Respondents the study should field.
    pub num_respondents: usize,
    /// Set when `num_respondents` came from the advisor.
    pub suggested_respondents: Option<usize>,
    /// Smooth power estimate for the study at `num_respondents`.
    pub expected_power: f64,
    /// Guidance for the caller.
    pub notes: Option<String>,
    /// Constraint validation, when constraints were supplied.
    pub constraint_report: Option<ConstraintReport>,
    /// Time spent generating.
    pub elapsed: Duration,
}

/// Builder for generating choice designs.
///
/// Defaults: balanced method, 3 options per screen, 10 screens, respondents
/// suggested by the advisor, D-efficiency scoring, default [`Limits`].
#[derive(Debug, Clone)]
pub struct DesignBuilder {
    grid: Grid,
    method: Method,
    options_per_screen: usize,
    num_screens: usize,
    num_respondents: Option<usize>,
    constraints: Option<ConstraintSpec>,
    metric: EfficiencyMetric,
    limits: Limits,
    annealing: AnnealingConfig,
    sample_size: SampleSizeConfig,
    restarts: usize,
    seed: Option<u64>,
}

impl DesignBuilder {
    /// Create a builder for `grid`.
    #[must_use]
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            method: Method::default(),
            options_per_screen: 3,
            num_screens: 10,
            num_respondents: None,
            constraints: None,
            metric: EfficiencyMetric::default(),
            limits: Limits::default(),
            annealing: AnnealingConfig::default(),
            sample_size: SampleSizeConfig::default(),
            restarts: 1,
            seed: None,
        }
    }

    /// Set the generation method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Set the number of options shown per screen.
    #[must_use]
    pub fn options_per_screen(mut self, options_per_screen: usize) -> Self {
        self.options_per_screen = options_per_screen;
        self
    }

    /// Set the number of screens (choice tasks) per respondent.
    #[must_use]
    pub fn num_screens(mut self, num_screens: usize) -> Self {
        self.num_screens = num_screens;
        self
    }

    /// Fix the respondent count instead of asking the advisor.
    #[must_use]
    pub fn num_respondents(mut self, num_respondents: usize) -> Self {
        self.num_respondents = Some(num_respondents);
        self
    }

    /// Validate the generated design against `constraints`.
    #[must_use]
    pub fn constraints(mut self, constraints: ConstraintSpec) -> Self {
        self.constraints = Some(constraints);
        self
    }

    /// Choose the reported efficiency metric.
    #[must_use]
    pub fn metric(mut self, metric: EfficiencyMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Set request limits.
    #[must_use]
    pub fn limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Set the D-optimal annealing schedule.
    #[must_use]
    pub fn annealing(mut self, annealing: AnnealingConfig) -> Self {
        self.annealing = annealing;
        self
    }

    /// Set respondent sizing parameters.
    ///
    /// The builder always sizes for main effects; `include_interactions` is
    /// ignored here.
    #[must_use]
    pub fn sample_size(mut self, sample_size: SampleSizeConfig) -> Self {
        self.sample_size = sample_size;
        self
    }

    /// Run the D-optimal search this many times and keep the best.
    ///
    /// With the `parallel` feature the restarts run on the Rayon pool.
    #[must_use]
    pub fn restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts;
        self
    }

    /// Seed the random source used by [`build`](Self::build).
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Generate the design.
    ///
    /// Uses the configured seed, or fresh entropy when none is set.
    ///
    /// # Errors
    ///
    /// See [`build_with_rng`](Self::build_with_rng).
    pub fn build(self) -> Result<GeneratedDesign> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.build_with_rng(&mut rng)
    }

    /// Generate the design drawing randomness from `rng`.
    ///
    /// # Errors
    ///
    /// Returns an error before any generation work if:
    /// - the grid is invalid
    /// - a count is zero or exceeds the [`Limits`]
    /// - the constraint spec names unknown attributes or levels
    /// - the annealing schedule or restart count is invalid
    pub fn build_with_rng(self, rng: &mut dyn RngCore) -> Result<GeneratedDesign> {
        self.validate()?;

        debug!(
            method = %self.method,
            grid = %self.grid,
            options_per_screen = self.options_per_screen,
            num_screens = self.num_screens,
            "generating design"
        );

        let advisor = SampleSizeAdvisor::new(&self.grid).with_config(SampleSizeConfig {
            include_interactions: false,
            ..self.sample_size.clone()
        });

        let (num_respondents, suggested_respondents, notes) = match self.num_respondents {
            Some(n) => (n, None, None),
            None => {
                let n = advisor.suggest_respondents(self.num_screens, self.options_per_screen)?;
                info!(respondents = n, "suggested respondent count");
                let note = if advisor.config().default_commercial {
                    format!(
                        "Using {n} respondents (default commercial target). For segment analysis, \
                         consider specifying segments or custom sample size."
                    )
                } else {
                    format!("Using {n} respondents (rule-of-thumb minimum).")
                };
                (n, Some(n), Some(note))
            }
        };

        let fallback = match self.method {
            Method::Orthogonal if !OrthogonalGenerator::applies_to(&self.grid) => {
                info!(
                    grid = %self.grid,
                    "orthogonal design needs all two-level attributes, using balanced rotation"
                );
                Some(Method::Balanced)
            }
            _ => None,
        };

        let generated = timed(|| self.generate(rng)).transpose()?;
        let design = generated.value;

        let efficiency = Efficiency::evaluate(&design, &self.grid, self.metric);
        let constraint_report = self
            .constraints
            .as_ref()
            .map(|spec| ConstraintManager::new(spec).validate_design(&design));

        if let Some(report) = constraint_report.as_ref().filter(|r| !r.is_valid) {
            info!(violations = report.violations.len(), "design violates constraints");
        }

        debug!(
            method = %self.method,
            metric = %efficiency.metric,
            efficiency = efficiency.score,
            elapsed_ms = generated.elapsed.as_secs_f64() * 1000.0,
            "design generated"
        );

        Ok(GeneratedDesign {
            expected_power: advisor.calculate_expected_power(
                num_respondents,
                self.num_screens,
                self.options_per_screen,
                0.2,
                0.05,
            ),
            design,
            efficiency,
            method: self.method,
            fallback,
            num_respondents,
            suggested_respondents,
            notes,
            constraint_report,
            elapsed: generated.elapsed,
        })
    }

    fn validate(&self) -> Result<()> {
        self.grid.validate()?;
        if self.options_per_screen == 0 {
            return Err(Error::invalid_params("options_per_screen must be at least 1"));
        }
        if self.num_screens == 0 {
            return Err(Error::invalid_params("num_screens must be at least 1"));
        }
        if self.num_respondents == Some(0) {
            return Err(Error::invalid_params("num_respondents must be at least 1"));
        }
        self.limits
            .check(self.options_per_screen, self.num_screens, self.num_respondents)?;
        if let Some(spec) = &self.constraints {
            spec.validate(&self.grid)?;
        }
        if self.method == Method::DOptimal {
            self.annealing.validate()?;
            if self.restarts == 0 {
                return Err(Error::invalid_params("restarts must be at least 1"));
            }
        }
        Ok(())
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Result<Design> {
        if self.method == Method::DOptimal && self.restarts > 1 {
            let generator = DOptimalGenerator::new(self.annealing.clone());
            let base_seed = rng.next_u64();

            #[cfg(feature = "parallel")]
            let report = crate::parallel::par_anneal_restarts(
                &generator,
                &self.grid,
                self.options_per_screen,
                self.num_screens,
                self.restarts,
                base_seed,
            )?;
            #[cfg(not(feature = "parallel"))]
            let report = generator.anneal_restarts(
                &self.grid,
                self.options_per_screen,
                self.num_screens,
                self.restarts,
                base_seed,
            )?;

            return Ok(report.design);
        }

        self.method
            .generator(&self.annealing)
            .generate(&self.grid, self.options_per_screen, self.num_screens, rng)
    }
}
