//! D-optimal design search by simulated annealing.
//!
//! The objective is `ln det(XᵀX)` of the dummy-coded design matrix (see
//! [`d_optimality`]). The search holds the design as a level-index matrix and
//! perturbs one cell per iteration:
//!
//! 1. draw a uniformly random starting design, exactly as
//!    [`RandomGenerator`](super::RandomGenerator) would
//! 2. pick a random task, option and attribute, and reassign a random level
//! 3. accept improvements outright; accept worse candidates with probability
//!    `exp(Δ / T)`
//! 4. cool `T *= cooling_rate` and stop at the iteration cap, after a streak of
//!    rejections, or once `T` drops below `1e-10`
//!
//! The best design seen is returned, so the result never scores below the
//! starting design.

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{check_inputs, Generator, RandomGenerator};
use crate::design::Design;
use crate::efficiency::{d_optimality, design_matrix_from_levels};
use crate::error::{Error, Result};
use crate::grid::Grid;

/// Temperatures below this end the search.
const MIN_TEMPERATURE: f64 = 1e-10;

/// Annealing schedule and stopping rules.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AnnealingConfig {
    /// Upper bound on mutation steps.
    pub max_iterations: usize,
    /// Accepted for compatibility with existing configurations; any strict
    /// improvement resets the rejection streak regardless of its size.
    pub convergence_threshold: f64,
    /// Starting temperature.
    pub initial_temperature: f64,
    /// Multiplicative cooling per iteration, in `(0, 1]`.
    pub cooling_rate: f64,
    /// Consecutive rejections that end the search.
    pub max_no_improvement: usize,
}

impl Default for AnnealingConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            convergence_threshold: 1e-6,
            initial_temperature: 1.0,
            cooling_rate: 0.95,
            max_no_improvement: 50,
        }
    }
}

impl AnnealingConfig {
    /// Check the schedule is usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParams`] for a cooling rate outside `(0, 1]`, a
    /// negative or non-finite temperature or threshold, or a zero
    /// `max_no_improvement`.
    pub fn validate(&self) -> Result<()> {
        if !(self.cooling_rate > 0.0 && self.cooling_rate <= 1.0) {
            return Err(Error::invalid_params(format!(
                "cooling_rate must be in (0, 1], got {}",
                self.cooling_rate
            )));
        }
        if !(self.initial_temperature.is_finite() && self.initial_temperature >= 0.0) {
            return Err(Error::invalid_params(format!(
                "initial_temperature must be finite and non-negative, got {}",
                self.initial_temperature
            )));
        }
        if !(self.convergence_threshold.is_finite() && self.convergence_threshold >= 0.0) {
            return Err(Error::invalid_params(format!(
                "convergence_threshold must be finite and non-negative, got {}",
                self.convergence_threshold
            )));
        }
        if self.max_no_improvement == 0 {
            return Err(Error::invalid_params("max_no_improvement must be at least 1"));
        }
        Ok(())
    }
}

/// Why the search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StopReason {
    /// Ran `max_iterations` steps.
    MaxIterations,
    /// Hit `max_no_improvement` consecutive rejections.
    NoImprovement,
    /// Temperature fell below the floor.
    TemperatureFloor,
}

/// Outcome of one annealing run.
#[derive(Debug, Clone)]
pub struct AnnealingReport {
    /// Best design found.
    pub design: Design,
    /// `ln det(XᵀX)` of the best design, `-∞` if singular.
    pub best_log_det: f64,
    /// `ln det(XᵀX)` of the random starting design.
    pub initial_log_det: f64,
    /// Mutation steps performed.
    pub iterations: usize,
    /// Candidates accepted, including worse ones.
    pub accepted: usize,
    /// Stopping rule that fired.
    pub stop: StopReason,
}

impl AnnealingReport {
    /// Gain in `ln det` over the starting design.
    #[must_use]
    pub fn improvement(&self) -> f64 {
        if self.best_log_det == self.initial_log_det {
            0.0
        } else {
            self.best_log_det - self.initial_log_det
        }
    }
}

/// Simulated-annealing search for designs maximizing `ln det(XᵀX)`.
#[derive(Debug, Clone, Default)]
pub struct DOptimalGenerator {
    config: AnnealingConfig,
}

impl DOptimalGenerator {
    /// Create a generator with the given schedule.
    #[must_use]
    pub fn new(config: AnnealingConfig) -> Self {
        Self { config }
    }

    /// The annealing schedule.
    #[must_use]
    pub fn config(&self) -> &AnnealingConfig {
        &self.config
    }

    /// Run the search and report how it went.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid grid, zero counts, or an invalid
    /// [`AnnealingConfig`].
    pub fn anneal<R: Rng + ?Sized>(
        &self,
        grid: &Grid,
        options_per_screen: usize,
        num_screens: usize,
        rng: &mut R,
    ) -> Result<AnnealingReport> {
        check_inputs(grid, options_per_screen, num_screens)?;
        self.config.validate()?;

        let counts = grid.level_counts();
        let rows = options_per_screen * num_screens;
        let score = |levels: &Array2<usize>| d_optimality(&design_matrix_from_levels(grid, levels));

        let mut current = RandomGenerator::level_matrix(grid, rows, rng);
        let mut current_score = score(&current);
        let initial_log_det = current_score;
        let mut best = current.clone();
        let mut best_score = current_score;

        let mut temperature = self.config.initial_temperature;
        let mut no_improvement = 0;
        let mut accepted = 0;
        let mut iterations = 0;
        let mut stop = StopReason::MaxIterations;

        while iterations < self.config.max_iterations {
            iterations += 1;

            let task = rng.gen_range(0..num_screens);
            let option = rng.gen_range(0..options_per_screen);
            let attr = rng.gen_range(0..counts.len());
            let level = rng.gen_range(0..counts[attr]);
            let row = task * options_per_screen + option;

            let previous = current[[row, attr]];
            current[[row, attr]] = level;
            let candidate_score = score(&current);

            if candidate_score > current_score {
                no_improvement = 0;
                current_score = candidate_score;
                accepted += 1;
                if candidate_score > best_score {
                    best_score = candidate_score;
                    best.assign(&current);
                }
            } else if rng.gen::<f64>() < acceptance_probability(candidate_score, current_score, temperature) {
                current_score = candidate_score;
                accepted += 1;
            } else {
                current[[row, attr]] = previous;
                no_improvement += 1;
                if no_improvement >= self.config.max_no_improvement {
                    stop = StopReason::NoImprovement;
                    break;
                }
            }

            temperature *= self.config.cooling_rate;
            if temperature < MIN_TEMPERATURE {
                stop = StopReason::TemperatureFloor;
                break;
            }
        }

        Ok(AnnealingReport {
            design: Design::from_level_matrix(grid, &best, options_per_screen),
            best_log_det: best_score,
            initial_log_det,
            iterations,
            accepted,
            stop,
        })
    }
}

impl DOptimalGenerator {
    /// Best of `restarts` independent runs.
    ///
    /// Restart `i` draws from `StdRng::seed_from_u64(base_seed + i)`, so the
    /// outcome depends only on the inputs. Ties go to the earliest restart.
    ///
    /// # Errors
    ///
    /// Returns an error if `restarts` is zero or any run fails.
    pub fn anneal_restarts(
        &self,
        grid: &Grid,
        options_per_screen: usize,
        num_screens: usize,
        restarts: usize,
        base_seed: u64,
    ) -> Result<AnnealingReport> {
        check_restarts(restarts)?;
        let mut reports = Vec::with_capacity(restarts);
        for i in 0..restarts as u64 {
            let mut rng = StdRng::seed_from_u64(base_seed.wrapping_add(i));
            reports.push(self.anneal(grid, options_per_screen, num_screens, &mut rng)?);
        }
        pick_best(reports)
    }
}

pub(crate) fn check_restarts(restarts: usize) -> Result<()> {
    if restarts == 0 {
        return Err(Error::invalid_params("restarts must be at least 1"));
    }
    Ok(())
}

/// Highest `best_log_det`, earliest first on ties.
pub(crate) fn pick_best(reports: Vec<AnnealingReport>) -> Result<AnnealingReport> {
    reports
        .into_iter()
        .reduce(|best, report| {
            if report.best_log_det > best.best_log_det {
                report
            } else {
                best
            }
        })
        .ok_or_else(|| Error::invalid_params("restarts must be at least 1"))
}

/// Metropolis acceptance for a non-improving candidate.
fn acceptance_probability(candidate: f64, current: f64, temperature: f64) -> f64 {
    if temperature <= 0.0 {
        return 0.0;
    }
    let p = ((candidate - current) / temperature).exp();
    // -inf to -inf gives NaN
    if p.is_nan() {
        0.0
    } else {
        p
    }
}

impl Generator for DOptimalGenerator {
    fn name(&self) -> &'static str {
        "doptimal"
    }

    fn is_deterministic(&self) -> bool {
        false
    }

    fn generate(
        &self,
        grid: &Grid,
        options_per_screen: usize,
        num_screens: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Design> {
        self.anneal(grid, options_per_screen, num_screens, rng)
            .map(|report| report.design)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::efficiency::d_efficiency;
    use crate::grid::Attribute;

    fn grid() -> Grid {
        Grid::new(vec![
            Attribute::new("Color", ["Red", "Blue", "Green"]),
            Attribute::new("Size", ["S", "M", "L"]),
            Attribute::new("Price", ["$10", "$20"]),
        ])
    }

    #[test]
    fn test_never_worse_than_random_start() {
        for seed in 0..5 {
            let generator = DOptimalGenerator::default();
            let report = generator
                .anneal(&grid(), 3, 6, &mut StdRng::seed_from_u64(seed))
                .unwrap();
            let random = RandomGenerator
                .generate(&grid(), 3, 6, &mut StdRng::seed_from_u64(seed))
                .unwrap();

            assert!(report.best_log_det >= report.initial_log_det);
            assert!(d_efficiency(&report.design, &grid()) >= d_efficiency(&random, &grid()));
        }
    }

    #[test]
    fn test_short_run_shape() {
        let generator = DOptimalGenerator::new(AnnealingConfig {
            max_iterations: 10,
            ..Default::default()
        });
        let mut rng = StdRng::seed_from_u64(9);
        let report = generator.anneal(&grid(), 2, 4, &mut rng).unwrap();

        assert_eq!(report.design.num_screens(), 4);
        assert_eq!(report.design.options_per_screen(), Some(2));
        assert!(report.iterations <= 10);
        let eff = d_efficiency(&report.design, &grid());
        assert!((0.0..=1.0).contains(&eff));
    }

    #[test]
    fn test_zero_iterations_returns_start() {
        let generator = DOptimalGenerator::new(AnnealingConfig {
            max_iterations: 0,
            ..Default::default()
        });
        let report = generator
            .anneal(&grid(), 3, 4, &mut StdRng::seed_from_u64(2))
            .unwrap();
        let random = RandomGenerator
            .generate(&grid(), 3, 4, &mut StdRng::seed_from_u64(2))
            .unwrap();

        assert_eq!(report.design, random);
        assert_eq!(report.iterations, 0);
        assert_eq!(report.stop, StopReason::MaxIterations);
        assert_eq!(report.improvement(), 0.0);
    }

    #[test]
    fn test_rejection_streak_stops() {
        // Single level: every candidate equals the (singular) current design
        let grid = Grid::new(vec![Attribute::new("Brand", ["Only"])]);
        let report = DOptimalGenerator::new(AnnealingConfig {
            max_iterations: 1000,
            cooling_rate: 1.0,
            ..Default::default()
        })
        .anneal(&grid, 2, 2, &mut StdRng::seed_from_u64(0))
        .unwrap();

        assert_eq!(report.stop, StopReason::NoImprovement);
        assert_eq!(report.iterations, 50);
        assert_eq!(report.accepted, 0);
        assert_eq!(report.best_log_det, f64::NEG_INFINITY);
    }

    #[test]
    fn test_small_gains_reset_rejection_streak() {
        let run = |threshold: f64, seed: u64| {
            DOptimalGenerator::new(AnnealingConfig {
                max_iterations: 500,
                convergence_threshold: threshold,
                cooling_rate: 1.0,
                max_no_improvement: 3,
                ..Default::default()
            })
            .anneal(&grid(), 3, 6, &mut StdRng::seed_from_u64(seed))
            .unwrap()
        };

        for seed in 0..5 {
            let exact = run(0.0, seed);
            let coarse = run(f64::MAX, seed);
            assert_eq!(exact.iterations, coarse.iterations);
            assert_eq!(exact.stop, coarse.stop);
            assert_eq!(exact.design, coarse.design);
            assert_eq!(exact.best_log_det, coarse.best_log_det);
        }
    }

    #[test]
    fn test_temperature_floor_stops() {
        let report = DOptimalGenerator::new(AnnealingConfig {
            max_iterations: 10_000,
            cooling_rate: 0.001,
            ..Default::default()
        })
        .anneal(&grid(), 3, 6, &mut StdRng::seed_from_u64(4))
        .unwrap();

        // 0.001^k < 1e-10 first at k = 4
        assert_eq!(report.stop, StopReason::TemperatureFloor);
        assert_eq!(report.iterations, 4);
    }

    #[test]
    fn test_config_validation() {
        assert!(AnnealingConfig::default().validate().is_ok());
        let bad = [
            AnnealingConfig { cooling_rate: 0.0, ..Default::default() },
            AnnealingConfig { cooling_rate: 1.5, ..Default::default() },
            AnnealingConfig { initial_temperature: -1.0, ..Default::default() },
            AnnealingConfig { convergence_threshold: f64::NAN, ..Default::default() },
            AnnealingConfig { max_no_improvement: 0, ..Default::default() },
        ];
        for config in bad {
            let generator = DOptimalGenerator::new(config);
            assert!(matches!(
                generator.anneal(&grid(), 2, 2, &mut StdRng::seed_from_u64(0)),
                Err(Error::InvalidParams { .. })
            ));
        }
    }

    #[test]
    fn test_restarts_pick_best() {
        let generator = DOptimalGenerator::new(AnnealingConfig {
            max_iterations: 20,
            ..Default::default()
        });
        let best = generator.anneal_restarts(&grid(), 3, 4, 4, 100).unwrap();
        for i in 0..4 {
            let single = generator
                .anneal(&grid(), 3, 4, &mut StdRng::seed_from_u64(100 + i))
                .unwrap();
            assert!(best.best_log_det >= single.best_log_det);
        }

        let again = generator.anneal_restarts(&grid(), 3, 4, 4, 100).unwrap();
        assert_eq!(best.design, again.design);
        assert!(generator.anneal_restarts(&grid(), 3, 4, 0, 100).is_err());
    }

    #[test]
    fn test_acceptance_probability() {
        assert_eq!(acceptance_probability(-1.0, 0.0, 0.0), 0.0);
        assert!((acceptance_probability(-1.0, 0.0, 1.0) - (-1.0_f64).exp()).abs() < 1e-12);
        assert_eq!(acceptance_probability(f64::NEG_INFINITY, f64::NEG_INFINITY, 1.0), 0.0);
        assert_eq!(acceptance_probability(f64::NEG_INFINITY, 2.0, 1.0), 0.0);
    }
}
