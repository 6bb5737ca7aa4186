//! D-optimality evaluation of choice designs.
//!
//! A design is scored through its dummy-coded design matrix `X` and the
//! information matrix `XᵀX`:
//!
//! - [`d_optimality`]: `ln det(XᵀX)`, the objective maximized by the D-optimal
//!   search; `-∞` when the determinant is at or below `1e-10`
//! - [`d_efficiency`]: `det(XᵀX)^(1/p) / n`, clamped to `[0, 1]`, the score
//!   reported to callers
//!
//! A singular information matrix means some parameter cannot be estimated
//! from the design. That is never an error: the efficiency simply drops to
//! `0.0`.
//!
//! ## Example
//!
//! ```
//! use conjoint::{Attribute, ChoiceOption, ChoiceTask, Design, Grid};
//! use conjoint::efficiency::d_efficiency;
//!
//! let grid = Grid::new(vec![Attribute::new("Color", ["Red", "Blue"])]);
//! let design = Design::new(vec![
//!     ChoiceTask::new(1, vec![ChoiceOption::from([("Color", "Red")]), ChoiceOption::from([("Color", "Blue")])]),
//!     ChoiceTask::new(2, vec![ChoiceOption::from([("Color", "Blue")]), ChoiceOption::from([("Color", "Red")])]),
//! ]);
//!
//! // XᵀX = [[2]], p = 1, n = 4
//! assert!((d_efficiency(&design, &grid) - 0.5).abs() < 1e-12);
//! ```

mod matrix;

pub use matrix::{
    design_matrix, design_matrix_from_levels, determinant, information_matrix, log_determinant,
};

use ndarray::Array2;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::design::{level_balance_score, Design};
use crate::grid::Grid;

/// Determinants at or below this value are treated as singular.
pub const SINGULARITY_THRESHOLD: f64 = 1e-10;

/// Which score backs a reported efficiency value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EfficiencyMetric {
    /// Normalized D-efficiency, `det(XᵀX)^(1/p) / n`.
    #[default]
    DEfficiency,
    /// Grid-free level-balance score; see [`level_balance_score`].
    LevelBalance,
}

impl fmt::Display for EfficiencyMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DEfficiency => write!(f, "d-efficiency"),
            Self::LevelBalance => write!(f, "level-balance"),
        }
    }
}

/// An efficiency score tagged with the metric that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Efficiency {
    /// The metric used.
    pub metric: EfficiencyMetric,
    /// Score in `[0, 1]`; higher is better.
    pub score: f64,
}

impl Efficiency {
    /// Score `design` with `metric`.
    #[must_use]
    pub fn evaluate(design: &Design, grid: &Grid, metric: EfficiencyMetric) -> Self {
        let score = match metric {
            EfficiencyMetric::DEfficiency => d_efficiency(design, grid),
            EfficiencyMetric::LevelBalance => level_balance_score(design),
        };
        Self { metric, score }
    }
}

/// D-optimality criterion: `ln det(XᵀX)` for design matrix `x`.
///
/// Returns `f64::NEG_INFINITY` when the information matrix is singular
/// (determinant ≤ [`SINGULARITY_THRESHOLD`]) or has no parameters.
#[must_use]
pub fn d_optimality(x: &Array2<f64>) -> f64 {
    if x.ncols() == 0 {
        return f64::NEG_INFINITY;
    }
    let info = information_matrix(x);
    match log_determinant(info.view()) {
        Some(log_det) if log_det > SINGULARITY_THRESHOLD.ln() => log_det,
        _ => f64::NEG_INFINITY,
    }
}

/// Normalized D-efficiency of a design matrix, in `[0, 1]`.
///
/// `det(XᵀX)^(1/p) / n` with `p` columns and `n` rows, clamped to `[0, 1]`.
/// Returns `0.0` when the information matrix is singular.
#[must_use]
pub fn d_efficiency_of_matrix(x: &Array2<f64>) -> f64 {
    let (n, p) = x.dim();
    if n == 0 || p == 0 {
        return 0.0;
    }

    let log_det = d_optimality(x);
    if !log_det.is_finite() {
        return 0.0;
    }

    let efficiency = (log_det / p as f64).exp() / n as f64;
    efficiency.clamp(0.0, 1.0)
}

/// Normalized D-efficiency of `design` against `grid`, in `[0, 1]`.
#[must_use]
pub fn d_efficiency(design: &Design, grid: &Grid) -> f64 {
    d_efficiency_of_matrix(&design_matrix(design, grid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::{ChoiceOption, ChoiceTask};
    use crate::grid::Attribute;
    use ndarray::array;

    fn opt(color: &str, size: &str) -> ChoiceOption {
        ChoiceOption::from([("Color", color), ("Size", size)])
    }

    #[test]
    fn test_identity_design_matrix() {
        let x = array![[1.0, 0.0], [0.0, 1.0]];
        let d = d_optimality(&x);
        assert!(d >= 0.0);
        assert!(d.abs() < 1e-12);
    }

    #[test]
    fn test_single_attribute_efficiency() {
        let grid = Grid::new(vec![Attribute::new("Color", ["Red", "Blue"])]);
        let design = Design::new(vec![
            ChoiceTask::new(
                1,
                vec![ChoiceOption::from([("Color", "Red")]), ChoiceOption::from([("Color", "Blue")])],
            ),
            ChoiceTask::new(
                2,
                vec![ChoiceOption::from([("Color", "Blue")]), ChoiceOption::from([("Color", "Red")])],
            ),
        ]);
        let eff = d_efficiency(&design, &grid);
        assert!((eff - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_unused_level_is_singular() {
        // Blue never appears, so its column is all zeros
        let grid = Grid::new(vec![
            Attribute::new("Color", ["Red", "Blue"]),
            Attribute::new("Size", ["S", "L"]),
        ]);
        let design = Design::new(vec![ChoiceTask::new(
            1,
            vec![opt("Red", "S"), opt("Red", "L"), opt("Red", "L")],
        )]);
        assert_eq!(d_efficiency(&design, &grid), 0.0);
        assert_eq!(
            d_optimality(&design_matrix(&design, &grid)),
            f64::NEG_INFINITY
        );
    }

    #[test]
    fn test_fewer_options_than_parameters() {
        let grid = Grid::new(vec![
            Attribute::new("A", ["a0", "a1", "a2"]),
            Attribute::new("B", ["b0", "b1", "b2"]),
            Attribute::new("C", ["c0", "c1", "c2"]),
        ]);
        let design = Design::new(vec![ChoiceTask::new(
            1,
            vec![
                ChoiceOption::from([("A", "a1"), ("B", "b1"), ("C", "c1")]),
                ChoiceOption::from([("A", "a2"), ("B", "b2"), ("C", "c2")]),
            ],
        )]);
        assert_eq!(d_efficiency(&design, &grid), 0.0);
    }

    #[test]
    fn test_single_level_attribute_is_singular() {
        let grid = Grid::new(vec![Attribute::new("Brand", ["Only"])]);
        let design = Design::new(vec![ChoiceTask::new(
            1,
            vec![ChoiceOption::from([("Brand", "Only")])],
        )]);
        assert_eq!(d_efficiency(&design, &grid), 0.0);
    }

    #[test]
    fn test_efficiency_bounded() {
        let grid = Grid::new(vec![
            Attribute::new("Color", ["Red", "Blue"]),
            Attribute::new("Size", ["S", "L"]),
        ]);
        let design = Design::new(vec![
            ChoiceTask::new(1, vec![opt("Red", "S"), opt("Blue", "L")]),
            ChoiceTask::new(2, vec![opt("Blue", "S"), opt("Red", "L")]),
        ]);
        let eff = d_efficiency(&design, &grid);
        assert!(eff > 0.0 && eff <= 1.0);
        // XᵀX = [[2,1],[1,2]], det = 3, p = 2, n = 4
        assert!((eff - 3.0_f64.sqrt() / 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_metric_tagging() {
        let grid = Grid::new(vec![
            Attribute::new("Color", ["Red", "Blue"]),
            Attribute::new("Size", ["S", "L"]),
        ]);
        let design = Design::new(vec![ChoiceTask::new(
            1,
            vec![opt("Red", "S"), opt("Blue", "L")],
        )]);
        let eff = Efficiency::evaluate(&design, &grid, EfficiencyMetric::LevelBalance);
        assert_eq!(eff.metric, EfficiencyMetric::LevelBalance);
        assert!((eff.score - 1.0).abs() < 1e-12);
    }
}
