//! Study parameter searches.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::SampleSizeAdvisor;
use crate::error::{Error, Result};
use crate::grid::Grid;

/// Power goal for the parameter searches.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PowerTarget {
    /// Power to reach.
    pub target_power: f64,
    /// Expected effect size.
    pub effect_size: f64,
    /// Significance level.
    pub alpha: f64,
}

impl Default for PowerTarget {
    fn default() -> Self {
        Self {
            target_power: 0.8,
            effect_size: 0.2,
            alpha: 0.05,
        }
    }
}

/// Smallest `x` in `low..=high` with `power(x) >= target`, assuming `power`
/// is non-decreasing. Returns `high` when no value qualifies.
pub(super) fn smallest_meeting<F>(low: usize, high: usize, target: f64, power: F) -> usize
where
    F: Fn(usize) -> f64,
{
    let mut best = high;
    let (mut lo, mut hi) = (low.max(1), high);
    while lo <= hi {
        let mid = lo + (hi - lo) / 2;
        if power(mid) >= target {
            best = mid;
            hi = mid - 1;
        } else {
            lo = mid + 1;
        }
    }
    best
}

/// Inputs to [`optimize_parameters`].
///
/// Unfixed counts start from 100 respondents, 10 screens and 3 options per
/// screen and are searched in that order, each search seeing the values
/// chosen before it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OptimizationRequest {
    /// Power goal. Target in `[0.1, 1]`, effect in `[0.1, 1]`, alpha in
    /// `[0.01, 0.1]`.
    pub target: PowerTarget,
    /// Respondent search ceiling, in `[10, 10000]`.
    pub max_respondents: usize,
    /// Screen search ceiling, in `[1, 50]`.
    pub max_screens: usize,
    /// Options search ceiling, in `[2, 10]`.
    pub max_options: usize,
    /// Use this respondent count instead of searching, in `[1, 10000]`.
    pub fixed_respondents: Option<usize>,
    /// Use this screen count instead of searching, in `[1, 50]`.
    pub fixed_screens: Option<usize>,
    /// Use this option count instead of searching, in `[2, 10]`.
    pub fixed_options: Option<usize>,
}

impl Default for OptimizationRequest {
    fn default() -> Self {
        Self {
            target: PowerTarget::default(),
            max_respondents: 1000,
            max_screens: 20,
            max_options: 5,
            fixed_respondents: None,
            fixed_screens: None,
            fixed_options: None,
        }
    }
}

fn check_range<T: PartialOrd + std::fmt::Display>(name: &str, value: T, min: T, max: T) -> Result<()> {
    if value < min || value > max {
        return Err(Error::invalid_params(format!(
            "{name} must be in [{min}, {max}], got {value}"
        )));
    }
    Ok(())
}

impl OptimizationRequest {
    /// Check every field against its documented range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParams`] naming the first field out of range.
    pub fn validate(&self) -> Result<()> {
        check_range("target_power", self.target.target_power, 0.1, 1.0)?;
        check_range("effect_size", self.target.effect_size, 0.1, 1.0)?;
        check_range("alpha", self.target.alpha, 0.01, 0.1)?;
        check_range("max_respondents", self.max_respondents, 10, 10_000)?;
        check_range("max_screens", self.max_screens, 1, 50)?;
        check_range("max_options", self.max_options, 2, 10)?;
        if let Some(n) = self.fixed_respondents {
            check_range("fixed_respondents", n, 1, 10_000)?;
        }
        if let Some(t) = self.fixed_screens {
            check_range("fixed_screens", t, 1, 50)?;
        }
        if let Some(a) = self.fixed_options {
            check_range("fixed_options", a, 2, 10)?;
        }
        Ok(())
    }
}

/// Recommended study dimensions.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StudyPlan {
    /// Respondents.
    pub num_respondents: usize,
    /// Screens per respondent.
    pub num_screens: usize,
    /// Options per screen.
    pub options_per_screen: usize,
    /// Power of this plan under [`statistical_power`](super::statistical_power).
    pub expected_power: f64,
    /// Main-effect parameters.
    pub parameter_count: usize,
    /// Number of distinct profiles the grid can form.
    pub design_complexity: u64,
    /// Warnings about the plan.
    pub notes: Vec<String>,
}

/// Choose respondents, screens and options per screen for a power goal.
///
/// # Errors
///
/// Returns an error if the grid is invalid or the request is out of range.
///
/// # Example
///
/// ```
/// use conjoint::{Attribute, Grid};
/// use conjoint::sample_size::{optimize_parameters, OptimizationRequest};
///
/// let grid = Grid::new(vec![
///     Attribute::new("Brand", ["A", "B", "C"]),
///     Attribute::new("Price", ["$1", "$2", "$3"]),
/// ]);
/// let plan = optimize_parameters(&grid, &OptimizationRequest::default()).unwrap();
///
/// assert!(plan.expected_power >= 0.8);
/// assert_eq!(plan.parameter_count, 4);
/// assert_eq!(plan.design_complexity, 9);
/// assert!(plan.notes.is_empty());
/// ```
pub fn optimize_parameters(grid: &Grid, request: &OptimizationRequest) -> Result<StudyPlan> {
    grid.validate()?;
    request.validate()?;

    let advisor = SampleSizeAdvisor::new(grid);
    let target = &request.target;

    let mut num_screens = request.fixed_screens.unwrap_or(10);
    let mut options_per_screen = request.fixed_options.unwrap_or(3);

    let num_respondents = match request.fixed_respondents {
        Some(n) => n,
        None => advisor.optimize_respondent_size(num_screens, options_per_screen, target, request.max_respondents),
    };
    if request.fixed_screens.is_none() {
        num_screens = advisor.optimize_screen_count(num_respondents, options_per_screen, target, request.max_screens);
    }
    if request.fixed_options.is_none() {
        options_per_screen =
            advisor.optimize_options_per_screen(num_respondents, num_screens, target, request.max_options);
    }

    let parameter_count = advisor.estimate_parameter_count();
    let expected_power = advisor.statistical_power(num_respondents, num_screens, options_per_screen, target);

    let mut notes = Vec::new();
    if expected_power < target.target_power {
        notes.push(format!(
            "Warning: Expected power ({expected_power:.3}) below target ({})",
            target.target_power
        ));
    }
    let observations = num_respondents * num_screens * (options_per_screen - 1);
    if parameter_count > observations {
        notes.push("Warning: Insufficient observations for parameter estimation".to_string());
    }

    Ok(StudyPlan {
        num_respondents,
        num_screens,
        options_per_screen,
        expected_power,
        parameter_count,
        design_complexity: grid.complexity(),
        notes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Attribute;

    fn grid() -> Grid {
        Grid::new(vec![
            Attribute::new("Brand", ["A", "B", "C", "D"]),
            Attribute::new("Price", ["$1", "$2", "$3"]),
            Attribute::new("Size", ["S", "L"]),
        ])
    }

    #[test]
    fn test_smallest_meeting() {
        assert_eq!(smallest_meeting(1, 100, 37.0, |x| x as f64), 37);
        assert_eq!(smallest_meeting(1, 100, 0.0, |x| x as f64), 1);
        assert_eq!(smallest_meeting(1, 100, 500.0, |x| x as f64), 100);
        assert_eq!(smallest_meeting(2, 5, 3.0, |x| x as f64), 3);
        // Empty range returns the ceiling
        assert_eq!(smallest_meeting(2, 1, 0.0, |x| x as f64), 1);
    }

    #[test]
    fn test_default_plan() {
        let plan = optimize_parameters(&grid(), &OptimizationRequest::default()).unwrap();

        // p = 6; Φ(0.2·√(20n) − 1.96) ≥ 0.8 first at n = 10
        assert_eq!(plan.num_respondents, 10);
        assert_eq!(plan.num_screens, 10);
        assert_eq!(plan.options_per_screen, 3);
        assert_eq!(plan.parameter_count, 6);
        assert_eq!(plan.design_complexity, 24);
        assert!(plan.expected_power >= 0.8);
        assert!(plan.notes.is_empty());
    }

    #[test]
    fn test_fixed_values_kept() {
        let request = OptimizationRequest {
            fixed_respondents: Some(50),
            fixed_screens: Some(4),
            fixed_options: Some(2),
            ..Default::default()
        };
        let plan = optimize_parameters(&grid(), &request).unwrap();
        assert_eq!(
            (plan.num_respondents, plan.num_screens, plan.options_per_screen),
            (50, 4, 2)
        );
    }

    #[test]
    fn test_warnings() {
        let request = OptimizationRequest {
            fixed_respondents: Some(1),
            fixed_screens: Some(1),
            fixed_options: Some(2),
            ..Default::default()
        };
        let plan = optimize_parameters(&grid(), &request).unwrap();
        assert_eq!(plan.expected_power, 0.0);
        assert_eq!(plan.notes.len(), 2);
        assert!(plan.notes[0].starts_with("Warning: Expected power (0.000) below target (0.8)"));
        assert_eq!(plan.notes[1], "Warning: Insufficient observations for parameter estimation");
    }

    #[test]
    fn test_request_ranges() {
        let cases = [
            OptimizationRequest {
                target: PowerTarget { target_power: 0.05, ..Default::default() },
                ..Default::default()
            },
            OptimizationRequest {
                target: PowerTarget { alpha: 0.2, ..Default::default() },
                ..Default::default()
            },
            OptimizationRequest { max_respondents: 5, ..Default::default() },
            OptimizationRequest { max_options: 11, ..Default::default() },
            OptimizationRequest { fixed_options: Some(1), ..Default::default() },
            OptimizationRequest { fixed_screens: Some(51), ..Default::default() },
        ];
        for request in cases {
            assert!(matches!(
                optimize_parameters(&grid(), &request),
                Err(Error::InvalidParams { .. })
            ));
        }
    }
}
