//! Closed-form power approximations.
//!
//! Two approximations are provided:
//!
//! - [`expected_power`]: a smooth `tanh` curve over total observations, used
//!   for quick feedback next to a suggested respondent count
//! - [`statistical_power`]: a normal approximation over the choice
//!   observations left after estimating the parameters, used by the
//!   parameter searches because it is monotone in every count

/// One-sided critical value for significance level `alpha`.
///
/// Only the conventional levels are tabulated: `0.05 → 1.96`,
/// `0.01 → 2.576`, anything else `→ 1.645`.
#[must_use]
pub fn z_alpha(alpha: f64) -> f64 {
    match alpha {
        a if (a - 0.05).abs() < 1e-9 => 1.96,
        a if (a - 0.01).abs() < 1e-9 => 2.576,
        _ => 1.645,
    }
}

/// Error function.
///
/// Chebyshev approximation of `erfc`, fractional error below `1.2e-7`
/// everywhere.
#[must_use]
pub fn erf(x: f64) -> f64 {
    const COEFFICIENTS: [f64; 10] = [
        -1.265_512_23,
        1.000_023_68,
        0.374_091_96,
        0.096_784_18,
        -0.186_288_06,
        0.278_868_07,
        -1.135_203_98,
        1.488_515_87,
        -0.822_152_23,
        0.170_872_77,
    ];

    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let poly = COEFFICIENTS
        .iter()
        .rev()
        .fold(0.0, |acc, &c| acc * t + c);
    let erfc = t * (-z * z + poly).exp();

    if x >= 0.0 {
        1.0 - erfc
    } else {
        erfc - 1.0
    }
}

/// Standard normal cumulative distribution function.
#[must_use]
pub fn normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

/// Smooth power estimate from the raw observation count.
///
/// `term = sqrt(n·t·a·effect²) − zα` and the result is
/// `0.5 + 0.5·tanh(term / 2)` clamped to `[0.01, 0.99]`.
///
/// ```
/// use conjoint::sample_size::expected_power;
///
/// let low = expected_power(50, 8, 3, 0.2, 0.05);
/// let high = expected_power(500, 8, 3, 0.2, 0.05);
/// assert!(low < high);
/// assert!(high <= 0.99);
/// ```
#[must_use]
pub fn expected_power(
    num_respondents: usize,
    num_screens: usize,
    options_per_screen: usize,
    effect_size: f64,
    alpha: f64,
) -> f64 {
    let total = num_respondents as f64 * num_screens as f64 * options_per_screen as f64;
    let term = (total * effect_size * effect_size).sqrt() - z_alpha(alpha);
    (0.5 + 0.5 * (term / 2.0).tanh()).clamp(0.01, 0.99)
}

/// Normal-approximation power for estimating `parameter_count` parameters.
///
/// Each task contributes `options_per_screen − 1` observations. With
/// `total = n·t·(a − 1)` and `df = total − p`, the power is
/// `Φ(effect·√total − zα)`, or `0.0` when `df ≤ 0`.
///
/// Non-decreasing in each of the three counts.
///
/// ```
/// use conjoint::sample_size::statistical_power;
///
/// // Too few observations for 6 parameters
/// assert_eq!(statistical_power(1, 2, 2, 6, 0.2, 0.05), 0.0);
/// assert!(statistical_power(200, 10, 3, 6, 0.2, 0.05) > 0.99);
/// ```
#[must_use]
pub fn statistical_power(
    num_respondents: usize,
    num_screens: usize,
    options_per_screen: usize,
    parameter_count: usize,
    effect_size: f64,
    alpha: f64,
) -> f64 {
    let total = num_respondents
        .saturating_mul(num_screens)
        .saturating_mul(options_per_screen.saturating_sub(1));
    if total <= parameter_count {
        return 0.0;
    }

    let ncp = effect_size * (total as f64).sqrt();
    normal_cdf(ncp - z_alpha(alpha)).clamp(0.0, 1.0)
}
