//! Choice design generation algorithms.
//!
//! Every algorithm consumes a [`Grid`] plus task/option counts and produces a
//! fresh [`Design`] of exactly `num_screens` tasks with `options_per_screen`
//! options each.
//!
//! ## Available Generators
//!
//! | Generator | Method name | Deterministic | Notes |
//! |-----------|-------------|---------------|-------|
//! | [`RandomGenerator`] | `random` | no | independent uniform draws |
//! | [`BalancedGenerator`] | `balanced` | yes | rotating level cursors |
//! | [`OrthogonalGenerator`] | `orthogonal` | yes | bit toggling for all-2-level grids, else balanced |
//! | [`DOptimalGenerator`] | `doptimal` | no | simulated annealing on `ln det(XᵀX)` |
//!
//! ## Usage
//!
//! All generators implement the [`Generator`] trait. Randomness is always
//! injected by the caller so concurrent calls never share a source:
//!
//! ```
//! use conjoint::{Attribute, Grid};
//! use conjoint::generate::{BalancedGenerator, Generator};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let grid = Grid::new(vec![
//!     Attribute::new("Color", ["Red", "Blue"]),
//!     Attribute::new("Size", ["S", "M", "L"]),
//! ]);
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let design = BalancedGenerator.generate(&grid, 3, 4, &mut rng).unwrap();
//!
//! assert_eq!(design.num_screens(), 4);
//! assert_eq!(design.options_per_screen(), Some(3));
//! ```

mod balanced;
pub(crate) mod doptimal;
mod orthogonal;
mod random;

pub use balanced::BalancedGenerator;
pub use doptimal::{AnnealingConfig, AnnealingReport, DOptimalGenerator, StopReason};
pub use orthogonal::OrthogonalGenerator;
pub use random::RandomGenerator;

use rand::RngCore;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::design::Design;
use crate::error::{Error, Result};
use crate::grid::Grid;

/// Trait for choice design generation algorithms.
pub trait Generator: Send + Sync {
    /// Get the name of this generation method.
    fn name(&self) -> &'static str;

    /// Whether identical inputs always produce identical designs.
    fn is_deterministic(&self) -> bool;

    /// Generate a design.
    ///
    /// Deterministic generators ignore `rng`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the grid fails [`Grid::validate`]
    /// - `options_per_screen` or `num_screens` is zero
    fn generate(
        &self,
        grid: &Grid,
        options_per_screen: usize,
        num_screens: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Design>;
}

/// Validate the inputs shared by every generator.
pub(crate) fn check_inputs(grid: &Grid, options_per_screen: usize, num_screens: usize) -> Result<()> {
    grid.validate()?;
    if options_per_screen == 0 {
        return Err(Error::invalid_params("options_per_screen must be at least 1"));
    }
    if num_screens == 0 {
        return Err(Error::invalid_params("num_screens must be at least 1"));
    }
    Ok(())
}

/// Generation algorithm selector.
///
/// Parsing is case-insensitive and accepts the long aliases
/// `balanced_overlap`, `orthogonal_array` and `d-optimal`.
///
/// ```
/// use conjoint::Method;
///
/// assert_eq!("DOptimal".parse::<Method>().unwrap(), Method::DOptimal);
/// assert_eq!("balanced_overlap".parse::<Method>().unwrap(), Method::Balanced);
/// assert!("genetic".parse::<Method>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Method {
    /// Independent uniform draws per attribute.
    Random,
    /// Rotating per-attribute level cursors.
    #[default]
    Balanced,
    /// Bit toggling for all-two-level grids, balanced rotation otherwise.
    Orthogonal,
    /// Simulated annealing on the D-optimality criterion.
    DOptimal,
}

impl Method {
    /// All methods, in documentation order.
    pub const ALL: [Method; 4] = [
        Method::Random,
        Method::Balanced,
        Method::Orthogonal,
        Method::DOptimal,
    ];

    /// Canonical lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::Balanced => "balanced",
            Self::Orthogonal => "orthogonal",
            Self::DOptimal => "doptimal",
        }
    }

    /// Instantiate the generator for this method.
    #[must_use]
    pub fn generator(self, annealing: &AnnealingConfig) -> Box<dyn Generator> {
        match self {
            Self::Random => Box::new(RandomGenerator),
            Self::Balanced => Box::new(BalancedGenerator),
            Self::Orthogonal => Box::new(OrthogonalGenerator),
            Self::DOptimal => Box::new(DOptimalGenerator::new(annealing.clone())),
        }
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "random" => Ok(Self::Random),
            "balanced" | "balanced_overlap" => Ok(Self::Balanced),
            "orthogonal" | "orthogonal_array" => Ok(Self::Orthogonal),
            "doptimal" | "d-optimal" => Ok(Self::DOptimal),
            _ => Err(Error::UnsupportedMethod(s.to_string())),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}
