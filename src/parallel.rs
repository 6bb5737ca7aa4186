//! Parallel multi-start D-optimal search using Rayon.
//!
//! Enable with the `parallel` feature flag. Restarts run on the Rayon pool,
//! each with its own seeded [`StdRng`], and the result is identical to
//! [`DOptimalGenerator::anneal_restarts`] for the same inputs.
//!
//! # Usage
//!
//! ```
//! use conjoint::{Attribute, Grid};
//! use conjoint::generate::{AnnealingConfig, DOptimalGenerator};
//! use conjoint::parallel::par_anneal_restarts;
//!
//! let grid = Grid::new(vec![
//!     Attribute::new("Color", ["Red", "Blue", "Green"]),
//!     Attribute::new("Size", ["S", "M", "L"]),
//! ]);
//! let generator = DOptimalGenerator::new(AnnealingConfig::default());
//!
//! let report = par_anneal_restarts(&generator, &grid, 3, 6, 8, 42).unwrap();
//! assert_eq!(report.design.num_screens(), 6);
//! ```

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::error::Result;
use crate::generate::doptimal::{check_restarts, pick_best};
use crate::generate::{AnnealingReport, DOptimalGenerator};
use crate::grid::Grid;

/// Best of `restarts` annealing runs executed in parallel.
///
/// Restart `i` is seeded with `base_seed + i`; ties go to the earliest
/// restart.
///
/// # Errors
///
/// Returns an error if `restarts` is zero or any run fails.
pub fn par_anneal_restarts(
    generator: &DOptimalGenerator,
    grid: &Grid,
    options_per_screen: usize,
    num_screens: usize,
    restarts: usize,
    base_seed: u64,
) -> Result<AnnealingReport> {
    check_restarts(restarts)?;
    let reports = (0..restarts as u64)
        .into_par_iter()
        .map(|i| {
            let mut rng = StdRng::seed_from_u64(base_seed.wrapping_add(i));
            generator.anneal(grid, options_per_screen, num_screens, &mut rng)
        })
        .collect::<Result<Vec<_>>>()?;
    pick_best(reports)
}
