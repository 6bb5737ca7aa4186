//! Uniform random design generation.

use ndarray::Array2;
use rand::{Rng, RngCore};

use super::{check_inputs, Generator};
use crate::design::Design;
use crate::error::Result;
use crate::grid::Grid;

/// Draws every attribute level of every option independently and uniformly.
///
/// No balance guarantees: a level may never appear, and options within a
/// task may repeat.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomGenerator;

impl RandomGenerator {
    /// Random level-index matrix with `rows` options.
    ///
    /// Draw order is row-major (option by option, attribute by attribute), so
    /// a seeded source always yields the same matrix.
    pub(crate) fn level_matrix<R: Rng + ?Sized>(grid: &Grid, rows: usize, rng: &mut R) -> Array2<usize> {
        let counts = grid.level_counts();
        let mut levels = Array2::zeros((rows, counts.len()));
        for row in 0..rows {
            for (a, &count) in counts.iter().enumerate() {
                levels[[row, a]] = rng.gen_range(0..count);
            }
        }
        levels
    }
}

impl Generator for RandomGenerator {
    fn name(&self) -> &'static str {
        "random"
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
        check_inputs(grid, options_per_screen, num_screens)?;
        let levels = Self::level_matrix(grid, options_per_screen * num_screens, rng);
        Ok(Design::from_level_matrix(grid, &levels, options_per_screen))
    }
}
