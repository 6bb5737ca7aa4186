//! Balanced-rotation design generation.

use ndarray::Array2;
use rand::RngCore;

use super::{check_inputs, Generator};
use crate::design::Design;
use crate::error::Result;
use crate::grid::Grid;

/// Spreads level usage evenly by rotating a per-attribute cursor.
///
/// For task `i` and option slot `k` (both 0-based) the level index of an
/// attribute with `L` levels is `(cursor + k + i) mod L`. After each task the
/// cursor advances by `options_per_screen mod L`. Levels may repeat within a
/// task when `L < options_per_screen`.
///
/// Fully deterministic: the injected randomness source is never touched.
///
/// ## Example
///
/// ```
/// use conjoint::{Attribute, Grid};
/// use conjoint::generate::BalancedGenerator;
///
/// let grid = Grid::new(vec![Attribute::new("Color", ["Red", "Blue", "Green"])]);
/// let levels = BalancedGenerator::level_matrix(&grid, 2, 2);
///
/// // task 0: cursor 0 -> [0, 1]; task 1: cursor 2 -> [(2+0+1)%3, (2+1+1)%3]
/// assert_eq!(levels.column(0).to_vec(), vec![0, 1, 0, 1]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BalancedGenerator;

impl BalancedGenerator {
    /// Level-index matrix for `num_screens` tasks of `options_per_screen`
    /// options, rows in task-major order.
    #[must_use]
    pub fn level_matrix(grid: &Grid, options_per_screen: usize, num_screens: usize) -> Array2<usize> {
        let counts = grid.level_counts();
        let mut cursors = vec![0usize; counts.len()];
        let mut levels = Array2::zeros((options_per_screen * num_screens, counts.len()));

        for i in 0..num_screens {
            for k in 0..options_per_screen {
                let row = i * options_per_screen + k;
                for (a, &count) in counts.iter().enumerate() {
                    levels[[row, a]] = (cursors[a] + k + i) % count;
                }
            }
            for (cursor, &count) in cursors.iter_mut().zip(&counts) {
                *cursor = (*cursor + options_per_screen % count) % count;
            }
        }

        levels
    }
}

impl Generator for BalancedGenerator {
    fn name(&self) -> &'static str {
        "balanced"
    }

    fn is_deterministic(&self) -> bool {
        true
    }

    fn generate(
        &self,
        grid: &Grid,
        options_per_screen: usize,
        num_screens: usize,
        _rng: &mut dyn RngCore,
    ) -> Result<Design> {
        check_inputs(grid, options_per_screen, num_screens)?;
        let levels = Self::level_matrix(grid, options_per_screen, num_screens);
        Ok(Design::from_level_matrix(grid, &levels, options_per_screen))
    }
}
