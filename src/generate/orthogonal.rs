//! Bit-toggle designs for all-two-level grids.

use ndarray::Array2;
use rand::RngCore;

use super::{check_inputs, BalancedGenerator, Generator};
use crate::design::Design;
use crate::error::Result;
use crate::grid::Grid;

/// Deterministic toggle pattern for grids where every attribute has exactly
/// two levels.
///
/// The level of attribute `a` in option `k` of task `i` is `(i + k + a) mod 2`.
/// For any other grid the output is exactly the [`BalancedGenerator`] design
/// for the same inputs.
///
/// ## Example
///
/// ```
/// use conjoint::{Attribute, Grid};
/// use conjoint::generate::{BalancedGenerator, OrthogonalGenerator};
///
/// let mixed = Grid::new(vec![
///     Attribute::new("Color", ["Red", "Blue"]),
///     Attribute::new("Size", ["S", "M", "L"]),
/// ]);
/// assert!(!OrthogonalGenerator::applies_to(&mixed));
/// assert_eq!(
///     OrthogonalGenerator::level_matrix(&mixed, 3, 4),
///     BalancedGenerator::level_matrix(&mixed, 3, 4),
/// );
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct OrthogonalGenerator;

impl OrthogonalGenerator {
    /// Whether the toggle pattern is used for `grid`.
    #[must_use]
    pub fn applies_to(grid: &Grid) -> bool {
        grid.is_two_level()
    }

    /// Level-index matrix, rows in task-major order.
    #[must_use]
    pub fn level_matrix(grid: &Grid, options_per_screen: usize, num_screens: usize) -> Array2<usize> {
        if !Self::applies_to(grid) {
            return BalancedGenerator::level_matrix(grid, options_per_screen, num_screens);
        }

        let rows = options_per_screen * num_screens;
        Array2::from_shape_fn((rows, grid.num_attributes()), |(row, a)| {
            let (i, k) = (row / options_per_screen, row % options_per_screen);
            (i + k + a) % 2
        })
    }
}

impl Generator for OrthogonalGenerator {
    fn name(&self) -> &'static str {
        "orthogonal"
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Attribute;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_toggle_pattern() {
        let grid = Grid::new(vec![
            Attribute::new("Color", ["Red", "Blue"]),
            Attribute::new("Size", ["S", "L"]),
            Attribute::new("Brand", ["A", "B"]),
        ]);
        let levels = OrthogonalGenerator::level_matrix(&grid, 2, 2);

        assert_eq!(levels.row(0).to_vec(), vec![0, 1, 0]);
        assert_eq!(levels.row(1).to_vec(), vec![1, 0, 1]);
        assert_eq!(levels.row(2).to_vec(), vec![1, 0, 1]);
        assert_eq!(levels.row(3).to_vec(), vec![0, 1, 0]);
    }

    #[test]
    fn test_fallback_matches_balanced() {
        let grid = Grid::new(vec![
            Attribute::new("Color", ["Red", "Blue"]),
            Attribute::new("Size", ["S", "M", "L"]),
        ]);
        let mut rng = StdRng::seed_from_u64(0);
        for (options, screens) in [(1, 1), (2, 5), (3, 4), (5, 7)] {
            let orthogonal = OrthogonalGenerator
                .generate(&grid, options, screens, &mut rng)
                .unwrap();
            let balanced = BalancedGenerator
                .generate(&grid, options, screens, &mut rng)
                .unwrap();
            assert_eq!(orthogonal, balanced);
        }
    }

    #[test]
    fn test_two_level_grid_differs_from_balanced() {
        let grid = Grid::new(vec![
            Attribute::new("Color", ["Red", "Blue"]),
            Attribute::new("Size", ["S", "L"]),
        ]);
        // Balanced gives both attributes the same column; the toggle offsets by attribute
        assert_ne!(
            OrthogonalGenerator::level_matrix(&grid, 2, 3),
            BalancedGenerator::level_matrix(&grid, 2, 3)
        );
    }
}
