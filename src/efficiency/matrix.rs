//! Dummy-coded design matrices and the linear algebra on top of them.

use ndarray::{Array2, ArrayView2};

use crate::design::Design;
use crate::grid::Grid;

/// Build the dummy-coded design matrix for `design`.
///
/// One row per option (task order), one column per non-reference level.
/// The first level of each attribute is the reference and has no column, so
/// an option at a reference level contributes an all-zero block for that
/// attribute. Attribute or level names the grid does not declare are ignored.
///
/// # Example
///
/// ```
/// use conjoint::{Attribute, ChoiceOption, ChoiceTask, Design, Grid};
/// use conjoint::efficiency::design_matrix;
///
/// let grid = Grid::new(vec![Attribute::new("Color", ["Red", "Blue"])]);
/// let design = Design::new(vec![ChoiceTask::new(
///     1,
///     vec![ChoiceOption::from([("Color", "Red")]), ChoiceOption::from([("Color", "Blue")])],
/// )]);
///
/// let x = design_matrix(&design, &grid);
/// assert_eq!(x.dim(), (2, 1));
/// assert_eq!(x[[1, 0]], 1.0);
/// ```
#[must_use]
pub fn design_matrix(design: &Design, grid: &Grid) -> Array2<f64> {
    let offsets = grid.column_offsets();
    let mut x = Array2::zeros((design.total_options(), grid.parameter_count()));

    for (row, option) in design.options().enumerate() {
        for (a, attr) in grid.attributes.iter().enumerate() {
            let level = option.get(&attr.name).and_then(|l| attr.level_index(l));
            if let Some(idx) = level.filter(|&idx| idx > 0) {
                x[[row, offsets[a] + idx - 1]] = 1.0;
            }
        }
    }

    x
}

/// Build the design matrix straight from a level-index matrix.
///
/// `levels` has one row per option and one column per attribute. This is the
/// fast path used while searching, where designs are held as indices.
#[must_use]
pub fn design_matrix_from_levels(grid: &Grid, levels: &Array2<usize>) -> Array2<f64> {
    let offsets = grid.column_offsets();
    let mut x = Array2::zeros((levels.nrows(), grid.parameter_count()));

    for (row, option) in levels.rows().into_iter().enumerate() {
        for (a, &idx) in option.iter().enumerate() {
            if idx > 0 {
                x[[row, offsets[a] + idx - 1]] = 1.0;
            }
        }
    }

    x
}

/// Information matrix `XᵀX`.
#[must_use]
pub fn information_matrix(x: &Array2<f64>) -> Array2<f64> {
    x.t().dot(x)
}

/// Natural log of the determinant of a square matrix.
///
/// Uses LU decomposition with partial pivoting and accumulates `ln|u_ii|`,
/// so large determinants do not overflow. Returns `None` when the
/// determinant is zero or negative. An empty matrix has determinant 1.
///
/// # Panics
///
/// Panics if the matrix is not square.
#[must_use]
pub fn log_determinant(m: ArrayView2<'_, f64>) -> Option<f64> {
    let n = m.nrows();
    assert_eq!(n, m.ncols(), "determinant requires a square matrix");

    let mut lu = m.to_owned();
    let mut log_det = 0.0;
    let mut negative = false;

    for col in 0..n {
        let mut pivot_row = col;
        let mut pivot_abs = lu[[col, col]].abs();
        for row in (col + 1)..n {
            let candidate = lu[[row, col]].abs();
            if candidate > pivot_abs {
                pivot_row = row;
                pivot_abs = candidate;
            }
        }

        if pivot_abs == 0.0 || !pivot_abs.is_finite() {
            return None;
        }

        if pivot_row != col {
            for k in 0..n {
                lu.swap([col, k], [pivot_row, k]);
            }
            negative = !negative;
        }

        let pivot = lu[[col, col]];
        if pivot < 0.0 {
            negative = !negative;
        }
        log_det += pivot_abs.ln();

        for row in (col + 1)..n {
            let factor = lu[[row, col]] / pivot;
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                let delta = factor * lu[[col, k]];
                lu[[row, k]] -= delta;
            }
        }
    }

    if negative {
        None
    } else {
        Some(log_det)
    }
}

/// Determinant of a square matrix, `0.0` when it is not positive.
#[must_use]
pub fn determinant(m: ArrayView2<'_, f64>) -> f64 {
    log_determinant(m).map_or(0.0, f64::exp)
}
