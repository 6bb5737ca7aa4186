//! Choice design core types.
//!
//! - [`ChoiceOption`]: one product profile, a flat attribute → level mapping
//! - [`ChoiceTask`]: one screen of competing options
//! - [`Design`]: the ordered sequence of screens shown to a respondent
//!
//! The shape `tasks[i].task_index == i + 1`, each task an ordered list of
//! options, each option a flat string mapping, is what exporters consume.
//! With the `serde` feature enabled it is also the serialized form.
//!
//! Option keys serialize sorted by attribute name. Exporters that need grid
//! column order read it from the [`Grid`], e.g. via
//! [`ChoiceOption::in_grid_order`].

mod stats;
mod verify;

pub use stats::{level_balance_score, LevelBalanceReport};
pub use verify::{verify_shape, ShapeIssue, ShapeReport};

use ndarray::Array2;
use std::collections::BTreeMap;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::grid::Grid;

/// A single product profile: one level name per attribute name.
///
/// Entries are kept sorted by attribute name, which makes equality and
/// hashing independent of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ChoiceOption(BTreeMap<String, String>);

impl ChoiceOption {
    /// Create an empty option.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign `level` to `attribute`, returning the previous level if any.
    pub fn insert(&mut self, attribute: impl Into<String>, level: impl Into<String>) -> Option<String> {
        self.0.insert(attribute.into(), level.into())
    }

    /// Level assigned to `attribute`.
    #[must_use]
    pub fn get(&self, attribute: &str) -> Option<&str> {
        self.0.get(attribute).map(String::as_str)
    }

    /// Whether `attribute` has a level.
    #[must_use]
    pub fn contains(&self, attribute: &str) -> bool {
        self.0.contains_key(attribute)
    }

    /// Number of assigned attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no attribute is assigned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate `(attribute, level)` pairs sorted by attribute name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(a, l)| (a.as_str(), l.as_str()))
    }

    /// Attribute names, sorted.
    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Borrow the underlying map.
    #[must_use]
    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.0
    }

    /// `(attribute, level)` pairs in the attribute order of `grid`.
    ///
    /// Attributes the option does not assign yield `None`; assignments to
    /// attributes outside the grid are skipped.
    ///
    /// ```
    /// use conjoint::{Attribute, ChoiceOption, Grid};
    ///
    /// let grid = Grid::new(vec![
    ///     Attribute::new("Size", ["S", "L"]),
    ///     Attribute::new("Color", ["Red", "Blue"]),
    /// ]);
    /// let option = ChoiceOption::from([("Color", "Red"), ("Size", "L")]);
    ///
    /// let row: Vec<_> = option.in_grid_order(&grid).collect();
    /// assert_eq!(row, vec![("Size", Some("L")), ("Color", Some("Red"))]);
    /// ```
    pub fn in_grid_order<'a>(&'a self, grid: &'a Grid) -> impl Iterator<Item = (&'a str, Option<&'a str>)> {
        grid.attributes
            .iter()
            .map(move |attr| (attr.name.as_str(), self.get(&attr.name)))
    }
}

impl<A, L> FromIterator<(A, L)> for ChoiceOption
where
    A: Into<String>,
    L: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (A, L)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(a, l)| (a.into(), l.into()))
                .collect(),
        )
    }
}

impl<const N: usize> From<[(&str, &str); N]> for ChoiceOption {
    fn from(pairs: [(&str, &str); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl From<BTreeMap<String, String>> for ChoiceOption {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

impl fmt::Display for ChoiceOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs: Vec<String> = self.iter().map(|(a, l)| format!("{a}: {l}")).collect();
        write!(f, "{{{}}}", pairs.join(", "))
    }
}

/// One screen of the survey.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChoiceTask {
    /// 1-based position of the task within the design.
    pub task_index: usize,
    /// Options shown on this screen, in display order.
    pub options: Vec<ChoiceOption>,
}

impl ChoiceTask {
    /// Create a task.
    #[must_use]
    pub fn new(task_index: usize, options: Vec<ChoiceOption>) -> Self {
        Self {
            task_index,
            options,
        }
    }
}

/// An ordered sequence of choice tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Design {
    tasks: Vec<ChoiceTask>,
}

impl Design {
    /// Create a design from tasks.
    #[must_use]
    pub fn new(tasks: Vec<ChoiceTask>) -> Self {
        Self { tasks }
    }

    /// Materialize a design from a level-index matrix.
    ///
    /// `levels` has one row per option (task-major) and one column per grid
    /// attribute; each cell is a level index into that attribute.
    ///
    /// # Panics
    ///
    /// Panics if the column count differs from the attribute count, if the
    /// row count is not a multiple of `options_per_screen`, or if a level
    /// index is out of range.
    #[must_use]
    pub fn from_level_matrix(grid: &Grid, levels: &Array2<usize>, options_per_screen: usize) -> Self {
        assert_eq!(
            levels.ncols(),
            grid.num_attributes(),
            "level matrix cols {} must match attributes {}",
            levels.ncols(),
            grid.num_attributes()
        );

        if options_per_screen == 0 {
            return Self::default();
        }
        assert_eq!(
            levels.nrows() % options_per_screen,
            0,
            "level matrix rows {} must be a multiple of options_per_screen {}",
            levels.nrows(),
            options_per_screen
        );

        let tasks = levels
            .rows()
            .into_iter()
            .map(|row| {
                grid.attributes
                    .iter()
                    .zip(row.iter())
                    .map(|(attr, &lvl)| (attr.name.as_str(), attr.level_name(lvl)))
                    .collect::<ChoiceOption>()
            })
            .collect::<Vec<_>>()
            .chunks(options_per_screen)
            .enumerate()
            .map(|(i, chunk)| ChoiceTask::new(i + 1, chunk.to_vec()))
            .collect();

        Self { tasks }
    }

    /// The tasks, in order.
    #[must_use]
    pub fn tasks(&self) -> &[ChoiceTask] {
        &self.tasks
    }

    /// Consume the design and return its tasks.
    #[must_use]
    pub fn into_tasks(self) -> Vec<ChoiceTask> {
        self.tasks
    }

    /// Number of tasks (screens).
    #[must_use]
    pub fn num_screens(&self) -> usize {
        self.tasks.len()
    }

    /// Options in the first task, or `None` for an empty design.
    #[must_use]
    pub fn options_per_screen(&self) -> Option<usize> {
        self.tasks.first().map(|t| t.options.len())
    }

    /// Total options across all tasks (design-matrix rows).
    #[must_use]
    pub fn total_options(&self) -> usize {
        self.tasks.iter().map(|t| t.options.len()).sum()
    }

    /// Whether the design has no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Iterate every option of every task, in task order.
    pub fn options(&self) -> impl Iterator<Item = &ChoiceOption> {
        self.tasks.iter().flat_map(|t| t.options.iter())
    }

    /// Iterate `(task_index, option)` pairs.
    pub fn indexed_options(&self) -> impl Iterator<Item = (usize, &ChoiceOption)> {
        self.tasks
            .iter()
            .flat_map(|t| t.options.iter().map(move |o| (t.task_index, o)))
    }
}

impl fmt::Display for Design {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Design({} tasks x {} options)",
            self.num_screens(),
            self.options_per_screen().unwrap_or(0)
        )?;
        for task in &self.tasks {
            writeln!(f, "  Task {}:", task.task_index)?;
            for option in &task.options {
                writeln!(f, "    {option}")?;
            }
        }
        Ok(())
    }
}
