//! Structural verification of choice designs.
//!
//! Checks the shape contract every generator promises: the requested number
//! of tasks, sequential 1-based task indices, a fixed option count per task,
//! and exactly one declared level per attribute in every option.

use super::Design;
use crate::grid::Grid;

/// Result of verifying a design's shape.
#[derive(Debug, Clone)]
pub struct ShapeReport {
    /// Whether the design satisfies the shape contract.
    pub is_valid: bool,
    /// Details about any issues found.
    pub issues: Vec<ShapeIssue>,
}

/// A specific shape problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeIssue {
    /// The design has the wrong number of tasks.
    TaskCount {
        /// Requested task count.
        expected: usize,
        /// Tasks present.
        actual: usize,
    },
    /// A task index is out of sequence.
    TaskIndex {
        /// 0-based position in the design.
        position: usize,
        /// Index the task should carry.
        expected: usize,
        /// Index the task carries.
        actual: usize,
    },
    /// A task has the wrong number of options.
    OptionCount {
        /// Offending task.
        task_index: usize,
        /// Requested option count.
        expected: usize,
        /// Options present.
        actual: usize,
    },
    /// An option omits a grid attribute.
    MissingAttribute {
        /// Offending task.
        task_index: usize,
        /// 0-based option position within the task.
        option: usize,
        /// Attribute missing from the option.
        attribute: String,
    },
    /// An option names an attribute the grid does not declare.
    UnknownAttribute {
        /// Offending task.
        task_index: usize,
        /// 0-based option position within the task.
        option: usize,
        /// Undeclared attribute.
        attribute: String,
    },
    /// An option uses a level its attribute does not declare.
    UnknownLevel {
        /// Offending task.
        task_index: usize,
        /// 0-based option position within the task.
        option: usize,
        /// Attribute carrying the level.
        attribute: String,
        /// Undeclared level.
        level: String,
    },
}

/// Verify that `design` has `num_screens` tasks of `options_per_screen`
/// options, each option drawn from `grid`.
///
/// Time complexity: O(total options × attributes × levels).
#[must_use]
pub fn verify_shape(
    design: &Design,
    grid: &Grid,
    options_per_screen: usize,
    num_screens: usize,
) -> ShapeReport {
    let mut issues = Vec::new();

    if design.num_screens() != num_screens {
        issues.push(ShapeIssue::TaskCount {
            expected: num_screens,
            actual: design.num_screens(),
        });
    }

    for (position, task) in design.tasks().iter().enumerate() {
        if task.task_index != position + 1 {
            issues.push(ShapeIssue::TaskIndex {
                position,
                expected: position + 1,
                actual: task.task_index,
            });
        }

        if task.options.len() != options_per_screen {
            issues.push(ShapeIssue::OptionCount {
                task_index: task.task_index,
                expected: options_per_screen,
                actual: task.options.len(),
            });
        }

        for (k, option) in task.options.iter().enumerate() {
            for attr in &grid.attributes {
                match option.get(&attr.name) {
                    None => issues.push(ShapeIssue::MissingAttribute {
                        task_index: task.task_index,
                        option: k,
                        attribute: attr.name.clone(),
                    }),
                    Some(level) if !attr.has_level(level) => {
                        issues.push(ShapeIssue::UnknownLevel {
                            task_index: task.task_index,
                            option: k,
                            attribute: attr.name.clone(),
                            level: level.to_string(),
                        });
                    }
                    Some(_) => {}
                }
            }

            for name in option.attributes() {
                if grid.attribute(name).is_none() {
                    issues.push(ShapeIssue::UnknownAttribute {
                        task_index: task.task_index,
                        option: k,
                        attribute: name.to_string(),
                    });
                }
            }
        }
    }

    ShapeReport {
        is_valid: issues.is_empty(),
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::{ChoiceOption, ChoiceTask};
    use crate::grid::Attribute;

    fn grid() -> Grid {
        Grid::new(vec![
            Attribute::new("Color", ["Red", "Blue"]),
            Attribute::new("Size", ["S", "L"]),
        ])
    }

    #[test]
    fn test_valid_shape() {
        let design = Design::new(vec![ChoiceTask::new(
            1,
            vec![
                ChoiceOption::from([("Color", "Red"), ("Size", "S")]),
                ChoiceOption::from([("Color", "Blue"), ("Size", "L")]),
            ],
        )]);
        let report = verify_shape(&design, &grid(), 2, 1);
        assert!(report.is_valid, "{:?}", report.issues);
    }

    #[test]
    fn test_detects_issues() {
        let design = Design::new(vec![ChoiceTask::new(
            2,
            vec![ChoiceOption::from([("Color", "Purple"), ("Weight", "1kg")])],
        )]);
        let report = verify_shape(&design, &grid(), 2, 3);
        assert!(!report.is_valid);

        let issues = &report.issues;
        assert!(issues.contains(&ShapeIssue::TaskCount { expected: 3, actual: 1 }));
        assert!(issues.contains(&ShapeIssue::TaskIndex {
            position: 0,
            expected: 1,
            actual: 2
        }));
        assert!(issues.contains(&ShapeIssue::OptionCount {
            task_index: 2,
            expected: 2,
            actual: 1
        }));
        assert!(issues.iter().any(|i| matches!(i, ShapeIssue::UnknownLevel { level, .. } if level == "Purple")));
        assert!(issues.iter().any(|i| matches!(i, ShapeIssue::MissingAttribute { attribute, .. } if attribute == "Size")));
        assert!(issues.iter().any(|i| matches!(i, ShapeIssue::UnknownAttribute { attribute, .. } if attribute == "Weight")));
    }
}
