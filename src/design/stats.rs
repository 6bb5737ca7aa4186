//! Level-usage statistics for choice designs.

use std::collections::HashMap;

use super::Design;
use crate::grid::Grid;

/// How often each level of each attribute appears in a design.
#[derive(Debug, Clone)]
pub struct LevelBalanceReport {
    /// Attribute names, in grid order.
    pub attributes: Vec<String>,
    /// `level_counts[a][l]` is the number of options using level `l` of attribute `a`.
    pub level_counts: Vec<Vec<usize>>,
    /// Whether attribute `a` uses its levels as evenly as the option count allows.
    pub attribute_balance: Vec<bool>,
    /// Options whose level for some attribute is not declared by the grid.
    pub unknown_levels: usize,
}

impl LevelBalanceReport {
    /// Whether every attribute is balanced.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.attribute_balance.iter().all(|&b| b)
    }
}

impl Design {
    /// Count level usage per attribute.
    ///
    /// An attribute is balanced when its most and least used levels differ
    /// by at most one occurrence.
    #[must_use]
    pub fn level_balance(&self, grid: &Grid) -> LevelBalanceReport {
        let mut level_counts: Vec<Vec<usize>> = grid
            .attributes
            .iter()
            .map(|a| vec![0; a.level_count()])
            .collect();
        let mut unknown_levels = 0;

        for option in self.options() {
            for (a, attr) in grid.attributes.iter().enumerate() {
                match option.get(&attr.name).and_then(|l| attr.level_index(l)) {
                    Some(idx) => level_counts[a][idx] += 1,
                    None => unknown_levels += 1,
                }
            }
        }

        let attribute_balance = level_counts
            .iter()
            .map(|counts| {
                let max = counts.iter().copied().max().unwrap_or(0);
                let min = counts.iter().copied().min().unwrap_or(0);
                max - min <= 1
            })
            .collect();

        LevelBalanceReport {
            attributes: grid.attributes.iter().map(|a| a.name.clone()).collect(),
            level_counts,
            attribute_balance,
            unknown_levels,
        }
    }
}

/// Grid-free level-balance score in `[0, 1]`.
///
/// Counts every `attribute::level` pair used by the design and compares each
/// count to the mean count: `1 - Σ|count - mean| / total`, floored at zero
/// and rounded to four decimals. Levels that never appear are not seen by
/// this score. Returns `0.0` for an empty design.
#[must_use]
pub fn level_balance_score(design: &Design) -> f64 {
    let mut counts: HashMap<(&str, &str), usize> = HashMap::new();
    let mut total = 0usize;
    for option in design.options() {
        for pair in option.iter() {
            *counts.entry(pair).or_insert(0) += 1;
            total += 1;
        }
    }

    if total == 0 {
        return 0.0;
    }

    let avg = total as f64 / counts.len().max(1) as f64;
    let deviation: f64 = counts.values().map(|&c| (c as f64 - avg).abs()).sum::<f64>() / total as f64;
    let score = (1.0 - deviation).max(0.0);
    (score * 10_000.0).round() / 10_000.0
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
    fn test_perfectly_balanced_score() {
        let design = Design::new(vec![ChoiceTask::new(
            1,
            vec![
                ChoiceOption::from([("Color", "Red"), ("Size", "S")]),
                ChoiceOption::from([("Color", "Blue"), ("Size", "L")]),
            ],
        )]);
        assert!((level_balance_score(&design) - 1.0).abs() < 1e-12);
        assert!(design.level_balance(&grid()).is_balanced());
    }

    #[test]
    fn test_unbalanced_score() {
        // Red x3 / Blue x1, S x4: counts {3, 1, 4}, mean 8/3
        let design = Design::new(vec![ChoiceTask::new(
            1,
            vec![
                ChoiceOption::from([("Color", "Red"), ("Size", "S")]),
                ChoiceOption::from([("Color", "Red"), ("Size", "S")]),
                ChoiceOption::from([("Color", "Red"), ("Size", "S")]),
                ChoiceOption::from([("Color", "Blue"), ("Size", "S")]),
            ],
        )]);
        let score = level_balance_score(&design);
        let expected: f64 = 1.0 - ((1.0 / 3.0) + (5.0 / 3.0) + (4.0 / 3.0)) / 8.0;
        assert!((score - (expected * 10_000.0).round() / 10_000.0).abs() < 1e-12);

        let report = design.level_balance(&grid());
        assert_eq!(report.level_counts[0], vec![3, 1]);
        assert_eq!(report.level_counts[1], vec![4, 0]);
        assert!(!report.is_balanced());
    }

    #[test]
    fn test_empty_score() {
        assert_eq!(level_balance_score(&Design::default()), 0.0);
    }

    #[test]
    fn test_unknown_levels_counted() {
        let design = Design::new(vec![ChoiceTask::new(
            1,
            vec![ChoiceOption::from([("Color", "Purple"), ("Size", "S")])],
        )]);
        let report = design.level_balance(&grid());
        assert_eq!(report.unknown_levels, 1);
    }
}
