//! Compiled constraint lookups.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::ConstraintSpec;
use crate::design::{ChoiceOption, Design};

/// Attribute-level pairs sorted by attribute name.
type Combination = Vec<(String, String)>;

fn canonical(attributes: &BTreeMap<String, String>) -> Combination {
    attributes
        .iter()
        .map(|(a, l)| (a.clone(), l.clone()))
        .collect()
}

/// Restrict `option` to the attributes in `shape`.
///
/// `None` when the option lacks one of them.
fn project(option: &ChoiceOption, shape: &[String]) -> Option<Combination> {
    shape
        .iter()
        .map(|name| option.get(name).map(|level| (name.clone(), level.to_string())))
        .collect()
}

struct Pairs<'a>(&'a [(String, String)]);

impl fmt::Display for Pairs<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (a, l)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{a}: {l}")?;
        }
        f.write_str("}")
    }
}

/// Outcome of validating a whole design.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConstraintReport {
    /// Whether no violation was found.
    pub is_valid: bool,
    /// Human-readable violations, prohibitions first in design order.
    pub violations: Vec<String>,
}

/// Number of constraints of each kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConstraintSummary {
    /// Prohibited combinations declared.
    pub prohibited_combinations: usize,
    /// Required combinations declared.
    pub required_combinations: usize,
    /// Level-balance constraints declared.
    pub level_balance_constraints: usize,
    /// Custom rules declared.
    pub custom_rules: usize,
}

/// Validates options and designs against a [`ConstraintSpec`].
///
/// Combinations are grouped by the set of attributes they name, so checking
/// an option costs one hash lookup per distinct group rather than one per
/// combination. The lookup tables are fixed at construction.
#[derive(Debug, Clone)]
pub struct ConstraintManager {
    // shape -> combination -> reason
    prohibited: Vec<(Vec<String>, HashMap<Combination, Option<String>>)>,
    // shape -> combinations, in declaration order without duplicates
    required: Vec<(Vec<String>, Vec<Combination>)>,
    summary: ConstraintSummary,
}

impl ConstraintManager {
    /// Compile `spec` into lookup tables.
    #[must_use]
    pub fn new(spec: &ConstraintSpec) -> Self {
        let mut prohibited: Vec<(Vec<String>, HashMap<Combination, Option<String>>)> = Vec::new();
        for combo in &spec.prohibited_combinations {
            let shape: Vec<String> = combo.attributes.keys().cloned().collect();
            let idx = match prohibited.iter().position(|(s, _)| *s == shape) {
                Some(idx) => idx,
                None => {
                    prohibited.push((shape, HashMap::new()));
                    prohibited.len() - 1
                }
            };
            prohibited[idx]
                .1
                .entry(canonical(&combo.attributes))
                .or_insert_with(|| combo.reason.clone());
        }

        let mut required: Vec<(Vec<String>, Vec<Combination>)> = Vec::new();
        for combo in &spec.required_combinations {
            let shape: Vec<String> = combo.attributes.keys().cloned().collect();
            let key = canonical(&combo.attributes);
            match required.iter_mut().find(|(s, _)| *s == shape) {
                Some((_, combos)) if combos.contains(&key) => {}
                Some((_, combos)) => combos.push(key),
                None => required.push((shape, vec![key])),
            }
        }

        Self {
            prohibited,
            required,
            summary: ConstraintSummary {
                prohibited_combinations: spec.prohibited_combinations.len(),
                required_combinations: spec.required_combinations.len(),
                level_balance_constraints: spec.level_balance_constraints.len(),
                custom_rules: spec.custom_rules.len(),
            },
        }
    }

    /// Check a single option against the prohibited combinations.
    ///
    /// # Errors
    ///
    /// Returns the reason, starting with `"Prohibited combination"`, when
    /// the option contains a prohibited combination.
    pub fn is_valid(&self, option: &ChoiceOption) -> Result<(), String> {
        for (shape, combos) in &self.prohibited {
            let Some(key) = project(option, shape) else {
                continue;
            };
            if let Some(reason) = combos.get(&key) {
                let mut message = format!("Prohibited combination: {}", Pairs(&key));
                if let Some(reason) = reason {
                    message.push_str(&format!(" ({reason})"));
                }
                return Err(message);
            }
        }
        Ok(())
    }

    /// Validate every option of `design`, then check that each required
    /// combination appears in at least one option anywhere in the design.
    #[must_use]
    pub fn validate_design(&self, design: &Design) -> ConstraintReport {
        let mut violations: Vec<String> = design
            .indexed_options()
            .filter_map(|(task_index, option)| {
                self.is_valid(option)
                    .err()
                    .map(|reason| format!("Task {task_index}: {reason}"))
            })
            .collect();

        for (shape, combos) in &self.required {
            let present: HashSet<Combination> = design
                .options()
                .filter_map(|option| project(option, shape))
                .collect();
            for combo in combos {
                if !present.contains(combo) {
                    violations.push(format!("Missing required combination: {}", Pairs(combo)));
                }
            }
        }

        ConstraintReport {
            is_valid: violations.is_empty(),
            violations,
        }
    }

    /// Keep only options without a prohibited combination.
    #[must_use]
    pub fn filter_valid_options(&self, options: &[ChoiceOption]) -> Vec<ChoiceOption> {
        options
            .iter()
            .filter(|option| self.is_valid(option).is_ok())
            .cloned()
            .collect()
    }

    /// Counts of the declared constraints.
    #[must_use]
    pub fn summary(&self) -> ConstraintSummary {
        self.summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::{CustomRule, LevelBalanceConstraint, ProhibitedCombination, RequiredCombination};
    use crate::design::ChoiceTask;

    fn opt(color: &str, size: &str) -> ChoiceOption {
        ChoiceOption::from([("Color", color), ("Size", size)])
    }

    fn prohibit_red_small() -> ConstraintManager {
        ConstraintManager::new(&ConstraintSpec {
            prohibited_combinations: vec![ProhibitedCombination::new([("Color", "Red"), ("Size", "S")])],
            ..Default::default()
        })
    }

    #[test]
    fn test_prohibited_combination() {
        let manager = prohibit_red_small();
        assert_eq!(manager.is_valid(&opt("Blue", "S")), Ok(()));

        let reason = manager.is_valid(&opt("Red", "S")).unwrap_err();
        assert!(reason.contains("Prohibited combination"));
        assert!(reason.contains("{Color: Red, Size: S}"));
    }

    #[test]
    fn test_partial_combination_matches_wider_option() {
        let manager = ConstraintManager::new(&ConstraintSpec {
            prohibited_combinations: vec![ProhibitedCombination::new([("Color", "Red")])
                .with_reason("out of stock")],
            ..Default::default()
        });
        let reason = manager.is_valid(&opt("Red", "L")).unwrap_err();
        assert_eq!(reason, "Prohibited combination: {Color: Red} (out of stock)");

        // Options that omit the attribute never match
        assert!(manager.is_valid(&ChoiceOption::from([("Size", "L")])).is_ok());
    }

    #[test]
    fn test_pair_constraints_on_three_attribute_options() {
        let manager = ConstraintManager::new(&ConstraintSpec {
            prohibited_combinations: vec![ProhibitedCombination::new([("Color", "Red"), ("Size", "S")])],
            required_combinations: vec![RequiredCombination::new([("Color", "Blue"), ("Size", "L")])],
            ..Default::default()
        });
        let wide = |color: &str, size: &str, brand: &str| {
            ChoiceOption::from([("Color", color), ("Size", size), ("Brand", brand)])
        };

        assert_eq!(
            manager.is_valid(&wide("Red", "S", "A")),
            Err("Prohibited combination: {Color: Red, Size: S}".to_string())
        );
        assert!(manager.is_valid(&wide("Red", "L", "A")).is_ok());

        let design = Design::new(vec![ChoiceTask::new(
            1,
            vec![wide("Blue", "L", "B"), wide("Red", "L", "A")],
        )]);
        let report = manager.validate_design(&design);
        assert!(report.is_valid, "{:?}", report.violations);
    }

    #[test]
    fn test_required_combination_anywhere() {
        let manager = ConstraintManager::new(&ConstraintSpec {
            required_combinations: vec![RequiredCombination::new([("Color", "Blue"), ("Size", "L")])],
            ..Default::default()
        });

        let mut tasks = vec![
            ChoiceTask::new(1, vec![opt("Red", "S")]),
            ChoiceTask::new(2, vec![opt("Blue", "S")]),
        ];
        let report = manager.validate_design(&Design::new(tasks.clone()));
        assert!(!report.is_valid);
        assert_eq!(report.violations.len(), 1);
        assert!(report.violations[0].contains("Missing required combination"));

        tasks.push(ChoiceTask::new(3, vec![opt("Red", "S"), opt("Blue", "L")]));
        let report = manager.validate_design(&Design::new(tasks));
        assert!(report.is_valid, "{:?}", report.violations);
    }

    #[test]
    fn test_violations_name_task() {
        let manager = prohibit_red_small();
        let design = Design::new(vec![
            ChoiceTask::new(1, vec![opt("Blue", "S"), opt("Blue", "L")]),
            ChoiceTask::new(2, vec![opt("Red", "S"), opt("Blue", "L")]),
        ]);
        let report = manager.validate_design(&design);
        assert!(!report.is_valid);
        assert_eq!(
            report.violations,
            vec!["Task 2: Prohibited combination: {Color: Red, Size: S}".to_string()]
        );
    }

    #[test]
    fn test_duplicate_requirements_reported_once() {
        let required = RequiredCombination::new([("Color", "Blue")]);
        let manager = ConstraintManager::new(&ConstraintSpec {
            required_combinations: vec![required.clone(), required],
            ..Default::default()
        });
        let report = manager.validate_design(&Design::new(vec![ChoiceTask::new(1, vec![opt("Red", "S")])]));
        assert_eq!(report.violations.len(), 1);
    }

    #[test]
    fn test_filter_valid_options() {
        let manager = prohibit_red_small();
        let options = vec![opt("Red", "S"), opt("Blue", "S"), opt("Red", "L")];
        let valid = manager.filter_valid_options(&options);

        assert_eq!(valid, vec![opt("Blue", "S"), opt("Red", "L")]);
    }

    #[test]
    fn test_empty_spec_accepts_everything() {
        let manager = ConstraintManager::new(&ConstraintSpec::default());
        let design = Design::new(vec![ChoiceTask::new(1, vec![opt("Red", "S")])]);
        assert!(manager.validate_design(&design).is_valid);
        assert_eq!(manager.summary(), ConstraintSummary::default());
    }

    #[test]
    fn test_summary_counts() {
        let manager = ConstraintManager::new(&ConstraintSpec {
            prohibited_combinations: vec![
                ProhibitedCombination::new([("Color", "Red")]),
                ProhibitedCombination::new([("Size", "S")]),
            ],
            required_combinations: vec![RequiredCombination::new([("Color", "Blue")])],
            level_balance_constraints: vec![LevelBalanceConstraint::new("Color")],
            custom_rules: vec![CustomRule::default()],
            max_complexity: None,
        });
        assert_eq!(
            manager.summary(),
            ConstraintSummary {
                prohibited_combinations: 2,
                required_combinations: 1,
                level_balance_constraints: 1,
                custom_rules: 1,
            }
        );
    }
}
