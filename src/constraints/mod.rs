//! Prohibited and required attribute-level combinations.
//!
//! A [`ConstraintSpec`] is plain data, typically deserialized from a request.
//! [`ConstraintManager`] compiles it once into lookup sets and then answers
//! validity questions without ever failing: violations come back as data.
//!
//! Combinations are partial options. A prohibited `{Color: Red, Size: S}`
//! rejects every option carrying both of those levels, whatever its other
//! attributes are.
//!
//! ```
//! use conjoint::ChoiceOption;
//! use conjoint::constraints::{ConstraintManager, ConstraintSpec, ProhibitedCombination};
//!
//! let spec = ConstraintSpec {
//!     prohibited_combinations: vec![ProhibitedCombination::new([("Color", "Red"), ("Size", "S")])],
//!     ..Default::default()
//! };
//! let manager = ConstraintManager::new(&spec);
//!
//! assert!(manager.is_valid(&ChoiceOption::from([("Color", "Blue"), ("Size", "S")])).is_ok());
//! let reason = manager
//!     .is_valid(&ChoiceOption::from([("Color", "Red"), ("Size", "S")]))
//!     .unwrap_err();
//! assert!(reason.contains("Prohibited combination"));
//! ```

mod manager;

pub use manager::{ConstraintManager, ConstraintReport, ConstraintSummary};

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::grid::Grid;

/// Attribute-level pairs that must never appear together in one option.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProhibitedCombination {
    /// Attribute name to level name.
    pub attributes: BTreeMap<String, String>,
    /// Why the combination is excluded.
    #[cfg_attr(feature = "serde", serde(default))]
    pub reason: Option<String>,
}

impl ProhibitedCombination {
    /// Create from attribute-level pairs.
    pub fn new<I, A, L>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, L)>,
        A: Into<String>,
        L: Into<String>,
    {
        Self {
            attributes: pairs.into_iter().map(|(a, l)| (a.into(), l.into())).collect(),
            reason: None,
        }
    }

    /// Attach a reason.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Attribute-level pairs that must appear together in at least one option.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RequiredCombination {
    /// Attribute name to level name.
    pub attributes: BTreeMap<String, String>,
    /// Why the combination must be shown.
    #[cfg_attr(feature = "serde", serde(default))]
    pub reason: Option<String>,
}

impl RequiredCombination {
    /// Create from attribute-level pairs.
    pub fn new<I, A, L>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, L)>,
        A: Into<String>,
        L: Into<String>,
    {
        Self {
            attributes: pairs.into_iter().map(|(a, l)| (a.into(), l.into())).collect(),
            reason: None,
        }
    }

    /// Attach a reason.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Frequency bounds for the levels of one attribute.
///
/// Carried and counted, not enforced by [`ConstraintManager`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LevelBalanceConstraint {
    /// Attribute to balance.
    pub attribute_name: String,
    /// Minimum appearances per level.
    #[cfg_attr(feature = "serde", serde(default))]
    pub min_frequency: Option<usize>,
    /// Maximum appearances per level.
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_frequency: Option<usize>,
    /// Allowed relative imbalance, in `[0, 1]`.
    #[cfg_attr(feature = "serde", serde(default = "default_tolerance"))]
    pub tolerance: f64,
}

#[cfg(feature = "serde")]
fn default_tolerance() -> f64 {
    0.1
}

impl LevelBalanceConstraint {
    /// Unbounded constraint on `attribute_name` with tolerance 0.1.
    pub fn new(attribute_name: impl Into<String>) -> Self {
        Self {
            attribute_name: attribute_name.into(),
            min_frequency: None,
            max_frequency: None,
            tolerance: 0.1,
        }
    }
}

/// Free-form rule passed through to downstream tooling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CustomRule {
    /// Rule name.
    pub name: String,
    /// Condition expression.
    pub condition: String,
    /// Action when the condition holds.
    pub action: String,
    /// Human-readable description.
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: Option<String>,
}

/// Complete constraint specification for one design request.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ConstraintSpec {
    /// Combinations no option may contain.
    pub prohibited_combinations: Vec<ProhibitedCombination>,
    /// Combinations some option must contain.
    pub required_combinations: Vec<RequiredCombination>,
    /// Per-attribute level frequency bounds.
    pub level_balance_constraints: Vec<LevelBalanceConstraint>,
    /// Pass-through rules.
    pub custom_rules: Vec<CustomRule>,
    /// Maximum complexity per choice task.
    pub max_complexity: Option<usize>,
}

impl ConstraintSpec {
    /// Whether this holds no combination constraints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prohibited_combinations.is_empty() && self.required_combinations.is_empty()
    }

    /// Check these constraints against `grid`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParams`] when a combination is empty or names
    /// an attribute or level the grid does not declare, when a level-balance
    /// constraint is out of range, or when `max_complexity` is zero.
    pub fn validate(&self, grid: &Grid) -> Result<()> {
        let combinations = self
            .prohibited_combinations
            .iter()
            .map(|c| ("prohibited", &c.attributes))
            .chain(self.required_combinations.iter().map(|c| ("required", &c.attributes)));

        for (kind, attributes) in combinations {
            if attributes.is_empty() {
                return Err(Error::invalid_params(format!(
                    "{kind} combination must name at least one attribute"
                )));
            }
            for (name, level) in attributes {
                let attr = grid.attribute(name).ok_or_else(|| {
                    Error::invalid_params(format!("{kind} combination names unknown attribute '{name}'"))
                })?;
                if !attr.has_level(level) {
                    return Err(Error::invalid_params(format!(
                        "{kind} combination names unknown level '{level}' of attribute '{name}'"
                    )));
                }
            }
        }

        for balance in &self.level_balance_constraints {
            if grid.attribute(&balance.attribute_name).is_none() {
                return Err(Error::invalid_params(format!(
                    "level balance constraint names unknown attribute '{}'",
                    balance.attribute_name
                )));
            }
            if !(0.0..=1.0).contains(&balance.tolerance) {
                return Err(Error::invalid_params(format!(
                    "level balance tolerance must be in [0, 1], got {}",
                    balance.tolerance
                )));
            }
            if let (Some(min), Some(max)) = (balance.min_frequency, balance.max_frequency) {
                if min > max {
                    return Err(Error::invalid_params(format!(
                        "level balance min_frequency {min} exceeds max_frequency {max}"
                    )));
                }
            }
        }

        if self.max_complexity == Some(0) {
            return Err(Error::invalid_params("max_complexity must be at least 1"));
        }

        Ok(())
    }
}
