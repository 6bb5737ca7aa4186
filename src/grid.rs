//! Attribute/level grid describing the space of product profiles.
//!
//! A [`Grid`] is the immutable input to every generator. Attribute order
//! matters: the first level of each attribute is the reference level that
//! contributes no column to the dummy-coded design matrix.

use std::collections::HashSet;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One value an attribute can take.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Level {
    /// Display name, unique within its attribute.
    pub name: String,
    /// Optional machine code or identifier.
    #[cfg_attr(feature = "serde", serde(default))]
    pub code: Option<String>,
}

impl Level {
    /// Create a level with no machine code.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: None,
        }
    }

    /// Attach a machine code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

impl From<&str> for Level {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Level {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// A named attribute with an ordered list of levels.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Attribute {
    /// Attribute name.
    pub name: String,
    /// Ordered levels; the first is the dummy-coding reference.
    pub levels: Vec<Level>,
}

impl Attribute {
    /// Create an attribute from a name and any iterable of level names.
    ///
    /// # Example
    ///
    /// ```
    /// use conjoint::Attribute;
    ///
    /// let color = Attribute::new("Color", ["Red", "Blue"]);
    /// assert_eq!(color.level_count(), 2);
    /// assert_eq!(color.level_index("Blue"), Some(1));
    /// ```
    #[must_use]
    pub fn new<I, L>(name: impl Into<String>, levels: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<Level>,
    {
        Self {
            name: name.into(),
            levels: levels.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of declared levels.
    #[must_use]
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Position of the named level, if declared.
    #[must_use]
    pub fn level_index(&self, name: &str) -> Option<usize> {
        self.levels.iter().position(|l| l.name == name)
    }

    /// Name of the level at `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of bounds.
    #[must_use]
    pub fn level_name(&self, idx: usize) -> &str {
        &self.levels[idx].name
    }

    /// Whether `name` is one of this attribute's levels.
    #[must_use]
    pub fn has_level(&self, name: &str) -> bool {
        self.level_index(name).is_some()
    }
}

/// Ordered attributes plus optional declared interaction terms.
///
/// Interaction terms are informational only; no interaction parameters are
/// estimated by the efficiency evaluator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Grid {
    /// Attributes in dummy-coding order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub attributes: Vec<Attribute>,
    /// Declared interaction terms (e.g. `"Color*Size"`).
    #[cfg_attr(feature = "serde", serde(default))]
    pub interactions: Vec<String>,
}

impl Grid {
    /// Create a grid from attributes.
    #[must_use]
    pub fn new(attributes: Vec<Attribute>) -> Self {
        Self {
            attributes,
            interactions: Vec::new(),
        }
    }

    /// Declare interaction terms.
    #[must_use]
    pub fn with_interactions<I, S>(mut self, interactions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.interactions = interactions.into_iter().map(Into::into).collect();
        self
    }

    /// Validate the grid.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the grid has no attributes
    /// - an attribute has no levels
    /// - an attribute repeats a level name
    /// - two attributes share a name
    ///
    /// # Example
    ///
    /// ```
    /// use conjoint::{Attribute, Error, Grid};
    ///
    /// assert_eq!(Grid::default().validate(), Err(Error::EmptyGrid));
    ///
    /// let grid = Grid::new(vec![Attribute::new("Size", ["S", "S"])]);
    /// assert!(matches!(grid.validate(), Err(Error::DuplicateLevel { .. })));
    /// ```
    pub fn validate(&self) -> Result<()> {
        if self.attributes.is_empty() {
            return Err(Error::EmptyGrid);
        }

        let mut attribute_names = HashSet::with_capacity(self.attributes.len());
        for attr in &self.attributes {
            if attr.levels.is_empty() {
                return Err(Error::EmptyAttribute {
                    attribute: attr.name.clone(),
                });
            }

            let mut seen = HashSet::with_capacity(attr.levels.len());
            for level in &attr.levels {
                if !seen.insert(level.name.as_str()) {
                    return Err(Error::DuplicateLevel {
                        attribute: attr.name.clone(),
                        level: level.name.clone(),
                    });
                }
            }

            if !attribute_names.insert(attr.name.as_str()) {
                return Err(Error::DuplicateAttribute(attr.name.clone()));
            }
        }

        Ok(())
    }

    /// Number of attributes.
    #[must_use]
    pub fn num_attributes(&self) -> usize {
        self.attributes.len()
    }

    /// Look up an attribute by name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Level count of each attribute, in grid order.
    #[must_use]
    pub fn level_counts(&self) -> Vec<usize> {
        self.attributes.iter().map(Attribute::level_count).collect()
    }

    /// Largest level count across attributes (0 for an empty grid).
    #[must_use]
    pub fn max_level_count(&self) -> usize {
        self.attributes
            .iter()
            .map(Attribute::level_count)
            .max()
            .unwrap_or(0)
    }

    /// Number of main-effect parameters: Σ(levels − 1).
    ///
    /// Equals the column count of the dummy-coded design matrix.
    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.attributes
            .iter()
            .map(|a| a.level_count().saturating_sub(1))
            .sum()
    }

    /// First design-matrix column of each attribute.
    ///
    /// Level `l > 0` of attribute `a` lands in column `offsets[a] + l - 1`.
    #[must_use]
    pub fn column_offsets(&self) -> Vec<usize> {
        let mut offsets = Vec::with_capacity(self.attributes.len());
        let mut next = 0;
        for attr in &self.attributes {
            offsets.push(next);
            next += attr.level_count().saturating_sub(1);
        }
        offsets
    }

    /// Total number of distinct profiles (product of level counts).
    ///
    /// Saturates at `u64::MAX` for very large grids.
    #[must_use]
    pub fn complexity(&self) -> u64 {
        self.attributes
            .iter()
            .fold(1u64, |acc, a| acc.saturating_mul(a.level_count() as u64))
    }

    /// Whether every attribute has exactly two levels.
    #[must_use]
    pub fn is_two_level(&self) -> bool {
        self.attributes.iter().all(|a| a.level_count() == 2)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .attributes
            .iter()
            .map(|a| format!("{}({})", a.name, a.level_count()))
            .collect();
        write!(f, "Grid[{}]", parts.join(" x "))
    }
}
