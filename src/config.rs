//! Request limits.
//!
//! Limits are plain values threaded into [`DesignBuilder`](crate::DesignBuilder);
//! nothing is cached process-wide. [`Limits::from_env`] reads overrides from
//! `APP_MAX_RESPONDENTS`, `APP_MAX_TASKS_PER_RESPONDENT` and
//! `APP_MAX_OPTIONS_PER_TASK`.

use std::env;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Upper bounds on a generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Limits {
    /// Maximum respondents.
    pub max_respondents: usize,
    /// Maximum choice tasks per respondent.
    pub max_tasks_per_respondent: usize,
    /// Maximum options per choice task.
    pub max_options_per_task: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_respondents: 2000,
            max_tasks_per_respondent: 20,
            max_options_per_task: 5,
        }
    }
}

impl Limits {
    /// Defaults overridden by any `APP_*` variables that are set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParams`] if a variable is set but is not a
    /// positive integer.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each key.
    ///
    /// # Errors
    ///
    /// Same as [`Limits::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let read = |key: &str, default: usize| -> Result<usize> {
            match lookup(key) {
                None => Ok(default),
                Some(raw) => match raw.trim().parse::<usize>() {
                    Ok(value) if value > 0 => Ok(value),
                    _ => Err(Error::invalid_params(format!(
                        "{key} must be a positive integer, got '{raw}'"
                    ))),
                },
            }
        };

        Ok(Self {
            max_respondents: read("APP_MAX_RESPONDENTS", defaults.max_respondents)?,
            max_tasks_per_respondent: read(
                "APP_MAX_TASKS_PER_RESPONDENT",
                defaults.max_tasks_per_respondent,
            )?,
            max_options_per_task: read("APP_MAX_OPTIONS_PER_TASK", defaults.max_options_per_task)?,
        })
    }

    /// Check request counts against the limits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LimitExceeded`] for the first count over its limit.
    pub fn check(
        &self,
        options_per_screen: usize,
        num_screens: usize,
        num_respondents: Option<usize>,
    ) -> Result<()> {
        if options_per_screen > self.max_options_per_task {
            return Err(Error::LimitExceeded {
                parameter: "options_per_screen",
                value: options_per_screen,
                max: self.max_options_per_task,
            });
        }
        if num_screens > self.max_tasks_per_respondent {
            return Err(Error::LimitExceeded {
                parameter: "num_screens",
                value: num_screens,
                max: self.max_tasks_per_respondent,
            });
        }
        match num_respondents {
            Some(n) if n > self.max_respondents => Err(Error::LimitExceeded {
                parameter: "num_respondents",
                value: n,
                max: self.max_respondents,
            }),
            _ => Ok(()),
        }
    }
}
