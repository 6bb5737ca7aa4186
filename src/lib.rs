//! # Conjoint
//!
//! Choice-based conjoint (CBC) design generation, scoring and study sizing.
//!
//! ## Overview
//!
//! A CBC survey shows each respondent a series of screens (choice tasks),
//! each offering a few product profiles built from attribute levels. This
//! library provides:
//! - Four interchangeable generators: random, balanced rotation, orthogonal
//!   (bit toggling for all-two-level grids) and D-optimal simulated annealing
//! - D-efficiency scoring on dummy-coded design matrices
//! - Prohibited/required combination checking
//! - Respondent sizing (Johnson–Orme) and power-driven parameter searches
//!
//! ## Quick Start
//!
//! ```rust
//! use conjoint::{Attribute, DesignBuilder, Grid, Method};
//!
//! let grid = Grid::new(vec![
//!     Attribute::new("Brand", ["Acme", "Globex", "Initech"]),
//!     Attribute::new("Price", ["$9", "$12", "$15"]),
//!     Attribute::new("Warranty", ["1y", "2y"]),
//! ]);
//!
//! let result = DesignBuilder::new(grid)
//!     .method(Method::DOptimal)
//!     .options_per_screen(3)
//!     .num_screens(8)
//!     .seed(7)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(result.design.num_screens(), 8);
//! assert!(result.efficiency.score > 0.0);
//! ```
//!
//! Or drive a generator directly with your own random source:
//!
//! ```rust
//! use conjoint::generate::{Generator, RandomGenerator};
//! use conjoint::{efficiency, Attribute, Grid};
//! use rand::SeedableRng;
//!
//! let grid = Grid::new(vec![
//!     Attribute::new("Color", ["Red", "Blue"]),
//!     Attribute::new("Size", ["S", "L"]),
//! ]);
//! let mut rng = rand::rngs::StdRng::seed_from_u64(1);
//! let design = RandomGenerator.generate(&grid, 2, 6, &mut rng).unwrap();
//!
//! let score = efficiency::d_efficiency(&design, &grid);
//! assert!((0.0..=1.0).contains(&score));
//! ```
//!
//! ## Features
//!
//! - `serde`: Serialization of grids, designs, constraint specs, configs and results
//! - `parallel`: Multi-start D-optimal search on the Rayon pool

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

pub mod builder;
pub mod config;
pub mod constraints;
pub mod design;
pub mod efficiency;
pub mod error;
pub mod generate;
pub mod grid;
pub mod sample_size;
pub mod timing;

#[cfg(feature = "parallel")]
pub mod parallel;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::builder::{DesignBuilder, GeneratedDesign};
    pub use crate::config::Limits;
    pub use crate::constraints::{
        ConstraintManager, ConstraintReport, ConstraintSpec, ProhibitedCombination,
        RequiredCombination,
    };
    pub use crate::design::{verify_shape, ChoiceOption, ChoiceTask, Design};
    pub use crate::efficiency::{d_efficiency, Efficiency, EfficiencyMetric};
    pub use crate::error::{Error, Result};
    pub use crate::generate::{
        AnnealingConfig, BalancedGenerator, DOptimalGenerator, Generator, Method,
        OrthogonalGenerator, RandomGenerator,
    };
    pub use crate::grid::{Attribute, Grid, Level};
    pub use crate::sample_size::{
        optimize_parameters, OptimizationRequest, PowerTarget, SampleSizeAdvisor,
        SampleSizeConfig, StudyPlan,
    };

    #[cfg(feature = "parallel")]
    pub use crate::parallel::par_anneal_restarts;
}

// Re-export commonly used items at crate root
pub use builder::{DesignBuilder, GeneratedDesign};
pub use design::{ChoiceOption, ChoiceTask, Design};
pub use error::{Error, Result};
pub use generate::Method;
pub use grid::{Attribute, Grid, Level};

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use crate::constraints::{ConstraintSummary, CustomRule, LevelBalanceConstraint};
    use crate::design::{LevelBalanceReport, ShapeIssue, ShapeReport};
    use crate::generate::{AnnealingReport, StopReason};
    use crate::timing::Timed;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_public_types_are_send_sync() {
        assert_send_sync::<Grid>();
        assert_send_sync::<Attribute>();
        assert_send_sync::<Level>();
        assert_send_sync::<ChoiceOption>();
        assert_send_sync::<ChoiceTask>();
        assert_send_sync::<Design>();
        assert_send_sync::<LevelBalanceReport>();
        assert_send_sync::<ShapeReport>();
        assert_send_sync::<ShapeIssue>();
        assert_send_sync::<Efficiency>();
        assert_send_sync::<Method>();
        assert_send_sync::<Box<dyn Generator>>();
        assert_send_sync::<RandomGenerator>();
        assert_send_sync::<BalancedGenerator>();
        assert_send_sync::<OrthogonalGenerator>();
        assert_send_sync::<DOptimalGenerator>();
        assert_send_sync::<AnnealingConfig>();
        assert_send_sync::<AnnealingReport>();
        assert_send_sync::<StopReason>();
        assert_send_sync::<ConstraintSpec>();
        assert_send_sync::<LevelBalanceConstraint>();
        assert_send_sync::<CustomRule>();
        assert_send_sync::<ConstraintManager>();
        assert_send_sync::<ConstraintReport>();
        assert_send_sync::<ConstraintSummary>();
        assert_send_sync::<SampleSizeAdvisor<'static>>();
        assert_send_sync::<SampleSizeConfig>();
        assert_send_sync::<OptimizationRequest>();
        assert_send_sync::<StudyPlan>();
        assert_send_sync::<Limits>();
        assert_send_sync::<DesignBuilder>();
        assert_send_sync::<GeneratedDesign>();
        assert_send_sync::<Timed<Design>>();
        assert_send_sync::<Error>();
    }
}
