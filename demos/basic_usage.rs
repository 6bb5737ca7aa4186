//! Basic usage example for the conjoint library.
//!
//! Builds a small grid, generates a design with each method, checks it
//! against constraints and sizes the study.
//!
//! Run with `RUST_LOG=debug` to see the builder's events.

use conjoint::constraints::{ConstraintSpec, ProhibitedCombination, RequiredCombination};
use conjoint::sample_size::{optimize_parameters, OptimizationRequest};
use conjoint::{Attribute, DesignBuilder, Grid, Method};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("Conjoint Library - Basic Usage Example\n");

    let grid = Grid::new(vec![
        Attribute::new("Brand", ["Acme", "Globex", "Initech"]),
        Attribute::new("Price", ["$9", "$12", "$15"]),
        Attribute::new("Color", ["Red", "Blue"]),
    ]);
    println!("Grid: {grid}");
    println!("  Parameters: {}", grid.parameter_count());
    println!("  Profiles: {}", grid.complexity());
    println!();

    for method in Method::ALL {
        let result = DesignBuilder::new(grid.clone())
            .method(method)
            .options_per_screen(3)
            .num_screens(8)
            .seed(2024)
            .build()
            .expect("Failed to generate design");

        print!(
            "{:<10} {} = {:.4}",
            method, result.efficiency.metric, result.efficiency.score
        );
        if let Some(used) = result.fallback {
            print!("  (generated with {used})");
        }
        println!("  [{:?}]", result.elapsed);
    }
    println!();

    // Show one design in full
    let result = DesignBuilder::new(grid.clone())
        .method(Method::DOptimal)
        .options_per_screen(3)
        .num_screens(4)
        .seed(7)
        .build()
        .expect("Failed to generate design");
    println!("D-optimal design:");
    println!("{}", result.design);
    println!("Respondents: {}", result.num_respondents);

    // CSV rows in grid column order
    let header: Vec<&str> = grid.attributes.iter().map(|a| a.name.as_str()).collect();
    println!("task,{}", header.join(","));
    for (task_index, option) in result.design.indexed_options() {
        let cells: Vec<&str> = option
            .in_grid_order(&grid)
            .map(|(_, level)| level.unwrap_or(""))
            .collect();
        println!("{task_index},{}", cells.join(","));
    }
    if let Some(notes) = &result.notes {
        println!("  {notes}");
    }
    println!();

    // Constraint validation
    let spec = ConstraintSpec {
        prohibited_combinations: vec![ProhibitedCombination::new([("Brand", "Acme"), ("Price", "$9")])
            .with_reason("Acme never discounts")],
        required_combinations: vec![RequiredCombination::new([("Brand", "Initech"), ("Color", "Blue")])],
        ..Default::default()
    };
    let checked = DesignBuilder::new(grid.clone())
        .method(Method::Balanced)
        .constraints(spec)
        .build()
        .expect("Failed to generate design");
    if let Some(report) = &checked.constraint_report {
        if report.is_valid {
            println!("✓ Balanced design satisfies all constraints");
        } else {
            println!("✗ Balanced design has {} violation(s):", report.violations.len());
            for violation in &report.violations {
                println!("  {violation}");
            }
        }
    }
    println!();

    // Study sizing
    let plan = optimize_parameters(&grid, &OptimizationRequest::default())
        .expect("Failed to optimize parameters");
    println!("Study plan for 80% power:");
    println!("  Respondents: {}", plan.num_respondents);
    println!("  Screens: {}", plan.num_screens);
    println!("  Options per screen: {}", plan.options_per_screen);
    println!("  Power: {:.3}", plan.expected_power);
    for note in &plan.notes {
        println!("  {note}");
    }
}
