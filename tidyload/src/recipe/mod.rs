//! Declarative recipes over tidy tables
//!
//! This module provides:
//! - `definition`: Recipe and source definition (JSON)
//! - `steps`: Available table steps
//! - `executor`: Run recipes and trace each step
//!
//! ## Usage Flow
//!
//! ```text
//! recipe.json → Recipe::from_file → Source::load → steps → TidyTable (+ ChartData)
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use tidyload::recipe::{run_recipe, Recipe};
//!
//! let recipe = Recipe::from_file("recipes/import-dynamics.json")?;
//! let run = run_recipe(&recipe)?;
//! println!("{}", run.summary());
//! ```

pub mod definition;
pub mod executor;
pub mod steps;

// Re-exports for convenience
pub use definition::{example_recipe, Recipe, Source, SourcePart};
pub use executor::{apply_steps, run_on_table, run_recipe, RecipeRun, StepTrace};
pub use steps::{steps_description, Step};
