//! Recipe executor
//!
//! Loads a recipe's source and folds its steps over the table, stopping at the
//! first failing step.

use serde::Serialize;

use super::definition::Recipe;
use super::steps::Step;
use crate::chart::ChartData;
use crate::error::{RecipeError, RecipeResult};
use crate::logs::{log_error, log_info, log_info_indent, log_success};
use crate::table::TidyTable;

/// Shape of the table after one step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepTrace {
    pub index: usize,
    pub step: String,
    pub rows: usize,
    pub columns: usize,
}

/// Result of executing a recipe
#[derive(Debug, Clone)]
pub struct RecipeRun {
    /// Final table
    pub table: TidyTable,
    /// Row/column counts after each step, starting with the source
    pub trace: Vec<StepTrace>,
    /// Chart data when the recipe declares a chart
    pub chart: Option<ChartData>,
}

impl RecipeRun {
    /// Get summary statistics
    pub fn summary(&self) -> String {
        format!(
            "{} step(s), {} rows x {} columns",
            self.trace.len().saturating_sub(1),
            self.table.len(),
            self.table.columns().len()
        )
    }
}

/// Apply `steps` to `table` in order.
pub fn apply_steps(table: TidyTable, steps: &[Step]) -> RecipeResult<(TidyTable, Vec<StepTrace>)> {
    let mut trace = Vec::with_capacity(steps.len());
    let mut current = table;

    for (index, step) in steps.iter().enumerate() {
        current = step.apply(&current).map_err(|source| {
            log_error(format!("Step {} ({}) failed: {}", index, step.name(), source));
            RecipeError::Step {
                index,
                step: step.name().to_string(),
                source,
            }
        })?;
        log_info_indent(
            format!("{}: {} -> {} rows", index, step.name(), current.len()),
            1,
        );
        trace.push(StepTrace {
            index,
            step: step.name().to_string(),
            rows: current.len(),
            columns: current.columns().len(),
        });
    }

    Ok((current, trace))
}

/// Execute a recipe end to end.
pub fn run_recipe(recipe: &Recipe) -> RecipeResult<RecipeRun> {
    if !recipe.description.is_empty() {
        log_info(format!("Recipe: {}", recipe.description));
    }

    let source = recipe.source.load(recipe.base_dir.as_deref())?;
    run_on_table(recipe, source)
}

/// Execute a recipe's steps and chart on an already loaded table.
pub fn run_on_table(recipe: &Recipe, source: TidyTable) -> RecipeResult<RecipeRun> {
    let mut trace = vec![StepTrace {
        index: 0,
        step: "source".to_string(),
        rows: source.len(),
        columns: source.columns().len(),
    }];

    let (table, step_trace) = apply_steps(source, &recipe.steps)?;
    trace.extend(step_trace.into_iter().map(|mut t| {
        t.index += 1;
        t
    }));

    let chart = recipe
        .chart
        .as_ref()
        .map(|spec| ChartData::from_table(&table, spec))
        .transpose()
        .map_err(RecipeError::Chart)?;

    let run = RecipeRun { table, trace, chart };
    log_success(run.summary());
    Ok(run)
}
