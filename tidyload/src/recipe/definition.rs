//! Recipe definition
//!
//! A recipe names where the data comes from, the steps applied to it and,
//! optionally, how the result should be charted.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::executor::apply_steps;
use super::steps::Step;
use crate::chart::{ChartKind, ChartSpec};
use crate::error::{LoadError, RecipeError, RecipeResult};
use crate::loader::{load_table, load_tagged, LoadOptions};
use crate::logs::log_info_indent;
use crate::reshape::MeltSpec;
use crate::table::TidyTable;

/// A complete analysis recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Version of the recipe format
    #[serde(default = "default_version")]
    pub version: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Where the input table comes from
    pub source: Source,

    /// Ordered steps applied to the source table
    #[serde(default)]
    pub steps: Vec<Step>,

    /// How to chart the final table
    #[serde(default)]
    pub chart: Option<ChartSpec>,

    /// Directory relative source paths are resolved against
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_header_skip() -> usize {
    2
}

/// Input of a recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Source {
    /// Every file starting with `pattern`, tagged from its name
    Tagged {
        pattern: String,
        tag_start: usize,
        #[serde(default)]
        delimiter: Option<String>,
        #[serde(default = "default_header_skip")]
        header_skip: usize,
    },

    /// One file, untagged
    File {
        path: String,
        #[serde(default = "default_header_skip")]
        header_skip: usize,
    },

    /// Several series stacked into one table (union of columns)
    Concat { parts: Vec<SourcePart> },
}

/// One series of a [`Source::Concat`]: a source and the steps shaping it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcePart {
    pub source: Source,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl SourcePart {
    pub fn new(source: Source) -> Self {
        Self { source, steps: Vec::new() }
    }

    pub fn with_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }
}

impl Source {
    /// Load the source table, resolving relative paths against `base_dir`
    pub fn load(&self, base_dir: Option<&Path>) -> RecipeResult<TidyTable> {
        match self {
            Source::Tagged { pattern, tag_start, delimiter, header_skip } => {
                let mut options = LoadOptions::new(*tag_start).with_header_skip(*header_skip);
                if let Some(delimiter) = delimiter {
                    options = options.with_delimiter(delimiter.clone());
                }
                let pattern = resolve(base_dir, pattern);
                Ok(load_tagged(&pattern.to_string_lossy(), &options)?)
            }
            Source::File { path, header_skip } => {
                Ok(load_table(resolve(base_dir, path), *header_skip)?)
            }
            Source::Concat { parts } => {
                if parts.is_empty() {
                    return Err(LoadError::Configuration(
                        "concat source needs at least one part".to_string(),
                    )
                    .into());
                }
                let mut tables = Vec::with_capacity(parts.len());
                for (index, part) in parts.iter().enumerate() {
                    let table = part
                        .source
                        .load(base_dir)
                        .and_then(|table| apply_steps(table, &part.steps))
                        .map(|(table, _)| table)
                        .map_err(|source| RecipeError::Part {
                            index,
                            source: Box::new(source),
                        })?;
                    log_info_indent(format!("part {}: {} rows", index, table.len()), 1);
                    tables.push(table);
                }
                Ok(TidyTable::concat(&tables))
            }
        }
    }
}

fn resolve(base_dir: Option<&Path>, path: &str) -> PathBuf {
    match base_dir {
        Some(base) if Path::new(path).is_relative() => base.join(path),
        _ => PathBuf::from(path),
    }
}

impl Recipe {
    /// Create a recipe with no steps
    pub fn new(source: Source) -> Self {
        Self {
            version: default_version(),
            description: String::new(),
            source,
            steps: Vec::new(),
            chart: None,
            base_dir: None,
        }
    }

    /// Parse a recipe from a JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Read a recipe file; relative source paths resolve against its directory
    pub fn from_file(path: impl AsRef<Path>) -> RecipeResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut recipe = Self::from_json(&content)?;
        recipe.base_dir = path.parent().map(Path::to_path_buf);
        Ok(recipe)
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Add a step to the chain
    pub fn with_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn with_chart(mut self, chart: ChartSpec) -> Self {
        self.chart = Some(chart);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Example recipe: five-year import dynamics from the tagged trade tables
pub fn example_recipe() -> Recipe {
    let years: Vec<String> = (2013..=2017).map(|y| y.to_string()).collect();
    let mut columns = years.clone();
    columns.push("Type".to_string());

    Recipe::new(Source::Tagged {
        pattern: "data/chinese-import-".to_string(),
        tag_start: 2,
        delimiter: None,
        header_skip: 2,
    })
    .with_description("Chinese imports from the world, 2013-2017, summed over categories")
    .with_step(Step::FilterEquals {
        column: "YEAR".to_string(),
        value: "World".to_string(),
    })
    .with_step(Step::Select { columns })
    .with_step(Step::Melt(
        MeltSpec::new(["Type"])
            .with_value_columns(years)
            .with_value_name("Trade Volume, Thousand $US"),
    ))
    .with_step(Step::GroupSum {
        by: "Year".to_string(),
        value: "Trade Volume, Thousand $US".to_string(),
    })
    .with_step(Step::Constant {
        column: "Type".to_string(),
        value: serde_json::Value::String("Import".to_string()),
    })
    .with_chart(ChartSpec {
        kind: ChartKind::Point,
        x: "Year".to_string(),
        y: "Trade Volume, Thousand $US".to_string(),
        hue: Some("Type".to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_serialization() {
        let recipe = example_recipe();
        let json = recipe.to_json().unwrap();
        let parsed = Recipe::from_json(&json).unwrap();
        assert_eq!(parsed, recipe);
    }

    #[test]
    fn test_source_defaults() {
        let recipe = Recipe::from_json(
            r#"{ "source": { "type": "file", "path": "fdi.csv" } }"#,
        )
        .unwrap();
        assert_eq!(recipe.version, "1.0");
        assert!(recipe.steps.is_empty());
        assert_eq!(
            recipe.source,
            Source::File { path: "fdi.csv".to_string(), header_skip: 2 }
        );
    }

    #[test]
    fn test_bundled_recipes_parse() {
        let bundled = [
            include_str!("../../../recipes/import-dynamics.json"),
            include_str!("../../../recipes/import-developed-economies.json"),
            include_str!("../../../recipes/export-by-type.json"),
            include_str!("../../../recipes/trade-dynamics.json"),
            include_str!("../../../recipes/fdi-flow.json"),
            include_str!("../../../recipes/fdi-2017-stock.json"),
        ];
        for json in bundled {
            let recipe = Recipe::from_json(json).unwrap();
            assert!(recipe.chart.is_some());
            match &recipe.source {
                Source::Concat { parts } => {
                    assert_eq!(parts.len(), 2);
                    assert!(parts.iter().all(|p| !p.steps.is_empty()));
                }
                _ => assert!(!recipe.steps.is_empty()),
            }
        }
    }

    #[test]
    fn test_concat_source_deserialize() {
        let recipe = Recipe::from_json(
            r#"{
                "source": {
                    "type": "concat",
                    "parts": [
                        { "source": { "type": "file", "path": "in.csv", "header_skip": 4 } },
                        {
                            "source": { "type": "file", "path": "out.csv", "header_skip": 4 },
                            "steps": [{ "type": "constant", "column": "Type", "value": "Outward" }]
                        }
                    ]
                }
            }"#,
        )
        .unwrap();

        let expected = Source::Concat {
            parts: vec![
                SourcePart::new(Source::File { path: "in.csv".into(), header_skip: 4 }),
                SourcePart::new(Source::File { path: "out.csv".into(), header_skip: 4 }).with_step(
                    Step::Constant {
                        column: "Type".into(),
                        value: serde_json::Value::String("Outward".into()),
                    },
                ),
            ],
        };
        assert_eq!(recipe.source, expected);
    }

    #[test]
    fn test_resolve_relative_paths() {
        let base = Path::new("/srv/recipes");
        assert_eq!(resolve(Some(base), "data/x-"), PathBuf::from("/srv/recipes/data/x-"));
        assert_eq!(resolve(Some(base), "/abs/x-"), PathBuf::from("/abs/x-"));
        assert_eq!(resolve(None, "data/x-"), PathBuf::from("data/x-"));
    }
}
