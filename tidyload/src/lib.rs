//! # tidyload - Tagged CSV ingestion and tidy reshaping
//!
//! tidyload loads families of similarly-named statistical CSV files (one file
//! per category, e.g. `chinese-import-asia.csv`, `chinese-import-europe.csv`),
//! tags every row with a label derived from its file name, and reshapes the
//! combined wide table into tidy long form for charting.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV files  │────▶│   Loader    │────▶│   Reshape   │────▶│ Chart data  │
//! │ (ISO/UTF8)  │     │ (tag+concat)│     │ (melt, sum) │     │   (JSON)    │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tidyload::{load_tagged, melt, group_sum, LoadOptions};
//!
//! let imports = load_tagged("data/chinese-import-", &LoadOptions::new(2))?;
//! let world = tidyload::filter_equals(&imports, "YEAR", "World")?;
//! let long = melt(&world.select(&["2016", "2017", "Type"])?, &["Type"], "Year", "Volume")?;
//! let per_year = group_sum(&long, "Year", "Volume")?;
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`table`] - Tidy table and cell values
//! - [`parser`] - CSV parsing with encoding detection
//! - [`loader`] - Tagged multi-file loading
//! - [`reshape`] - Melt, group-sum and row subsets
//! - [`recipe`] - Declarative JSON pipelines
//! - [`chart`] - Chart-ready export
//! - [`logs`] - Run log

// Core modules
pub mod error;
pub mod logs;
pub mod table;

// Parsing and loading
pub mod loader;
pub mod parser;

// Transformation
pub mod reshape;
pub mod recipe;

// Output
pub mod chart;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    LoadError,
    ParseError,
    PipelineError,
    RecipeError,
    SchemaError,
};

// =============================================================================
// Re-exports - Table
// =============================================================================

pub use table::{TidyTable, Value};

// =============================================================================
// Re-exports - Parsing and loading
// =============================================================================

pub use parser::{
    decode_content,
    detect_delimiter,
    detect_encoding,
    parse_bytes,
    parse_str,
    ParseOptions,
    ParsedCsv,
};

pub use loader::{
    file_tag,
    load_table,
    load_tagged,
    matching_files,
    LoadOptions,
    TAG_COLUMN,
};

// =============================================================================
// Re-exports - Reshape
// =============================================================================

pub use reshape::{
    exclude_contains,
    filter_contains,
    filter_equals,
    group_sum,
    melt,
    melt_with,
    MeltSpec,
};

// =============================================================================
// Re-exports - Recipes and charts
// =============================================================================

pub use recipe::{
    example_recipe,
    run_recipe,
    steps_description,
    Recipe,
    RecipeRun,
    Source,
    SourcePart,
    Step,
};

pub use chart::{ChartData, ChartKind, ChartSpec};
