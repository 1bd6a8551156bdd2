//! Error types for the tidyload pipeline.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`ParseError`] - Malformed CSV content (with file and line context)
//! - [`LoadError`] - Tagged loader errors (configuration, missing files, parse)
//! - [`SchemaError`] - Column references that do not fit a table
//! - [`RecipeError`] - Recipe loading and step execution errors
//! - [`PipelineError`] - Top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// CSV Parsing Errors
// =============================================================================

/// CSV parsing error with context.
#[derive(Debug, Clone)]
pub struct ParseError {
    /// File being parsed, when known.
    pub file: Option<PathBuf>,
    /// 1-based line number in the raw file (0 when not tied to a line).
    pub line: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            file: None,
            line,
            message: message.into(),
        }
    }

    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.file, self.line) {
            (Some(file), 0) => write!(f, "{}: {}", file.display(), self.message),
            (Some(file), line) => write!(f, "{}, line {}: {}", file.display(), line, self.message),
            (None, 0) => write!(f, "{}", self.message),
            (None, line) => write!(f, "Line {}: {}", line, self.message),
        }
    }
}

impl std::error::Error for ParseError {}

// =============================================================================
// Loader Errors
// =============================================================================

/// Errors raised by the tagged loader and single-file loader.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Bad call-site arguments (tag_start out of range, empty delimiter...).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The pattern matched no file.
    #[error("No file matches pattern '{pattern}'")]
    FileNotFound { pattern: String },

    /// A file could not be parsed.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// A file or directory could not be read.
    #[error("Failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// =============================================================================
// Schema Errors
// =============================================================================

/// Errors raised when an operation references columns a table does not fit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A referenced column is absent from the table.
    #[error("Unknown column: '{0}'")]
    UnknownColumn(String),

    /// The operation would produce two columns with the same name.
    #[error("Duplicate column: '{0}'")]
    DuplicateColumn(String),

    /// A row does not have one cell per column.
    #[error("Row has {found} cells but the table has {expected} columns")]
    ArityMismatch { expected: usize, found: usize },
}

// =============================================================================
// Recipe Errors
// =============================================================================

/// Errors while loading or executing a recipe.
#[derive(Debug, Error)]
pub enum RecipeError {
    /// Recipe JSON is malformed.
    #[error("Invalid recipe: {0}")]
    Json(#[from] serde_json::Error),

    /// Recipe file could not be read.
    #[error("Cannot read recipe: {0}")]
    Io(#[from] std::io::Error),

    /// Loading the recipe source failed.
    #[error("Source failed: {0}")]
    Source(#[from] LoadError),

    /// A step failed.
    #[error("Step {index} ({step}) failed: {source}")]
    Step {
        index: usize,
        step: String,
        #[source]
        source: SchemaError,
    },

    /// One part of a concat source failed.
    #[error("Source part {index} failed: {source}")]
    Part {
        index: usize,
        #[source]
        source: Box<RecipeError>,
    },

    /// Chart columns do not fit the final table.
    #[error("Chart error: {0}")]
    Chart(SchemaError),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level error type used by the CLI.
///
/// It wraps all lower-level errors so every subcommand can use `?`.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Recipe error: {0}")]
    Recipe(#[from] RecipeError),

    #[error("CSV output error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV parsing.
pub type ParseResult<T> = Result<T, ParseError>;

/// Result type for loader operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for table operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Result type for recipe operations.
pub type RecipeResult<T> = Result<T, RecipeError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
