//! Tagged multi-file loader.
//!
//! Reads every CSV file whose name starts with a path prefix, tags each row
//! with a label derived from its file name and concatenates the results.
//!
//! # Example
//!
//! ```rust,ignore
//! use tidyload::{load_tagged, LoadOptions};
//!
//! // data/chinese-import-asia.csv, data/chinese-import-europe.csv, ...
//! let imports = load_tagged("data/chinese-import-", &LoadOptions::new(2))?;
//! assert!(imports.has_column("Type"));
//! ```

pub mod tag;

pub use tag::{file_tag, segment_count};

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{LoadError, LoadResult};
use crate::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::parser::{parse_bytes, ParseOptions};
use crate::table::{TidyTable, Value};

/// Reserved column holding each row's file tag.
pub const TAG_COLUMN: &str = "Type";

/// Options for [`load_tagged`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Number of leading file-name segments dropped from the tag.
    pub tag_start: usize,

    /// Segment delimiter inside file names.
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// Non-data lines discarded before each file's header row.
    #[serde(default = "default_header_skip")]
    pub header_skip: usize,

    /// File extension of matching files (without the dot).
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Column receiving the tag.
    #[serde(default = "default_tag_column")]
    pub tag_column: String,

    /// CSV field delimiter. `,` by default, auto-detected from the header row when `None`.
    #[serde(default = "default_csv_delimiter")]
    pub csv_delimiter: Option<char>,
}

fn default_delimiter() -> String {
    "-".to_string()
}

fn default_header_skip() -> usize {
    2
}

fn default_extension() -> String {
    "csv".to_string()
}

fn default_tag_column() -> String {
    TAG_COLUMN.to_string()
}

fn default_csv_delimiter() -> Option<char> {
    Some(',')
}

impl LoadOptions {
    /// Options with the default delimiter (`-`) and header skip (2).
    pub fn new(tag_start: usize) -> Self {
        Self {
            tag_start,
            delimiter: default_delimiter(),
            header_skip: default_header_skip(),
            extension: default_extension(),
            tag_column: default_tag_column(),
            csv_delimiter: default_csv_delimiter(),
        }
    }

    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    pub fn with_header_skip(mut self, header_skip: usize) -> Self {
        self.header_skip = header_skip;
        self
    }

    pub fn with_csv_delimiter(mut self, csv_delimiter: Option<char>) -> Self {
        self.csv_delimiter = csv_delimiter;
        self
    }

    fn parse_options(&self) -> ParseOptions {
        ParseOptions::default()
            .with_header_skip(self.header_skip)
            .with_delimiter(self.csv_delimiter)
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Split a path prefix into the directory to scan and the file-name prefix.
fn split_pattern(pattern: &str) -> (PathBuf, String) {
    if pattern.is_empty() {
        return (PathBuf::from("."), String::new());
    }
    if pattern.ends_with('/') || pattern.ends_with(std::path::MAIN_SEPARATOR) {
        return (PathBuf::from(pattern), String::new());
    }

    let path = Path::new(pattern);
    let prefix = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_string();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    (dir, prefix)
}

/// Files whose name starts with the pattern's last component and ends with
/// `.{extension}`, sorted by file name.
pub fn matching_files(pattern: &str, extension: &str) -> LoadResult<Vec<PathBuf>> {
    let (dir, prefix) = split_pattern(pattern);
    let suffix = format!(".{}", extension);

    let entries = match fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => return Err(LoadError::Io { path: dir, source }),
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| LoadError::Io {
            path: dir.clone(),
            source,
        })?;
        let path = entry.path();
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => continue,
        };
        if name.starts_with(&prefix) && name.ends_with(&suffix) && path.is_file() {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Check `tag_start` and the delimiter against the matched files.
fn validate_tagging(files: &[PathBuf], options: &LoadOptions) -> LoadResult<()> {
    if options.delimiter.is_empty() {
        return Err(LoadError::Configuration(
            "file name delimiter must not be empty".to_string(),
        ));
    }

    let shortest = files
        .iter()
        .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
        .map(|name| (name, segment_count(name, &options.delimiter)))
        .min_by_key(|(_, count)| *count);

    if let Some((name, count)) = shortest {
        if options.tag_start > count {
            return Err(LoadError::Configuration(format!(
                "tag_start {} exceeds the {} segment(s) of '{}'",
                options.tag_start, count, name
            )));
        }
    }
    Ok(())
}

/// Read and parse one file, mapping failures to the loader's errors.
fn read_file(path: &Path, parse_options: &ParseOptions) -> LoadResult<(TidyTable, String)> {
    let bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed = parse_bytes(&bytes, parse_options).map_err(|e| e.with_file(path))?;
    Ok((parsed.table, parsed.encoding))
}

/// Load every file matching `pattern`, tag its rows and concatenate.
///
/// Any per-file failure aborts the whole load.
pub fn load_tagged(pattern: &str, options: &LoadOptions) -> LoadResult<TidyTable> {
    let files = matching_files(pattern, &options.extension)?;
    if files.is_empty() {
        return Err(LoadError::FileNotFound {
            pattern: format!("{}*.{}", pattern, options.extension),
        });
    }
    validate_tagging(&files, options)?;

    log_info(format!("Loading {} file(s) matching '{}'", files.len(), pattern));

    let parse_options = options.parse_options();
    let mut tables = Vec::with_capacity(files.len());

    for path in &files {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let tag = file_tag(name, options.tag_start, &options.delimiter);

        let (table, encoding) = read_file(path, &parse_options)?;
        if table.has_column(&options.tag_column) {
            log_warning(format!(
                "{} already has a '{}' column, overwriting it with the tag",
                name, options.tag_column
            ));
        }
        log_info_indent(
            format!("{} -> '{}' ({} rows, {})", name, tag, table.len(), encoding),
            1,
        );

        tables.push(table.with_constant(&options.tag_column, Value::Text(tag)));
    }

    let combined = TidyTable::concat(&tables);
    log_success(format!(
        "Loaded {} rows x {} columns",
        combined.len(),
        combined.columns().len()
    ));
    Ok(combined)
}

/// Load a single CSV file without tagging.
pub fn load_table(path: impl AsRef<Path>, header_skip: usize) -> LoadResult<TidyTable> {
    let path = path.as_ref();
    let parse_options = ParseOptions::default().with_header_skip(header_skip);
    let (table, encoding) = read_file(path, &parse_options)?;
    log_info(format!(
        "Read {} ({} rows, {})",
        path.display(),
        table.len(),
        encoding
    ));
    Ok(table)
}
