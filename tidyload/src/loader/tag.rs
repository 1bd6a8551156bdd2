//! File tags: category labels derived from file names.
//!
//! ```text
//! data/chinese-import-asia-pacific.csv
//!      └─────┬─────┘ └─────┬─────┘
//!        skipped      kept (tag_start = 2)   →  "Asia Pacific"
//! ```

use std::path::Path;

/// Stem of a file name: directory and last extension removed.
fn stem(filename: &str) -> &str {
    Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename)
}

/// First character uppercased, the rest lowercased.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Number of `delimiter`-separated segments in the file's stem.
pub fn segment_count(filename: &str, delimiter: &str) -> usize {
    if delimiter.is_empty() {
        return 1;
    }
    stem(filename).split(delimiter).count()
}

/// Derive the tag of `filename`.
///
/// The stem is split on `delimiter`, the first `tag_start` segments are
/// dropped and the rest are capitalized and joined with single spaces. A
/// `tag_start` past the last segment yields an empty tag; the loader rejects
/// that case before calling this.
pub fn file_tag(filename: &str, tag_start: usize, delimiter: &str) -> String {
    let stem = stem(filename);
    let segments: Vec<&str> = if delimiter.is_empty() {
        vec![stem]
    } else {
        stem.split(delimiter).collect()
    };

    segments
        .iter()
        .skip(tag_start)
        .map(|s| capitalize(s))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_segment_tag() {
        assert_eq!(file_tag("chinese-import-asia.csv", 2, "-"), "Asia");
    }

    #[test]
    fn test_multi_segment_tag() {
        assert_eq!(
            file_tag("./src/data/chinese-export-latin-america.csv", 2, "-"),
            "Latin America"
        );
    }

    #[test]
    fn test_capitalize_lowers_the_rest() {
        assert_eq!(file_tag("trade-EUROPE.csv", 1, "-"), "Europe");
    }

    #[test]
    fn test_tag_is_pure() {
        let first = file_tag("chinese-import-asia.csv", 2, "-");
        let _ = file_tag("chinese-import-oceania.csv", 2, "-");
        assert_eq!(first, file_tag("chinese-import-asia.csv", 2, "-"));
    }

    #[test]
    fn test_other_delimiter() {
        assert_eq!(file_tag("fdi_inward_flow.csv", 1, "_"), "Inward Flow");
    }

    #[test]
    fn test_tag_start_zero_keeps_everything() {
        assert_eq!(file_tag("world.csv", 0, "-"), "World");
    }

    #[test]
    fn test_tag_start_past_end_is_empty() {
        assert_eq!(file_tag("chinese-import.csv", 2, "-"), "");
    }

    #[test]
    fn test_segment_count() {
        assert_eq!(segment_count("data/chinese-import-asia.csv", "-"), 3);
        assert_eq!(segment_count("asia.csv", "-"), 1);
    }
}
