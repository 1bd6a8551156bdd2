//! CSV parser with encoding detection, permissive decoding and header skipping.
//!
//! Converts raw bytes into a typed [`TidyTable`]. No tagging or reshaping here.

use crate::error::{ParseError, ParseResult};
use crate::table::{infer_column, TidyTable, Value};

/// Options for parsing one CSV file.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOptions {
    /// Leading non-data lines to discard before the header row.
    pub header_skip: usize,
    /// Field delimiter (auto-detect from the header row if not specified).
    pub delimiter: Option<char>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            header_skip: 0,
            delimiter: Some(','),
        }
    }
}

impl ParseOptions {
    pub fn with_header_skip(mut self, header_skip: usize) -> Self {
        self.header_skip = header_skip;
        self
    }

    pub fn with_delimiter(mut self, delimiter: Option<char>) -> Self {
        self.delimiter = delimiter;
        self
    }
}

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParsedCsv {
    /// Parsed, typed table
    pub table: TidyTable,
    /// Detected encoding label
    pub encoding: String,
    /// Delimiter actually used
    pub delimiter: char,
}

/// Single-byte Western encodings trusted from chardet's guess.
const LATIN_ENCODINGS: [&str; 2] = ["windows-1252", "iso-8859-15"];

/// Detect the encoding of raw bytes.
///
/// Valid UTF-8 (including plain ASCII) is always reported as `utf-8`. Other
/// input is handed to chardet; only Latin-family guesses are trusted, anything
/// else falls back to `windows-1252`.
pub fn detect_encoding(bytes: &[u8]) -> String {
    if std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }

    let charset = chardet::detect(bytes).0;

    // Normalize charset names
    let label = match charset.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    };

    encoding_rs::Encoding::for_label(label.as_bytes())
        .map(|encoding| encoding.name().to_lowercase())
        .filter(|name| LATIN_ENCODINGS.contains(&name.as_str()))
        .unwrap_or_else(|| "windows-1252".to_string())
}

/// Decode bytes to a string using the given encoding label.
///
/// Never fails: invalid sequences become replacement characters, and unknown
/// labels fall back to `windows-1252`, which maps every byte.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let encoding = encoding_rs::Encoding::for_label(encoding.as_bytes())
        .unwrap_or(encoding_rs::WINDOWS_1252);
    let (decoded, _, _) = encoding.decode(bytes);
    decoded.into_owned()
}

/// Detect the delimiter by counting occurrences in one line.
pub fn detect_delimiter(line: &str) -> char {
    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Byte offset just past the first `n` lines of `content`.
fn skip_lines(content: &str, n: usize) -> ParseResult<usize> {
    if n == 0 {
        return Ok(0);
    }
    let mut seen = 0;
    for (offset, _) in content.match_indices('\n') {
        seen += 1;
        if seen == n {
            return Ok(offset + 1);
        }
    }
    let total = content.lines().count();
    Err(ParseError::new(
        0,
        format!("header_skip {} leaves no header row ({} lines in file)", n, total),
    ))
}

/// Turn raw header cells into unique column names.
///
/// Blank names become `Unnamed: <index>`; repeated names get a `.<n>` suffix.
fn normalize_headers(raw: &csv::StringRecord) -> Vec<String> {
    let mut headers: Vec<String> = Vec::with_capacity(raw.len());
    for (i, cell) in raw.iter().enumerate() {
        let base = if cell.is_empty() {
            format!("Unnamed: {}", i)
        } else {
            cell.to_string()
        };
        let mut name = base.clone();
        let mut n = 1;
        while headers.contains(&name) {
            name = format!("{}.{}", base, n);
            n += 1;
        }
        headers.push(name);
    }
    headers
}

/// Parse decoded CSV text into a typed table.
pub fn parse_str(content: &str, options: &ParseOptions) -> ParseResult<ParsedCsv> {
    let start = skip_lines(content, options.header_skip)?;
    let body = &content[start..];

    let header_line = body
        .lines()
        .find(|l| !l.trim().is_empty())
        .ok_or_else(|| ParseError::new(options.header_skip + 1, "No header row found"))?;
    let delimiter = options
        .delimiter
        .unwrap_or_else(|| detect_delimiter(header_line));

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .delimiter(delimiter as u8)
        .from_reader(body.as_bytes());

    let mut records = reader.records();

    let header = records
        .next()
        .ok_or_else(|| ParseError::new(options.header_skip + 1, "No header row found"))?
        .map_err(|e| ParseError::new(options.header_skip + 1, format!("Cannot read header: {}", e)))?;
    let headers = normalize_headers(&header);

    // Raw cells, column-major once all rows are read
    let mut raw_rows: Vec<csv::StringRecord> = Vec::new();
    for result in records {
        let record = result.map_err(|e| {
            let line = e
                .position()
                .map(|p| p.line() as usize + options.header_skip)
                .unwrap_or(0);
            ParseError::new(line, format!("Cannot read record: {}", e))
        })?;
        let line = record
            .position()
            .map(|p| p.line() as usize + options.header_skip)
            .unwrap_or(0);

        if record.len() > headers.len() {
            return Err(ParseError::new(
                line,
                format!("Expected {} fields, found {}", headers.len(), record.len()),
            ));
        }
        raw_rows.push(record);
    }

    let columns: Vec<Vec<Value>> = (0..headers.len())
        .map(|col| {
            let cells: Vec<&str> = raw_rows
                .iter()
                .map(|record| record.get(col).unwrap_or(""))
                .collect();
            infer_column(&cells)
        })
        .collect();

    let mut table = TidyTable::new(headers.iter().cloned())
        .map_err(|e| ParseError::new(options.header_skip + 1, e.to_string()))?;
    for row_idx in 0..raw_rows.len() {
        let row = columns.iter().map(|col| col[row_idx].clone()).collect();
        table
            .push_row(row)
            .map_err(|e| ParseError::new(0, e.to_string()))?;
    }

    Ok(ParsedCsv {
        table,
        encoding: "utf-8".to_string(),
        delimiter,
    })
}

/// Parse CSV bytes with encoding detection.
pub fn parse_bytes(bytes: &[u8], options: &ParseOptions) -> ParseResult<ParsedCsv> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let mut parsed = parse_str(&content, options)?;
    parsed.encoding = encoding;
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(skip: usize) -> ParseOptions {
        ParseOptions::default().with_header_skip(skip)
    }

    #[test]
    fn test_simple_csv() {
        let parsed = parse_str("Country,2016,2017\nA,1,3\nB,2,4", &opts(0)).unwrap();
        let table = parsed.table;

        assert_eq!(table.columns(), &["Country", "2016", "2017"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0, "Country"), Some(&Value::text("A")));
        assert_eq!(table.get(1, "2017"), Some(&Value::Int(4)));
    }

    #[test]
    fn test_header_skip() {
        let csv = "Title line\nSource: somewhere\nYEAR,2017\nWorld,10.5\n";
        let table = parse_str(csv, &opts(2)).unwrap().table;

        assert_eq!(table.columns(), &["YEAR", "2017"]);
        assert_eq!(table.get(0, "2017"), Some(&Value::Float(10.5)));
    }

    #[test]
    fn test_header_skip_exceeds_lines() {
        let err = parse_str("a,b\n1,2\n", &opts(5)).unwrap_err();
        assert!(err.message.contains("header_skip 5"));
    }

    #[test]
    fn test_header_skip_consumes_everything() {
        let err = parse_str("one\ntwo\n", &opts(2)).unwrap_err();
        assert!(err.message.contains("No header row"));
    }

    #[test]
    fn test_quoted_values() {
        let csv = "name,value\n\"Developed economies: Europe\",\"1,5\"";
        let table = parse_str(csv, &opts(0)).unwrap().table;

        assert_eq!(table.get(0, "name"), Some(&Value::text("Developed economies: Europe")));
        assert_eq!(table.get(0, "value"), Some(&Value::text("1,5")));
    }

    #[test]
    fn test_short_rows_padded_with_null() {
        let table = parse_str("a,b,c\n1,2\n", &opts(0)).unwrap().table;
        assert_eq!(table.get(0, "c"), Some(&Value::Null));
    }

    #[test]
    fn test_long_rows_rejected() {
        let err = parse_str("a,b\n1,2\n1,2,3\n", &opts(0)).unwrap_err();
        assert_eq!(err.line, 3);
        assert!(err.message.contains("Expected 2 fields"));
    }

    #[test]
    fn test_long_row_line_accounts_for_skip() {
        let err = parse_str("note\na,b\n1,2,3\n", &opts(1)).unwrap_err();
        assert_eq!(err.line, 3);
    }

    #[test]
    fn test_blank_and_duplicate_headers() {
        let table = parse_str(",x,x\n1,2,3\n", &opts(0)).unwrap().table;
        assert_eq!(table.columns(), &["Unnamed: 0", "x", "x.1"]);
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c"), ';');
        assert_eq!(detect_delimiter("a,b,c"), ',');
        assert_eq!(detect_delimiter("a\tb\tc"), '\t');
        assert_eq!(detect_delimiter("a|b|c"), '|');
        assert_eq!(detect_delimiter("single"), ',');
    }

    #[test]
    fn test_auto_delimiter_uses_header_row() {
        let csv = "notes, with, commas\nname;age\nAlice;30\n";
        let options = opts(1).with_delimiter(None);
        let parsed = parse_str(csv, &options).unwrap();
        assert_eq!(parsed.delimiter, ';');
        assert_eq!(parsed.table.get(0, "age"), Some(&Value::Int(30)));
    }

    #[test]
    fn test_latin1_decoding() {
        // "Côte" in ISO-8859-1
        let bytes: &[u8] = &[0x43, 0xF4, 0x74, 0x65];
        assert_eq!(decode_content(bytes, "iso-8859-1"), "Côte");
    }

    #[test]
    fn test_non_utf8_file_is_decoded_not_rejected() {
        let mut bytes = b"Country,2017\nC".to_vec();
        bytes.push(0xF4);
        bytes.extend_from_slice(b"te d'Ivoire,5\n");

        let parsed = parse_bytes(&bytes, &opts(0)).unwrap();
        assert_ne!(parsed.encoding, "utf-8");

        assert_eq!(parsed.table.get(0, "Country"), Some(&Value::text("Côte d'Ivoire")));
        assert_eq!(parsed.table.get(0, "2017"), Some(&Value::Int(5)));
    }

    #[test]
    fn test_decode_never_fails() {
        let decoded = decode_content(&[0x41, 0xFF, 0x42], "utf-8");
        assert!(decoded.starts_with('A'));
        assert!(decoded.ends_with('B'));
    }
}
