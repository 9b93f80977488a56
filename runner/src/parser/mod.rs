//! CSV reading with encoding and delimiter auto-detection.
//!
//! Turns raw bytes into a header row plus data rows of raw cell strings.
//! No validation happens here; the engine only consumes [`CsvData`].

use std::path::Path;

use crate::config::RunOptions;
use crate::error::{CsvError, CsvResult};

/// Header row plus data rows, each row aligned with the headers.
///
/// Rows may be ragged: a missing trailing cell reads as blank, surplus cells
/// are kept so baseline checks can report them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvData {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Build from string slices, mostly for tests and embedders.
    pub fn from_rows<H, R, C>(headers: &[H], rows: &[R]) -> Self
    where
        H: AsRef<str>,
        R: AsRef<[C]>,
        C: AsRef<str>,
    {
        Self {
            headers: headers.iter().map(|h| h.as_ref().to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.as_ref().iter().map(|c| c.as_ref().to_string()).collect())
                .collect(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Raw cell text; blank when the row is too short.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// A tokenized input file plus its identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowFile {
    pub file_name: String,
    /// Detected type, the lower-cased extension.
    pub file_type: Option<String>,
    pub data: CsvData,
}

impl WorkflowFile {
    /// Wrap already-tokenized data, detecting the type from the file name.
    pub fn new(file_name: impl Into<String>, data: CsvData) -> Self {
        let file_name = file_name.into();
        Self {
            file_type: detect_file_type(&file_name),
            file_name,
            data,
        }
    }

    pub fn with_file_type(mut self, file_type: Option<String>) -> Self {
        self.file_type = file_type;
        self
    }
}

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub data: CsvData,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
}

/// File type from the file name extension, lower-cased.
pub fn detect_file_type(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(|e| e.to_lowercase())
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "iso-8859-15" | "latin-9" | "latin9" => "iso-8859-15".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => String::from_utf8(bytes.to_vec())
            .map_err(|e| CsvError::Encoding(e.to_string())),
        // WHATWG maps the latin1 labels to windows-1252
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => {
            Ok(encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned())
        }
        "iso-8859-15" | "latin-9" | "latin9" => {
            Ok(encoding_rs::ISO_8859_15.decode(bytes).0.into_owned())
        }
        _ => Ok(String::from_utf8_lossy(bytes).into_owned()),
    }
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Tokenize CSV text with an explicit delimiter.
///
/// Headers are trimmed; cells are kept raw. Whitespace-only lines are skipped.
///
/// # Example
/// ```ignore
/// use workflow_runner::parser::parse_csv_str;
///
/// let data = parse_csv_str("name,age\nAlice,30\nBob,25", ',').unwrap();
/// assert_eq!(data.headers, vec!["name", "age"]);
/// assert_eq!(data.cell(1, 1), "25");
/// ```
pub fn parse_csv_str(content: &str, delimiter: char) -> CsvResult<CsvData> {
    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile);
    }
    let delimiter_byte =
        u8::try_from(delimiter).map_err(|_| CsvError::InvalidDelimiter(delimiter))?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter_byte)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.is_empty() || headers.iter().all(String::is_empty) {
        return Err(CsvError::NoHeaders);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.len() == 1 && record[0].trim().is_empty() {
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(CsvData { headers, rows })
}

/// Parse CSV bytes, auto-detecting encoding and (unless given) delimiter.
pub fn parse_bytes_auto(bytes: &[u8], delimiter: Option<char>) -> CsvResult<ParseResult> {
    if bytes.is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(&content));
    let data = parse_csv_str(&content, delimiter)?;

    Ok(ParseResult {
        data,
        encoding,
        delimiter,
    })
}

/// A file read from disk, with the encoding and delimiter used to read it.
#[derive(Debug, Clone)]
pub struct ReadResult {
    pub file: WorkflowFile,
    pub encoding: String,
    pub delimiter: char,
}

/// Read a file from disk, keeping the detected reading parameters.
pub fn read_file<P: AsRef<Path>>(path: P, options: &RunOptions) -> CsvResult<ReadResult> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let parsed = parse_bytes_auto(&bytes, options.delimiter)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(ReadResult {
        file: WorkflowFile::new(file_name, parsed.data),
        encoding: parsed.encoding,
        delimiter: parsed.delimiter,
    })
}

/// Read a file from disk into a [`WorkflowFile`].
pub fn read_workflow_file<P: AsRef<Path>>(
    path: P,
    options: &RunOptions,
) -> CsvResult<WorkflowFile> {
    read_file(path, options).map(|read| read.file)
}

/// Format delimiter for display
pub fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_simple_csv() {
        let data = parse_csv_str("name,age\nAlice,30\nBob,25", ',').unwrap();

        assert_eq!(data.headers, vec!["name", "age"]);
        assert_eq!(data.row_count(), 2);
        assert_eq!(data.cell(0, 0), "Alice");
        assert_eq!(data.cell(1, 1), "25");
    }

    #[test]
    fn test_quoted_values() {
        let data = parse_csv_str("name;value\n\"Alice\";\"Hello; World\"", ';').unwrap();

        assert_eq!(data.cell(0, 0), "Alice");
        assert_eq!(data.cell(0, 1), "Hello; World");
    }

    #[test]
    fn test_headers_trimmed_cells_raw() {
        let data = parse_csv_str(" name , age\n Alice ,30", ',').unwrap();

        assert_eq!(data.headers, vec!["name", "age"]);
        assert_eq!(data.cell(0, 0), " Alice ");
    }

    #[test]
    fn test_empty_lines_skipped() {
        let data = parse_csv_str("a,b\n1,2\n\n3,4\n", ',').unwrap();
        assert_eq!(data.row_count(), 2);
    }

    #[test]
    fn test_ragged_rows() {
        let data = parse_csv_str("a,b,c\n1,2\n1,2,3,4", ',').unwrap();

        assert_eq!(data.cell(0, 2), "");
        assert_eq!(data.rows[1].len(), 4);
    }

    #[test]
    fn test_empty_csv_error() {
        assert!(matches!(parse_csv_str("", ','), Err(CsvError::EmptyFile)));
        assert!(matches!(parse_bytes_auto(b"", None), Err(CsvError::EmptyFile)));
    }

    #[test]
    fn test_invalid_delimiter() {
        assert!(matches!(
            parse_csv_str("a,b\n1,2", '→'),
            Err(CsvError::InvalidDelimiter('→'))
        ));
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
        assert_eq!(detect_delimiter("a|b|c\n1|2|3"), '|');
        assert_eq!(detect_delimiter("single"), ',');
    }

    #[test]
    fn test_detect_file_type() {
        assert_eq!(detect_file_type("grades.CSV"), Some("csv".to_string()));
        assert_eq!(detect_file_type("dir/grades.tsv"), Some("tsv".to_string()));
        assert_eq!(detect_file_type("grades"), None);
    }

    #[test]
    fn test_auto_parse() {
        let result = parse_bytes_auto(b"name;age\nAlice;30\nBob;25", None).unwrap();

        assert_eq!(result.delimiter, ';');
        assert_eq!(result.encoding, "utf-8");
        assert_eq!(result.data.headers, vec!["name", "age"]);
        assert_eq!(result.data.row_count(), 2);
    }

    #[test]
    fn test_bom_stripped() {
        let result = parse_bytes_auto(b"\xEF\xBB\xBFname,age\nAlice,30", None).unwrap();
        assert_eq!(result.data.headers[0], "name");
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1").unwrap();
        assert_eq!(decoded, "Société");
    }

    #[test]
    fn test_latin1_symbols_not_read_as_latin9() {
        // 0xA4 is the currency sign in ISO-8859-1, the euro sign in ISO-8859-15
        assert_eq!(decode_content(b"\xA4\xBD", "iso-8859-1").unwrap(), "¤½");
        assert_eq!(decode_content(b"\xA4", "latin1").unwrap(), "¤");
        assert_eq!(decode_content(b"\xA4", "iso-8859-15").unwrap(), "€");
    }

    #[test]
    fn test_read_workflow_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grades.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "studentName,grade\nAda,A\n").unwrap();

        let read = read_file(&path, &RunOptions::default()).unwrap();
        assert_eq!(read.encoding, "utf-8");
        assert_eq!(read.delimiter, ',');

        let file = read_workflow_file(&path, &RunOptions::default()).unwrap();
        assert_eq!(file.file_name, "grades.csv");
        assert_eq!(file.file_type.as_deref(), Some("csv"));
        assert_eq!(file.data.row_count(), 1);
    }
}
