//! CSV table reader/writer with encoding and delimiter auto-detection.
//!
//! Turns uploaded bytes into a [`Table`] and writes an [`OutputTable`] back
//! out. No lookup logic here.

use std::collections::HashSet;
use std::io::{Read, Write};
use std::path::Path;

use crate::error::{TableError, TableResult};
use crate::models::{OutputTable, Table};

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParsedTable {
    /// Parsed header and rows
    pub table: Table,
    /// Detected encoding
    pub encoding: String,
    /// Detected delimiter
    pub delimiter: char,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::ISO_8859_15.decode(bytes).0.into_owned()
        }
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        // UTF-8 and anything unknown: lossy UTF-8
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Detect the delimiter by counting occurrences in the first line.
///
/// Falls back to `,` when the header has a single column.
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

/// Read a table from a reader with an explicit delimiter.
///
/// Quoted cells are honored, short rows are padded with empty cells and
/// whitespace-only lines are skipped. Header names are trimmed.
///
/// # Example
/// ```
/// use lookupmask::parser::read_table;
///
/// let table = read_table("id,name\n1,Ann\n".as_bytes(), ',').unwrap();
/// assert_eq!(table.headers, vec!["id", "name"]);
/// assert_eq!(table.rows[0]["name"], "Ann");
/// ```
pub fn read_table<R: Read>(reader: R, delimiter: char) -> TableResult<Table> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter_byte(delimiter))
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let header_record = csv_reader.headers()?.clone();
    if header_record.is_empty() {
        return Err(TableError::EmptyFile);
    }

    let headers: Vec<String> = header_record
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(TableError::NoHeaders);
    }

    let mut seen = HashSet::new();
    for header in &headers {
        if !seen.insert(header.to_lowercase()) {
            return Err(TableError::DuplicateHeader(header.clone()));
        }
    }

    let mut table = Table::new(headers);
    for record in csv_reader.records() {
        let record = record?;
        if record.len() == 1 && record[0].trim().is_empty() {
            continue;
        }
        table.push_record(record.iter().map(str::to_string));
    }

    Ok(table)
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> TableResult<ParsedTable> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(TableError::EmptyFile);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = detect_delimiter(&content);
    let table = read_table(content.as_bytes(), delimiter)?;

    Ok(ParsedTable {
        table,
        encoding,
        delimiter,
    })
}

/// Parse a CSV file with auto-detection of encoding and delimiter.
pub fn parse_file_auto<P: AsRef<Path>>(path: P) -> TableResult<ParsedTable> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes_auto(&bytes)
}

/// Write an output table as comma-separated CSV.
pub fn write_table<W: Write>(writer: W, output: &OutputTable) -> TableResult<()> {
    let mut csv_writer = csv::WriterBuilder::new().from_writer(writer);
    csv_writer.write_record(&output.headers)?;
    for row in &output.rows {
        csv_writer.write_record(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Serialize an output table to CSV bytes.
pub fn table_to_bytes(output: &OutputTable) -> TableResult<Vec<u8>> {
    let mut buffer = Vec::new();
    write_table(&mut buffer, output)?;
    Ok(buffer)
}

fn delimiter_byte(delimiter: char) -> u8 {
    if delimiter.is_ascii() {
        delimiter as u8
    } else {
        b','
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_csv() {
        let table = read_table("name;age\nAlice;30\nBob;25".as_bytes(), ';').unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0]["name"], "Alice");
        assert_eq!(table.rows[0]["age"], "30");
        assert_eq!(table.rows[1]["name"], "Bob");
        assert_eq!(table.rows[1]["age"], "25");
    }

    #[test]
    fn test_quoted_values_keep_delimiter() {
        let csv = "name,address\n\"Ann\",\"1 Main St, Springfield\"";
        let table = read_table(csv.as_bytes(), ',').unwrap();

        assert_eq!(table.rows[0]["name"], "Ann");
        assert_eq!(table.rows[0]["address"], "1 Main St, Springfield");
    }

    #[test]
    fn test_cells_are_not_trimmed() {
        let table = read_table("a,b\n  x , y".as_bytes(), ',').unwrap();

        assert_eq!(table.rows[0]["a"], "  x ");
        assert_eq!(table.rows[0]["b"], " y");
    }

    #[test]
    fn test_headers_are_trimmed() {
        let table = read_table(" id , name \n1,Ann".as_bytes(), ',').unwrap();
        assert_eq!(table.headers, vec!["id", "name"]);
    }

    #[test]
    fn test_empty_lines_skipped() {
        let table = read_table("a;b\n1;2\n\n3;4\n".as_bytes(), ';').unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_missing_values_padded() {
        let table = read_table("a;b;c\n1;;3\n4".as_bytes(), ';').unwrap();

        assert_eq!(table.rows[0]["b"], "");
        assert_eq!(table.rows[1]["a"], "4");
        assert_eq!(table.rows[1]["c"], "");
    }

    #[test]
    fn test_duplicate_header_rejected() {
        let result = read_table("id,ID\n1,2".as_bytes(), ',');
        assert!(matches!(result, Err(TableError::DuplicateHeader(h)) if h == "ID"));
    }

    #[test]
    fn test_header_only_table() {
        let table = read_table("id,name\n".as_bytes(), ',').unwrap();
        assert_eq!(table.headers.len(), 2);
        assert!(table.is_empty());
    }

    #[test]
    fn test_empty_csv_error() {
        assert!(matches!(parse_bytes_auto(b""), Err(TableError::EmptyFile)));
        assert!(matches!(parse_bytes_auto(b"  \n"), Err(TableError::EmptyFile)));
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
        assert_eq!(detect_delimiter("a|b|c\n1|2|3"), '|');
        assert_eq!(detect_delimiter("single\nvalue"), ',');
    }

    #[test]
    fn test_detect_delimiter_prefers_most_frequent() {
        assert_eq!(detect_delimiter("a,b;c;d"), ';');
        assert_eq!(detect_delimiter("a;b,c"), ',');
    }

    #[test]
    fn test_auto_parse() {
        let result = parse_bytes_auto(b"name;age\nAlice;30\nBob;25").unwrap();

        assert_eq!(result.delimiter, ';');
        assert_eq!(result.encoding, "utf-8");
        assert_eq!(result.table.len(), 2);
        assert_eq!(result.table.headers, vec!["name", "age"]);
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1");
        assert_eq!(decoded, "Société");
    }

    #[test]
    fn test_write_table_quotes_when_needed() {
        let output = OutputTable {
            headers: vec!["name".into(), "city".into()],
            rows: vec![vec!["Ann".into(), "Paris, FR".into()]],
        };

        let bytes = table_to_bytes(&output).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "name,city\nAnn,\"Paris, FR\"\n");
    }

    #[test]
    fn test_parse_file_auto() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("people.csv");
        std::fs::write(&path, "id,name\n1,Ann\n").unwrap();

        let parsed = parse_file_auto(&path).unwrap();
        assert_eq!(parsed.table.rows[0]["id"], "1");
    }
}
