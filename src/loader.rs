use std::path::Path;

use crate::error::{CleanError, Result};
use crate::models::RawFrame;

const DELIMITERS: [u8; 3] = [b',', b';', b'\t'];

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Decode as UTF-8 when valid, otherwise as Latin-1 (each byte is its own code point).
pub fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => e.into_bytes().iter().map(|&b| b as char).collect(),
    }
}

/// Pick the separator that occurs most often in the header line.
/// Ties go to the earlier candidate, so a header without separators reads as comma.
pub fn detect_delimiter(text: &str) -> u8 {
    let header = text
        .lines()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("");
    let mut best = DELIMITERS[0];
    let mut best_count = 0usize;
    for &d in &DELIMITERS {
        let count = header.bytes().filter(|&b| b == d).count();
        if count > best_count {
            best = d;
            best_count = count;
        }
    }
    best
}

// ---------------------------------------------------------------------------
// load_raw
// ---------------------------------------------------------------------------

pub fn load_raw(file_path: &Path) -> Result<RawFrame> {
    tracing::info!(path = %file_path.display(), "loading raw data");
    let text = decode_text(std::fs::read(file_path)?);
    let frame = parse_raw(&text, file_path)?;
    tracing::info!(columns = ?frame.columns, rows = frame.rows.len(), "raw columns");
    Ok(frame)
}

/// Parse decoded text read from `source`. Text without a header line is an error.
pub fn parse_raw(text: &str, source: &Path) -> Result<RawFrame> {
    let delimiter = detect_delimiter(text);
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let mut records = rdr.records();
    let header = loop {
        let Some(record) = records.next() else {
            return Err(CleanError::EmptyInput(source.to_path_buf()));
        };
        let record = record?;
        if !record.iter().all(|f| f.trim().is_empty()) {
            break record;
        }
    };
    let columns: Vec<String> = header.iter().map(str::to_string).collect();
    let width = columns.len();

    let mut rows = Vec::new();
    for result in records {
        let record = result?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        let mut row: Vec<String> = record.iter().take(width).map(str::to_string).collect();
        row.resize(width, String::new());
        rows.push(row);
    }
    Ok(RawFrame { columns, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("date;type;value\n01/01/2024;entrada;1,00"), b';');
        assert_eq!(detect_delimiter("date,type,value\n"), b',');
        assert_eq!(detect_delimiter("date\ttype\tvalue\n"), b'\t');
        assert_eq!(detect_delimiter("date\n"), b',');
        assert_eq!(detect_delimiter(""), b',');
    }

    #[test]
    fn test_decode_text_falls_back_to_latin1() {
        // "saída" in ISO-8859-1
        let bytes = vec![b's', b'a', 0xED, b'd', b'a'];
        assert_eq!(decode_text(bytes), "saída");
        assert_eq!(decode_text("saída".as_bytes().to_vec()), "saída");
    }

    #[test]
    fn test_parse_raw_semicolon_with_decimal_commas() {
        let text = "date;type;value;category\n15/01/2024;entrada;-1.000,50;salario\n";
        let frame = parse_raw(text, Path::new("raw.csv")).unwrap();
        assert_eq!(frame.columns, vec!["date", "type", "value", "category"]);
        assert_eq!(frame.rows.len(), 1);
        assert_eq!(frame.rows[0][2], "-1.000,50");
    }

    #[test]
    fn test_parse_raw_pads_and_truncates_rows() {
        let text = "a,b,c\n1,2\n\n1,2,3,4\n";
        let frame = parse_raw(text, Path::new("raw.csv")).unwrap();
        assert_eq!(frame.rows.len(), 2);
        assert_eq!(frame.rows[0], vec!["1", "2", ""]);
        assert_eq!(frame.rows[1], vec!["1", "2", "3"]);
    }

    #[test]
    fn test_parse_raw_quoted_fields() {
        let text = "date,type,value\n01/02/2024,saida,\"1.234,56\"\n";
        let frame = parse_raw(text, Path::new("raw.csv")).unwrap();
        assert_eq!(frame.rows[0][2], "1.234,56");
    }

    #[test]
    fn test_parse_raw_empty_input() {
        for text in ["", "\n\n", " , \n"] {
            match parse_raw(text, Path::new("blank.csv")) {
                Err(CleanError::EmptyInput(p)) => assert_eq!(p, Path::new("blank.csv")),
                other => panic!("expected EmptyInput, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_load_raw_reads_latin1_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.csv");
        let mut bytes = b"date;type;value\n01/01/2024;sa".to_vec();
        bytes.push(0xED);
        bytes.extend_from_slice(b"da;10,00\n");
        std::fs::write(&path, bytes).unwrap();
        let frame = load_raw(&path).unwrap();
        assert_eq!(frame.rows[0][1], "saída");
    }

    #[test]
    fn test_load_raw_empty_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        std::fs::write(&path, "").unwrap();
        assert!(matches!(load_raw(&path), Err(CleanError::EmptyInput(_))));
    }
}
