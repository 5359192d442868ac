//! Best-effort decoding of a stream of concatenated JSON records.
//!
//! The measurement executables print one record per line, except when they
//! pretty-print, in which case a record spans several lines. There is no
//! delimiter between records. Lines are accumulated until the buffer decodes
//! as exactly one record; whatever is still buffered when the input runs out
//! is dropped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::GzDecoder;

use crate::error::Result;
use crate::record::Record;

#[derive(Default, Clone, Debug, PartialEq)]
pub struct ParsedRecords {
    pub records: Vec<Record>,
    /// Bytes left in the accumulation buffer at end of input.
    pub discarded_bytes: usize,
}

pub fn parse_records<R: BufRead>(mut reader: R) -> Result<ParsedRecords> {
    let mut parsed = ParsedRecords::default();
    let mut buf = String::new();

    loop {
        let n = reader.read_line(&mut buf)?;
        if n == 0 {
            break;
        }
        // Any decode error, incomplete or malformed, means "keep reading".
        if let Ok(record) = serde_json::from_str::<Record>(&buf) {
            parsed.records.push(record);
            buf.clear();
        }
    }

    parsed.discarded_bytes = buf.len();
    if !buf.trim().is_empty() {
        warn!(
            "discarding {} trailing bytes after {} records",
            buf.len(),
            parsed.records.len()
        );
    }
    Ok(parsed)
}

/// Parse a result file, transparently gunzipping `*.gz` files.
pub fn read_result_file(path: &Path) -> Result<ParsedRecords> {
    let file = File::open(path)?;
    let parsed = if path.extension().map_or(false, |ext| ext == "gz") {
        parse_records(BufReader::new(GzDecoder::new(file)))?
    } else {
        parse_records(BufReader::new(file))?
    };
    debug!(
        "parsed {} records from {}",
        parsed.records.len(),
        path.display()
    );
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn records() -> Vec<Record> {
        vec![
            Record::new().with("block_size", 10).with("rsync_bytes", 500),
            Record::new().with("block_size", 20).with("rsync_bytes", 300),
            Record::new().with("block_size", 20).with("rsync_bytes", 300),
        ]
    }

    fn parse(text: &str) -> ParsedRecords {
        parse_records(Cursor::new(text.as_bytes())).unwrap()
    }

    #[test]
    fn single_line_records() {
        let text: String = records()
            .iter()
            .map(|r| serde_json::to_string(r).unwrap() + "\n")
            .collect();
        let parsed = parse(&text);
        assert_eq!(parsed.records, records());
        assert_eq!(parsed.discarded_bytes, 0);
    }

    #[test]
    fn pretty_printed_records() {
        let text: String = records()
            .iter()
            .map(|r| serde_json::to_string_pretty(r).unwrap() + "\n")
            .collect();
        assert_eq!(parse(&text).records, records());
    }

    #[test]
    fn blank_lines_between_records() {
        let text = "{\"a\": 1}\n\n{\n  \"a\": 2\n}\n\n";
        let parsed = parse(text);
        assert_eq!(
            parsed.records,
            vec![Record::new().with("a", 1), Record::new().with("a", 2)]
        );
        assert_eq!(parsed.discarded_bytes, 1);
    }

    #[test]
    fn dangling_tail_is_dropped() {
        let text = "{\"a\": 1}\n{\"a\": 2}\n{\n  \"a\":";
        let parsed = parse(text);
        assert_eq!(
            parsed.records,
            vec![Record::new().with("a", 1), Record::new().with("a", 2)]
        );
        assert_eq!(parsed.discarded_bytes, "{\n  \"a\":".len());
    }

    #[test]
    fn garbage_line_swallows_the_rest() {
        let text = "{\"a\": 1}\nFailed to peel keys for all nodes\n{\"a\": 2}\n";
        let parsed = parse(text);
        assert_eq!(parsed.records, vec![Record::new().with("a", 1)]);
        assert!(parsed.discarded_bytes > 0);
    }

    #[test]
    fn empty_input() {
        assert_eq!(parse(""), ParsedRecords::default());
    }
}
