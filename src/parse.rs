//! Tab-separated parsing into ordered records.

use csv::ReaderBuilder;
use tracing::{debug, info};

use crate::error::{PipelineError, Result};

/// One parsed input line. Fields are kept as text, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    fields: Vec<String>,
}

impl RawRecord {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub(crate) fn into_fields(self) -> Vec<String> {
        self.fields
    }
}

impl<S: Into<String>> FromIterator<S> for RawRecord {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

/// The first record, naming every column by position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    names: Vec<String>,
}

impl Header {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Parse tab-separated text. Blank lines are skipped and rows may differ in
/// width. Double quotes quote a field, as in the excel-tab dialect.
pub fn parse_tsv(text: &str) -> Result<Vec<RawRecord>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.is_empty() || (record.len() == 1 && record[0].is_empty()) {
            continue;
        }
        records.push(record.iter().collect::<RawRecord>());
    }

    debug!(records = records.len(), "parsed tsv");
    Ok(records)
}

/// Split off the header and take exactly `data_rows` records after it.
///
/// Rows past `data_rows` are ignored. Fewer rows than requested is an error
/// rather than a silently shorter data set.
pub fn split_header(records: Vec<RawRecord>, data_rows: usize) -> Result<(Header, Vec<RawRecord>)> {
    let mut records = records.into_iter();
    let header = records
        .next()
        .map(|r| Header::new(r.into_fields()))
        .ok_or(PipelineError::EmptyInput)?;

    let data: Vec<RawRecord> = records.take(data_rows).collect();
    if data.len() < data_rows {
        return Err(PipelineError::NotEnoughRows {
            expected: data_rows,
            found: data.len(),
        });
    }

    info!(columns = header.len(), rows = data.len(), "split header from data");
    Ok((header, data))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(records: &[RawRecord]) -> Vec<Vec<&str>> {
        records
            .iter()
            .map(|r| r.fields().iter().map(String::as_str).collect())
            .collect()
    }

    #[test]
    fn test_parse_preserves_field_order() {
        let records = parse_tsv("a\tb\nc\td\n").unwrap();
        assert_eq!(fields(&records), vec![vec!["a", "b"], vec!["c", "d"]]);
    }

    #[test]
    fn test_parse_skips_blank_lines() {
        let records = parse_tsv("a\tb\n\n\nc\td\n\n").unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_parse_keeps_empty_fields_and_ragged_rows() {
        let records = parse_tsv("h1\th2\th3\nx\t\tz\ty\n").unwrap();
        assert_eq!(fields(&records), vec![vec!["h1", "h2", "h3"], vec!["x", "", "z", "y"]]);
    }

    #[test]
    fn test_parse_quoted_tab() {
        let records = parse_tsv("\"a\tb\"\tc\n").unwrap();
        assert_eq!(fields(&records), vec![vec!["a\tb", "c"]]);
    }

    #[test]
    fn test_parse_accepts_cut_final_line() {
        let records = parse_tsv("a\tb\tc\nd\te").unwrap();
        assert_eq!(fields(&records)[1], vec!["d", "e"]);
    }

    #[test]
    fn test_split_header_takes_requested_rows() {
        let records = parse_tsv("h\n1\n2\n3\n4\n5\n6\n7\n").unwrap();
        let (header, data) = split_header(records, 5).unwrap();
        assert_eq!(header.names(), &["h".to_string()]);
        assert_eq!(data.len(), 5);
        assert_eq!(data[4].fields(), &["5".to_string()]);
    }

    #[test]
    fn test_split_header_not_enough_rows() {
        let records = parse_tsv("h\n1\n2\n").unwrap();
        let err = split_header(records, 5).unwrap_err();
        assert!(matches!(err, PipelineError::NotEnoughRows { expected: 5, found: 2 }));
    }

    #[test]
    fn test_split_header_empty_input() {
        let err = split_header(Vec::new(), 5).unwrap_err();
        assert!(matches!(err, PipelineError::EmptyInput));
    }
}
