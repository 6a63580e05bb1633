//! CSV intake and export
//!
//! Import side: a tolerant reader built on `csv::ReaderBuilder` in flexible
//! mode. The header row defines field names; data rows are accessed through
//! a lowercased header map, with missing trailing cells reading as empty.
//! Quoted cells may span lines and contain doubled quotes.
//!
//! Export side: an RFC4180-style serializer. Values containing the
//! delimiter, quotes, or newlines are quote-wrapped with internal quotes
//! doubled; everything else passes through verbatim.

use csv::{ReaderBuilder, StringRecord};
use std::collections::HashMap;
use std::io;
use std::path::Path;

/// A parsed CSV file: headers plus records
#[derive(Debug, Default)]
pub struct RowSet {
    headers: Vec<String>,
    index: HashMap<String, usize>,
    records: Vec<StringRecord>,
}

impl RowSet {
    pub fn from_path(path: &Path) -> Result<Self, csv::Error> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(io::BufReader::new(file))
    }

    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, csv::Error> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = rdr
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        let index = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.to_lowercase(), i))
            .collect();

        let mut records = Vec::new();
        for result in rdr.records() {
            records.push(result?);
        }

        Ok(Self {
            headers,
            index,
            records,
        })
    }

    pub fn parse_str(text: &str) -> Result<Self, csv::Error> {
        Self::from_reader(text.as_bytes())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.records.iter().map(move |record| Row {
            index: &self.index,
            record,
        })
    }
}

/// One data row, addressed by (case-insensitive) header name
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    index: &'a HashMap<String, usize>,
    record: &'a StringRecord,
}

impl Row<'_> {
    /// A trimmed, non-empty cell value. Missing columns and missing
    /// trailing cells both read as `None`.
    pub fn get(&self, header: &str) -> Option<String> {
        self.index
            .get(&header.to_lowercase())
            .and_then(|&i| self.record.get(i))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// Like [`Row::get`] but falling back across alternative column names
    /// (e.g. `storeName` vs `clinicName`)
    pub fn get_any(&self, headers: &[&str]) -> Option<String> {
        headers.iter().find_map(|h| self.get(h))
    }

    /// A cell value defaulting to the empty string
    pub fn get_or_default(&self, header: &str) -> String {
        self.get(header).unwrap_or_default()
    }
}

/// Normalize a list-valued cell into a deduplicated ordered list.
///
/// Accepts `;`-separated strings, trims entries, drops empties, and keeps
/// the first occurrence of each value. The single coercion point for
/// shape-shifting import payloads.
pub fn split_multi(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for part in raw.split(';') {
        let part = part.trim();
        if part.is_empty() || out.iter().any(|e| e == part) {
            continue;
        }
        out.push(part.to_string());
    }
    out
}

/// Entity collections that can be exported as CSV
pub trait ToCsv {
    fn csv_headers() -> Vec<&'static str>;
    fn csv_record(&self) -> Vec<String>;
}

/// Escape one field per RFC4180: wrap when it contains the delimiter,
/// quotes, or newlines, doubling internal quotes
pub fn escape_field(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Serialize rows to CSV text with a header line
pub fn write_csv(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(headers.join(","));
    for row in rows {
        let cells: Vec<String> = row.iter().map(|c| escape_field(c)).collect();
        lines.push(cells.join(","));
    }
    lines.join("\n")
}

/// Serialize a full entity collection to CSV text.
///
/// Returns `None` for an empty collection so callers can report a no-op
/// instead of producing a headers-only file.
pub fn export_collection<T: ToCsv>(items: &[T]) -> Option<String> {
    if items.is_empty() {
        return None;
    }
    let rows: Vec<Vec<String>> = items.iter().map(|i| i.csv_record()).collect();
    Some(write_csv(&T::csv_headers(), &rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let set = RowSet::parse_str("name,category\nPet Paradise,VET\nCity Pets,PET_STORE\n")
            .unwrap();
        assert_eq!(set.len(), 2);
        let rows: Vec<_> = set.rows().collect();
        assert_eq!(rows[0].get("name").as_deref(), Some("Pet Paradise"));
        assert_eq!(rows[1].get("category").as_deref(), Some("PET_STORE"));
    }

    #[test]
    fn test_parse_empty_input() {
        let set = RowSet::parse_str("").unwrap();
        assert!(set.is_empty());
        assert!(set.headers().is_empty());
    }

    #[test]
    fn test_headers_match_case_insensitively() {
        let set = RowSet::parse_str("StoreName,Category\nFoo,VET\n").unwrap();
        let row = set.rows().next().unwrap();
        assert_eq!(row.get("storename").as_deref(), Some("Foo"));
        assert_eq!(row.get("STORENAME").as_deref(), Some("Foo"));
    }

    #[test]
    fn test_newline_inside_quoted_cell_is_one_row() {
        let text = "name,notes\n\"Pet Paradise\",\"line one\nline two\"\n";
        let set = RowSet::parse_str(text).unwrap();
        assert_eq!(set.len(), 1);
        let row = set.rows().next().unwrap();
        assert_eq!(row.get("notes").as_deref(), Some("line one\nline two"));
    }

    #[test]
    fn test_doubled_quote_unescapes() {
        let text = "name\n\"Bob''s \"\"Pets\"\"\"\n".replace("''", "'");
        let set = RowSet::parse_str(&text).unwrap();
        let row = set.rows().next().unwrap();
        assert_eq!(row.get("name").as_deref(), Some("Bob's \"Pets\""));
    }

    #[test]
    fn test_missing_trailing_cells_read_empty() {
        let set = RowSet::parse_str("a,b,c\n1,2\n").unwrap();
        let row = set.rows().next().unwrap();
        assert_eq!(row.get("b").as_deref(), Some("2"));
        assert_eq!(row.get("c"), None);
        assert_eq!(row.get_or_default("c"), "");
    }

    #[test]
    fn test_get_any_falls_back() {
        let set = RowSet::parse_str("clinicName\nCity Vets\n").unwrap();
        let row = set.rows().next().unwrap();
        assert_eq!(
            row.get_any(&["storeName", "clinicName"]).as_deref(),
            Some("City Vets")
        );
    }

    #[test]
    fn test_split_multi_normalizes() {
        assert_eq!(
            split_multi("Premium Dog Food; Cat Toys ;;Premium Dog Food"),
            vec!["Premium Dog Food".to_string(), "Cat Toys".to_string()]
        );
        assert_eq!(split_multi("single"), vec!["single".to_string()]);
        assert!(split_multi(" ; ; ").is_empty());
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("simple"), "simple");
        assert_eq!(escape_field("with,comma"), "\"with,comma\"");
        assert_eq!(escape_field("with\"quote"), "\"with\"\"quote\"");
        assert_eq!(escape_field("with\nnewline"), "\"with\nnewline\"");
    }

    #[test]
    fn test_csv_roundtrip_stability() {
        // Parse, re-serialize, re-parse: row count and cell values survive.
        let original = "name,notes,tags\n\
            \"Pet, Paradise\",\"multi\nline\",\"a;b\"\n\
            Plain,\"has \"\"quotes\"\"\",c\n";
        let first = RowSet::parse_str(original).unwrap();

        let headers: Vec<&str> = first.headers().iter().map(String::as_str).collect();
        let rows: Vec<Vec<String>> = first
            .rows()
            .map(|r| {
                headers
                    .iter()
                    .map(|h| r.get_or_default(h))
                    .collect::<Vec<_>>()
            })
            .collect();
        let serialized = write_csv(&headers, &rows);
        let second = RowSet::parse_str(&serialized).unwrap();

        assert_eq!(first.len(), second.len());
        for (a, b) in first.rows().zip(second.rows()) {
            for h in &headers {
                assert_eq!(a.get_or_default(h), b.get_or_default(h));
            }
        }
    }

    struct Item {
        name: String,
        count: usize,
    }

    impl ToCsv for Item {
        fn csv_headers() -> Vec<&'static str> {
            vec!["name", "count"]
        }
        fn csv_record(&self) -> Vec<String> {
            vec![self.name.clone(), self.count.to_string()]
        }
    }

    #[test]
    fn test_export_collection_empty_is_none() {
        let items: Vec<Item> = Vec::new();
        assert!(export_collection(&items).is_none());
    }

    #[test]
    fn test_export_collection_writes_headers() {
        let items = vec![Item {
            name: "a,b".to_string(),
            count: 2,
        }];
        let csv = export_collection(&items).unwrap();
        assert_eq!(csv, "name,count\n\"a,b\",2");
    }
}
