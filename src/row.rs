use indexmap::IndexMap;
use std::fs::File;
use std::path::PathBuf;
use thiserror::Error;

/// One unit of input data: an ordered mapping from column name to value.
///
/// Every value is a plain string; the empty string stands for a missing
/// cell. The row source resolves any dynamic typing before the row reaches
/// the merge passes, so nothing downstream deals with NaN or numbers.
/// Column order is insertion order and drives every iteration over the row.
#[derive(Debug, Clone, Default)]
pub struct Row {
    values: IndexMap<String, String>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.values.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }

    /// Iterates over `(column, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, String)> for Row {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[derive(Error, Debug)]
pub enum RowSourceError {
    #[error("Failed to read spreadsheet: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse spreadsheet: {0}")]
    Csv(#[from] csv::Error),
}

/// Produces a finite, restartable sequence of rows.
///
/// Each call re-reads the backing spreadsheet, so one pipeline run sees one
/// consistent scan. A source that cannot be opened or parsed aborts the
/// whole run; there is no partial/streaming contract.
pub trait RowSource {
    fn rows(&self) -> Result<Vec<Row>, RowSourceError>;
}

/// Row source backed by a CSV file whose first record is the header.
pub struct CsvRowSource {
    path: PathBuf,
}

impl CsvRowSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RowSource for CsvRowSource {
    fn rows(&self) -> Result<Vec<Row>, RowSourceError> {
        let file = File::open(&self.path)?;
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);
        let headers = reader.headers()?.clone();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let mut row = Row::new();
            for (index, column) in headers.iter().enumerate() {
                // Short records are padded with empty strings.
                row.insert(column, record.get(index).unwrap_or(""));
            }
            rows.push(row);
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_row_preserves_column_order() {
        let mut row = Row::new();
        row.insert("b", "2");
        row.insert("a", "1");
        let columns: Vec<&str> = row.iter().map(|(k, _)| k).collect();
        assert_eq!(columns, vec!["b", "a"]);
    }

    #[test]
    fn test_csv_source_reads_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rows.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "Name,Email").unwrap();
        writeln!(file, "Alice,alice@example.com").unwrap();
        writeln!(file, "Bob,bob@example.com").unwrap();

        let rows = CsvRowSource::new(&path).rows().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Name"), Some("Alice"));
        assert_eq!(rows[1].get("Email"), Some("bob@example.com"));
    }

    #[test]
    fn test_csv_source_pads_short_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rows.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "Name,Email,Phone").unwrap();
        writeln!(file, "Alice").unwrap();

        let rows = CsvRowSource::new(&path).rows().unwrap();
        assert_eq!(rows[0].get("Email"), Some(""));
        assert_eq!(rows[0].get("Phone"), Some(""));
    }

    #[test]
    fn test_csv_source_missing_file() {
        let source = CsvRowSource::new("no_such_file.csv");
        assert!(matches!(source.rows(), Err(RowSourceError::Io(_))));
    }
}
