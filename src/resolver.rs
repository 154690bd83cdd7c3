use indexmap::IndexMap;

use crate::normalize::normalize_key;
use crate::row::Row;

/// Maps template-declared field names to row columns via normalized keys.
///
/// Built once per row; both merge passes share the same resolver. When two
/// columns normalize to the same key, the later column (in row order) wins;
/// this is deliberate and deterministic, not an error.
#[derive(Debug)]
pub struct BindingResolver {
    table: IndexMap<String, String>,
}

impl BindingResolver {
    pub fn from_row(row: &Row) -> Self {
        let mut table = IndexMap::new();
        for (column, _) in row.iter() {
            table.insert(normalize_key(column), column.to_string());
        }
        Self { table }
    }

    /// Resolves a form-field tag to the original column name.
    ///
    /// `None` means "no binding, leave the marker untouched".
    pub fn lookup(&self, tag: &str) -> Option<&str> {
        self.table.get(&normalize_key(tag)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
