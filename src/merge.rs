use indexmap::IndexMap;
use log::debug;

use crate::document::{Block, Document, FormField, Inline, Run};
use crate::format::format_value;
use crate::resolver::BindingResolver;
use crate::row::Row;

/// Per-column diagnostic counters for one merge pass.
///
/// Purely informational: callers may log or ignore them, nothing persists
/// between fills.
#[derive(Debug, Clone, Default)]
pub struct MergeCounters {
    counts: IndexMap<String, usize>,
}

impl MergeCounters {
    pub fn new() -> Self {
        Self::default()
    }

    fn bump(&mut self, column: &str) {
        *self.counts.entry(column.to_string()).or_insert(0) += 1;
    }

    pub fn get(&self, column: &str) -> usize {
        self.counts.get(column).copied().unwrap_or(0)
    }

    /// Total number of replacements across all columns.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Visits every form field in the tree, including fields inside table
/// cells, in document order.
fn visit_form_fields(blocks: &mut [Block], visit: &mut impl FnMut(&mut FormField)) {
    for block in blocks {
        match block {
            Block::Paragraph(paragraph) => {
                for inline in &mut paragraph.children {
                    if let Inline::FormField(field) = inline {
                        visit(field);
                    }
                }
            }
            Block::Table(table) => {
                for row in &mut table.rows {
                    for cell in &mut row.cells {
                        visit_form_fields(&mut cell.blocks, visit);
                    }
                }
            }
        }
    }
}

/// Visits every plain text run in the tree. Runs inside form fields are
/// not visited; those belong to the form-field pass.
fn visit_runs(blocks: &mut [Block], visit: &mut impl FnMut(&mut Run)) {
    for block in blocks {
        match block {
            Block::Paragraph(paragraph) => {
                for inline in &mut paragraph.children {
                    if let Inline::Run(run) = inline {
                        visit(run);
                    }
                }
            }
            Block::Table(table) => {
                for row in &mut table.rows {
                    for cell in &mut row.cells {
                        visit_runs(&mut cell.blocks, visit);
                    }
                }
            }
        }
    }
}

/// First merge pass: fills form fields in place.
///
/// A field's tag is resolved through the normalized-key table; on a match
/// the FIRST run of the field is overwritten with the formatted value.
/// Untagged fields, unresolved tags and fields without runs are skipped
/// silently; a missing binding is expected, not an error. Every field that
/// resolves to the same column is filled independently from the same value.
pub fn merge_form_fields(
    document: &mut Document,
    row: &Row,
    resolver: &BindingResolver,
) -> MergeCounters {
    let mut counters = MergeCounters::new();
    visit_form_fields(&mut document.body, &mut |field| {
        let tag = match field.tag.as_deref() {
            Some(tag) => tag,
            None => return,
        };
        let column = match resolver.lookup(tag) {
            Some(column) => column,
            None => {
                debug!("No binding for form-field tag '{}'", tag);
                return;
            }
        };
        let value = match row.get(column) {
            Some(value) => value,
            None => return,
        };
        if let Some(run) = field.runs.first_mut() {
            run.text = format_value(value);
            counters.bump(column);
        }
    });
    counters
}

/// Second merge pass: splices `${columnName}` tokens into run text.
///
/// Placeholder matching is literal: the token must carry the original
/// column name exactly, including case and punctuation. This asymmetry
/// with the normalized form-field matching is observable behavior and is
/// kept on purpose. Occurrences are replaced left to right; the scan
/// resumes after each spliced value, so a value that itself contains the
/// token cannot loop. Unmatched placeholders stay as literal text.
pub fn merge_placeholders(document: &mut Document, row: &Row) -> MergeCounters {
    let mut counters = MergeCounters::new();
    visit_runs(&mut document.body, &mut |run| {
        for (column, value) in row.iter() {
            let token = format!("${{{}}}", column);
            let mut from = 0;
            while let Some(found) = run.text[from..].find(&token) {
                let start = from + found;
                let rendered = format_value(value);
                run.text.replace_range(start..start + token.len(), &rendered);
                from = start + rendered.len();
                counters.bump(column);
            }
        }
    });
    counters
}
