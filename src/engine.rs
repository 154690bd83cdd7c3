use log::{debug, info};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::document::{Document, DocumentError};
use crate::merge::{merge_form_fields, merge_placeholders, MergeCounters};
use crate::resolver::BindingResolver;
use crate::row::Row;

/// Diagnostics from one fill: how many markers were rewritten, per pass.
#[derive(Debug)]
pub struct MergeReport {
    pub fields_filled: usize,
    pub substitutions: usize,
    pub field_counters: MergeCounters,
    pub placeholder_counters: MergeCounters,
}

#[derive(Error, Debug)]
pub enum FillError {
    #[error("Template not found: {0:?}")]
    TemplateNotFound(PathBuf),
    #[error("Failed to load template {path:?}: {source}")]
    Load {
        path: PathBuf,
        source: DocumentError,
    },
    #[error("Failed to save document {path:?}: {source}")]
    Save {
        path: PathBuf,
        source: DocumentError,
    },
}

/// TemplateEngine runs both merge passes over one template instance.
pub struct TemplateEngine;

impl TemplateEngine {
    pub fn new() -> Self {
        Self
    }

    /// Fills one template with one row and writes the result to `output_path`.
    ///
    /// The template is loaded fresh on every call; a mutated instance is
    /// never reused across rows. The form-field pass runs before the
    /// placeholder pass, and the order is significant: form-field
    /// boilerplate that happens to look like a placeholder must not be
    /// processed twice. Per-marker misses never fail the fill; only an
    /// unreadable template or an unwritable output does, and a failed fill
    /// leaves no partial output file behind.
    pub fn fill(
        &self,
        template_path: &Path,
        row: &Row,
        output_path: &Path,
    ) -> Result<MergeReport, FillError> {
        if !template_path.exists() {
            return Err(FillError::TemplateNotFound(template_path.to_path_buf()));
        }

        let mut document = Document::load(template_path).map_err(|source| FillError::Load {
            path: template_path.to_path_buf(),
            source,
        })?;

        let resolver = BindingResolver::from_row(row);
        debug!("Binding table ({} keys): {:?}", resolver.len(), resolver);

        let field_counters = merge_form_fields(&mut document, row, &resolver);
        let placeholder_counters = merge_placeholders(&mut document, row);

        document.save(output_path).map_err(|source| FillError::Save {
            path: output_path.to_path_buf(),
            source,
        })?;

        let report = MergeReport {
            fields_filled: field_counters.total(),
            substitutions: placeholder_counters.total(),
            field_counters,
            placeholder_counters,
        };
        info!(
            "Filled {:?}: {} form fields, {} placeholder substitutions",
            output_path, report.fields_filled, report.substitutions
        );
        Ok(report)
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Block, FormField, Inline, Paragraph, Run};
    use std::fs;
    use tempfile::tempdir;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn sample_template() -> Document {
        Document {
            body: vec![Block::Paragraph(Paragraph {
                children: vec![
                    Inline::Run(Run {
                        text: "Contact: ${Email}".to_string(),
                    }),
                    Inline::FormField(FormField {
                        tag: Some("Entreprise/Commune".to_string()),
                        runs: vec![Run {
                            text: "placeholder".to_string(),
                        }],
                    }),
                ],
            })],
        }
    }

    #[test]
    fn test_fill_rewrites_both_marker_kinds() {
        let dir = tempdir().unwrap();
        let template_path = dir.path().join("template.json");
        let output_path = dir.path().join("out/filled.json");
        sample_template().save(&template_path).unwrap();

        let engine = TemplateEngine::new();
        let data = row(&[
            ("Email", "a@b.c"),
            ("entreprise commune", "Ville Haute"),
        ]);
        let report = engine.fill(&template_path, &data, &output_path).unwrap();
        assert_eq!(report.fields_filled, 1);
        assert_eq!(report.substitutions, 1);

        let filled = Document::load(&output_path).unwrap();
        match &filled.body[0] {
            Block::Paragraph(p) => {
                match &p.children[0] {
                    Inline::Run(r) => assert_eq!(r.text, "Contact: a@b.c"),
                    _ => panic!("expected run"),
                }
                match &p.children[1] {
                    Inline::FormField(f) => assert_eq!(f.runs[0].text, "Ville Haute"),
                    _ => panic!("expected form field"),
                }
            }
            _ => panic!("expected paragraph"),
        }
    }

    #[test]
    fn test_fill_is_idempotent() {
        let dir = tempdir().unwrap();
        let template_path = dir.path().join("template.json");
        let first = dir.path().join("a.json");
        let second = dir.path().join("b.json");
        sample_template().save(&template_path).unwrap();

        let engine = TemplateEngine::new();
        let data = row(&[("Email", "a@b.c")]);
        engine.fill(&template_path, &data, &first).unwrap();
        engine.fill(&template_path, &data, &second).unwrap();

        let a = fs::read(&first).unwrap();
        let b = fs::read(&second).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_template_leaves_no_output() {
        let dir = tempdir().unwrap();
        let output_path = dir.path().join("filled.json");
        let engine = TemplateEngine::new();
        let result = engine.fill(
            &dir.path().join("no_such_template.json"),
            &row(&[("a", "b")]),
            &output_path,
        );
        assert!(matches!(result, Err(FillError::TemplateNotFound(_))));
        assert!(!output_path.exists());
    }

    #[test]
    fn test_malformed_template_is_a_load_error() {
        let dir = tempdir().unwrap();
        let template_path = dir.path().join("template.json");
        fs::write(&template_path, "{ nope").unwrap();
        let engine = TemplateEngine::new();
        let output_path = dir.path().join("filled.json");
        let result = engine.fill(&template_path, &row(&[]), &output_path);
        assert!(matches!(result, Err(FillError::Load { .. })));
        assert!(!output_path.exists());
    }
}
