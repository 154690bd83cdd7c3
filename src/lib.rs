//! docmerge fills structured document templates from spreadsheet rows and
//! publishes the results to a remote file store.
//!
//! The core is the templating engine: it merges one [`Row`] of named string
//! values into a fresh copy of a template [`Document`] by rewriting two
//! distinct binding mechanisms, then writes the filled document out.
//!
//! - **Form fields** are tagged nodes; tags bind to columns through
//!   normalized keys (diacritics stripped, lower-cased, punctuation
//!   collapsed), so `"Entreprise/Commune"` binds a field tagged
//!   `"entreprise commune"`.
//! - **Placeholders** are literal `${columnName}` tokens inside run text
//!   and bind to column names exactly, case and punctuation included.
//!
//! Unmatched markers are left untouched; filling the same template with
//! the same row twice produces byte-identical output. Everything around
//! the engine (row source, publish sink, scheduling) is orchestration and
//! lives behind the [`RowSource`] and [`PublishSink`] traits.

pub mod config;
pub mod document;
pub mod engine;
pub mod format;
pub mod merge;
pub mod normalize;
pub mod pipeline;
pub mod publish;
pub mod resolver;
pub mod row;

pub use config::Config;
pub use document::Document;
pub use engine::{FillError, MergeReport, TemplateEngine};
pub use pipeline::{run_once, RunSummary};
pub use publish::{PublishSink, RcloneSink};
pub use resolver::BindingResolver;
pub use row::{CsvRowSource, Row, RowSource};
