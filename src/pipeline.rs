use anyhow::{Context, Result};
use chrono::Local;
use log::{debug, error, info, warn};
use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::engine::TemplateEngine;
use crate::publish::PublishSink;
use crate::row::{Row, RowSource};

/// Outcome of one full pipeline pass over the spreadsheet.
#[derive(Debug, Default, PartialEq)]
pub struct RunSummary {
    pub published: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Derives the output document name for one row.
///
/// Prefers the configured identifying column, lower-cased with spaces
/// replaced by underscores; falls back to a timestamp + row index when the
/// column is not configured, absent or empty.
pub fn derive_output_name(row: &Row, index: usize, config: &Config) -> String {
    let from_column = config
        .name_column
        .as_deref()
        .and_then(|column| row.get(column))
        .filter(|value| !value.is_empty());

    match from_column {
        Some(value) => {
            let safe = value.to_lowercase().replace(' ', "_");
            format!("{}_{}.json", config.output_prefix, safe)
        }
        None => {
            let timestamp = Local::now().format("%Y%m%d_%H%M%S");
            format!("{}_{}_{}.json", config.output_prefix, timestamp, index)
        }
    }
}

fn reset_work_dir(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("Failed to clean work directory {:?}", path))?;
    }
    fs::create_dir_all(path)
        .with_context(|| format!("Failed to create work directory {:?}", path))?;
    Ok(())
}

/// Runs one full pass: scan rows, fill, publish anything not yet published.
///
/// Strictly sequential; each row is fully filled and handed off before the
/// next one begins, and every row loads its own fresh template instance.
/// A row that fails to fill or upload is logged and skipped; only a failure
/// to load the spreadsheet itself aborts the run.
pub fn run_once(
    config: &Config,
    source: &dyn RowSource,
    sink: &dyn PublishSink,
) -> Result<RunSummary> {
    reset_work_dir(&config.work_dir)?;

    let rows = source.rows().context("Failed to load spreadsheet rows")?;
    if rows.is_empty() {
        warn!("Spreadsheet contains no data rows");
    }

    let engine = TemplateEngine::new();
    let mut summary = RunSummary::default();

    for (index, row) in rows.iter().enumerate() {
        let name = derive_output_name(row, index, config);

        if sink.exists(&name) {
            info!("{} already published, skipping row {}", name, index);
            summary.skipped += 1;
            continue;
        }

        let output_path = config.work_dir.join(&name);
        match engine.fill(&config.template, row, &output_path) {
            Ok(report) => debug!(
                "Row {}: {} form fields, {} placeholder substitutions",
                index, report.fields_filled, report.substitutions
            ),
            Err(e) => {
                error!("Failed to fill document for row {}: {}", index, e);
                summary.failed += 1;
                continue;
            }
        }

        if sink.put(&output_path, &name) {
            info!("Published {}", name);
            summary.published += 1;
        } else {
            error!("Failed to publish {}", name);
            summary.failed += 1;
        }
    }

    info!(
        "Run complete: {} published, {} skipped, {} failed",
        summary.published, summary.skipped, summary.failed
    );
    Ok(summary)
}

/// Runs one pass and logs any failure instead of propagating it.
///
/// This is the scheduler's entry point: a pass that fails (transient
/// spreadsheet or remote trouble) must not stop future passes from being
/// scheduled. Returns whether the pass succeeded.
pub fn run_logged(config: &Config, source: &dyn RowSource, sink: &dyn PublishSink) -> bool {
    match run_once(config, source, sink) {
        Ok(_) => true,
        Err(e) => {
            error!("Pipeline run failed: {:#}", e);
            false
        }
    }
}
