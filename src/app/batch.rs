//! CSV batch mode: one meal description per row in, one estimate per row out.

use crate::core::NutritionResolver;
use crate::domain::Locale;
use crate::utils::error::{MealLensError, Result};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct BatchInput {
    pub description: String,
    #[serde(default)]
    pub locale: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchOutput {
    pub description: String,
    pub calories: Option<u32>,
    pub protein: Option<u32>,
    pub carbs: Option<u32>,
    pub fats: Option<u32>,
    pub status: String,
    pub resolved_at: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub resolved: usize,
    pub failed: usize,
}

fn status_for(err: &MealLensError) -> &'static str {
    match err {
        MealLensError::EmptyInput => "empty_input",
        MealLensError::Translation { .. } => "translation_failed",
        MealLensError::UnresolvedNutrition { .. } => "unresolved",
        _ => "error",
    }
}

fn raw_text(record: &csv::StringRecord) -> String {
    record.iter().collect::<Vec<_>>().join(",")
}

fn failed_row(description: String, status: &str) -> BatchOutput {
    BatchOutput {
        description,
        calories: None,
        protein: None,
        carbs: None,
        fats: None,
        status: status.to_string(),
        resolved_at: chrono::Utc::now().to_rfc3339(),
    }
}

/// Rows are resolved one after another; a failed or malformed row is recorded, not fatal.
pub async fn run_batch<R: Read, W: Write>(
    resolver: &NutritionResolver,
    input: R,
    output: W,
) -> Result<BatchSummary> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(input);
    let headers = reader.headers()?.clone();
    let mut writer = csv::Writer::from_writer(output);
    let mut summary = BatchSummary::default();

    for record in reader.records() {
        summary.total += 1;

        let parsed = match record {
            Ok(record) if record.len() == headers.len() => record
                .deserialize::<BatchInput>(Some(&headers))
                .map_err(|err| (raw_text(&record), err.to_string())),
            Ok(record) => Err((
                raw_text(&record),
                format!("expected {} fields, found {}", headers.len(), record.len()),
            )),
            Err(err) if err.is_io_error() => return Err(err.into()),
            Err(err) => Err((String::new(), err.to_string())),
        };

        let row = match parsed {
            Ok(row) => row,
            Err((raw, err)) => {
                summary.failed += 1;
                tracing::warn!("⚠️ Row {} is malformed: {}", summary.total, err);
                writer.serialize(failed_row(raw, "invalid_row"))?;
                continue;
            }
        };

        let locale = row
            .locale
            .as_deref()
            .filter(|code| !code.is_empty())
            .map(Locale::new)
            .unwrap_or_else(|| resolver.locale().clone());

        let result = resolver
            .resolve_from_text_with_locale(&row.description, &locale)
            .await;

        let record = match result {
            Ok(estimate) => {
                summary.resolved += 1;
                BatchOutput {
                    description: row.description,
                    calories: Some(estimate.calories),
                    protein: Some(estimate.protein),
                    carbs: Some(estimate.carbs),
                    fats: Some(estimate.fats),
                    status: "ok".to_string(),
                    resolved_at: chrono::Utc::now().to_rfc3339(),
                }
            }
            Err(err) => {
                summary.failed += 1;
                tracing::warn!("Row {} failed: {}", summary.total, err);
                failed_row(row.description, status_for(&err))
            }
        };

        writer.serialize(record)?;
    }

    writer.flush()?;
    tracing::info!(
        "📊 Batch finished: {} rows, {} resolved, {} failed",
        summary.total,
        summary.resolved,
        summary.failed
    );
    Ok(summary)
}

pub async fn run_batch_files<P: AsRef<Path>, Q: AsRef<Path>>(
    resolver: &NutritionResolver,
    input_path: P,
    output_path: Q,
) -> Result<BatchSummary> {
    let input = std::fs::File::open(input_path)?;

    if let Some(parent) = output_path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let output = std::fs::File::create(output_path)?;

    run_batch(resolver, input, output).await
}
