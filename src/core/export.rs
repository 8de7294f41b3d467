//! Export of the refill history.

use crate::errors::{AppError, AppResult};
use crate::models::{Dispenser, RefillExport, RefillLog};
use crate::ui::messages::{info, success, warning};
use crate::utils::date;
use clap::ValueEnum;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

/// Whether `path` may be written. Existing files need `force` or a "y" answer.
fn ensure_writable(path: &Path, force: bool) -> AppResult<()> {
    if !path.exists() || force {
        return Ok(());
    }

    warning(format!("The file '{}' already exists.", path.display()));

    print!("Overwrite? [y/N]: ");
    io::stdout().flush().ok();

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    let ans = answer.trim().to_ascii_lowercase();

    if ans == "y" || ans == "yes" {
        info("Existing file will be overwritten.");
        Ok(())
    } else {
        Err(AppError::from(io::Error::other(
            "Export cancelled: existing file not overwritten",
        )))
    }
}

pub fn to_export_rows(logs: &[RefillLog], dispensers: &[Dispenser]) -> Vec<RefillExport> {
    let names: HashMap<i64, &str> = dispensers.iter().map(|d| (d.id, d.name.as_str())).collect();

    logs.iter()
        .map(|l| RefillExport {
            id: l.id,
            dispenser_id: l.dispenser_id,
            dispenser: names.get(&l.dispenser_id).copied().unwrap_or("").to_string(),
            timestamp: date::to_db(&l.timestamp),
            level_before_ml: l.level_before_refill_ml,
            amount_ml: l.refill_amount_ml,
            level_after_ml: l.current_ml_refill,
            notes: l.notes.clone(),
        })
        .collect()
}

fn write_json(rows: &[RefillExport], path: &Path) -> AppResult<()> {
    let json = serde_json::to_string_pretty(rows)?;
    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

fn write_csv(rows: &[RefillExport], path: &Path) -> AppResult<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub struct ExportLogic;

impl ExportLogic {
    /// Returns the number of exported rows.
    pub fn export(
        rows: &[RefillExport],
        format: ExportFormat,
        file: &str,
        force: bool,
    ) -> AppResult<usize> {
        let path = Path::new(file);
        if !path.is_absolute() {
            return Err(AppError::from(io::Error::other(format!(
                "Output file path must be absolute: {file}"
            ))));
        }

        if rows.is_empty() {
            warning("No refills recorded. Nothing to export.");
            return Ok(0);
        }

        ensure_writable(path, force)?;

        info(format!(
            "Exporting {} refills to {}: {}",
            rows.len(),
            format.as_str().to_uppercase(),
            path.display()
        ));

        match format {
            ExportFormat::Csv => write_csv(rows, path)?,
            ExportFormat::Json => write_json(rows, path)?,
        }

        success(format!("Export completed: {}", path.display()));
        Ok(rows.len())
    }
}
