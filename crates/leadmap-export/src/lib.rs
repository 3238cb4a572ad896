//! Lead output formats.
//!
//! Leads go out as CSV (the default, one row per lead with missing fields
//! rendered as "N/A") or as pretty-printed JSON where missing fields stay
//! `null`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

use leadmap_core::{Lead, NOT_AVAILABLE};
use std::path::Path;
use thiserror::Error;

/// Result alias for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Errors surfaced while writing leads out.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Filesystem trouble
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization failed
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization failed
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

fn field_or_na(field: Option<&str>) -> &str {
    field.unwrap_or(NOT_AVAILABLE)
}

/// Write leads as CSV to `path`. With no leads the file is left untouched.
pub fn write_csv(leads: &[Lead], path: &Path) -> Result<()> {
    if leads.is_empty() {
        tracing::warn!("no leads to write, skipping {}", path.display());
        return Ok(());
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(Lead::field_names())?;
    for lead in leads {
        writer.write_record([
            lead.name.as_str(),
            field_or_na(lead.address.as_deref()),
            field_or_na(lead.phone.as_deref()),
            field_or_na(lead.website.as_deref()),
        ])?;
    }
    writer.flush()?;
    tracing::info!("wrote {} leads to {}", leads.len(), path.display());
    Ok(())
}

/// Render leads as a pretty-printed JSON array.
pub fn to_json(leads: &[Lead]) -> Result<String> {
    Ok(serde_json::to_string_pretty(leads)?)
}

/// Write leads as pretty-printed JSON to `path`. With no leads the file is
/// left untouched.
pub fn write_json(leads: &[Lead], path: &Path) -> Result<()> {
    if leads.is_empty() {
        tracing::warn!("no leads to write, skipping {}", path.display());
        return Ok(());
    }
    std::fs::write(path, to_json(leads)?)?;
    tracing::info!("wrote {} leads to {}", leads.len(), path.display());
    Ok(())
}
