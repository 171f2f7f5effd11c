//! Output module for exporting harvested contacts
//!
//! This module handles:
//! - Writing contacts to a markdown table or a SQLite database
//! - Choosing the optional columns from the data itself
//! - Delivering the final contact list to a webhook

pub mod columns;
mod markdown;
mod sqlite_output;
mod webhook;

pub use columns::{columns_for, Column};
pub use markdown::{format_markdown_table, MarkdownExporter};
pub use sqlite_output::{write_contacts, SqliteExporter};
pub use webhook::{DeliveryReport, WebhookClient};

use crate::config::ExportFormat;
use crate::contact::Contact;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while exporting contacts
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Format error: {0}")]
    Format(String),
}

pub type OutputResult<T> = std::result::Result<T, OutputError>;

/// A destination format for contacts
pub trait Exporter: Send + Sync {
    /// File extension without the dot
    fn extension(&self) -> &'static str;

    /// Writes `contacts` to `path`, returning the absolute path written
    fn export(&self, contacts: &[Contact], path: &Path) -> OutputResult<PathBuf>;
}

/// Exporter for the configured format
pub fn exporter_for(format: ExportFormat) -> Box<dyn Exporter> {
    match format {
        ExportFormat::Markdown => Box::new(MarkdownExporter),
        ExportFormat::Sqlite => Box::new(SqliteExporter),
    }
}

/// `{directory}/contacts_{stem}.{ext}`
pub fn export_path(directory: impl AsRef<Path>, stem: &str, exporter: &dyn Exporter) -> PathBuf {
    directory
        .as_ref()
        .join(format!("contacts_{}.{}", stem, exporter.extension()))
}

/// Creates the parent directory and removes a stale file at `path`
pub(crate) fn prepare_target(path: &Path) -> OutputResult<()> {
    if path.is_dir() {
        return Err(OutputError::Format(format!(
            "{} is a directory",
            path.display()
        )));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_export_path() {
        let exporter = exporter_for(ExportFormat::Sqlite);
        let path = export_path("out", "abc", exporter.as_ref());
        assert_eq!(path, Path::new("out").join("contacts_abc.db"));

        let exporter = exporter_for(ExportFormat::Markdown);
        assert_eq!(exporter.extension(), "md");
    }

    #[test]
    fn test_directory_target_rejected() {
        let dir = TempDir::new().unwrap();
        let contacts = vec![Contact::email("a@example.com", "", "u")];
        let result = MarkdownExporter.export(&contacts, dir.path());
        assert!(matches!(result, Err(OutputError::Format(_))));
    }
}
