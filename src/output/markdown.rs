//! Markdown contact export
//!
//! Writes the contacts as a single markdown table preceded by a short header.

use crate::contact::Contact;
use crate::output::columns::{columns_for, Column};
use crate::output::{prepare_target, Exporter, OutputResult};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownExporter;

impl Exporter for MarkdownExporter {
    fn extension(&self) -> &'static str {
        "md"
    }

    fn export(&self, contacts: &[Contact], path: &Path) -> OutputResult<PathBuf> {
        prepare_target(path)?;

        let markdown = format_markdown_table(contacts);
        let mut file = File::create(path)?;
        file.write_all(markdown.as_bytes())?;

        Ok(path.canonicalize()?)
    }
}

/// Formats contacts as a markdown document
pub fn format_markdown_table(contacts: &[Contact]) -> String {
    let columns = columns_for(contacts);
    let mut md = String::new();

    md.push_str("# Contacts\n\n");
    md.push_str(&format!(
        "- **Generated**: {}\n",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    md.push_str(&format!("- **Contacts**: {}\n\n", contacts.len()));

    let header: Vec<&str> = columns.iter().map(Column::title).collect();
    md.push_str(&format!("| {} |\n", header.join(" | ")));
    md.push_str(&format!("|{}\n", "---|".repeat(columns.len())));

    for contact in contacts {
        let cells: Vec<String> = columns
            .iter()
            .map(|column| escape_cell(&column.render(contact)))
            .collect();
        md.push_str(&format!("| {} |\n", cells.join(" | ")));
    }

    md
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}
