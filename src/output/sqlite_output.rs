//! SQLite contact export
//!
//! Writes the contacts to a `contacts` table. Only the active columns are
//! created; `validated` is stored as a nullable integer.

use crate::contact::Contact;
use crate::output::columns::{columns_for, Column};
use crate::output::{prepare_target, Exporter, OutputResult};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteExporter;

impl Exporter for SqliteExporter {
    fn extension(&self) -> &'static str {
        "db"
    }

    fn export(&self, contacts: &[Contact], path: &Path) -> OutputResult<PathBuf> {
        prepare_target(path)?;

        let mut conn = Connection::open(path)?;
        write_contacts(&mut conn, contacts)?;
        drop(conn);

        Ok(path.canonicalize()?)
    }
}

/// Replaces the `contacts` table with the given contacts
pub fn write_contacts(conn: &mut Connection, contacts: &[Contact]) -> rusqlite::Result<()> {
    let columns = columns_for(contacts);

    let definitions: Vec<String> = columns
        .iter()
        .map(|c| match c {
            Column::Validated => format!("{} INTEGER", c.key()),
            _ => format!("{} TEXT NOT NULL DEFAULT ''", c.key()),
        })
        .collect();

    let tx = conn.transaction()?;
    tx.execute_batch("DROP TABLE IF EXISTS contacts;")?;
    tx.execute_batch(&format!(
        "CREATE TABLE contacts (id INTEGER PRIMARY KEY AUTOINCREMENT, {});",
        definitions.join(", ")
    ))?;

    {
        let names: Vec<&str> = columns.iter().map(Column::key).collect();
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
        let mut stmt = tx.prepare(&format!(
            "INSERT INTO contacts ({}) VALUES ({})",
            names.join(", "),
            placeholders.join(", ")
        ))?;

        for contact in contacts {
            let values = columns.iter().map(|column| match column {
                Column::Validated => match contact.validated {
                    Some(valid) => Value::Integer(i64::from(valid)),
                    None => Value::Null,
                },
                _ => Value::Text(column.render(contact)),
            });
            stmt.execute(params_from_iter(values))?;
        }
    }

    tx.commit()
}
