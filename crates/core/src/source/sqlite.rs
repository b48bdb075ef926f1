//! SQLite-backed sheet.
//!
//! A sheet is a plain table: its columns are the sheet's columns, its rows in
//! `rowid` order are the sheet's rows. Cells are read as text whatever their
//! storage class; NULL reads as an empty cell.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection};

use super::error::SourceError;
use super::traits::{Sheet, SheetSource};
use super::types::{Row, RowId};

/// Opens connections to one table of a SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteSource {
    path: PathBuf,
    table: String,
}

impl SqliteSource {
    /// Creates a source for `table` in the database at `path`.
    pub fn new(path: impl Into<PathBuf>, table: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            table: table.into(),
        }
    }

    /// Database path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SheetSource for SqliteSource {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn open(&self) -> Result<Box<dyn Sheet>, SourceError> {
        if !self.path.exists() {
            return Err(SourceError::Open(format!(
                "database not found: {}",
                self.path.display()
            )));
        }
        let conn = Connection::open(&self.path).map_err(|e| SourceError::Open(e.to_string()))?;
        let sheet = SqliteSheet::from_connection(conn, &self.table)?;
        Ok(Box::new(sheet))
    }
}

/// An open connection to one table.
pub struct SqliteSheet {
    conn: Connection,
    table: String,
    columns: Vec<String>,
}

impl SqliteSheet {
    /// Binds an existing connection to `table`, failing if the table is missing.
    pub fn from_connection(conn: Connection, table: &str) -> Result<Self, SourceError> {
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?)",
            params![table],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(SourceError::SheetNotFound(table.to_string()));
        }

        let columns = Self::load_columns(&conn, table)?;
        Ok(Self {
            conn,
            table: table.to_string(),
            columns,
        })
    }

    /// Creates `table` with the given text columns if it does not exist yet.
    pub fn create_table(conn: &Connection, table: &str, columns: &[&str]) -> Result<(), SourceError> {
        let defs: Vec<String> = columns
            .iter()
            .map(|c| format!("{} TEXT NOT NULL DEFAULT ''", quote_ident(c)))
            .collect();
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {} ({});",
            quote_ident(table),
            defs.join(", ")
        ))?;
        Ok(())
    }

    fn load_columns(conn: &Connection, table: &str) -> Result<Vec<String>, SourceError> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote_ident(table)))?;
        let columns = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(columns)
    }

    fn cell_to_string(value: ValueRef<'_>) -> String {
        match value {
            ValueRef::Null => String::new(),
            ValueRef::Integer(i) => i.to_string(),
            ValueRef::Real(f) => f.to_string(),
            ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
            ValueRef::Blob(b) => String::from_utf8_lossy(b).into_owned(),
        }
    }
}

#[async_trait]
impl Sheet for SqliteSheet {
    async fn read_all_rows(&mut self) -> Result<Vec<Row>, SourceError> {
        let select: Vec<String> = self.columns.iter().map(|c| quote_ident(c)).collect();
        let sql = format!(
            "SELECT {} FROM {} ORDER BY rowid",
            select.join(", "),
            quote_ident(&self.table)
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;

        let mut out = Vec::new();
        let mut id: RowId = 0;
        while let Some(row) = rows.next()? {
            id += 1;
            let mut fields = std::collections::BTreeMap::new();
            for (idx, name) in self.columns.iter().enumerate() {
                fields.insert(name.clone(), Self::cell_to_string(row.get_ref(idx)?));
            }
            out.push(Row::new(id, fields));
        }
        Ok(out)
    }

    async fn write_cell(
        &mut self,
        row_id: RowId,
        column: &str,
        value: &str,
    ) -> Result<(), SourceError> {
        if !self.columns.iter().any(|c| c == column) {
            return Err(SourceError::UnknownColumn(column.to_string()));
        }
        if row_id == 0 {
            return Err(SourceError::RowNotFound(row_id));
        }

        let table = quote_ident(&self.table);
        let sql = format!(
            "UPDATE {table} SET {} = ? WHERE rowid = (SELECT rowid FROM {table} ORDER BY rowid LIMIT 1 OFFSET ?)",
            quote_ident(column),
        );
        let updated = self.conn.execute(&sql, params![value, i64::from(row_id) - 1])?;
        if updated == 0 {
            return Err(SourceError::RowNotFound(row_id));
        }
        Ok(())
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
