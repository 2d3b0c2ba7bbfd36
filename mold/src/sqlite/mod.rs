//! SQLite executor for declared rows.
//!
//! [`SqliteExecutor`] runs the statements rendered by a [`RowDeclarator`]
//! against a caller-owned `rusqlite::Connection`. The declarator stays
//! side-effect free; this is the only place mold talks to a database.

use log::{debug, info};
use rusqlite::{params_from_iter, Connection};
use serde_json::Value;

use crate::declare::RowDeclarator;
use crate::error::{ExecuteError, ExecuteResult};
use crate::transform::Record;

/// Executes create-table and insert statements for one row shape.
#[derive(Debug, Clone)]
pub struct SqliteExecutor<'a> {
    declarator: RowDeclarator<'a>,
}

impl<'a> SqliteExecutor<'a> {
    pub fn new(declarator: RowDeclarator<'a>) -> Self {
        Self { declarator }
    }

    /// Run the create-table statement.
    pub fn create_table(&self, conn: &Connection, table: &str) -> ExecuteResult<()> {
        let sql = self.declarator.create_statement(table)?;
        conn.execute(&sql, [])?;
        info!("Created table {}", table);
        Ok(())
    }

    /// Insert one record. Returns the number of rows written.
    pub fn insert<R: Record + ?Sized>(
        &self,
        conn: &Connection,
        table: &str,
        record: &R,
    ) -> ExecuteResult<usize> {
        let sql = self.declarator.insert_statement(table)?;
        let values = self.declarator.insert_values(record)?;
        Ok(conn.execute(&sql, params_from_iter(values.iter().map(to_sql)))?)
    }

    /// Insert every record inside one transaction.
    ///
    /// The first failing record rolls the whole batch back.
    pub fn insert_all<R: Record>(
        &self,
        conn: &mut Connection,
        table: &str,
        records: &[R],
    ) -> ExecuteResult<usize> {
        let sql = self.declarator.insert_statement(table)?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(&sql)?;
            for (index, record) in records.iter().enumerate() {
                let row_error = |source: ExecuteError| ExecuteError::Row {
                    index,
                    source: Box::new(source),
                };
                let values = self
                    .declarator
                    .insert_values(record)
                    .map_err(|e| row_error(e.into()))?;
                stmt.execute(params_from_iter(values.iter().map(to_sql)))
                    .map_err(|e| row_error(e.into()))?;
            }
        }
        tx.commit()?;
        debug!("Inserted {} records into {}", records.len(), table);
        Ok(records.len())
    }
}

/// Bind a JSON value as a SQLite value.
///
/// Booleans become 0/1 and nested values are stored as JSON text.
pub fn to_sql(value: &Value) -> rusqlite::types::Value {
    use rusqlite::types::Value as Sql;

    match value {
        Value::Null => Sql::Null,
        Value::Bool(b) => Sql::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Sql::Integer(i),
            None => Sql::Real(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => Sql::Text(s.clone()),
        Value::Array(_) | Value::Object(_) => Sql::Text(value.to_string()),
    }
}
