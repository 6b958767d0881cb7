//! Creating the target table and inserting normalized rows.

use rusqlite::{params_from_iter, Connection};
use tracing::{info, warn};

use crate::config::IN_MEMORY;
use crate::error::{PipelineError, Result};
use crate::normalize::NormalizedRecord;
use crate::schema::TableDefinition;

/// Open `:memory:` or a database file
pub fn open_database(path: &str) -> Result<Connection> {
    let conn = if path == IN_MEMORY {
        Connection::open_in_memory()?
    } else {
        Connection::open(path)?
    };
    Ok(conn)
}

pub fn create_table(conn: &Connection, table: &TableDefinition) -> Result<()> {
    conn.execute(&table.create_sql(), [])?;
    info!(table = %table.name(), columns = table.columns().len(), "created table");
    Ok(())
}

/// Insert every row in one transaction, committed after the last row.
///
/// Each row binds exactly one value per non-key column; the key is assigned
/// by SQLite. Rows are checked before the transaction starts, and a failed
/// insert rolls the whole batch back.
pub fn insert_rows(
    conn: &mut Connection,
    table: &TableDefinition,
    rows: &[NormalizedRecord],
) -> Result<usize> {
    let width = table.value_columns().len();
    for (i, row) in rows.iter().enumerate() {
        if row.len() < width {
            return Err(PipelineError::RowTooShort {
                row: i,
                expected: width,
                found: row.len(),
            });
        }
        if row.len() > width {
            warn!(
                row = i,
                discarded = row.len() - width,
                "row has more fields than the table, extra fields dropped"
            );
        }
    }

    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(&table.insert_sql())?;
        for row in rows {
            stmt.execute(params_from_iter(&row.fields()[..width]))?;
        }
    }
    tx.commit()?;

    info!(table = %table.name(), rows = rows.len(), "inserted rows");
    Ok(rows.len())
}
