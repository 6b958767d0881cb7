//! Read-back queries run after loading.

use rusqlite::{Connection, ToSql};
use tracing::info;

use crate::error::Result;
use crate::schema::{Identifier, TableDefinition};
use crate::value::Value;

/// Rows of a query along with the column names the statement reported
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl QueryResult {
    pub fn first(&self) -> Option<&[Value]> {
        self.rows.first().map(Vec::as_slice)
    }
}

fn query(conn: &Connection, sql: &str, params: &[&dyn ToSql]) -> Result<QueryResult> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let width = columns.len();

    let rows = stmt
        .query_map(params, |row| {
            (0..width)
                .map(|i| row.get_ref(i).map(Value::from))
                .collect::<rusqlite::Result<Vec<_>>>()
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(QueryResult { columns, rows })
}

fn single_column(result: QueryResult) -> Vec<Value> {
    result
        .rows
        .into_iter()
        .filter_map(|row| row.into_iter().next())
        .collect()
}

/// `SELECT *`, in key order
pub fn select_all(conn: &Connection, table: &TableDefinition) -> Result<QueryResult> {
    let sql = format!(
        "SELECT * FROM {} ORDER BY {}",
        table.name().quoted(),
        table.key_column().name.quoted()
    );
    query(conn, &sql, &[])
}

/// One column across every row, in key order
pub fn select_column(
    conn: &Connection,
    table: &TableDefinition,
    column: &str,
) -> Result<Vec<Value>> {
    let column = Identifier::parse(column)?;
    let sql = format!(
        "SELECT {} FROM {} ORDER BY {}",
        column.quoted(),
        table.name().quoted(),
        table.key_column().name.quoted()
    );
    Ok(single_column(query(conn, &sql, &[])?))
}

/// One column for the rows where `key` equals `value`; the value is bound
pub fn select_column_where(
    conn: &Connection,
    table: &TableDefinition,
    column: &str,
    key: &str,
    value: &Value,
) -> Result<Vec<Value>> {
    let column = Identifier::parse(column)?;
    let key = Identifier::parse(key)?;
    let sql = format!(
        "SELECT {} FROM {} WHERE {} = ?1",
        column.quoted(),
        table.name().quoted(),
        key.quoted()
    );
    Ok(single_column(query(conn, &sql, &[value as &dyn ToSql])?))
}

/// Results of the three read-back queries
#[derive(Debug, Clone, PartialEq)]
pub struct Verification {
    pub all: QueryResult,
    pub column: Vec<Value>,
    pub lookup: Vec<Value>,
}

pub fn verify(
    conn: &Connection,
    table: &TableDefinition,
    column: &str,
    lookup_column: &str,
    key_column: &str,
    key_value: &Value,
) -> Result<Verification> {
    let all = select_all(conn, table)?;
    info!(columns = ?all.columns, rows = all.rows.len(), "read back table");
    if let Some(first) = all.first() {
        let rendered: Vec<String> = first.iter().map(ToString::to_string).collect();
        info!(row = %rendered.join(", "), "first row");
    }

    let column_values = select_column(conn, table, column)?;
    info!(column, values = column_values.len(), "read back column");

    let lookup = select_column_where(conn, table, lookup_column, key_column, key_value)?;
    info!(
        column = lookup_column,
        key = key_column,
        value = %key_value,
        found = lookup.len(),
        "looked up by key"
    );

    Ok(Verification {
        all,
        column: column_values,
        lookup,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load::{create_table, insert_rows, open_database};
    use crate::normalize::NormalizedRecord;
    use crate::parse::Header;
    use crate::schema::DataType;

    fn loaded() -> (Connection, TableDefinition) {
        let mut conn = open_database(":memory:").unwrap();
        let header = Header::new(
            ["UserID", "Name", "Age", "StartDate"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );
        let table = TableDefinition::from_header(
            "Employees",
            &header,
            &[DataType::Integer, DataType::Varchar, DataType::Integer, DataType::Date],
        )
        .unwrap();
        create_table(&conn, &table).unwrap();
        let rows: Vec<NormalizedRecord> = [
            ["Bob", "33", "2010-08-22"],
            ["David", "24", "2017-07-10"],
            ["Heather", "29", "2011-09-14"],
        ]
        .iter()
        .map(|r| NormalizedRecord::from_fields(r.iter().map(|s| s.to_string()).collect()))
        .collect();
        insert_rows(&mut conn, &table, &rows).unwrap();
        (conn, table)
    }

    #[test]
    fn test_select_all_reports_columns_and_affinity() {
        let (conn, table) = loaded();
        let result = select_all(&conn, &table).unwrap();
        assert_eq!(result.columns, vec!["UserID", "Name", "Age", "StartDate"]);
        assert_eq!(result.rows.len(), 3);
        assert_eq!(
            result.first().unwrap(),
            &[
                Value::Integer(1),
                Value::from("Bob"),
                Value::Integer(33),
                Value::from("2010-08-22"),
            ]
        );
    }

    #[test]
    fn test_select_column_in_insert_order() {
        let (conn, table) = loaded();
        let names = select_column(&conn, &table, "Name").unwrap();
        let names: Vec<&str> = names.iter().filter_map(Value::as_text).collect();
        assert_eq!(names, vec!["Bob", "David", "Heather"]);
    }

    #[test]
    fn test_select_column_where_binds_value() {
        let (conn, table) = loaded();
        let found =
            select_column_where(&conn, &table, "Name", "UserID", &Value::Integer(2)).unwrap();
        assert_eq!(found, vec![Value::from("David")]);

        let missing =
            select_column_where(&conn, &table, "Name", "UserID", &Value::Integer(42)).unwrap();
        assert!(missing.is_empty());
    }

    #[test]
    fn test_round_trip_by_key() {
        let (conn, _table) = loaded();
        let sql = "SELECT * FROM Employees WHERE UserID = ?1";
        let result = query(&conn, sql, rusqlite::params![3]).unwrap();
        assert_eq!(
            result.rows,
            vec![vec![
                Value::Integer(3),
                Value::from("Heather"),
                Value::Integer(29),
                Value::from("2011-09-14"),
            ]]
        );
    }

    #[test]
    fn test_unsafe_column_name_rejected() {
        let (conn, table) = loaded();
        let err = select_column(&conn, &table, "Name FROM Employees; --").unwrap_err();
        assert!(matches!(err, crate::error::PipelineError::InvalidIdentifier { .. }));
    }

    #[test]
    fn test_verify_runs_all_three_queries() {
        let (conn, table) = loaded();
        let report = verify(&conn, &table, "Name", "Age", "UserID", &Value::Integer(1)).unwrap();
        assert_eq!(report.all.rows.len(), 3);
        assert_eq!(report.column.len(), 3);
        assert_eq!(report.lookup, vec![Value::Integer(33)]);
    }
}
