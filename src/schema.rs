//! Table definitions built from an external header.
//!
//! Header names come from downloaded data, so every name is checked before it
//! is placed in SQL text. Names that pass are always double-quoted, which also
//! lets keywords such as `Key` or `Row` be used as column names.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use crate::error::{PipelineError, Result};
use crate::parse::Header;

static BARE_IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern should compile")
});

/// A table or column name that is safe to put in SQL text
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(String);

/// Outcome of checking a candidate name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentifierCheck {
    Valid(Identifier),
    Rejected { raw: String, reason: String },
}

impl Identifier {
    pub fn check(raw: &str) -> IdentifierCheck {
        let rejected = |reason: &str| IdentifierCheck::Rejected {
            raw: raw.to_string(),
            reason: reason.to_string(),
        };

        if raw.is_empty() {
            return rejected("empty name");
        }
        if !BARE_IDENTIFIER.is_match(raw) {
            return rejected("not a bare identifier");
        }
        IdentifierCheck::Valid(Identifier(raw.to_string()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        match Self::check(raw) {
            IdentifierCheck::Valid(ident) => Ok(ident),
            IdentifierCheck::Rejected { raw, reason } => Err(PipelineError::InvalidIdentifier {
                identifier: raw,
                reason,
            }),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Declared column type. SQLite derives the affinity from this name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Integer,
    Varchar,
    Date,
}

impl DataType {
    pub fn sql_type(&self) -> &'static str {
        match self {
            DataType::Integer => "INTEGER",
            DataType::Varchar => "VARCHAR",
            DataType::Date => "DATE",
        }
    }
}

/// Column types of the Livermore fungi records, by header position
pub const FUNGI_COLUMN_TYPES: [DataType; 16] = [
    DataType::Integer,
    DataType::Varchar,
    DataType::Date,
    DataType::Date,
    DataType::Varchar,
    DataType::Varchar,
    DataType::Varchar,
    DataType::Varchar,
    DataType::Integer,
    DataType::Varchar,
    DataType::Varchar,
    DataType::Varchar,
    DataType::Varchar,
    DataType::Varchar,
    DataType::Varchar,
    DataType::Varchar,
];

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: Identifier,
    pub data_type: DataType,
    pub primary_key: bool,
}

impl ColumnDefinition {
    fn sql(&self) -> String {
        let mut sql = format!("{} {}", self.name.quoted(), self.data_type.sql_type());
        if self.primary_key {
            sql.push_str(" PRIMARY KEY");
        }
        sql
    }
}

/// A table with at least one column; the first column is the key.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDefinition {
    name: Identifier,
    columns: Vec<ColumnDefinition>,
}

impl TableDefinition {
    /// One column per header name, in header order, typed by position. The
    /// first column is the primary key.
    pub fn from_header(table: &str, header: &Header, types: &[DataType]) -> Result<Self> {
        if header.len() != types.len() || types.is_empty() {
            return Err(PipelineError::SchemaMismatch {
                header: header.len(),
                types: types.len(),
            });
        }

        let columns = header
            .names()
            .iter()
            .zip(types)
            .enumerate()
            .map(|(i, (name, data_type))| {
                Ok(ColumnDefinition {
                    name: Identifier::parse(name)?,
                    data_type: *data_type,
                    primary_key: i == 0,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name: Identifier::parse(table)?,
            columns,
        })
    }

    pub fn name(&self) -> &Identifier {
        &self.name
    }

    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    pub fn key_column(&self) -> &ColumnDefinition {
        &self.columns[0]
    }

    /// Columns that receive bound values on insert
    pub fn value_columns(&self) -> &[ColumnDefinition] {
        &self.columns[1..]
    }

    pub fn create_sql(&self) -> String {
        let columns: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("    {}", c.sql()))
            .collect();
        format!(
            "CREATE TABLE {} (\n{}\n)",
            self.name.quoted(),
            columns.join(",\n")
        )
    }

    pub fn insert_sql(&self) -> String {
        let names: Vec<String> = self
            .value_columns()
            .iter()
            .map(|c| c.name.quoted())
            .collect();
        let placeholders: Vec<String> = (1..=names.len()).map(|i| format!("?{}", i)).collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.name.quoted(),
            names.join(", "),
            placeholders.join(", ")
        )
    }
}
