//! Fetch → Parse → Normalize → Load → Verify

use rusqlite::Connection;
use tracing::{info, info_span, warn};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::fetch::{self, Source};
use crate::load;
use crate::normalize::{NormalizedRecord, Normalizer};
use crate::parse::{self, Header};
use crate::schema::{DataType, TableDefinition, FUNGI_COLUMN_TYPES};
use crate::value::Value;
use crate::verify::{self, Verification};

/// Everything one run produced
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    pub header: Header,
    pub rows: Vec<NormalizedRecord>,
    pub table: TableDefinition,
    pub inserted: usize,
    pub verification: Verification,
}

pub struct Pipeline {
    config: PipelineConfig,
    column_types: Vec<DataType>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            column_types: FUNGI_COLUMN_TYPES.to_vec(),
        }
    }

    /// Replace the per-position column types
    pub fn with_column_types(mut self, column_types: Vec<DataType>) -> Self {
        self.column_types = column_types;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Open the configured database and run against it
    pub fn run_with_database(&self, source: &dyn Source) -> Result<(Connection, PipelineReport)> {
        let mut conn = load::open_database(&self.config.database)?;
        let report = self.run(source, &mut conn)?;
        Ok((conn, report))
    }

    pub fn run(&self, source: &dyn Source, conn: &mut Connection) -> Result<PipelineReport> {
        let config = &self.config;
        config.validate()?;

        let text = {
            let _span = info_span!("fetch").entered();
            let text = fetch::fetch_text(source, config.max_chars)?;
            fetch::stage(text, config.scratch_file, config.scratch_dir.as_deref())?
        };

        let (header, raw_rows) = {
            let _span = info_span!("parse").entered();
            parse::split_header(parse::parse_tsv(&text)?, config.data_rows)?
        };
        info!(header = ?header.names(), "parsed header");

        let rows = {
            let _span = info_span!("normalize").entered();
            Normalizer::new(config.blank_placeholder.clone(), config.drop_leading)
                .normalize_all(raw_rows)?
        };

        let (table, inserted) = {
            let _span = info_span!("load").entered();
            let header = fit_header(&header, self.column_types.len())?;
            let table =
                TableDefinition::from_header(&config.table_name, &header, &self.column_types)?;
            load::create_table(conn, &table)?;
            let inserted = load::insert_rows(conn, &table, &rows)?;
            (table, inserted)
        };

        let verification = {
            let _span = info_span!("verify").entered();
            let v = &config.verify;
            verify::verify(
                conn,
                &table,
                &v.column,
                &v.lookup_column,
                &v.key_column,
                &Value::Integer(v.key_value),
            )?
        };

        Ok(PipelineReport {
            header,
            rows,
            table,
            inserted,
            verification,
        })
    }
}

/// Keep the first `width` header names. A header shorter than the type map is
/// an error; extra names are ignored.
fn fit_header(header: &Header, width: usize) -> Result<Header> {
    if header.len() < width {
        return Err(PipelineError::SchemaMismatch {
            header: header.len(),
            types: width,
        });
    }
    if header.len() > width {
        warn!(ignored = ?&header.names()[width..], "header has more names than column types");
    }
    Ok(Header::new(header.names()[..width].to_vec()))
}
