//! Row cleanup.
//!
//! For a raw row `f` with the default settings the output is
//! `[f[2] + " " + f[3]] ++ f[4..]`: two leading fields are discarded and the
//! next two are joined into one synthetic field that goes first.

use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::parse::RawRecord;

/// A RawRecord after blank-filling, the leading drop and the merge.
///
/// [`Normalizer::normalize`] only accepts a [`RawRecord`] and there is no
/// conversion back, so a normalized row can never be normalized again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    fields: Vec<String>,
}

impl NormalizedRecord {
    /// Wrap fields that are already in table shape
    pub fn from_fields(fields: Vec<String>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The joined field
    pub fn synthetic(&self) -> &str {
        self.fields.first().map(String::as_str).unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalizer {
    placeholder: String,
    drop_leading: usize,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new("No data", 2)
    }
}

impl Normalizer {
    pub fn new(placeholder: impl Into<String>, drop_leading: usize) -> Self {
        Self {
            placeholder: placeholder.into(),
            drop_leading,
        }
    }

    /// Fields a raw row needs: the dropped ones plus the two merged ones
    pub fn min_fields(&self) -> usize {
        self.drop_leading + 2
    }

    /// Normalize one row. `row` is its position in the data set, for errors.
    pub fn normalize(&self, row: usize, record: RawRecord) -> Result<NormalizedRecord> {
        if record.len() < self.min_fields() {
            return Err(PipelineError::RowTooShort {
                row,
                expected: self.min_fields(),
                found: record.len(),
            });
        }

        // Only exact empty strings count as missing
        let mut fields: Vec<String> = record
            .into_fields()
            .into_iter()
            .skip(self.drop_leading)
            .map(|field| {
                if field.is_empty() {
                    self.placeholder.clone()
                } else {
                    field
                }
            })
            .collect();

        let second = fields.remove(1);
        fields[0] = format!("{} {}", fields[0], second);
        Ok(NormalizedRecord { fields })
    }

    pub fn normalize_all(&self, records: Vec<RawRecord>) -> Result<Vec<NormalizedRecord>> {
        let normalized = records
            .into_iter()
            .enumerate()
            .map(|(row, record)| self.normalize(row, record))
            .collect::<Result<Vec<_>>>()?;
        for record in &normalized {
            debug!(synthetic = record.synthetic(), fields = record.len(), "normalized row");
        }
        Ok(normalized)
    }
}
