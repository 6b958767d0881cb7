//! SQLite practice: load a downloaded TSV dataset into SQLite.
//!
//! # Intention
//!
//! - Fetch the Livermore fungi records, clean the first rows and store them in
//!   a table whose columns are named by the file's own header.
//! - Read the table back to confirm what was stored.
//!
//! # Architectural Boundaries
//!
//! - Each stage is a plain function returning [`error::Result`]; [`pipeline`]
//!   only composes them.
//! - Names taken from the data are validated in [`schema`] before they reach
//!   any SQL text. Values are always bound as parameters.

pub mod config;
pub mod error;
pub mod fetch;
pub mod load;
pub mod logging;
pub mod normalize;
pub mod parse;
pub mod pipeline;
pub mod schema;
pub mod value;
pub mod verify;

pub use error::{PipelineError, Result};
pub use pipeline::{Pipeline, PipelineReport};
