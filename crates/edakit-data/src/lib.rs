//! Tabular data loading for exploratory analysis.
//!
//! This crate reads delimited text files into an immutable in-memory
//! [`Table`] and provides the dataset-level summaries used before any
//! statistical test is run.
//!
//! # Modules
//!
//! - [`table`]: The [`Table`] and [`Column`] types, projections, and profiling
//! - [`reader`]: CSV reading with per-column type inference ([`ReadOptions`])
//!
//! # Examples
//!
//! ## Loading a table
//!
//! ```no_run
//! use edakit_data::{ReadOptions, Table};
//!
//! let options = ReadOptions {
//!     index_col: Some("ID".to_owned()),
//!     ..ReadOptions::default()
//! };
//! let table = Table::read_csv("data/credit.csv", &options)?;
//! println!("{} rows x {} columns", table.num_rows(), table.num_columns());
//! # Ok::<(), edakit_data::DataError>(())
//! ```
//!
//! ## Profiling columns
//!
//! ```
//! use edakit_data::{Column, Table};
//!
//! let table = Table::new(vec![
//!     Column::categorical("Gender", [Some("Female"), Some("Male"), None]),
//!     Column::numeric("Income", [Some(14.9), Some(106.0), Some(104.6)]),
//! ]);
//!
//! let profile = table.profile();
//! assert_eq!(profile[0].null, 1);
//! assert_eq!(profile[1].cardinality, 3);
//! ```

use std::{io, path::PathBuf};

pub use self::{reader::ReadOptions, table::*};

pub mod reader;
pub mod table;

/// Errors raised while loading or querying a [`Table`].
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::IsVariant)]
pub enum DataError {
    /// The input file does not exist or could not be read.
    #[display("cannot read {}: {source}", path.display())]
    FileAccess { path: PathBuf, source: io::Error },
    /// The file content is not a well-formed table.
    #[display("malformed table in {} (line {line}): {message}", path.display())]
    Parse {
        path: PathBuf,
        line: u64,
        message: String,
    },
    /// The requested column is not part of the table.
    #[display("column '{name}' not found")]
    ColumnNotFound { name: String },
}
