//! # lib-vna
//!
//! Loaders for swept network analyzer data.
//!
//! This crate provides parsers for:
//! - plain three-column text exports (`frequency value1 value2`)
//! - `.s1p`/`.s2p` files (Touchstone S-parameters)
//!
//! All parsers are built using the `nom` parser combinator library and
//! report failures with line and column numbers.

pub mod error;
pub mod columns;
pub mod touchstone;

pub use error::ParseError;
pub use columns::{parse_columns, parse_columns_file, LoadOptions};
pub use touchstone::{parse_touchstone, parse_touchstone_file, TouchstoneFile};

use lib_types::measurement::Measurement;
use std::path::Path;

/// Kind of sweep file, decided by extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputKind {
    /// Whitespace or comma separated columns.
    Columns,
    /// Touchstone `.sNp`.
    Touchstone,
}

impl InputKind {
    pub fn from_path(path: &Path) -> Self {
        if touchstone::infer_ports_from_extension(path).is_some() {
            Self::Touchstone
        } else {
            Self::Columns
        }
    }
}

/// Load a sweep from disk.
///
/// Touchstone files carry their own unit and format, so `options` only
/// applies to column files.
pub fn load_measurement(path: &Path, options: &LoadOptions) -> Result<Measurement, ParseError> {
    match InputKind::from_path(path) {
        InputKind::Columns => {
            tracing::info!("Loading column sweep from {:?}", path);
            parse_columns_file(path, options)
        }
        InputKind::Touchstone => {
            tracing::info!("Loading Touchstone sweep from {:?}", path);
            if *options != LoadOptions::default() {
                tracing::warn!("Column options are ignored for Touchstone input");
            }
            parse_touchstone_file(path).map(TouchstoneFile::into_measurement)
        }
    }
}
