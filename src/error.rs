//! Defines [`GeoParquetError`], representing all errors returned by this crate.

use arrow_schema::ArrowError;
use std::fmt::Debug;
use thiserror::Error;

/// Enum with all errors in this crate.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum GeoParquetError {
    /// A geometry value could not be converted to well-known binary.
    ///
    /// This includes null cells in the geometry column.
    #[error("Failed to encode geometry at row {row} as WKB: {reason}")]
    Encoding {
        /// Index of the offending row.
        row: usize,
        /// Human-readable cause.
        reason: String,
    },

    /// A stored byte sequence is not valid well-known binary.
    #[error("Failed to decode WKB geometry at row {row}: {reason}")]
    Decoding {
        /// Index of the offending row.
        row: usize,
        /// Human-readable cause.
        reason: String,
    },

    /// No coordinate reference system descriptor was available where one is required.
    #[error("No coordinate reference system found")]
    MissingCrs,

    /// A string could not be interpreted as a coordinate reference system descriptor.
    #[error("Unrecognized coordinate reference system: {0}")]
    InvalidCrs(String),

    /// The geometry metadata stored in the file is malformed or inconsistent with its schema.
    #[error("Invalid geometry metadata: {0}")]
    Metadata(String),

    /// A [`GeoDataFrame`][crate::GeoDataFrame] could not be assembled from its parts.
    #[error("Invalid data frame: {0}")]
    InvalidFrame(String),

    /// [ArrowError]
    #[error(transparent)]
    Arrow(#[from] ArrowError),

    /// [parquet::errors::ParquetError]
    #[error(transparent)]
    ParquetError(#[from] parquet::errors::ParquetError),

    /// [std::io::Error]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// [serde_json::Error]
    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),
}

/// Crate-specific result type.
pub type Result<T> = std::result::Result<T, GeoParquetError>;

impl From<GeoParquetError> for ArrowError {
    fn from(err: GeoParquetError) -> Self {
        match err {
            GeoParquetError::Arrow(err) => err,
            _ => ArrowError::ExternalError(Box::new(err)),
        }
    }
}
