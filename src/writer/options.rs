use parquet::file::properties::WriterProperties;

use crate::crs::Crs;

/// Options for writing GeoParquet
#[derive(Clone, Debug, Default)]
pub struct GeoParquetWriterOptions {
    /// The coordinate reference system to record for the geometry column.
    ///
    /// Takes precedence over the CRS attached to the frame. If neither is set, writing fails
    /// with [`MissingCrs`][crate::error::GeoParquetError::MissingCrs].
    pub crs: Option<Crs>,

    /// Passed through to the underlying [`ArrowWriter`][parquet::arrow::ArrowWriter].
    pub writer_properties: Option<WriterProperties>,
}

impl GeoParquetWriterOptions {
    /// Record `crs` instead of the frame's own CRS.
    pub fn with_crs(self, crs: Crs) -> Self {
        Self {
            crs: Some(crs),
            ..self
        }
    }

    /// Set the Parquet [`WriterProperties`], e.g. compression or row group size.
    pub fn with_writer_properties(self, writer_properties: WriterProperties) -> Self {
        Self {
            writer_properties: Some(writer_properties),
            ..self
        }
    }
}
