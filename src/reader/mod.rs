//! Read GeoParquet into a [`GeoDataFrame`].

mod options;
mod parse;

use std::fs::File;
use std::path::Path;

use arrow::compute::concat_batches;
use arrow_array::RecordBatch;
use arrow_schema::ArrowError;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::file::reader::ChunkReader;

pub use options::GeoParquetReaderOptions;

use crate::error::{GeoParquetError, Result};
use crate::frame::GeoDataFrame;
use crate::metadata::GeoParquetMetadata;
use crate::reader::parse::parse_record_batch;

/// Read the geometry metadata of a GeoParquet file from its footer, without decoding any rows.
///
/// Fails with [`MissingCrs`][GeoParquetError::MissingCrs] if the file has no geometry metadata.
pub fn read_geoparquet_metadata<R: ChunkReader + 'static>(
    reader: R,
) -> Result<GeoParquetMetadata> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(reader)?;
    GeoParquetMetadata::from_parquet_meta(builder.metadata().file_metadata())
        .ok_or(GeoParquetError::MissingCrs)?
}

/// Read a GeoParquet file into a [`GeoDataFrame`].
///
/// The file must carry geometry metadata with a CRS; files without one are rejected with
/// [`MissingCrs`][GeoParquetError::MissingCrs] rather than read with an unknown CRS. Every WKB
/// value must decode, otherwise [`Decoding`][GeoParquetError::Decoding] is returned and no frame
/// is produced.
pub fn read_geoparquet<R: ChunkReader + 'static>(
    reader: R,
    options: GeoParquetReaderOptions,
) -> Result<GeoDataFrame> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(reader)?;

    let geo_meta = GeoParquetMetadata::from_parquet_meta(builder.metadata().file_metadata())
        .ok_or(GeoParquetError::MissingCrs)??;
    let crs = geo_meta.crs()?;
    let field_meta = geo_meta.primary_field()?;

    let schema = builder.schema().clone();
    let reader = options.apply_to_builder(builder).build()?;
    let batches = reader.collect::<std::result::Result<Vec<RecordBatch>, ArrowError>>()?;
    let batch = concat_batches(&schema, &batches)?;

    tracing::debug!(
        rows = batch.num_rows(),
        batches = batches.len(),
        geometry_column = %field_meta.field_name,
        crs_format = %crs.format(),
        "read geoparquet"
    );

    parse_record_batch(batch, field_meta, crs)
}

/// Read the GeoParquet file at `path` into a [`GeoDataFrame`].
pub fn read_geoparquet_path(
    path: impl AsRef<Path>,
    options: GeoParquetReaderOptions,
) -> Result<GeoDataFrame> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "opening geoparquet file");
    read_geoparquet(File::open(path)?, options)
}
