//! Write a [`GeoDataFrame`] to GeoParquet.

mod encode;
mod metadata;
mod options;

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use arrow_array::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;

pub use options::GeoParquetWriterOptions;

use crate::crs::Crs;
use crate::error::{GeoParquetError, Result};
use crate::frame::GeoDataFrame;
use crate::metadata::GeoParquetMetadata;
use crate::writer::encode::encode_frame;

/// The CRS to record: the explicit option wins over the frame's own.
fn resolve_crs<'a>(
    frame: &'a GeoDataFrame,
    options: &'a GeoParquetWriterOptions,
) -> Result<&'a Crs> {
    options
        .crs
        .as_ref()
        .or(frame.crs())
        .ok_or(GeoParquetError::MissingCrs)
}

/// Write a [`GeoDataFrame`] as GeoParquet to any sink.
///
/// The geometry column is encoded as WKB in full before anything is written to `writer`, so an
/// [`Encoding`][GeoParquetError::Encoding] or [`MissingCrs`][GeoParquetError::MissingCrs] error
/// leaves the sink untouched.
pub fn write_geoparquet<W: Write + Send>(
    frame: &GeoDataFrame,
    writer: W,
    options: &GeoParquetWriterOptions,
) -> Result<()> {
    let crs = resolve_crs(frame, options)?;
    let (batch, geo_meta) = encode_frame(frame, crs)?;
    write_encoded(&batch, &geo_meta, writer, options.writer_properties.clone())
}

/// Write a [`GeoDataFrame`] as a GeoParquet file at `path`.
///
/// The file is written to a hidden temporary sibling and renamed over `path` only once it is
/// complete. On failure `path` is left as it was.
pub fn to_geoparquet(
    frame: &GeoDataFrame,
    path: impl AsRef<Path>,
    options: &GeoParquetWriterOptions,
) -> Result<()> {
    let path = path.as_ref();
    let crs = resolve_crs(frame, options)?;
    let (batch, geo_meta) = encode_frame(frame, crs)?;

    let tmp_path = temporary_path(path)?;
    tracing::debug!(
        path = %path.display(),
        tmp_path = %tmp_path.display(),
        "writing geoparquet file"
    );

    let result = File::create(&tmp_path)
        .map_err(GeoParquetError::from)
        .and_then(|mut file| {
            write_encoded(
                &batch,
                &geo_meta,
                &mut file,
                options.writer_properties.clone(),
            )?;
            file.sync_all()?;
            Ok(())
        })
        .and_then(|()| fs::rename(&tmp_path, path).map_err(GeoParquetError::from));

    if let Err(err) = &result {
        tracing::debug!(error = %err, "removing incomplete geoparquet file");
        if let Err(remove_err) = fs::remove_file(&tmp_path) {
            if remove_err.kind() != io::ErrorKind::NotFound {
                tracing::warn!(
                    tmp_path = %tmp_path.display(),
                    error = %remove_err,
                    "failed to remove temporary file"
                );
            }
        }
    }

    result
}

fn write_encoded<W: Write + Send>(
    batch: &RecordBatch,
    geo_meta: &GeoParquetMetadata,
    writer: W,
    writer_properties: Option<WriterProperties>,
) -> Result<()> {
    let mut writer = ArrowWriter::try_new(writer, batch.schema(), writer_properties)?;

    if batch.num_rows() > 0 {
        writer.write(batch)?;
    }

    writer.append_key_value_metadata(geo_meta.to_key_value()?);
    writer.close()?;

    tracing::debug!(
        rows = batch.num_rows(),
        columns = batch.num_columns(),
        "wrote geoparquet"
    );

    Ok(())
}

fn temporary_path(path: &Path) -> Result<PathBuf> {
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} does not name a file", path.display()),
        )
    })?;

    let mut tmp_name = OsString::from(".");
    tmp_name.push(file_name);
    tmp_name.push(format!(".{}.tmp", std::process::id()));
    Ok(path.with_file_name(tmp_name))
}
