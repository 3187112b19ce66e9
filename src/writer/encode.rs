use std::sync::Arc;

use arrow_array::{ArrayRef, RecordBatch};
use arrow_schema::{Field, FieldRef, Schema};

use crate::crs::Crs;
use crate::error::Result;
use crate::frame::GeoDataFrame;
use crate::metadata::{GeoParquetMetadata, GEOMETRY_FIELDS_KEY};
use crate::wkb::{encode_geometries, to_wkb_array};
use crate::writer::metadata::create_metadata;

/// Serialize the geometry column of `frame` to WKB and splice it back among the attribute
/// columns.
///
/// Fails before producing anything if any geometry cannot be encoded.
pub(super) fn encode_frame(
    frame: &GeoDataFrame,
    crs: &Crs,
) -> Result<(RecordBatch, GeoParquetMetadata)> {
    let series = frame.geometry();

    // Metadata is computed from the geometries before they are serialized.
    let geo_meta = create_metadata(series, crs);

    let encoded = encode_geometries(series.geometries())?;
    let wkb_array = to_wkb_array(&encoded);

    let attributes = frame.attributes();
    let attribute_schema = attributes.schema_ref();

    let mut fields: Vec<FieldRef> = attribute_schema.fields().to_vec();
    let mut columns: Vec<ArrayRef> = attributes.columns().to_vec();

    // Nulls are rejected while encoding.
    let wkb_field = Field::new(series.name(), wkb_array.data_type().clone(), false);
    fields.insert(frame.geometry_index(), Arc::new(wkb_field));
    columns.insert(frame.geometry_index(), wkb_array);

    // A frame read back from a file must not carry the old metadata entry along.
    let mut schema_metadata = attribute_schema.metadata().clone();
    schema_metadata.remove(GEOMETRY_FIELDS_KEY);

    let schema = Arc::new(Schema::new_with_metadata(fields, schema_metadata));
    let batch = RecordBatch::try_new(schema, columns)?;

    Ok((batch, geo_meta))
}
