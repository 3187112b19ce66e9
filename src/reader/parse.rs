//! Turn a decoded Parquet record batch back into a [`GeoDataFrame`].

use std::sync::Arc;

use arrow_array::cast::AsArray;
use arrow_array::{ArrayRef, RecordBatch, RecordBatchOptions};
use arrow_schema::{DataType, FieldRef, Schema};

use crate::crs::Crs;
use crate::error::{GeoParquetError, Result};
use crate::frame::{GeoDataFrame, GeoSeries};
use crate::metadata::{GeometryFieldMetadata, GEOMETRY_FIELDS_KEY};
use crate::wkb::from_wkb_array;

/// Split the WKB column described by `field_meta` out of `batch`, decode it, and keep every
/// other column as attributes in their original order.
pub(crate) fn parse_record_batch(
    batch: RecordBatch,
    field_meta: &GeometryFieldMetadata,
    crs: Crs,
) -> Result<GeoDataFrame> {
    let schema = batch.schema();
    let (geometry_index, geometry_field) = schema
        .column_with_name(&field_meta.field_name)
        .ok_or_else(|| {
            GeoParquetError::Metadata(format!(
                "Geometry column {} not found in file schema",
                field_meta.field_name
            ))
        })?;

    let column = batch.column(geometry_index);
    let geometries = match geometry_field.data_type() {
        DataType::Binary => from_wkb_array(column.as_binary::<i32>())?,
        DataType::LargeBinary => from_wkb_array(column.as_binary::<i64>())?,
        dt => {
            return Err(GeoParquetError::Metadata(format!(
                "Expected geometry column {} to have a binary data type, got {dt}",
                field_meta.field_name
            )))
        }
    };

    let mut attribute_fields: Vec<FieldRef> = Vec::with_capacity(batch.num_columns() - 1);
    let mut attribute_columns: Vec<ArrayRef> = Vec::with_capacity(batch.num_columns() - 1);
    let fields_and_columns = schema.fields().iter().zip(batch.columns());
    for (column_idx, (field, column)) in fields_and_columns.enumerate() {
        if column_idx != geometry_index {
            attribute_fields.push(field.clone());
            attribute_columns.push(column.clone());
        }
    }

    let mut schema_metadata = schema.metadata().clone();
    schema_metadata.remove(GEOMETRY_FIELDS_KEY);

    let attributes = RecordBatch::try_new_with_options(
        Arc::new(Schema::new_with_metadata(attribute_fields, schema_metadata)),
        attribute_columns,
        &RecordBatchOptions::new().with_row_count(Some(batch.num_rows())),
    )?;

    let geometry =
        GeoSeries::from_geometries(field_meta.field_name.clone(), geometries).with_crs(crs);
    GeoDataFrame::try_new_with_position(attributes, geometry, geometry_index)
}

#[cfg(test)]
mod test {
    use arrow_array::{BinaryArray, Int64Array, LargeBinaryArray, StringArray};
    use arrow_schema::Field;
    use geo::Geometry;

    use super::*;
    use crate::metadata::GeometryFormat;
    use crate::test::point;
    use crate::wkb::encode_geometry;

    fn field_meta(name: &str) -> GeometryFieldMetadata {
        GeometryFieldMetadata {
            field_name: name.to_string(),
            geometry_format: GeometryFormat::WKB,
            geometry_types: vec![],
            crs: Some("EPSG:2154".to_string()),
            crs_format: None,
            bbox: None,
        }
    }

    fn wkb_values() -> Vec<Vec<u8>> {
        point::points()
            .iter()
            .enumerate()
            .map(|(row, geom)| encode_geometry(row, Some(geom)).unwrap())
            .collect()
    }

    fn batch(wkb: ArrayRef) -> RecordBatch {
        let schema = Schema::new(vec![
            Field::new("id", DataType::Int64, false),
            Field::new("geom", wkb.data_type().clone(), true),
            Field::new("name", DataType::Utf8, true),
        ]);
        RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(Int64Array::from(vec![10, 11, 12])),
                wkb,
                Arc::new(StringArray::from(vec!["x", "y", "z"])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn geometry_column_keeps_its_position() {
        let wkb = Arc::new(BinaryArray::from_iter_values(wkb_values()));
        let crs = Crs::from_authority_code("EPSG:2154").unwrap();
        let frame = parse_record_batch(batch(wkb), &field_meta("geom"), crs.clone()).unwrap();

        assert_eq!(frame.column_names(), vec!["id", "geom", "name"]);
        assert_eq!(frame.geometry_index(), 1);
        assert_eq!(frame.crs(), Some(&crs));
        let geoms: Vec<Geometry> = frame.geometry().iter().flatten().cloned().collect();
        assert_eq!(geoms, point::points());
    }

    #[test]
    fn large_binary_is_accepted() {
        let wkb = Arc::new(LargeBinaryArray::from_iter_values(wkb_values()));
        let crs = Crs::from_authority_code("EPSG:2154").unwrap();
        let frame = parse_record_batch(batch(wkb), &field_meta("geom"), crs).unwrap();
        assert_eq!(frame.num_rows(), 3);
    }

    #[test]
    fn unknown_geometry_column() {
        let wkb = Arc::new(BinaryArray::from_iter_values(wkb_values()));
        let crs = Crs::from_authority_code("EPSG:2154").unwrap();
        assert!(matches!(
            parse_record_batch(batch(wkb), &field_meta("geometry"), crs),
            Err(GeoParquetError::Metadata(_))
        ));
    }

    #[test]
    fn non_binary_geometry_column() {
        let wkb = Arc::new(BinaryArray::from_iter_values(wkb_values()));
        let crs = Crs::from_authority_code("EPSG:2154").unwrap();
        assert!(matches!(
            parse_record_batch(batch(wkb), &field_meta("name"), crs),
            Err(GeoParquetError::Metadata(_))
        ));
    }

    #[test]
    fn null_wkb_is_a_decoding_error() {
        let mut values: Vec<Option<Vec<u8>>> = wkb_values().into_iter().map(Some).collect();
        values[2] = None;
        let wkb = Arc::new(BinaryArray::from_iter(values));
        let crs = Crs::from_authority_code("EPSG:2154").unwrap();
        assert!(matches!(
            parse_record_batch(batch(wkb), &field_meta("geom"), crs),
            Err(GeoParquetError::Decoding { row: 2, .. })
        ));
    }
}
