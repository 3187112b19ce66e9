use crate::crs::Crs;
use crate::frame::GeoSeries;
use crate::metadata::{GeoParquetMetadata, GeometryFieldMetadata, GeometryFormat};

/// Describe the geometry column being written.
///
/// Geometry types and bounds are computed from the in-memory geometries, before they are
/// serialized.
pub(crate) fn create_metadata(series: &GeoSeries, crs: &Crs) -> GeoParquetMetadata {
    let column_meta = GeometryFieldMetadata {
        field_name: series.name().to_string(),
        geometry_format: GeometryFormat::WKB,
        geometry_types: series.geometry_types().into_iter().collect(),
        crs: Some(crs.as_str().to_string()),
        crs_format: Some(crs.format().clone()),
        bbox: series.total_bounds().to_vec(),
    };

    GeoParquetMetadata {
        fields: vec![column_meta],
    }
}
