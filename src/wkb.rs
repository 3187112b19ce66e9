//! Conversion between [`geo::Geometry`] values and well-known binary, cell by cell and column by
//! column.
//!
//! The byte-level codec is [`geozero`]'s; this module only adapts it to nullable Arrow columns
//! and attaches row indices to errors.

use std::borrow::Cow;
use std::sync::Arc;

use arrow_array::{Array, ArrayRef, GenericBinaryArray, OffsetSizeTrait};
use geo::{CoordsIter, Geometry, GeometryCollection, LineString};
use geozero::wkb::Wkb;
use geozero::{CoordDimensions, ToGeo, ToWkb};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::error::{GeoParquetError, Result};

/// Convert geometry types WKB cannot represent into their closest WKB equivalent.
///
/// `Line` becomes a two-point `LineString`; `Rect` and `Triangle` become a `Polygon`.
pub(crate) fn normalize(geom: &Geometry) -> Cow<'_, Geometry> {
    match geom {
        Geometry::Line(line) => Cow::Owned(Geometry::LineString(LineString::new(vec![
            line.start, line.end,
        ]))),
        Geometry::Rect(rect) => Cow::Owned(Geometry::Polygon(rect.to_polygon())),
        Geometry::Triangle(triangle) => Cow::Owned(Geometry::Polygon(triangle.to_polygon())),
        Geometry::GeometryCollection(collection)
            if collection
                .0
                .iter()
                .any(|g| matches!(normalize(g), Cow::Owned(_))) =>
        {
            Cow::Owned(Geometry::GeometryCollection(GeometryCollection(
                collection
                    .0
                    .iter()
                    .map(|g| normalize(g).into_owned())
                    .collect(),
            )))
        }
        _ => Cow::Borrowed(geom),
    }
}

/// Encode a single geometry cell as 2D WKB.
///
/// `row` is only used to annotate errors.
pub fn encode_geometry(row: usize, geom: Option<&Geometry>) -> Result<Vec<u8>> {
    let geom = geom.ok_or_else(|| GeoParquetError::Encoding {
        row,
        reason: "geometry is null".to_string(),
    })?;

    if geom
        .coords_iter()
        .any(|coord| !coord.x.is_finite() || !coord.y.is_finite())
    {
        return Err(GeoParquetError::Encoding {
            row,
            reason: "geometry has non-finite coordinates".to_string(),
        });
    }

    normalize(geom)
        .to_wkb(CoordDimensions::xy())
        .map_err(|err| GeoParquetError::Encoding {
            row,
            reason: err.to_string(),
        })
}

/// Decode a single WKB cell.
///
/// `row` is only used to annotate errors.
pub fn decode_geometry(row: usize, buf: Option<&[u8]>) -> Result<Geometry> {
    let buf = buf.ok_or_else(|| GeoParquetError::Decoding {
        row,
        reason: "WKB value is null".to_string(),
    })?;
    if buf.is_empty() {
        return Err(GeoParquetError::Decoding {
            row,
            reason: "WKB value is empty".to_string(),
        });
    }

    Wkb(buf.to_vec())
        .to_geo()
        .map_err(|err| GeoParquetError::Decoding {
            row,
            reason: err.to_string(),
        })
}

/// Encode every cell of a geometry column, preserving row order.
///
/// With the `rayon` feature, rows are encoded in parallel; if several rows fail, which one is
/// reported is unspecified.
pub(crate) fn encode_geometries(geoms: &[Option<Geometry>]) -> Result<Vec<Vec<u8>>> {
    #[cfg(feature = "rayon")]
    let iter = geoms.par_iter().enumerate();
    #[cfg(not(feature = "rayon"))]
    let iter = geoms.iter().enumerate();

    iter.map(|(row, geom)| encode_geometry(row, geom.as_ref()))
        .collect()
}

/// Build a WKB column from encoded cells.
///
/// Falls back to 64-bit offsets when the column holds more than `i32::MAX` bytes.
pub(crate) fn to_wkb_array(encoded: &[Vec<u8>]) -> ArrayRef {
    let total_len: usize = encoded.iter().map(Vec::len).sum();
    if total_len <= i32::MAX as usize {
        Arc::new(GenericBinaryArray::<i32>::from_iter_values(encoded))
    } else {
        Arc::new(GenericBinaryArray::<i64>::from_iter_values(encoded))
    }
}

/// Decode every cell of a WKB column, preserving row order.
pub(crate) fn from_wkb_array<O: OffsetSizeTrait>(
    arr: &GenericBinaryArray<O>,
) -> Result<Vec<Geometry>> {
    let cell = |row: usize| (!arr.is_null(row)).then(|| arr.value(row));

    #[cfg(feature = "rayon")]
    let iter = (0..arr.len()).into_par_iter();
    #[cfg(not(feature = "rayon"))]
    let iter = 0..arr.len();

    iter.map(|row| decode_geometry(row, cell(row))).collect()
}

#[cfg(test)]
mod test {
    use arrow_array::BinaryArray;
    use geo::{line_string, point, polygon, Coord, Line, Rect};

    use super::*;

    #[test]
    fn point_round_trip() {
        let geom = Geometry::Point(point!(x: 1., y: 2.));
        let buf = encode_geometry(0, Some(&geom)).unwrap();
        // little endian, type 1, two doubles
        assert_eq!(buf.len(), 21);
        assert_eq!(buf[0], 1);
        assert_eq!(decode_geometry(0, Some(&buf)).unwrap(), geom);
    }

    #[test]
    fn null_geometry_is_an_encoding_error() {
        let err = encode_geometry(7, None).unwrap_err();
        assert!(matches!(err, GeoParquetError::Encoding { row: 7, .. }));
    }

    #[test]
    fn nan_coordinate_is_an_encoding_error() {
        let geom = Geometry::Point(point!(x: f64::NAN, y: 2.));
        assert!(matches!(
            encode_geometry(3, Some(&geom)),
            Err(GeoParquetError::Encoding { row: 3, .. })
        ));
    }

    #[test]
    fn garbage_bytes_are_a_decoding_error() {
        let err = decode_geometry(2, Some(&[0x01, 0xff, 0xff, 0xff, 0xff])).unwrap_err();
        assert!(matches!(err, GeoParquetError::Decoding { row: 2, .. }));

        let err = decode_geometry(4, Some(&[])).unwrap_err();
        assert!(matches!(err, GeoParquetError::Decoding { row: 4, .. }));

        let err = decode_geometry(5, None).unwrap_err();
        assert!(matches!(err, GeoParquetError::Decoding { row: 5, .. }));
    }

    #[test]
    fn truncated_point_is_a_decoding_error() {
        let geom = Geometry::Point(point!(x: 1., y: 2.));
        let buf = encode_geometry(0, Some(&geom)).unwrap();
        assert!(decode_geometry(0, Some(&buf[..12])).is_err());
    }

    #[test]
    fn normalize_special_types() {
        let line = Geometry::Line(Line::new(
            Coord { x: 0., y: 0. },
            Coord { x: 1., y: 1. },
        ));
        assert_eq!(
            normalize(&line).into_owned(),
            Geometry::LineString(line_string![(x: 0., y: 0.), (x: 1., y: 1.)])
        );

        let rect = Geometry::Rect(Rect::new(Coord { x: 0., y: 0. }, Coord { x: 1., y: 1. }));
        assert!(matches!(normalize(&rect).into_owned(), Geometry::Polygon(_)));

        let collection = Geometry::GeometryCollection(GeometryCollection(vec![rect]));
        match normalize(&collection).into_owned() {
            Geometry::GeometryCollection(gc) => {
                assert!(matches!(gc.0[0], Geometry::Polygon(_)))
            }
            other => panic!("unexpected geometry {other:?}"),
        }

        let polygon = Geometry::Polygon(polygon![(x: 0., y: 0.), (x: 1., y: 0.), (x: 0., y: 1.)]);
        assert!(matches!(normalize(&polygon), Cow::Borrowed(_)));
    }

    #[test]
    fn column_round_trip_preserves_order() {
        let geoms: Vec<Option<Geometry>> = (0..50)
            .map(|i| Some(Geometry::Point(point!(x: i as f64, y: -(i as f64)))))
            .collect();
        let encoded = encode_geometries(&geoms).unwrap();
        let array = BinaryArray::from_iter_values(&encoded);
        let decoded = from_wkb_array(&array).unwrap();
        assert_eq!(decoded.len(), 50);
        for (i, geom) in decoded.into_iter().enumerate() {
            assert_eq!(Some(geom), geoms[i]);
        }
    }

    #[test]
    fn column_reports_failing_row() {
        let geoms = vec![
            Some(Geometry::Point(point!(x: 0., y: 0.))),
            None,
            Some(Geometry::Point(point!(x: 1., y: 1.))),
        ];
        assert!(matches!(
            encode_geometries(&geoms),
            Err(GeoParquetError::Encoding { row: 1, .. })
        ));
    }
}
