//! Structs corresponding to the geometry metadata stored in the Parquet footer.
//!
//! The metadata lives under a single key/value entry, [`GEOMETRY_FIELDS_KEY`], whose value is a
//! JSON array with one object per geometry column:
//!
//! ```json
//! [
//!   {
//!     "field_name": "geometry",
//!     "geometry_format": "wkb",
//!     "geometry_types": ["Point"],
//!     "crs": "GEOGCRS[\"WGS 84\", ...]",
//!     "crs_format": "WKT2_2018",
//!     "bbox": [1.0, 2.0, 3.0, 4.0]
//!   }
//! ]
//! ```

use std::fmt::Display;
use std::str::FromStr;

use parquet::file::metadata::{FileMetaData, KeyValue};
use serde::{Deserialize, Serialize};

use crate::crs::{Crs, CrsFormat};
use crate::error::{GeoParquetError, Result};

/// The Parquet key/value metadata key holding the geometry metadata.
pub const GEOMETRY_FIELDS_KEY: &str = "geometry_fields";

/// The serialization of the geometry column.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
pub enum GeometryFormat {
    /// Well-known binary
    #[serde(rename = "wkb")]
    WKB,
}

/// Geometry type names, as recorded in `geometry_types`.
///
/// The list only describes the column, so names this crate never writes (such as `LinearRing`)
/// are kept as [`GeometryType::Other`] instead of rejecting the file.
#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GeometryType {
    /// Point geometry type
    Point,
    /// LineString geometry type
    LineString,
    /// Polygon geometry type
    Polygon,
    /// MultiPoint geometry type
    MultiPoint,
    /// MultiLineString geometry type
    MultiLineString,
    /// MultiPolygon geometry type
    MultiPolygon,
    /// GeometryCollection geometry type
    GeometryCollection,
    /// A type name written by another producer.
    Other(String),
}

impl GeometryType {
    /// The type a geometry is written as.
    ///
    /// `Line` is written as a `LineString`, `Rect` and `Triangle` as a `Polygon`.
    pub fn of(geom: &geo::Geometry) -> Self {
        use geo::Geometry::*;
        match geom {
            Point(_) => Self::Point,
            Line(_) | LineString(_) => Self::LineString,
            Polygon(_) | Rect(_) | Triangle(_) => Self::Polygon,
            MultiPoint(_) => Self::MultiPoint,
            MultiLineString(_) => Self::MultiLineString,
            MultiPolygon(_) => Self::MultiPolygon,
            GeometryCollection(_) => Self::GeometryCollection,
        }
    }

    fn as_str(&self) -> &str {
        match self {
            Self::Point => "Point",
            Self::LineString => "LineString",
            Self::Polygon => "Polygon",
            Self::MultiPoint => "MultiPoint",
            Self::MultiLineString => "MultiLineString",
            Self::MultiPolygon => "MultiPolygon",
            Self::GeometryCollection => "GeometryCollection",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for GeometryType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "Point" => Self::Point,
            "LineString" => Self::LineString,
            "Polygon" => Self::Polygon,
            "MultiPoint" => Self::MultiPoint,
            "MultiLineString" => Self::MultiLineString,
            "MultiPolygon" => Self::MultiPolygon,
            "GeometryCollection" => Self::GeometryCollection,
            _ => Self::Other(name),
        }
    }
}

impl From<GeometryType> for String {
    fn from(geometry_type: GeometryType) -> Self {
        match geometry_type {
            GeometryType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for GeometryType {
    type Err = GeoParquetError;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(GeoParquetError::Metadata(
                "Empty value for geometry_type".to_string(),
            ));
        }
        Ok(Self::from(s.to_string()))
    }
}

impl Display for GeometryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata about a single geometry column.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GeometryFieldMetadata {
    /// Name of the geometry column in the file schema.
    pub field_name: String,

    /// Serialization of the geometry values. Only WKB is supported.
    pub geometry_format: GeometryFormat,

    /// Distinct geometry types found in the column, in order of first appearance.
    #[serde(default)]
    pub geometry_types: Vec<GeometryType>,

    /// The coordinate reference system descriptor, stored verbatim.
    #[serde(default)]
    pub crs: Option<String>,

    /// The format of `crs`. Detected from the descriptor when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crs_format: Option<CrsFormat>,

    /// Total bounds of the column as `[minx, miny, maxx, maxy]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,
}

impl GeometryFieldMetadata {
    /// The coordinate reference system of this column, if one was recorded.
    pub fn crs(&self) -> Option<Crs> {
        self.crs
            .as_deref()
            .filter(|crs| !crs.trim().is_empty())
            .map(|crs| Crs::from_stored(crs.to_string(), self.crs_format.clone()))
    }
}

/// All geometry metadata of a file.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct GeoParquetMetadata {
    /// One entry per geometry column.
    pub fields: Vec<GeometryFieldMetadata>,
}

impl GeoParquetMetadata {
    /// Look for geometry metadata in the [FileMetaData] of a Parquet file.
    ///
    /// Returns `None` if the [`GEOMETRY_FIELDS_KEY`] entry is absent.
    pub fn from_parquet_meta(metadata: &FileMetaData) -> Option<Result<Self>> {
        metadata
            .key_value_metadata()
            .and_then(|kv_metadata| Self::from_key_value_metadata(kv_metadata))
    }

    pub(crate) fn from_key_value_metadata(kv_metadata: &[KeyValue]) -> Option<Result<Self>> {
        for kv in kv_metadata {
            if kv.key == GEOMETRY_FIELDS_KEY {
                return kv.value.as_ref().map(|value| {
                    serde_json::from_str(value)
                        .map_err(|err| GeoParquetError::Metadata(err.to_string()))
                });
            }
        }

        None
    }

    /// The geometry column read back into a data frame.
    ///
    /// Only one geometry column is supported; this is the first listed one.
    pub fn primary_field(&self) -> Result<&GeometryFieldMetadata> {
        self.fields.first().ok_or(GeoParquetError::MissingCrs)
    }

    /// The single coordinate reference system applying to every geometry column.
    pub fn crs(&self) -> Result<Crs> {
        let crs = self.primary_field()?.crs().ok_or(GeoParquetError::MissingCrs)?;
        for field in self.fields.iter().skip(1) {
            if field.crs.as_deref() != Some(crs.as_str()) {
                return Err(GeoParquetError::Metadata(format!(
                    "Geometry column {} has a different CRS than {}",
                    field.field_name,
                    self.fields[0].field_name
                )));
            }
        }
        Ok(crs)
    }

    /// Serialize to the Parquet key/value entry.
    pub fn to_key_value(&self) -> Result<KeyValue> {
        Ok(KeyValue::new(
            GEOMETRY_FIELDS_KEY.to_string(),
            serde_json::to_string(self)?,
        ))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn field_json(crs: &str) -> String {
        format!(
            r#"{{"field_name": "geometry", "geometry_format": "wkb", "geometry_types": ["Point"], "crs": {crs}}}"#
        )
    }

    #[test]
    fn parse_minimal_entry() {
        let meta: GeoParquetMetadata =
            serde_json::from_str(&format!("[{}]", field_json(r#""+proj=longlat""#))).unwrap();
        let field = meta.primary_field().unwrap();
        assert_eq!(field.field_name, "geometry");
        assert_eq!(field.geometry_format, GeometryFormat::WKB);
        assert_eq!(field.geometry_types, vec![GeometryType::Point]);
        assert!(field.bbox.is_none());

        let crs = meta.crs().unwrap();
        assert_eq!(crs.as_str(), "+proj=longlat");
        assert_eq!(crs.format(), &CrsFormat::Proj);
    }

    // Keys written by newer producers are ignored.
    #[test]
    fn extra_keys_in_field_metadata() {
        let s = r#"[{
            "field_name": "geom",
            "geometry_format": "wkb",
            "crs": "EPSG:2154",
            "crs_format": "AUTHORITY_CODE",
            "other_key": true
        }]"#;
        let meta: GeoParquetMetadata = serde_json::from_str(s).unwrap();
        assert_eq!(meta.fields[0].field_name, "geom");
        assert!(meta.fields[0].geometry_types.is_empty());
        assert_eq!(meta.crs().unwrap().format(), &CrsFormat::AuthorityCode);
    }

    #[test]
    fn foreign_geometry_type_names_are_kept() {
        let s = r#"[{
            "field_name": "geometry",
            "geometry_format": "wkb",
            "geometry_types": ["LinearRing", "Point"],
            "crs": "EPSG:2154"
        }]"#;
        let meta: GeoParquetMetadata = serde_json::from_str(s).unwrap();
        assert_eq!(
            meta.fields[0].geometry_types,
            vec![
                GeometryType::Other("LinearRing".to_string()),
                GeometryType::Point
            ]
        );

        let kv = meta.to_key_value().unwrap();
        assert!(kv
            .value
            .as_deref()
            .unwrap()
            .contains(r#""geometry_types":["LinearRing","Point"]"#));
    }

    #[test]
    fn unsupported_geometry_format() {
        let s = r#"[{"field_name": "geom", "geometry_format": "wkt", "crs": "EPSG:2154"}]"#;
        assert!(serde_json::from_str::<GeoParquetMetadata>(s).is_err());
    }

    #[test]
    fn missing_or_null_crs() {
        let meta: GeoParquetMetadata =
            serde_json::from_str(&format!("[{}]", field_json("null"))).unwrap();
        assert!(matches!(meta.crs(), Err(GeoParquetError::MissingCrs)));

        let meta: GeoParquetMetadata =
            serde_json::from_str(&format!("[{}]", field_json(r#""""#))).unwrap();
        assert!(matches!(meta.crs(), Err(GeoParquetError::MissingCrs)));

        let meta: GeoParquetMetadata = serde_json::from_str("[]").unwrap();
        assert!(matches!(meta.crs(), Err(GeoParquetError::MissingCrs)));
    }

    #[test]
    fn conflicting_crs_between_fields() {
        let s = format!(
            "[{}, {}]",
            field_json(r#""EPSG:2154""#),
            field_json(r#""EPSG:3035""#)
        );
        let meta: GeoParquetMetadata = serde_json::from_str(&s).unwrap();
        assert!(matches!(meta.crs(), Err(GeoParquetError::Metadata(_))));
    }

    #[test]
    fn key_value_round_trip() {
        let meta = GeoParquetMetadata {
            fields: vec![GeometryFieldMetadata {
                field_name: "geometry".to_string(),
                geometry_format: GeometryFormat::WKB,
                geometry_types: vec![GeometryType::Polygon, GeometryType::MultiPolygon],
                crs: Some("EPSG:2154".to_string()),
                crs_format: Some(CrsFormat::AuthorityCode),
                bbox: Some(vec![0., 1., 2., 3.]),
            }],
        };
        let kv = meta.to_key_value().unwrap();
        assert_eq!(kv.key, GEOMETRY_FIELDS_KEY);
        assert!(kv.value.as_deref().unwrap().starts_with('['));

        let parsed = GeoParquetMetadata::from_key_value_metadata(&[kv])
            .unwrap()
            .unwrap();
        assert_eq!(parsed, meta);
    }

    #[test]
    fn malformed_json() {
        let kv = KeyValue::new(GEOMETRY_FIELDS_KEY.to_string(), "{not json".to_string());
        assert!(matches!(
            GeoParquetMetadata::from_key_value_metadata(&[kv]),
            Some(Err(GeoParquetError::Metadata(_)))
        ));
        assert!(GeoParquetMetadata::from_key_value_metadata(&[]).is_none());
    }

    #[test]
    fn geometry_type_names() {
        assert_eq!(GeometryType::MultiPolygon.to_string(), "MultiPolygon");
        assert_eq!(
            "GeometryCollection".parse::<GeometryType>().unwrap(),
            GeometryType::GeometryCollection
        );
        assert_eq!(
            "LinearRing".parse::<GeometryType>().unwrap(),
            GeometryType::Other("LinearRing".to_string())
        );
        assert!("".parse::<GeometryType>().is_err());
        assert_eq!(
            serde_json::to_string(&GeometryType::LineString).unwrap(),
            r#""LineString""#
        );
    }
}
