//! Coordinate reference system descriptors.
//!
//! A [`Crs`] is an opaque text descriptor together with a [`CrsFormat`] label. The canonical
//! format written by this crate is [WKT2_2018](https://www.ogc.org/standard/wkt-crs/); PROJ
//! strings and bare `AUTHORITY:CODE` identifiers are accepted and stored verbatim under their own
//! label. No reprojection or conversion between formats is performed, except for the handful of
//! authority codes with a built-in WKT2_2018 definition.

use std::fmt::Display;
use std::str::FromStr;

use phf::phf_map;
use serde::{Deserialize, Serialize};

use crate::error::{GeoParquetError, Result};

/// WKT2_2018 definitions of commonly used authority codes.
static WELL_KNOWN_CRS: phf::Map<&'static str, &'static str> = phf_map! {
    "EPSG:4326" => r#"GEOGCRS["WGS 84",DATUM["World Geodetic System 1984",ELLIPSOID["WGS 84",6378137,298.257223563,LENGTHUNIT["metre",1]]],PRIMEM["Greenwich",0,ANGLEUNIT["degree",0.0174532925199433]],CS[ellipsoidal,2],AXIS["geodetic latitude (Lat)",north,ORDER[1],ANGLEUNIT["degree",0.0174532925199433]],AXIS["geodetic longitude (Lon)",east,ORDER[2],ANGLEUNIT["degree",0.0174532925199433]],USAGE[SCOPE["unknown"],AREA["World"],BBOX[-90,-180,90,180]],ID["EPSG",4326]]"#,
    "OGC:CRS84" => r#"GEOGCRS["WGS 84 (CRS84)",DATUM["World Geodetic System 1984",ELLIPSOID["WGS 84",6378137,298.257223563,LENGTHUNIT["metre",1]]],PRIMEM["Greenwich",0,ANGLEUNIT["degree",0.0174532925199433]],CS[ellipsoidal,2],AXIS["geodetic longitude (Lon)",east,ORDER[1],ANGLEUNIT["degree",0.0174532925199433]],AXIS["geodetic latitude (Lat)",north,ORDER[2],ANGLEUNIT["degree",0.0174532925199433]],USAGE[SCOPE["unknown"],AREA["World"],BBOX[-90,-180,90,180]],ID["OGC","CRS84"]]"#,
    "EPSG:3857" => r#"PROJCRS["WGS 84 / Pseudo-Mercator",BASEGEOGCRS["WGS 84",DATUM["World Geodetic System 1984",ELLIPSOID["WGS 84",6378137,298.257223563,LENGTHUNIT["metre",1]]],PRIMEM["Greenwich",0,ANGLEUNIT["degree",0.0174532925199433]],ID["EPSG",4326]],CONVERSION["Popular Visualisation Pseudo-Mercator",METHOD["Popular Visualisation Pseudo Mercator",ID["EPSG",1024]],PARAMETER["Latitude of natural origin",0,ANGLEUNIT["degree",0.0174532925199433],ID["EPSG",8801]],PARAMETER["Longitude of natural origin",0,ANGLEUNIT["degree",0.0174532925199433],ID["EPSG",8802]],PARAMETER["False easting",0,LENGTHUNIT["metre",1],ID["EPSG",8806]],PARAMETER["False northing",0,LENGTHUNIT["metre",1],ID["EPSG",8807]]],CS[Cartesian,2],AXIS["easting (X)",east,ORDER[1],LENGTHUNIT["metre",1]],AXIS["northing (Y)",north,ORDER[2],LENGTHUNIT["metre",1]],USAGE[SCOPE["Web mapping and visualisation."],AREA["World between 85.06°S and 85.06°N."],BBOX[-85.06,-180,85.06,180]],ID["EPSG",3857]]"#,
};

/// Leading keywords of WKT2 coordinate reference system definitions.
const WKT2_KEYWORDS: [&str; 12] = [
    "BOUNDCRS",
    "COMPOUNDCRS",
    "DERIVEDPROJCRS",
    "ENGCRS",
    "ENGINEERINGCRS",
    "GEODCRS",
    "GEODETICCRS",
    "GEOGCRS",
    "GEOGRAPHICCRS",
    "PROJCRS",
    "PROJECTEDCRS",
    "VERTCRS",
];

/// Leading keywords of legacy WKT1 definitions.
const WKT1_KEYWORDS: [&str; 6] = [
    "COMPD_CS", "GEOCCS", "GEOGCS", "LOCAL_CS", "PROJCS", "VERT_CS",
];

/// The text encoding of a [`Crs`] descriptor.
///
/// Serialized as the `crs_format` key of the geometry metadata. Labels written by other
/// producers are kept as [`CrsFormat::Other`] and written back unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum CrsFormat {
    /// [WKT2_2018](https://www.ogc.org/standard/wkt-crs/). The canonical format.
    Wkt2_2018,

    /// Legacy OGC WKT1.
    Wkt1,

    /// A [PROJ string](https://proj.org/usage/projections.html), e.g. `+proj=longlat +datum=WGS84`.
    Proj,

    /// An identifier in the form `AUTHORITY:CODE`, e.g. `EPSG:2154`.
    AuthorityCode,

    /// No label was recorded and the descriptor matches none of the known syntaxes.
    Unknown,

    /// A label written by another producer, e.g. `projjson`.
    Other(String),
}

impl CrsFormat {
    /// Classify a descriptor string by its syntax.
    ///
    /// Returns `None` when the string matches none of the known formats.
    pub fn detect(value: &str) -> Option<Self> {
        let value = value.trim();

        // WKT1 may embed a PROJ string in an EXTENSION node, so check WKT first.
        if let Some((keyword, _)) = value.split_once('[') {
            let keyword = keyword.trim().to_ascii_uppercase();
            if WKT2_KEYWORDS.contains(&keyword.as_str()) {
                return Some(Self::Wkt2_2018);
            }
            if WKT1_KEYWORDS.contains(&keyword.as_str()) {
                return Some(Self::Wkt1);
            }
        }

        if value.starts_with('+') || value.contains("+proj=") {
            return Some(Self::Proj);
        }

        if is_authority_code(value) {
            return Some(Self::AuthorityCode);
        }

        None
    }

    /// The label written to `crs_format`.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Wkt2_2018 => "WKT2_2018",
            Self::Wkt1 => "WKT1",
            Self::Proj => "PROJ",
            Self::AuthorityCode => "AUTHORITY_CODE",
            Self::Unknown => "unknown",
            Self::Other(label) => label,
        }
    }
}

impl From<String> for CrsFormat {
    fn from(label: String) -> Self {
        match label.as_str() {
            "WKT2_2018" => Self::Wkt2_2018,
            "WKT1" => Self::Wkt1,
            "PROJ" => Self::Proj,
            "AUTHORITY_CODE" => Self::AuthorityCode,
            "unknown" => Self::Unknown,
            _ => Self::Other(label),
        }
    }
}

impl From<CrsFormat> for String {
    fn from(format: CrsFormat) -> Self {
        match format {
            CrsFormat::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

impl Display for CrsFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_authority_code(value: &str) -> bool {
    let Some((authority, code)) = value.split_once(':') else {
        return false;
    };
    let valid_char = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.');
    !authority.is_empty()
        && !code.is_empty()
        && authority.starts_with(|c: char| c.is_ascii_alphabetic())
        && authority.chars().all(valid_char)
        && code.chars().all(valid_char)
}

/// A coordinate reference system descriptor applying to every geometry in a column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Crs {
    value: String,
    format: CrsFormat,
}

impl Crs {
    /// Construct from a WKT2_2018 string.
    pub fn from_wkt2_2018(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            format: CrsFormat::Wkt2_2018,
        }
    }

    /// Construct from a PROJ string.
    pub fn from_proj(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            format: CrsFormat::Proj,
        }
    }

    /// Construct from an `AUTHORITY:CODE` identifier, stored as-is.
    ///
    /// Use [`Crs::from_user_input`] to expand well-known codes to their WKT2_2018 definition.
    pub fn from_authority_code(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if !is_authority_code(&value) {
            return Err(GeoParquetError::InvalidCrs(format!(
                "expected AUTHORITY:CODE, got {value:?}"
            )));
        }
        Ok(Self {
            value,
            format: CrsFormat::AuthorityCode,
        })
    }

    /// Interpret any supported descriptor.
    ///
    /// WKT and PROJ strings are kept verbatim. Authority codes listed in the built-in table
    /// (`EPSG:4326`, `OGC:CRS84`, `EPSG:3857`) are replaced by their WKT2_2018 definition; other
    /// codes are kept as [`CrsFormat::AuthorityCode`]. An empty string means no CRS at all.
    pub fn from_user_input(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(GeoParquetError::MissingCrs);
        }

        match CrsFormat::detect(trimmed) {
            Some(CrsFormat::AuthorityCode) => {
                if let Some(wkt) = WELL_KNOWN_CRS.get(trimmed.to_ascii_uppercase().as_str()) {
                    Ok(Self::from_wkt2_2018(*wkt))
                } else {
                    Self::from_authority_code(trimmed)
                }
            }
            Some(format) => Ok(Self {
                value: trimmed.to_string(),
                format,
            }),
            None => Err(GeoParquetError::InvalidCrs(trimmed.to_string())),
        }
    }

    /// Rebuild a descriptor read back from file metadata without reinterpreting it.
    ///
    /// When the producer did not record a format, it is detected from the string.
    pub(crate) fn from_stored(value: String, format: Option<CrsFormat>) -> Self {
        let format = format
            .or_else(|| CrsFormat::detect(&value))
            .unwrap_or(CrsFormat::Unknown);
        Self { value, format }
    }

    /// The descriptor text.
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// The format of the descriptor text.
    pub fn format(&self) -> &CrsFormat {
        &self.format
    }

    /// Whether the descriptor is in the canonical WKT2_2018 format.
    pub fn is_canonical(&self) -> bool {
        self.format == CrsFormat::Wkt2_2018
    }

    /// Consume self, returning the descriptor text.
    pub fn into_inner(self) -> String {
        self.value
    }
}

impl FromStr for Crs {
    type Err = GeoParquetError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_user_input(s)
    }
}

impl Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}
