//! Read and write geospatial tables as [GeoParquet](https://github.com/opengeospatial/geoparquet).
//!
//! A [`GeoDataFrame`] is a set of attribute columns plus one geometry column. Writing stores the
//! geometries as WKB in a Parquet binary column and records the coordinate reference system,
//! geometry types and bounding box as JSON under the `geometry_fields` key of the file-level
//! key/value metadata. Reading reverses this.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use arrow_array::{RecordBatch, StringArray};
//! use arrow_schema::{DataType, Field, Schema};
//! use geo::{point, Geometry};
//! use geoparquet::{read_geoparquet_path, to_geoparquet, Crs, GeoDataFrame, GeoSeries};
//!
//! let schema = Schema::new(vec![Field::new("name", DataType::Utf8, true)]);
//! let names = StringArray::from(vec!["a", "b"]);
//! let attributes = RecordBatch::try_new(Arc::new(schema), vec![Arc::new(names)]).unwrap();
//!
//! let geometry = GeoSeries::from_geometries(
//!     "geometry",
//!     [point!(x: 1., y: 2.).into(), point!(x: 3., y: 4.).into()],
//! )
//! .with_crs(Crs::from_user_input("EPSG:4326").unwrap());
//! let frame = GeoDataFrame::try_new(attributes, geometry).unwrap();
//!
//! let dir = tempfile::tempdir().unwrap();
//! let path = dir.path().join("points.parquet");
//! to_geoparquet(&frame, &path, &Default::default()).unwrap();
//!
//! let read = read_geoparquet_path(&path, Default::default()).unwrap();
//! assert_eq!(read.geometry().get(1), Some(&Geometry::Point(point!(x: 3., y: 4.))));
//! assert_eq!(read.crs(), frame.crs());
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![cfg_attr(not(test), deny(unused_crate_dependencies))]
#![warn(missing_docs)]

pub mod crs;
pub mod error;
mod frame;
pub mod metadata;
mod reader;
mod total_bounds;
pub mod wkb;
mod writer;

pub use crs::{Crs, CrsFormat};
pub use error::{GeoParquetError, Result};
pub use frame::{GeoDataFrame, GeoSeries};
pub use metadata::GeoParquetMetadata;
pub use reader::{
    read_geoparquet, read_geoparquet_metadata, read_geoparquet_path, GeoParquetReaderOptions,
};
pub use total_bounds::BoundingRect;
pub use writer::{to_geoparquet, write_geoparquet, GeoParquetWriterOptions};
