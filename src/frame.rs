//! The in-memory tabular container: attribute columns plus one geometry column.

use std::sync::Arc;

use arrow_array::{ArrayRef, RecordBatch, RecordBatchOptions};
use arrow_schema::Schema;
use geo::Geometry;
use indexmap::IndexSet;

use crate::crs::Crs;
use crate::error::{GeoParquetError, Result};
use crate::metadata::GeometryType;
use crate::total_bounds::{total_bounds, BoundingRect};

/// A named column of geometries sharing one coordinate reference system.
///
/// Cells may be null while the series is being built, but a series containing nulls cannot be
/// written.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoSeries {
    name: String,
    geometries: Vec<Option<Geometry>>,
    crs: Option<Crs>,
}

impl GeoSeries {
    /// Create a new series from nullable geometries, without a CRS.
    pub fn new(name: impl Into<String>, geometries: Vec<Option<Geometry>>) -> Self {
        Self {
            name: name.into(),
            geometries,
            crs: None,
        }
    }

    /// Create a new series where every cell is valid.
    pub fn from_geometries(
        name: impl Into<String>,
        geometries: impl IntoIterator<Item = Geometry>,
    ) -> Self {
        Self::new(name, geometries.into_iter().map(Some).collect())
    }

    /// Attach a coordinate reference system.
    pub fn with_crs(self, crs: Crs) -> Self {
        Self {
            crs: Some(crs),
            ..self
        }
    }

    /// Column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The coordinate reference system, if one is attached.
    pub fn crs(&self) -> Option<&Crs> {
        self.crs.as_ref()
    }

    /// Replace or clear the coordinate reference system.
    pub fn set_crs(&mut self, crs: Option<Crs>) {
        self.crs = crs;
    }

    /// All cells in row order.
    pub fn geometries(&self) -> &[Option<Geometry>] {
        &self.geometries
    }

    /// The geometry at row `i`, or `None` if it is null or out of bounds.
    pub fn get(&self, i: usize) -> Option<&Geometry> {
        self.geometries.get(i).and_then(|g| g.as_ref())
    }

    /// Iterate over cells in row order.
    pub fn iter(&self) -> impl Iterator<Item = Option<&Geometry>> + '_ {
        self.geometries.iter().map(|g| g.as_ref())
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.geometries.len()
    }

    /// Whether the series has no rows.
    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }

    /// Whether any cell is null.
    pub fn has_nulls(&self) -> bool {
        self.geometries.iter().any(Option::is_none)
    }

    /// Distinct geometry types, in order of first appearance. Null cells are skipped.
    pub fn geometry_types(&self) -> IndexSet<GeometryType> {
        self.geometries
            .iter()
            .flatten()
            .map(GeometryType::of)
            .collect()
    }

    /// 2D bounds of every non-null geometry.
    pub fn total_bounds(&self) -> BoundingRect {
        total_bounds(self.geometries.iter().flatten())
    }

    /// Decompose into name, cells and CRS.
    pub fn into_inner(self) -> (String, Vec<Option<Geometry>>, Option<Crs>) {
        (self.name, self.geometries, self.crs)
    }
}

/// An ordered set of named columns, exactly one of which holds geometries.
///
/// Attribute columns are kept as an Arrow [`RecordBatch`]; the geometry column sits at a fixed
/// position among them.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoDataFrame {
    attributes: RecordBatch,
    geometry: GeoSeries,
    geometry_index: usize,
}

impl GeoDataFrame {
    /// Create a new frame with the geometry column after all attribute columns.
    pub fn try_new(attributes: RecordBatch, geometry: GeoSeries) -> Result<Self> {
        let geometry_index = attributes.num_columns();
        Self::try_new_with_position(attributes, geometry, geometry_index)
    }

    /// Create a new frame with the geometry column at `geometry_index`.
    ///
    /// `geometry_index` counts attribute columns before the geometry column, so it must be at
    /// most `attributes.num_columns()`.
    pub fn try_new_with_position(
        attributes: RecordBatch,
        geometry: GeoSeries,
        geometry_index: usize,
    ) -> Result<Self> {
        if attributes.num_rows() != geometry.len() {
            return Err(GeoParquetError::InvalidFrame(format!(
                "{} attribute rows but {} geometries",
                attributes.num_rows(),
                geometry.len()
            )));
        }

        if attributes.schema().column_with_name(geometry.name()).is_some() {
            return Err(GeoParquetError::InvalidFrame(format!(
                "attribute column {} collides with the geometry column",
                geometry.name()
            )));
        }

        if geometry_index > attributes.num_columns() {
            return Err(GeoParquetError::InvalidFrame(format!(
                "geometry position {geometry_index} out of range for {} attribute columns",
                attributes.num_columns()
            )));
        }

        Ok(Self {
            attributes,
            geometry,
            geometry_index,
        })
    }

    /// Create a frame with no attribute columns.
    pub fn try_from_geometry(geometry: GeoSeries) -> Result<Self> {
        let options = RecordBatchOptions::new().with_row_count(Some(geometry.len()));
        let attributes =
            RecordBatch::try_new_with_options(Arc::new(Schema::empty()), vec![], &options)?;
        Self::try_new(attributes, geometry)
    }

    /// The non-geometry columns.
    pub fn attributes(&self) -> &RecordBatch {
        &self.attributes
    }

    /// The geometry column.
    pub fn geometry(&self) -> &GeoSeries {
        &self.geometry
    }

    /// Position of the geometry column among all columns.
    pub fn geometry_index(&self) -> usize {
        self.geometry_index
    }

    /// The coordinate reference system of the geometry column.
    pub fn crs(&self) -> Option<&Crs> {
        self.geometry.crs()
    }

    /// Replace or clear the coordinate reference system of the geometry column.
    pub fn set_crs(&mut self, crs: Option<Crs>) {
        self.geometry.set_crs(crs);
    }

    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        self.geometry.len()
    }

    /// Number of columns, including the geometry column.
    pub fn num_columns(&self) -> usize {
        self.attributes.num_columns() + 1
    }

    /// Column names in order, including the geometry column.
    pub fn column_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .attributes
            .schema_ref()
            .fields()
            .iter()
            .map(|field| field.name().as_str())
            .collect();
        names.insert(self.geometry_index, self.geometry.name());
        names
    }

    /// An attribute column by name.
    pub fn column_by_name(&self, name: &str) -> Option<&ArrayRef> {
        self.attributes.column_by_name(name)
    }

    /// Decompose into attributes, geometry column and its position.
    pub fn into_parts(self) -> (RecordBatch, GeoSeries, usize) {
        (self.attributes, self.geometry, self.geometry_index)
    }
}
