use geo::{BoundingRect as _, Geometry};

/// Running 2D bounds of a geometry column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingRect {
    minx: f64,
    miny: f64,
    maxx: f64,
    maxy: f64,
}

impl BoundingRect {
    /// New
    pub fn new() -> Self {
        BoundingRect {
            minx: f64::INFINITY,
            miny: f64::INFINITY,
            maxx: -f64::INFINITY,
            maxy: -f64::INFINITY,
        }
    }

    /// Minimum x, or `+inf` when empty.
    pub fn minx(&self) -> f64 {
        self.minx
    }

    /// Minimum y.
    pub fn miny(&self) -> f64 {
        self.miny
    }

    /// Maximum x.
    pub fn maxx(&self) -> f64 {
        self.maxx
    }

    /// Maximum y.
    pub fn maxy(&self) -> f64 {
        self.maxy
    }

    /// Whether no coordinate has been added yet.
    pub fn is_empty(&self) -> bool {
        self.minx > self.maxx || self.miny > self.maxy
    }

    /// Grow to cover `geom`.
    pub fn add_geometry(&mut self, geom: &Geometry) {
        // Empty collections have no bounds.
        if let Some(rect) = geom.bounding_rect() {
            self.minx = self.minx.min(rect.min().x);
            self.miny = self.miny.min(rect.min().y);
            self.maxx = self.maxx.max(rect.max().x);
            self.maxy = self.maxy.max(rect.max().y);
        }
    }

    /// Grow to cover `other`.
    pub fn update(&mut self, other: &BoundingRect) {
        self.minx = self.minx.min(other.minx);
        self.miny = self.miny.min(other.miny);
        self.maxx = self.maxx.max(other.maxx);
        self.maxy = self.maxy.max(other.maxy);
    }

    /// `[minx, miny, maxx, maxy]`, or `None` if empty.
    pub fn to_vec(&self) -> Option<Vec<f64>> {
        if self.is_empty() {
            None
        } else {
            Some(vec![self.minx, self.miny, self.maxx, self.maxy])
        }
    }
}

impl Default for BoundingRect {
    fn default() -> Self {
        Self::new()
    }
}

/// Total bounds of all non-null geometries.
pub(crate) fn total_bounds<'a>(geoms: impl IntoIterator<Item = &'a Geometry>) -> BoundingRect {
    let mut bounds = BoundingRect::new();
    for geom in geoms {
        bounds.add_geometry(geom);
    }
    bounds
}
