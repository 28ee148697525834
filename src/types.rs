//! Core value types shared by the document model and the point renderer.

use std::fmt;

use glam::DVec2;

// ============================================================================
// Data points
// ============================================================================

/// One datum as bound to a point element.
///
/// Mirrors the shape of a chart series value: an optional series id, an
/// optional id carried by the nested data record, the position within the
/// series and the plotted value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataPoint {
    /// Series id this value belongs to
    pub id: Option<String>,
    /// Id of the nested data record, used when the series id is absent
    pub data_id: Option<String>,
    pub index: usize,
    pub x: f64,
    pub value: Option<f64>,
}

impl DataPoint {
    pub fn new(id: impl Into<String>, index: usize, x: f64, value: f64) -> Self {
        Self {
            id: Some(id.into()),
            data_id: None,
            index,
            x,
            value: Some(value),
        }
    }

    /// A datum with no ids at all; its identity falls back to the raw value.
    pub fn raw(index: usize, x: f64, value: f64) -> Self {
        Self {
            id: None,
            data_id: None,
            index,
            x,
            value: Some(value),
        }
    }

    pub fn with_data_id(mut self, data_id: impl Into<String>) -> Self {
        self.data_id = Some(data_id.into());
        self
    }

    /// Identity used for pattern slots and synthetic definition ids.
    ///
    /// Explicit id first, then the nested data id, then the raw value.
    /// Empty strings count as absent.
    pub fn identity(&self) -> String {
        let non_empty = |s: &Option<String>| {
            s.as_deref()
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
        };

        non_empty(&self.id)
            .or_else(|| non_empty(&self.data_id))
            .unwrap_or_else(|| match self.value {
                Some(v) => format!("{v}"),
                None => format!("{}", self.x),
            })
    }
}

// ============================================================================
// Bounding boxes
// ============================================================================

/// Axis-aligned bounding box in user units.
///
/// A freshly created box is empty (min > max) and absorbs the first point
/// expanded into it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub min: DVec2,
    pub max: DVec2,
}

impl Default for BBox {
    fn default() -> Self {
        Self::new()
    }
}

impl BBox {
    pub fn new() -> Self {
        Self {
            min: DVec2::splat(f64::INFINITY),
            max: DVec2::splat(f64::NEG_INFINITY),
        }
    }

    pub fn from_rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            min: DVec2::new(x, y),
            max: DVec2::new(x + width, y + height),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    pub fn expand(&mut self, p: DVec2) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn union(mut self, other: BBox) -> BBox {
        if !other.is_empty() {
            self.expand(other.min);
            self.expand(other.max);
        }
        self
    }

    pub fn translate(self, offset: DVec2) -> BBox {
        if self.is_empty() {
            return self;
        }
        BBox {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Width of the box; zero when empty
    pub fn width(&self) -> f64 {
        if self.is_empty() { 0.0 } else { self.max.x - self.min.x }
    }

    /// Height of the box; zero when empty
    pub fn height(&self) -> f64 {
        if self.is_empty() { 0.0 } else { self.max.y - self.min.y }
    }

    pub fn center(&self) -> DVec2 {
        if self.is_empty() {
            DVec2::ZERO
        } else {
            (self.min + self.max) / 2.0
        }
    }
}

impl fmt::Display for BBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "BBox(empty)")
        } else {
            write!(
                f,
                "BBox({}, {}, {}x{})",
                self.min.x,
                self.min.y,
                self.width(),
                self.height()
            )
        }
    }
}
