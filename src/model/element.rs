//! Element - a named structural entity owning an ordered vertex list

use serde::{Deserialize, Serialize};

use super::kind::{ElementKind, GeometryKind};
use super::vertex::Vertex;

/// A structural element: identity, attributes, and its owned vertices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    /// Stable integer id, dense and unique within a model
    pub id: u64,
    /// Unique textual name
    pub name: String,
    pub kind: ElementKind,
    pub geometry_kind: GeometryKind,
    /// Ordered vertex list; may be empty
    pub vertices: Vec<Vertex>,
}

impl Element {
    pub fn new(id: u64, name: &str, kind: ElementKind, geometry_kind: GeometryKind) -> Self {
        Self {
            id,
            name: name.to_string(),
            kind,
            geometry_kind,
            vertices: Vec::new(),
        }
    }

    pub fn with_vertices(mut self, vertices: Vec<Vertex>) -> Self {
        self.vertices = vertices;
        self
    }

    /// Axis-aligned bounding range on X
    pub fn x_range(&self) -> Option<(f64, f64)> {
        range_of(self.vertices.iter().map(|v| v.x))
    }

    /// Axis-aligned bounding range on Y
    pub fn y_range(&self) -> Option<(f64, f64)> {
        range_of(self.vertices.iter().map(|v| v.y))
    }

    /// Distinct Z levels present in this element's vertices, merged within `z_tolerance`
    pub fn z_levels(&self, z_tolerance: f64) -> Vec<f64> {
        let mut zs: Vec<f64> = self.vertices.iter().map(|v| v.z).collect();
        zs.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let mut levels: Vec<f64> = Vec::new();
        for z in zs {
            match levels.last() {
                Some(&last) if (z - last).abs() <= z_tolerance => {}
                _ => levels.push(z),
            }
        }
        levels
    }

    /// Mean X/Y position of all vertices (used by compact elements)
    pub fn centroid_xy(&self) -> Option<(f64, f64)> {
        if self.vertices.is_empty() {
            return None;
        }
        let n = self.vertices.len() as f64;
        let (sx, sy) = self
            .vertices
            .iter()
            .fold((0.0, 0.0), |acc, v| (acc.0 + v.x, acc.1 + v.y));
        Some((sx / n, sy / n))
    }
}

fn range_of(mut it: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let first = it.next()?;
    let (mut lo, mut hi) = (first, first);
    for v in it {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    Some((lo, hi))
}
