//! Canonical axis lines discovered from the vertex cloud

use serde::{Deserialize, Serialize};

use super::kind::AxisKind;

/// A canonical X or Y coordinate that vertices are snapped onto
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AxisLine {
    /// Stable id, unique within an axis
    pub id: u64,
    pub axis: AxisKind,
    /// Canonical coordinate (meters)
    pub position: f64,
    /// Number of distinct Z levels witnessed at this position
    pub floor_count: usize,
    /// Total vertices supporting this axis line
    pub vertex_count: usize,
    /// Set when this line only cleared the relaxed `min_floors - 1` threshold
    pub fallback: bool,
}

impl AxisLine {
    pub fn new(
        id: u64,
        axis: AxisKind,
        position: f64,
        floor_count: usize,
        vertex_count: usize,
        fallback: bool,
    ) -> Self {
        Self {
            id,
            axis,
            position,
            floor_count,
            vertex_count,
            fallback,
        }
    }

    /// Distance from this axis line to a candidate position
    pub fn distance(&self, p: f64) -> f64 {
        (self.position - p).abs()
    }
}
