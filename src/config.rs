//! Tunable alignment parameters

use serde::{Deserialize, Serialize};

use crate::model::FloorLadder;

/// Every tunable named by the alignment engine, with the reference defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignmentConfig {
    /// Rounding precision applied before grouping and after snapping (meters)
    pub rounding_precision: f64,
    /// Radius within which candidate positions are coalesced (meters)
    pub cluster_radius: f64,
    /// Two Z values within this tolerance are considered the same floor (meters)
    pub z_tolerance: f64,
    /// Minimum distinct floor count for a position to become an axis line
    pub min_floors: usize,
    /// Primary snap tolerance (meters)
    pub max_snap_distance: f64,
    /// Outlier snap tolerance, tried only if the primary tolerance fails (meters)
    pub outlier_snap_distance: f64,
    /// Spatial gap used to split removed-slab footprints into separate clusters (meters)
    pub consolidation_gap: f64,
    /// Walls thinner than this, or with multi-face geometry, are simplified (meters)
    pub thin_wall_threshold: f64,
    /// Slabs with max(z) at or below this are removed, not kept as roof (meters)
    pub roof_z_threshold: f64,
    /// Distance within which a column centroid is considered "at" a grid intersection (meters)
    pub proximity_tolerance: f64,
    /// Radius within which duplicate support emissions are suppressed (meters)
    pub dedup_radius: f64,
    /// Z levels eligible for point support placement
    pub support_floor_zs: Vec<f64>,
    /// The fixed floor ladder (not discovered; configuration)
    pub floor_ladder: FloorLadder,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            rounding_precision: 0.005,
            cluster_radius: 0.002,
            z_tolerance: 0.020,
            min_floors: 3,
            max_snap_distance: 0.75,
            outlier_snap_distance: 4.0,
            consolidation_gap: 2.0,
            thin_wall_threshold: 0.05,
            roof_z_threshold: 30.0,
            proximity_tolerance: 0.5,
            dedup_radius: 0.1,
            support_floor_zs: vec![-4.44, 2.12],
            floor_ladder: FloorLadder::reference(),
        }
    }
}

impl AlignmentConfig {
    /// Reference-default configuration
    pub fn reference() -> Self {
        Self::default()
    }

    pub fn with_rounding_precision(mut self, v: f64) -> Self {
        self.rounding_precision = v;
        self
    }

    pub fn with_min_floors(mut self, v: usize) -> Self {
        self.min_floors = v;
        self
    }

    pub fn with_max_snap_distance(mut self, v: f64) -> Self {
        self.max_snap_distance = v;
        self
    }

    pub fn with_outlier_snap_distance(mut self, v: f64) -> Self {
        self.outlier_snap_distance = v;
        self
    }

    /// Relax `min_floors` by one, for the fallback pass in axis discovery
    pub fn relaxed_min_floors(&self) -> usize {
        self.min_floors.saturating_sub(1).max(1)
    }
}
