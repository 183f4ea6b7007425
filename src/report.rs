//! The alignment report: axis counts, displacement percentiles, per-rule
//! edit counts, and the recoverable-condition warnings the pipeline
//! accumulates instead of aborting on.

use serde::{Deserialize, Serialize};

use crate::model::{AlignedVertex, AxisKind, AxisLine, ElementKind};
use crate::rules::RuleStats;
use crate::snap::SnapStats;
use crate::validator::ValidationWarnings;

/// Displacement percentiles over the aligned vertex stream (meters)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct DisplacementPercentiles {
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
    pub max: f64,
}

impl DisplacementPercentiles {
    fn from_displacements(mut values: Vec<f64>) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        values.sort_by(|a, b| a.partial_cmp(b).unwrap());
        Self {
            p50: percentile(&values, 0.50),
            p95: percentile(&values, 0.95),
            p99: percentile(&values, 0.99),
            max: *values.last().unwrap(),
        }
    }
}

fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = p * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = rank - lo as f64;
        sorted[lo] * (1.0 - frac) + sorted[hi] * frac
    }
}

/// Per-rule addition/removal counts, one field pair per object-transform rule
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct RuleReport {
    pub slab_removal_removed: usize,
    pub slab_consolidation_added: usize,
    pub wall_simplification_removed: usize,
    pub wall_simplification_added: usize,
    pub support_placement_added: usize,
    pub support_placement_removed: usize,
    pub centerline_emission_added: usize,
    pub grid_lines_added: usize,
}

impl From<RuleStats> for RuleReport {
    fn from(s: RuleStats) -> Self {
        Self {
            slab_removal_removed: s.slab_removal.removed,
            slab_consolidation_added: s.slab_consolidation.added,
            wall_simplification_removed: s.wall_simplification.removed,
            wall_simplification_added: s.wall_simplification.added,
            support_placement_added: s.support_placement.added,
            support_placement_removed: s.support_placement.removed,
            centerline_emission_added: s.centerline_emission.added,
            grid_lines_added: s.grid_lines.added,
        }
    }
}

/// The full report the Materializer persists alongside the output model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignmentReport {
    pub x_axis_count: usize,
    pub y_axis_count: usize,
    pub x_axis_fallback_count: usize,
    pub y_axis_fallback_count: usize,
    pub displacement: DisplacementPercentiles,
    pub rules: RuleReport,
    pub unaligned_vertex_count: usize,
    pub unaligned_vertices: Vec<(u64, usize)>,
    pub escalated_snap_count: usize,
    pub unreconstructable_footprint_count: usize,
    pub aligned_fraction: f64,
    pub low_alignment_warning: bool,
    /// Present only when a reference model was supplied
    pub reference_match_fraction: Option<f64>,
    /// Fraction of the reference model's X axis positions matched by a
    /// discovered line; `None` when no reference X positions were supplied
    pub x_axis_recall: Option<f64>,
    /// Fraction of the reference model's Y axis positions matched by a
    /// discovered line; `None` when no reference Y positions were supplied
    pub y_axis_recall: Option<f64>,
    /// Reference axis positions with no matching discovered line
    pub missing_reference_positions: Vec<(AxisKind, f64)>,
    /// Element kinds whose final count drifted more than 10% from the
    /// reference model's per-kind counts
    pub object_count_drift: Vec<(ElementKind, f64)>,
}

impl AlignmentReport {
    pub fn build(
        aligned: &[AlignedVertex],
        x_lines: &[AxisLine],
        y_lines: &[AxisLine],
        rule_stats: RuleStats,
        snap_stats: SnapStats,
        warnings: ValidationWarnings,
    ) -> Self {
        let displacements: Vec<f64> = aligned.iter().map(|v| v.displacement()).collect();
        let unaligned: Vec<(u64, usize)> = aligned
            .iter()
            .filter(|v| !v.has_any_axis())
            .map(|v| (v.element_id, v.vertex_index))
            .collect();

        let aligned_fraction = if aligned.is_empty() {
            1.0
        } else {
            (aligned.len() - unaligned.len()) as f64 / aligned.len() as f64
        };

        let unreconstructable_footprint_count = rule_stats.unreconstructable_footprints;

        Self {
            x_axis_count: x_lines.len(),
            y_axis_count: y_lines.len(),
            x_axis_fallback_count: x_lines.iter().filter(|l| l.fallback).count(),
            y_axis_fallback_count: y_lines.iter().filter(|l| l.fallback).count(),
            displacement: DisplacementPercentiles::from_displacements(displacements),
            rules: rule_stats.into(),
            unaligned_vertex_count: unaligned.len(),
            unaligned_vertices: unaligned,
            escalated_snap_count: snap_stats.escalated,
            unreconstructable_footprint_count,
            aligned_fraction,
            low_alignment_warning: warnings.low_alignment_fraction.is_some(),
            reference_match_fraction: warnings.reference_match_fraction,
            x_axis_recall: warnings.x_axis_recall,
            y_axis_recall: warnings.y_axis_recall,
            missing_reference_positions: warnings.missing_reference_positions,
            object_count_drift: warnings.object_count_drift,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn percentile_of_single_value_is_itself() {
        let p = DisplacementPercentiles::from_displacements(vec![0.3]);
        assert_eq!(p.p50, 0.3);
        assert_eq!(p.max, 0.3);
    }

    #[test]
    fn percentile_interpolates_between_ranks() {
        let values = vec![1.0, 2.0, 3.0, 4.0];
        let p = DisplacementPercentiles::from_displacements(values);
        assert_relative_eq!(p.p50, 2.5, epsilon = 1e-9);
        assert_eq!(p.max, 4.0);
    }

    #[test]
    fn build_carries_reference_warnings_into_the_report() {
        let mut warnings = ValidationWarnings::default();
        warnings.x_axis_recall = Some(0.75);
        warnings.y_axis_recall = Some(1.0);
        warnings.missing_reference_positions = vec![(AxisKind::X, 12.0)];
        warnings.object_count_drift = vec![(ElementKind::Column, 0.2)];

        let report = AlignmentReport::build(
            &[],
            &[],
            &[],
            RuleStats::default(),
            SnapStats::default(),
            warnings,
        );

        assert_eq!(report.x_axis_recall, Some(0.75));
        assert_eq!(report.y_axis_recall, Some(1.0));
        assert_eq!(report.missing_reference_positions, vec![(AxisKind::X, 12.0)]);
        assert_eq!(report.object_count_drift, vec![(ElementKind::Column, 0.2)]);
    }
}
