//! Axis discovery: select canonical X/Y axis-line positions from the raw
//! vertex cloud by multi-floor presence rather than density clustering.

use std::collections::BTreeMap;

use log::{debug, info};

use crate::config::AlignmentConfig;
use crate::error::{AlignError, AlignResult};
use crate::model::{AxisKind, AxisLine, Vertex};

/// A coalesced candidate position before the `min_floors` filter is applied
#[derive(Debug, Clone)]
struct Candidate {
    position: f64,
    z_levels: Vec<f64>,
    vertex_count: usize,
}

impl Candidate {
    fn floor_count(&self) -> usize {
        self.z_levels.len()
    }
}

/// Run axis discovery for one axis, returning AxisLines sorted ascending by position
pub fn discover_axis(
    vertices: &[Vertex],
    axis: AxisKind,
    config: &AlignmentConfig,
    reference_positions: Option<&[f64]>,
) -> AlignResult<Vec<AxisLine>> {
    if vertices.is_empty() {
        return Ok(Vec::new());
    }

    let candidates = build_candidates(vertices, axis, config);

    let mut selected = select(&candidates, config.min_floors, false, &[]);
    if selected.is_empty() {
        debug!(
            "axis {}: no candidate reached min_floors={}, retrying with min_floors=2",
            axis, config.min_floors
        );
        selected = select(&candidates, 2, true, &[]);
        if selected.is_empty() {
            return Err(AlignError::NoAxesFound(axis.label()));
        }
    }

    if let Some(refs) = reference_positions {
        let relaxed = config.relaxed_min_floors();
        let already: Vec<f64> = selected.iter().map(|(c, _)| c.position).collect();
        let extra = select(&candidates, relaxed, true, &already)
            .into_iter()
            .filter(|(c, _)| {
                refs.iter()
                    .any(|&r| (r - c.position).abs() <= config.rounding_precision)
            });
        selected.extend(extra);
    }

    // Deterministic id assignment: rank by (-floor_count, -vertex_count, position),
    // then emit ascending by position as the contract requires.
    let mut ranked = selected;
    ranked.sort_by(|a, b| {
        b.0.floor_count()
            .cmp(&a.0.floor_count())
            .then(b.0.vertex_count.cmp(&a.0.vertex_count))
            .then(a.0.position.partial_cmp(&b.0.position).unwrap())
    });

    let mut lines: Vec<AxisLine> = ranked
        .into_iter()
        .enumerate()
        .map(|(i, (c, fallback))| {
            AxisLine::new(i as u64, axis, c.position, c.floor_count(), c.vertex_count, fallback)
        })
        .collect();
    lines.sort_by(|a, b| a.position.partial_cmp(&b.position).unwrap());

    info!(
        "axis {}: discovered {} axis lines ({} fallback)",
        axis,
        lines.len(),
        lines.iter().filter(|l| l.fallback).count()
    );

    Ok(lines)
}

/// Fraction of `reference_positions` matched by some line in `lines` within
/// `tolerance`, plus the reference positions that weren't. Used to compute
/// per-axis recall against a supplied reference model.
pub fn recall_against(lines: &[AxisLine], reference_positions: &[f64], tolerance: f64) -> (f64, Vec<f64>) {
    if reference_positions.is_empty() {
        return (1.0, Vec::new());
    }
    let mut missing = Vec::new();
    let mut matched = 0usize;
    for &r in reference_positions {
        if lines.iter().any(|l| (l.position - r).abs() <= tolerance) {
            matched += 1;
        } else {
            missing.push(r);
        }
    }
    (matched as f64 / reference_positions.len() as f64, missing)
}

fn select(
    candidates: &[Candidate],
    min_floors: usize,
    fallback: bool,
    exclude_positions: &[f64],
) -> Vec<(Candidate, bool)> {
    candidates
        .iter()
        .filter(|c| c.floor_count() >= min_floors)
        .filter(|c| !exclude_positions.iter().any(|&p| (p - c.position).abs() < 1e-9))
        .map(|c| (c.clone(), fallback))
        .collect()
}

fn build_candidates(vertices: &[Vertex], axis: AxisKind, config: &AlignmentConfig) -> Vec<Candidate> {
    // Step 1+2: round to `rounding_precision`, group by rounded bucket, recording
    // the unrounded coordinate and Z for each member.
    let mut buckets: BTreeMap<i64, Vec<(f64, f64)>> = BTreeMap::new();
    for v in vertices {
        let coord = match axis {
            AxisKind::X => v.x,
            AxisKind::Y => v.y,
        };
        let key = (coord / config.rounding_precision).round() as i64;
        buckets.entry(key).or_default().push((coord, v.z));
    }

    let mut ordered: Vec<(f64, Vec<(f64, f64)>)> = buckets
        .into_iter()
        .map(|(key, members)| (key as f64 * config.rounding_precision, members))
        .collect();
    ordered.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());

    // Step 3: coalesce adjacent buckets within `cluster_radius`.
    let mut clusters: Vec<Vec<(f64, f64)>> = Vec::new();
    for (bucket_pos, members) in ordered {
        match clusters.last_mut() {
            Some(last) if (bucket_pos - weighted_mean(last)).abs() <= config.cluster_radius => {
                last.extend(members);
            }
            _ => clusters.push(members),
        }
    }

    clusters
        .into_iter()
        .map(|members| {
            let position = weighted_mean(&members);
            let z_levels = merge_z_levels(members.iter().map(|(_, z)| *z), config.z_tolerance);
            Candidate {
                position,
                z_levels,
                vertex_count: members.len(),
            }
        })
        .collect()
}

fn weighted_mean(members: &[(f64, f64)]) -> f64 {
    let sum: f64 = members.iter().map(|(x, _)| x).sum();
    sum / members.len() as f64
}

/// Merge Z values into a sorted list of distinct levels, treating two Zs as
/// equal when within `tolerance`.
fn merge_z_levels(zs: impl Iterator<Item = f64>, tolerance: f64) -> Vec<f64> {
    let mut values: Vec<f64> = zs.collect();
    values.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let mut levels: Vec<f64> = Vec::new();
    for z in values {
        match levels.last() {
            Some(&last) if (z - last).abs() <= tolerance => {}
            _ => levels.push(z),
        }
    }
    levels
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vx(id: u64, idx: usize, x: f64, z: f64) -> Vertex {
        Vertex::new(id, idx, x, 0.0, z)
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let cfg = AlignmentConfig::default();
        let lines = discover_axis(&[], AxisKind::X, &cfg, None).unwrap();
        assert!(lines.is_empty());
    }

    #[test]
    fn position_witnessed_on_enough_floors_becomes_axis_line() {
        let cfg = AlignmentConfig::default();
        let verts = vec![
            vx(1, 0, -39.700, -4.44),
            vx(2, 0, -39.701, -1.56),
            vx(3, 0, -39.699, 2.12),
            vx(4, 0, -39.702, 5.48),
        ];
        let lines = discover_axis(&verts, AxisKind::X, &cfg, None).unwrap();
        assert_eq!(lines.len(), 1);
        assert!((lines[0].position - (-39.7005)).abs() < 0.01);
        assert_eq!(lines[0].floor_count, 4);
        assert!(!lines[0].fallback);
    }

    #[test]
    fn sole_candidate_below_min_floors_is_rescued_by_global_fallback() {
        let cfg = AlignmentConfig::default();
        let verts = vec![vx(1, 0, 10.0, -4.44), vx(2, 0, 10.0, -1.56)];
        // No candidate clears min_floors=3, so the global fallback
        // retries at min_floors=2.
        let lines = discover_axis(&verts, AxisKind::X, &cfg, None).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].floor_count, 2);
        assert!(lines[0].fallback);
    }

    #[test]
    fn truly_empty_result_raises_no_axes_found() {
        let cfg = AlignmentConfig::default();
        let verts = vec![vx(1, 0, 10.0, -4.44)];
        let err = discover_axis(&verts, AxisKind::X, &cfg, None).unwrap_err();
        assert!(matches!(err, AlignError::NoAxesFound(_)));
    }

    #[test]
    fn output_sorted_ascending_by_position() {
        let cfg = AlignmentConfig::default();
        let mut verts = Vec::new();
        for (base, z_offset) in [(-10.0, 0), (5.0, 0), (0.0, 0)] {
            for i in 0..3 {
                verts.push(vx(1, 0, base, -4.44 + (i + z_offset) as f64 * 3.0));
            }
        }
        let lines = discover_axis(&verts, AxisKind::X, &cfg, None).unwrap();
        for w in lines.windows(2) {
            assert!(w[0].position < w[1].position);
        }
    }

    #[test]
    fn recall_against_flags_unmatched_reference_positions() {
        let lines = vec![AxisLine::new(0, AxisKind::X, -39.700, 4, 4, false)];
        let (recall, missing) = recall_against(&lines, &[-39.700, 10.0], 0.005);
        assert!((recall - 0.5).abs() < 1e-12);
        assert_eq!(missing, vec![10.0]);
    }

    #[test]
    fn distinct_axes_75mm_apart_are_not_fused() {
        let cfg = AlignmentConfig::default();
        let mut verts = Vec::new();
        for i in 0..3 {
            let z = -4.44 + i as f64 * 3.0;
            verts.push(vx(1, 0, 0.000, z));
            verts.push(vx(2, 0, 0.075, z));
        }
        let lines = discover_axis(&verts, AxisKind::X, &cfg, None).unwrap();
        assert_eq!(lines.len(), 2, "75mm apart axes must remain distinct");
    }
}
