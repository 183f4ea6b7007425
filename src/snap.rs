//! Snap engine: choose a target axis line per endpoint, then assign each
//! vertex the displacement of the endpoint it belongs to.

use std::collections::HashMap;

use crate::config::AlignmentConfig;
use crate::endpoint::{self, Endpoints};
use crate::geometry::round_to;
use crate::model::{AlignedVertex, AxisLine, Element};

/// Outcome of snapping a single endpoint position
#[derive(Debug, Clone, Copy)]
struct SnapTarget {
    axis_line_id: Option<u64>,
    position: f64,
    escalated: bool,
}

/// Find the snap target for `p` against a (position-ascending) axis line slice
fn snap_one(p: f64, lines: &[AxisLine], config: &AlignmentConfig) -> SnapTarget {
    if lines.is_empty() {
        return SnapTarget {
            axis_line_id: None,
            position: p,
            escalated: false,
        };
    }

    let idx = match lines.binary_search_by(|l| l.position.partial_cmp(&p).unwrap()) {
        Ok(i) => i,
        Err(i) => i,
    };

    let mut best: Option<&AxisLine> = None;
    let mut best_dist = f64::INFINITY;
    for candidate in [idx.checked_sub(1), Some(idx), Some(idx + 1)].into_iter().flatten() {
        if let Some(line) = lines.get(candidate) {
            let dist = line.distance(p);
            match best {
                None => {
                    best = Some(line);
                    best_dist = dist;
                }
                Some(current) => {
                    if is_better(line, dist, current, best_dist) {
                        best = Some(line);
                        best_dist = dist;
                    }
                }
            }
        }
    }

    let best = best.expect("non-empty axis line slice always has a nearest candidate");

    if best_dist <= config.max_snap_distance {
        SnapTarget {
            axis_line_id: Some(best.id),
            position: best.position,
            escalated: false,
        }
    } else if best_dist <= config.outlier_snap_distance {
        SnapTarget {
            axis_line_id: Some(best.id),
            position: best.position,
            escalated: true,
        }
    } else {
        SnapTarget {
            axis_line_id: None,
            position: p,
            escalated: false,
        }
    }
}

/// Tie-break: equidistant within 1e-9 m -> higher floor_count, then higher
/// vertex_count, then lower position.
fn is_better(candidate: &AxisLine, candidate_dist: f64, current: &AxisLine, current_dist: f64) -> bool {
    if (candidate_dist - current_dist).abs() > 1e-9 {
        return candidate_dist < current_dist;
    }
    if candidate.floor_count != current.floor_count {
        return candidate.floor_count > current.floor_count;
    }
    if candidate.vertex_count != current.vertex_count {
        return candidate.vertex_count > current.vertex_count;
    }
    candidate.position < current.position
}

/// Report of how many endpoints snapped via the outlier tier and how many
/// could not be snapped at all (feeds `AlignmentReport`)
#[derive(Debug, Default, Clone, Copy)]
pub struct SnapStats {
    pub escalated: usize,
    pub unsnapped: usize,
}

/// Snap every vertex of `element`, returning its AlignedVertex list and stats
pub fn snap_element(
    element: &Element,
    x_lines: &[AxisLine],
    y_lines: &[AxisLine],
    config: &AlignmentConfig,
) -> (Vec<AlignedVertex>, SnapStats) {
    let endpoints = endpoint::resolve(element, config);
    let mut stats = SnapStats::default();

    let x_targets = resolve_targets(&endpoints.x, x_lines, config, &mut stats);
    let y_targets = resolve_targets(&endpoints.y, y_lines, config, &mut stats);

    let aligned = element
        .vertices
        .iter()
        .map(|v| {
            let mut av = AlignedVertex::unsnapped(*v);

            if let Some(&(pos, axis_id)) = pick_target(&endpoints.x, &x_targets, v.x) {
                av.aligned_x = round_to(pos, config.rounding_precision);
                av.axis_x = axis_id;
            }
            if let Some(&(pos, axis_id)) = pick_target(&endpoints.y, &y_targets, v.y) {
                av.aligned_y = round_to(pos, config.rounding_precision);
                av.axis_y = axis_id;
            }
            av.aligned_z = v.z; // never rounded, never moved

            av
        })
        .collect();

    (aligned, stats)
}

fn resolve_targets(
    endpoint_positions: &[f64],
    lines: &[AxisLine],
    config: &AlignmentConfig,
    stats: &mut SnapStats,
) -> Vec<(f64, Option<u64>)> {
    endpoint_positions
        .iter()
        .map(|&p| {
            let target = snap_one(p, lines, config);
            if target.escalated {
                stats.escalated += 1;
            }
            if target.axis_line_id.is_none() {
                stats.unsnapped += 1;
            }
            (target.position, target.axis_line_id)
        })
        .collect()
}

/// Assign a vertex's original coordinate to the nearest endpoint (by original
/// value), returning that endpoint's snap target
fn pick_target<'a>(
    endpoint_positions: &[f64],
    targets: &'a [(f64, Option<u64>)],
    original: f64,
) -> Option<&'a (f64, Option<u64>)> {
    if endpoint_positions.is_empty() {
        return None;
    }
    let idx = if endpoint_positions.len() == 1 {
        0
    } else {
        endpoint_positions
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| (*a - original).abs().partial_cmp(&(*b - original).abs()).unwrap())
            .map(|(i, _)| i)
            .unwrap()
    };
    targets.get(idx)
}

/// Snap an entire model's elements, preserving input vertex order within
/// each element and returning the combined stats
pub fn snap_all(
    elements: &[Element],
    x_lines: &[AxisLine],
    y_lines: &[AxisLine],
    config: &AlignmentConfig,
) -> (Vec<AlignedVertex>, SnapStats) {
    let mut all = Vec::new();
    let mut stats = SnapStats::default();
    for element in elements {
        let (aligned, element_stats) = snap_element(element, x_lines, y_lines, config);
        all.extend(aligned);
        stats.escalated += element_stats.escalated;
        stats.unsnapped += element_stats.unsnapped;
    }
    (all, stats)
}

/// Per-element endpoint map retained for validation (element consistency check)
pub fn endpoints_for(elements: &[Element], config: &AlignmentConfig) -> HashMap<u64, Endpoints> {
    elements
        .iter()
        .map(|e| (e.id, endpoint::resolve(e, config)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AxisKind, ElementKind, GeometryKind, Vertex};

    fn axis_line(id: u64, axis: AxisKind, position: f64, floor_count: usize, vertex_count: usize) -> AxisLine {
        AxisLine::new(id, axis, position, floor_count, vertex_count, false)
    }

    #[test]
    fn single_column_snaps_all_vertices_to_same_axis() {
        let cfg = AlignmentConfig::default();
        let e = Element::new(1, "C1", ElementKind::Column, GeometryKind::Point).with_vertices(vec![
            Vertex::new(1, 0, -39.775, 22.500, -4.44),
            Vertex::new(1, 1, -39.770, 22.502, -1.56),
            Vertex::new(1, 2, -39.772, 22.500, 2.12),
            Vertex::new(1, 3, -39.773, 22.501, 5.48),
        ]);
        let x_lines = vec![axis_line(0, AxisKind::X, -39.700, 6, 20)];
        let y_lines = vec![axis_line(0, AxisKind::Y, 22.500, 8, 20)];
        let (aligned, stats) = snap_element(&e, &x_lines, &y_lines, &cfg);

        assert_eq!(aligned.len(), 4);
        for av in &aligned {
            assert_eq!(av.aligned_x, -39.700);
            assert_eq!(av.aligned_y, 22.500);
            assert_eq!(av.aligned_z, av.original_z);
        }
        assert_eq!(stats.unsnapped, 0);
        assert_eq!(stats.escalated, 0);
    }

    #[test]
    fn spanning_wall_assigns_vertices_to_nearest_endpoint() {
        let cfg = AlignmentConfig::default();
        let mut verts = Vec::new();
        for i in 0..4 {
            verts.push(Vertex::new(1, i, -55.900, 12.30, i as f64 * 3.0));
        }
        for i in 4..8 {
            verts.push(Vertex::new(1, i, -50.700, 12.30, (i - 4) as f64 * 3.0));
        }
        let e = Element::new(1, "W1", ElementKind::Wall, GeometryKind::Brep).with_vertices(verts);
        let x_lines = vec![
            axis_line(0, AxisKind::X, -55.850, 6, 20),
            axis_line(1, AxisKind::X, -50.700, 6, 20),
        ];
        let y_lines = vec![axis_line(0, AxisKind::Y, 12.300, 6, 20)];

        let (aligned, _) = snap_element(&e, &x_lines, &y_lines, &cfg);
        for av in &aligned {
            if av.original_x < -53.0 {
                assert_eq!(av.aligned_x, -55.850);
            } else {
                assert_eq!(av.aligned_x, -50.700);
            }
            assert_eq!(av.aligned_y, 12.300);
        }
    }

    #[test]
    fn boundary_at_max_snap_distance_still_snaps() {
        let cfg = AlignmentConfig::default();
        let lines = vec![axis_line(0, AxisKind::Y, 27.213, 6, 20)];
        let target = snap_one(27.213 + cfg.max_snap_distance, &lines, &cfg);
        assert_eq!(target.axis_line_id, Some(0));
        assert!(!target.escalated);
    }

    #[test]
    fn outlier_snap_escalates_between_tiers() {
        let cfg = AlignmentConfig::default();
        let lines = vec![axis_line(0, AxisKind::Y, 27.213, 6, 20)];
        let target = snap_one(30.900, &lines, &cfg);
        assert_eq!(target.axis_line_id, Some(0));
        assert!(target.escalated);
    }

    #[test]
    fn boundary_at_outlier_snap_distance_still_snaps() {
        let cfg = AlignmentConfig::default();
        let lines = vec![axis_line(0, AxisKind::Y, 0.0, 6, 20)];
        let target = snap_one(cfg.outlier_snap_distance, &lines, &cfg);
        assert_eq!(target.axis_line_id, Some(0));
        assert!(target.escalated);
    }

    #[test]
    fn beyond_outlier_distance_is_unsnapped() {
        let cfg = AlignmentConfig::default();
        let lines = vec![axis_line(0, AxisKind::Y, 0.0, 6, 20)];
        let target = snap_one(100.0, &lines, &cfg);
        assert_eq!(target.axis_line_id, None);
        assert_eq!(target.position, 100.0);
    }

    #[test]
    fn equidistant_lines_prefer_higher_floor_count() {
        let cfg = AlignmentConfig::default();
        let lines = vec![
            axis_line(0, AxisKind::X, -1.0, 3, 10),
            axis_line(1, AxisKind::X, 1.0, 5, 10),
        ];
        let target = snap_one(0.0, &lines, &cfg);
        assert_eq!(target.axis_line_id, Some(1));
    }

    #[test]
    fn z_is_never_touched() {
        let cfg = AlignmentConfig::default();
        let e = Element::new(1, "C1", ElementKind::Column, GeometryKind::Point)
            .with_vertices(vec![Vertex::new(1, 0, 0.0, 0.0, 1.23456789)]);
        let (aligned, _) = snap_element(&e, &[], &[], &cfg);
        assert_eq!(aligned[0].aligned_z.to_bits(), 1.23456789_f64.to_bits());
    }
}
