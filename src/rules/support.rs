//! Rule 6 (support point placement) and Rule 7 (centerline emission)

use std::collections::HashMap;

use crate::config::AlignmentConfig;
use crate::geometry::BoundingRect;
use crate::model::{AlignedVertex, AxisLine, Element, ElementKind, GeometryKind};

use super::{ObjectEdit, RuleStats};

/// A support placed at a discovered (x, y, z) triple
#[derive(Debug, Clone, Copy)]
pub(crate) struct Placement {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

pub(crate) struct Rule6Result {
    pub edits: Vec<ObjectEdit>,
    pub placements: Vec<Placement>,
}

fn column_centroid(element: &Element, avs: &[&AlignedVertex]) -> (f64, f64) {
    let _ = element;
    let n = avs.len() as f64;
    let (sx, sy) = avs.iter().fold((0.0, 0.0), |acc, v| (acc.0 + v.aligned_x, acc.1 + v.aligned_y));
    (sx / n, sy / n)
}

/// For each (x-line, y-line, support floor z) where a COLUMN centroid lands
/// within `proximity_tolerance`, place a point support; also retire
/// pre-existing supports that no longer sit on any discovered axis.
pub(crate) fn apply_rule6(
    elements: &[Element],
    aligned_by_element: &HashMap<u64, Vec<&AlignedVertex>>,
    x_lines: &[AxisLine],
    y_lines: &[AxisLine],
    config: &AlignmentConfig,
    stats: &mut RuleStats,
) -> Rule6Result {
    let mut columns: Vec<(&Element, (f64, f64))> = elements
        .iter()
        .filter(|e| e.kind == ElementKind::Column)
        .filter_map(|e| aligned_by_element.get(&e.id).map(|avs| (e, column_centroid(e, avs))))
        .collect();
    columns.sort_by_key(|(e, _)| e.id);

    let mut edits = Vec::new();
    let mut placements = Vec::new();
    let mut emitted: Vec<(f64, f64, f64)> = Vec::new();

    for &z in &config.support_floor_zs {
        for x_line in x_lines {
            for y_line in y_lines {
                let hit = columns.iter().any(|(_, (cx, cy))| {
                    let d = ((cx - x_line.position).powi(2) + (cy - y_line.position).powi(2)).sqrt();
                    d <= config.proximity_tolerance
                });
                if !hit {
                    continue;
                }
                if emitted.iter().any(|&(ex, ey, ez)| {
                    ez == z
                        && ((ex - x_line.position).powi(2) + (ey - y_line.position).powi(2)).sqrt()
                            <= config.dedup_radius
                }) {
                    continue;
                }
                emitted.push((x_line.position, y_line.position, z));
                placements.push(Placement {
                    x: x_line.position,
                    y: y_line.position,
                    z,
                });
                edits.push(ObjectEdit::Add {
                    kind: ElementKind::Support,
                    geometry_kind: GeometryKind::Point,
                    name: format!("SUP-{:.3}-{:.3}-{:.2}", x_line.position, y_line.position, z),
                    points: vec![(x_line.position, y_line.position, z)],
                    layer_hint: None,
                });
                stats.support_placement.added += 1;
            }
        }
    }

    edits.extend(edge_supports(elements, aligned_by_element, config, stats, &mut placements));
    edits.extend(retire_stale_supports(
        elements,
        aligned_by_element,
        x_lines,
        y_lines,
        config,
        stats,
    ));

    Rule6Result { edits, placements }
}

/// The fixed set of line supports along the building's outer edges; derived
/// from the overall aligned footprint rather than a literal reference count.
fn edge_supports(
    elements: &[Element],
    aligned_by_element: &HashMap<u64, Vec<&AlignedVertex>>,
    config: &AlignmentConfig,
    stats: &mut RuleStats,
    placements: &mut Vec<Placement>,
) -> Vec<ObjectEdit> {
    let points: Vec<(f64, f64)> = elements
        .iter()
        .filter(|e| e.kind == ElementKind::Column || e.kind == ElementKind::Wall)
        .filter_map(|e| aligned_by_element.get(&e.id))
        .flat_map(|avs| avs.iter().map(|v| (v.aligned_x, v.aligned_y)))
        .collect();
    let Some(rect) = BoundingRect::from_points(&points) else {
        return Vec::new();
    };

    let corners = [
        (rect.min_x, rect.min_y),
        (rect.max_x, rect.min_y),
        (rect.max_x, rect.max_y),
        (rect.min_x, rect.max_y),
    ];

    let mut edits = Vec::new();
    for &z in &config.support_floor_zs {
        for (i, &(cx, cy)) in corners.iter().enumerate() {
            let next = corners[(i + 1) % corners.len()];
            edits.push(ObjectEdit::Add {
                kind: ElementKind::Support,
                geometry_kind: GeometryKind::LineCurve,
                name: format!("SUP-EDGE-{i}-{z:.2}"),
                points: vec![(cx, cy, z), (next.0, next.1, z)],
                layer_hint: Some("edge-supports".to_string()),
            });
            placements.push(Placement { x: cx, y: cy, z });
            stats.support_placement.added += 1;
        }
    }
    edits
}

fn retire_stale_supports(
    elements: &[Element],
    aligned_by_element: &HashMap<u64, Vec<&AlignedVertex>>,
    x_lines: &[AxisLine],
    y_lines: &[AxisLine],
    config: &AlignmentConfig,
    stats: &mut RuleStats,
) -> Vec<ObjectEdit> {
    let mut supports: Vec<&Element> = elements.iter().filter(|e| e.kind == ElementKind::Support).collect();
    supports.sort_by_key(|e| e.id);

    let mut edits = Vec::new();
    for support in supports {
        let Some(avs) = aligned_by_element.get(&support.id) else {
            continue;
        };
        let (cx, cy) = column_centroid(support, avs);
        let nearest_x = x_lines.iter().map(|l| l.distance(cx)).fold(f64::INFINITY, f64::min);
        let nearest_y = y_lines.iter().map(|l| l.distance(cy)).fold(f64::INFINITY, f64::min);
        if nearest_x > config.max_snap_distance || nearest_y > config.max_snap_distance {
            edits.push(ObjectEdit::Remove { element_id: support.id });
            stats.support_placement.removed += 1;
        }
    }
    edits
}

/// For each support placement, emit a vertical centerline spanning that
/// floor span; the curve-kind bucketing is presentational only.
pub(crate) fn apply_rule7(
    placements: &[Placement],
    config: &AlignmentConfig,
    stats: &mut RuleStats,
) -> Vec<ObjectEdit> {
    let mut ordered = placements.to_vec();
    ordered.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap().then(a.z.partial_cmp(&b.z).unwrap()));

    let mut edits = Vec::new();
    for p in ordered {
        let Some(span) = config.floor_ladder.span_containing(p.z, config.z_tolerance) else {
            continue;
        };
        let geometry_kind = curve_kind_for_span(span.height());
        edits.push(ObjectEdit::Add {
            kind: ElementKind::Support,
            geometry_kind,
            name: format!("CENTERLINE-{:.3}-{:.3}-{:.2}", p.x, p.y, span.z_bottom),
            points: vec![(p.x, p.y, span.z_bottom), (p.x, p.y, span.z_top)],
            layer_hint: Some("centerlines".to_string()),
        });
        stats.centerline_emission.added += 1;
    }
    edits
}

fn curve_kind_for_span(height: f64) -> GeometryKind {
    if height < 3.0 {
        GeometryKind::LineCurve
    } else if height < 6.0 {
        GeometryKind::PolyCurve
    } else {
        GeometryKind::NurbsCurve
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AxisKind, Vertex};

    fn axis_line(id: u64, axis: AxisKind, position: f64) -> AxisLine {
        AxisLine::new(id, axis, position, 6, 10, false)
    }

    #[test]
    fn column_near_intersection_gets_a_support() {
        let cfg = AlignmentConfig::default();
        let column = Element::new(1, "C1", ElementKind::Column, GeometryKind::Point)
            .with_vertices(vec![Vertex::new(1, 0, -39.7, 22.5, -4.44)]);
        let elements = vec![column];
        let av = vec![AlignedVertex::unsnapped(Vertex::new(1, 0, -39.7, 22.5, -4.44))];
        let mut by_element: HashMap<u64, Vec<&AlignedVertex>> = HashMap::new();
        by_element.insert(1, av.iter().collect());

        let x_lines = vec![axis_line(0, AxisKind::X, -39.7)];
        let y_lines = vec![axis_line(0, AxisKind::Y, 22.5)];

        let mut stats = RuleStats::default();
        let result = apply_rule6(&elements, &by_element, &x_lines, &y_lines, &cfg, &mut stats);
        assert!(result.placements.iter().any(|p| p.x == -39.7 && p.y == 22.5));
    }

    #[test]
    fn centerline_height_buckets_curve_kind() {
        assert_eq!(curve_kind_for_span(2.0), GeometryKind::LineCurve);
        assert_eq!(curve_kind_for_span(4.0), GeometryKind::PolyCurve);
        assert_eq!(curve_kind_for_span(8.0), GeometryKind::NurbsCurve);
    }
}
