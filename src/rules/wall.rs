//! Rule 5 - wall simplification: remove thin or multi-face walls, then
//! re-emit one single-face rectangle per floor span the wall intersected.

use std::collections::HashMap;

use crate::config::AlignmentConfig;
use crate::model::{AlignedVertex, Element, ElementKind, GeometryKind};

use super::{ObjectEdit, RuleStats};

/// `PolyCurve`/`NurbsCurve` tag a wall built from more than a single planar
/// face; those, plus anything thinner than `thin_wall_threshold`, get simplified.
fn needs_simplification(element: &Element, config: &AlignmentConfig) -> bool {
    let multi_face = matches!(
        element.geometry_kind,
        GeometryKind::PolyCurve | GeometryKind::NurbsCurve
    );
    let thickness = match (element.x_range(), element.y_range()) {
        (Some((x_lo, x_hi)), Some((y_lo, y_hi))) => (x_hi - x_lo).min(y_hi - y_lo),
        _ => return multi_face,
    };
    multi_face || thickness < config.thin_wall_threshold
}

pub(crate) fn apply_rule5(
    elements: &[Element],
    aligned_by_element: &HashMap<u64, Vec<&AlignedVertex>>,
    config: &AlignmentConfig,
    stats: &mut RuleStats,
) -> Vec<ObjectEdit> {
    let mut walls: Vec<&Element> = elements.iter().filter(|e| e.kind == ElementKind::Wall).collect();
    walls.sort_by_key(|e| e.id);

    let mut edits = Vec::new();
    for wall in walls {
        if !needs_simplification(wall, config) {
            continue;
        }
        let Some(avs) = aligned_by_element.get(&wall.id) else {
            continue;
        };

        edits.push(ObjectEdit::Remove { element_id: wall.id });
        stats.wall_simplification.removed += 1;

        let x_lo = avs.iter().map(|v| v.aligned_x).fold(f64::INFINITY, f64::min);
        let x_hi = avs.iter().map(|v| v.aligned_x).fold(f64::NEG_INFINITY, f64::max);
        let y_lo = avs.iter().map(|v| v.aligned_y).fold(f64::INFINITY, f64::min);
        let y_hi = avs.iter().map(|v| v.aligned_y).fold(f64::NEG_INFINITY, f64::max);
        let z_lo = avs.iter().map(|v| v.aligned_z).fold(f64::INFINITY, f64::min);
        let z_hi = avs.iter().map(|v| v.aligned_z).fold(f64::NEG_INFINITY, f64::max);

        for span in config.floor_ladder.spans() {
            if span.z_top < z_lo || span.z_bottom > z_hi {
                continue;
            }
            let points = vec![
                (x_lo, y_lo, span.z_bottom),
                (x_hi, y_hi, span.z_bottom),
                (x_hi, y_hi, span.z_top),
                (x_lo, y_lo, span.z_top),
            ];
            edits.push(ObjectEdit::Add {
                kind: ElementKind::Wall,
                geometry_kind: GeometryKind::Brep,
                name: format!("WALL-{}-{:.2}", wall.id, span.z_bottom),
                points,
                layer_hint: None,
            });
            stats.wall_simplification.added += 1;
        }
    }
    edits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Vertex;

    fn aligned(element_id: u64, pts: &[(f64, f64, f64)]) -> Vec<AlignedVertex> {
        pts.iter()
            .enumerate()
            .map(|(i, &(x, y, z))| AlignedVertex::unsnapped(Vertex::new(element_id, i, x, y, z)))
            .collect()
    }

    #[test]
    fn thin_wall_is_removed_and_replaced_per_span() {
        let cfg = AlignmentConfig::default();
        let wall = Element::new(1, "W1", ElementKind::Wall, GeometryKind::Brep).with_vertices(vec![
            Vertex::new(1, 0, -55.85, 12.3, -4.44),
            Vertex::new(1, 1, -55.85, 12.33, 5.48),
        ]);
        let elements = vec![wall];
        let av = aligned(1, &[(-55.85, 12.3, -4.44), (-55.85, 12.33, 5.48)]);
        let mut by_element: HashMap<u64, Vec<&AlignedVertex>> = HashMap::new();
        by_element.insert(1, av.iter().collect());

        let mut stats = RuleStats::default();
        let edits = apply_rule5(&elements, &by_element, &cfg, &mut stats);
        assert!(matches!(edits[0], ObjectEdit::Remove { element_id: 1 }));
        assert_eq!(stats.wall_simplification.removed, 1);
        assert!(stats.wall_simplification.added >= 2);
    }

    #[test]
    fn thick_single_face_wall_is_untouched() {
        let cfg = AlignmentConfig::default();
        let wall = Element::new(1, "W1", ElementKind::Wall, GeometryKind::Brep).with_vertices(vec![
            Vertex::new(1, 0, 0.0, 0.0, 0.0),
            Vertex::new(1, 1, 0.3, 5.0, 3.0),
        ]);
        assert!(!needs_simplification(&wall, &cfg));
    }
}
