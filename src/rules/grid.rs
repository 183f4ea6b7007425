//! Grid-line emission: one unnamed horizontal curve per Y-axis line

use crate::model::{AlignedVertex, AxisLine, ElementKind, GeometryKind};

use super::{ObjectEdit, RuleStats};

pub(crate) fn apply_grid_lines(
    aligned: &[AlignedVertex],
    y_lines: &[AxisLine],
    stats: &mut RuleStats,
) -> Vec<ObjectEdit> {
    let x_lo = aligned.iter().map(|v| v.aligned_x).fold(f64::INFINITY, f64::min);
    let x_hi = aligned.iter().map(|v| v.aligned_x).fold(f64::NEG_INFINITY, f64::max);
    if !x_lo.is_finite() || !x_hi.is_finite() {
        return Vec::new();
    }

    let mut lines = y_lines.to_vec();
    lines.sort_by(|a, b| a.position.partial_cmp(&b.position).unwrap());

    let mut edits = Vec::new();
    for line in lines {
        edits.push(ObjectEdit::Add {
            kind: ElementKind::Beam,
            geometry_kind: GeometryKind::LineCurve,
            name: String::new(),
            points: vec![(x_lo, line.position, 0.0), (x_hi, line.position, 0.0)],
            layer_hint: Some("grid".to_string()),
        });
        stats.grid_lines.added += 1;
    }
    edits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AxisKind, Vertex};

    #[test]
    fn one_grid_line_per_y_axis() {
        let aligned = vec![
            AlignedVertex::unsnapped(Vertex::new(1, 0, -10.0, 0.0, 0.0)),
            AlignedVertex::unsnapped(Vertex::new(1, 1, 10.0, 0.0, 0.0)),
        ];
        let y_lines = vec![
            AxisLine::new(0, AxisKind::Y, 5.0, 6, 10, false),
            AxisLine::new(1, AxisKind::Y, 12.5, 6, 10, false),
        ];
        let mut stats = RuleStats::default();
        let edits = apply_grid_lines(&aligned, &y_lines, &mut stats);
        assert_eq!(edits.len(), 2);
        assert_eq!(stats.grid_lines.added, 2);
    }
}
