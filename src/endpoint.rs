//! Endpoint resolution: reduce an element's vertex list to the 1-2 distinct
//! per-axis positions its topology actually has.

use crate::config::AlignmentConfig;
use crate::model::{Element, ElementKind};

/// The distinct X and Y endpoint positions characterizing an element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Endpoints {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Endpoints {
    /// The endpoint closest to `value` (panics if empty; elements always have
    /// at least one endpoint unless skipped entirely, e.g. SLAB)
    pub fn nearest_x(&self, value: f64) -> f64 {
        nearest(&self.x, value)
    }

    pub fn nearest_y(&self, value: f64) -> f64 {
        nearest(&self.y, value)
    }
}

fn nearest(values: &[f64], target: f64) -> f64 {
    *values
        .iter()
        .min_by(|a, b| (*a - target).abs().partial_cmp(&(*b - target).abs()).unwrap())
        .expect("endpoint list must not be empty when queried")
}

/// Resolve an element's endpoints per the per-kind rules
pub fn resolve(element: &Element, config: &AlignmentConfig) -> Endpoints {
    match element.kind {
        ElementKind::Column | ElementKind::Support => resolve_compact(element),
        ElementKind::Slab => Endpoints::default(),
        ElementKind::Wall | ElementKind::Beam => resolve_spanning(element, config),
    }
}

fn resolve_compact(element: &Element) -> Endpoints {
    match element.centroid_xy() {
        Some((cx, cy)) => Endpoints {
            x: vec![cx],
            y: vec![cy],
        },
        None => Endpoints::default(),
    }
}

fn resolve_spanning(element: &Element, config: &AlignmentConfig) -> Endpoints {
    let xs: Vec<f64> = element.vertices.iter().map(|v| v.x).collect();
    let ys: Vec<f64> = element.vertices.iter().map(|v| v.y).collect();

    let (delta_x, delta_y) = (
        element.x_range().map(|(lo, hi)| hi - lo).unwrap_or(0.0),
        element.y_range().map(|(lo, hi)| hi - lo).unwrap_or(0.0),
    );

    let long_axis_is_x = delta_x >= delta_y;
    let (delta_long, delta_short) = if long_axis_is_x {
        (delta_x, delta_y)
    } else {
        (delta_y, delta_x)
    };
    // The short axis is still "two endpoints" rather than wall thickness noise
    // once its own span is a substantial fraction of the long axis — that's
    // what an L-shaped wall's second leg looks like.
    let l_shaped = delta_long > 0.0 && delta_short >= delta_long * L_SHAPE_RATIO;

    let (x, y) = if long_axis_is_x {
        let x = cap_to_extremes(cluster_1d(&xs, config.cluster_radius), 2);
        let y = if l_shaped {
            cap_to_extremes(cluster_1d(&ys, config.cluster_radius), 2)
        } else {
            vec![mean(&ys)]
        };
        (x, y)
    } else {
        let y = cap_to_extremes(cluster_1d(&ys, config.cluster_radius), 2);
        let x = if l_shaped {
            cap_to_extremes(cluster_1d(&xs, config.cluster_radius), 2)
        } else {
            vec![mean(&xs)]
        };
        (x, y)
    };

    Endpoints { x, y }
}

/// Fraction of the long-axis span above which the short axis is treated as a
/// genuine second leg (L-shaped) rather than wall-thickness noise.
const L_SHAPE_RATIO: f64 = 0.3;

/// Keep at most `max` clusters, collapsing to the extreme (min, max) means when
/// there are more
fn cap_to_extremes(mut clusters: Vec<f64>, max: usize) -> Vec<f64> {
    if clusters.len() <= max {
        return clusters;
    }
    clusters.sort_by(|a, b| a.partial_cmp(b).unwrap());
    vec![clusters[0], *clusters.last().unwrap()]
}

fn cluster_1d(values: &[f64], cluster_radius: f64) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let mut clusters: Vec<Vec<f64>> = Vec::new();
    for v in sorted {
        match clusters.last_mut() {
            Some(last) if (v - mean(last)).abs() <= cluster_radius => last.push(v),
            _ => clusters.push(vec![v]),
        }
    }
    clusters.iter().map(|c| mean(c)).collect()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GeometryKind, Vertex};

    #[test]
    fn column_has_single_endpoint_per_axis() {
        let cfg = AlignmentConfig::default();
        let e = Element::new(1, "C1", ElementKind::Column, GeometryKind::Point).with_vertices(vec![
            Vertex::new(1, 0, -39.775, 22.500, -4.44),
            Vertex::new(1, 1, -39.770, 22.502, -1.56),
        ]);
        let ep = resolve(&e, &cfg);
        assert_eq!(ep.x.len(), 1);
        assert_eq!(ep.y.len(), 1);
    }

    #[test]
    fn spanning_wall_has_two_x_one_y() {
        let cfg = AlignmentConfig::default();
        let mut verts = Vec::new();
        for (i, x) in [-55.900, -55.905, -50.700, -50.702].into_iter().enumerate() {
            verts.push(Vertex::new(1, i, x, 12.30, 0.0));
            verts.push(Vertex::new(1, i + 10, x, 12.31, 3.0));
        }
        let e = Element::new(1, "W1", ElementKind::Wall, GeometryKind::Brep).with_vertices(verts);
        let ep = resolve(&e, &cfg);
        assert_eq!(ep.x.len(), 2);
        assert_eq!(ep.y.len(), 1);
    }

    #[test]
    fn slab_has_no_endpoints() {
        let cfg = AlignmentConfig::default();
        let e = Element::new(1, "S1", ElementKind::Slab, GeometryKind::Brep).with_vertices(vec![
            Vertex::new(1, 0, 0.0, 0.0, 2.12),
        ]);
        let ep = resolve(&e, &cfg);
        assert!(ep.x.is_empty() && ep.y.is_empty());
    }

    #[test]
    fn l_shaped_wall_keeps_two_endpoints_on_both_axes() {
        let cfg = AlignmentConfig::default();
        // Two legs: one running along X at y=0, one along Y at x=10, meeting near (10,0)
        let mut verts = Vec::new();
        for x in [0.0, 10.0] {
            verts.push(Vertex::new(1, verts.len(), x, 0.0, 0.0));
        }
        for y in [0.0, 10.0] {
            verts.push(Vertex::new(1, verts.len(), 10.0, y, 0.0));
        }
        let e = Element::new(1, "W2", ElementKind::Wall, GeometryKind::Brep).with_vertices(verts);
        let ep = resolve(&e, &cfg);
        assert_eq!(ep.x.len(), 2);
        assert_eq!(ep.y.len(), 2);
    }

    #[test]
    fn cluster_1d_merges_close_values() {
        let clusters = cluster_1d(&[1.000, 1.001, 5.000], 0.002);
        assert_eq!(clusters.len(), 2);
    }
}
