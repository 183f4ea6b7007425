//! Rule 3 (slab removal) and Rule 4 (slab consolidation)

use std::collections::HashMap;

use crate::config::AlignmentConfig;
use crate::geometry::BoundingRect;
use crate::model::{AlignedVertex, Element, ElementKind, GeometryKind};

use super::{ObjectEdit, RuleStats};

/// A removed slab's footprint, tagged with the floor Z it was captured at
#[derive(Debug, Clone)]
pub(crate) struct RemovedFootprint {
    pub floor_z: f64,
    pub rect: BoundingRect,
}

pub(crate) struct Rule3Result {
    pub edits: Vec<ObjectEdit>,
    /// Footprints grouped by floor Z, sorted ascending by floor Z then rect origin
    pub footprints: HashMap<OrderedF64, Vec<BoundingRect>>,
}

/// f64 wrapper usable as a HashMap key for the (finite, floor-ladder-snapped) floor Z
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct OrderedF64(pub f64);
impl Eq for OrderedF64 {}
impl std::hash::Hash for OrderedF64 {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

/// Remove every SLAB whose vertex set has max(z) <= roof_z_threshold, keeping
/// the topmost as the roof, and retain each removed footprint grouped by floor.
pub(crate) fn apply_rule3(
    elements: &[Element],
    aligned_by_element: &HashMap<u64, Vec<&AlignedVertex>>,
    config: &AlignmentConfig,
    stats: &mut RuleStats,
) -> Rule3Result {
    let mut edits = Vec::new();
    let mut footprints: HashMap<OrderedF64, Vec<BoundingRect>> = HashMap::new();

    let mut slabs: Vec<&Element> = elements.iter().filter(|e| e.kind == ElementKind::Slab).collect();
    slabs.sort_by_key(|e| e.id);

    for slab in slabs {
        let Some(avs) = aligned_by_element.get(&slab.id) else {
            continue;
        };
        let max_z = avs.iter().map(|v| v.aligned_z).fold(f64::NEG_INFINITY, f64::max);
        if max_z > config.roof_z_threshold {
            continue; // roof: kept as-is
        }

        let points: Vec<(f64, f64)> = avs.iter().map(|v| (v.aligned_x, v.aligned_y)).collect();
        let Some(rect) = BoundingRect::from_points(&points) else {
            continue;
        };

        let floor_z = config.floor_ladder.nearest(max_z).unwrap_or(max_z);
        footprints.entry(OrderedF64(floor_z)).or_default().push(rect);

        edits.push(ObjectEdit::Remove { element_id: slab.id });
        stats.slab_removal.removed += 1;
    }

    Rule3Result { edits, footprints }
}

/// For each floor level, cluster removed footprint centroids (separated by
/// more than `consolidation_gap` on either axis become distinct clusters)
/// and emit one consolidated rectangular slab per cluster.
pub(crate) fn apply_rule4(
    footprints: &HashMap<OrderedF64, Vec<BoundingRect>>,
    config: &AlignmentConfig,
    stats: &mut RuleStats,
) -> Vec<ObjectEdit> {
    let mut floors: Vec<f64> = footprints.keys().map(|k| k.0).collect();
    floors.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let mut edits = Vec::new();
    for floor_z in floors {
        let rects = &footprints[&OrderedF64(floor_z)];
        if rects.is_empty() {
            stats.unreconstructable_footprints += 1;
            continue;
        }

        let clusters = cluster_rects(rects, config.consolidation_gap);
        let mut rects_out: Vec<BoundingRect> = clusters
            .into_iter()
            .filter_map(|members| BoundingRect::merge_all(&members))
            .collect();

        // The contract expects 1-3 rectangles per floor; merge the closest
        // pair until within budget rather than silently dropping any.
        while rects_out.len() > 3 {
            let (i, j) = closest_pair(&rects_out);
            let merged = rects_out[i].merge(&rects_out[j]);
            let (lo, hi) = if i < j { (i, j) } else { (j, i) };
            rects_out.remove(hi);
            rects_out.remove(lo);
            rects_out.push(merged);
        }

        rects_out.sort_by(|a, b| {
            a.min_x
                .partial_cmp(&b.min_x)
                .unwrap()
                .then(a.min_y.partial_cmp(&b.min_y).unwrap())
        });

        for (idx, rect) in rects_out.iter().enumerate() {
            let corners = vec![
                (rect.min_x, rect.min_y, floor_z),
                (rect.max_x, rect.min_y, floor_z),
                (rect.max_x, rect.max_y, floor_z),
                (rect.min_x, rect.max_y, floor_z),
            ];
            edits.push(ObjectEdit::Add {
                kind: ElementKind::Slab,
                geometry_kind: GeometryKind::Brep,
                name: format!("SLAB-CONSOL-{floor_z:.2}-{idx}"),
                points: corners,
                layer_hint: Some("consolidated-slabs".to_string()),
            });
            stats.slab_consolidation.added += 1;
        }
    }
    edits
}

fn cluster_rects(rects: &[BoundingRect], gap: f64) -> Vec<Vec<BoundingRect>> {
    let n = rects.len();
    let mut parent: Vec<usize> = (0..n).collect();
    fn find(parent: &mut [usize], x: usize) -> usize {
        if parent[x] != x {
            parent[x] = find(parent, parent[x]);
        }
        parent[x]
    }
    for i in 0..n {
        for j in (i + 1)..n {
            if rects[i].gap_x(&rects[j]) <= gap && rects[i].gap_y(&rects[j]) <= gap {
                let (ri, rj) = (find(&mut parent, i), find(&mut parent, j));
                if ri != rj {
                    parent[ri] = rj;
                }
            }
        }
    }
    let mut groups: HashMap<usize, Vec<BoundingRect>> = HashMap::new();
    for i in 0..n {
        let root = find(&mut parent, i);
        groups.entry(root).or_default().push(rects[i]);
    }
    groups.into_values().collect()
}

fn closest_pair(rects: &[BoundingRect]) -> (usize, usize) {
    let mut best = (0, 1, f64::INFINITY);
    for i in 0..rects.len() {
        for j in (i + 1)..rects.len() {
            let d = rects[i].center_distance(&rects[j]);
            if d < best.2 {
                best = (i, j, d);
            }
        }
    }
    (best.0, best.1)
}
