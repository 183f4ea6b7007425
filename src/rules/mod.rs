//! Object Transform Engine: the seven deterministic object-level rules.
//!
//! Rules 1 and 2 are axis discovery and snapping (elsewhere); this module
//! covers rules 3-7 plus grid-line emission, run in the fixed order the
//! contract requires since rule 4 depends on footprints rule 3 captures.

mod grid;
mod slab;
mod support;
mod wall;

use std::collections::HashMap;

use crate::config::AlignmentConfig;
use crate::model::{AlignedVertex, AxisLine, Element, ElementKind, GeometryKind};

/// A single object-level edit the Materializer must apply
#[derive(Debug, Clone)]
pub enum ObjectEdit {
    /// Remove an existing element by id
    Remove { element_id: u64 },
    /// Add a new synthetic element
    Add {
        kind: ElementKind,
        geometry_kind: GeometryKind,
        name: String,
        points: Vec<(f64, f64, f64)>,
        layer_hint: Option<String>,
    },
}

/// Per-rule addition/removal counts, surfaced in the alignment report
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleCounts {
    pub removed: usize,
    pub added: usize,
}

#[derive(Debug, Default, Clone)]
pub struct RuleStats {
    pub slab_removal: RuleCounts,
    pub slab_consolidation: RuleCounts,
    pub wall_simplification: RuleCounts,
    pub support_placement: RuleCounts,
    pub centerline_emission: RuleCounts,
    pub grid_lines: RuleCounts,
    /// Count of SlabFootprintUnreconstructable warnings (empty consolidation clusters)
    pub unreconstructable_footprints: usize,
}

/// Map from element id to its aligned vertices, in the element's own vertex order
pub(crate) fn index_aligned(aligned: &[AlignedVertex]) -> HashMap<u64, Vec<&AlignedVertex>> {
    let mut map: HashMap<u64, Vec<&AlignedVertex>> = HashMap::new();
    for av in aligned {
        map.entry(av.element_id).or_default().push(av);
    }
    for vs in map.values_mut() {
        vs.sort_by_key(|v| v.vertex_index);
    }
    map
}

/// Run rules 3 through 7 plus grid-line emission, in that order
pub fn apply_rules(
    elements: &[Element],
    aligned: &[AlignedVertex],
    x_lines: &[AxisLine],
    y_lines: &[AxisLine],
    config: &AlignmentConfig,
) -> (Vec<ObjectEdit>, RuleStats) {
    let aligned_by_element = index_aligned(aligned);
    let mut stats = RuleStats::default();
    let mut edits: Vec<ObjectEdit> = Vec::new();

    let removed_slabs = slab::apply_rule3(elements, &aligned_by_element, config, &mut stats);
    edits.extend(removed_slabs.edits.clone());

    edits.extend(slab::apply_rule4(&removed_slabs.footprints, config, &mut stats));

    edits.extend(wall::apply_rule5(
        elements,
        &aligned_by_element,
        config,
        &mut stats,
    ));

    let supports = support::apply_rule6(
        elements,
        &aligned_by_element,
        x_lines,
        y_lines,
        config,
        &mut stats,
    );
    edits.extend(supports.edits.clone());

    edits.extend(support::apply_rule7(&supports.placements, config, &mut stats));

    edits.extend(grid::apply_grid_lines(aligned, y_lines, &mut stats));

    (edits, stats)
}
