//! Validator: post-pipeline assertions over the aligned vertex stream and
//! object diff. Fatal findings raise `AlignError::ValidationFailed`;
//! everything else is a warning accumulated by the caller.

use std::collections::HashMap;

use crate::config::AlignmentConfig;
use crate::endpoint::Endpoints;
use crate::error::{AlignError, AlignResult};
use crate::geometry::distinct_sorted;
use crate::model::{AlignedVertex, AxisKind, AxisLine, Element, ElementKind};

/// Non-fatal findings surfaced for the report rather than aborting the pipeline
#[derive(Debug, Default, Clone)]
pub struct ValidationWarnings {
    pub low_alignment_fraction: Option<f64>,
    pub reference_match_fraction: Option<f64>,
    /// Fraction of supplied reference axis positions matched by a discovered
    /// line, per axis; `None` when no reference positions were supplied.
    pub x_axis_recall: Option<f64>,
    pub y_axis_recall: Option<f64>,
    /// Reference axis positions with no matching discovered line beyond tolerance
    pub missing_reference_positions: Vec<(AxisKind, f64)>,
    /// Element kinds whose final count differs from the reference model's by more than 10%
    pub object_count_drift: Vec<(ElementKind, f64)>,
}

/// Run the critical (fatal-on-failure) checks, then the aggregate warnings
pub fn validate(
    elements: &[Element],
    aligned: &[AlignedVertex],
    endpoints_by_element: &HashMap<u64, Endpoints>,
    x_lines: &[AxisLine],
    y_lines: &[AxisLine],
    config: &AlignmentConfig,
) -> AlignResult<ValidationWarnings> {
    check_z_invariant(aligned)?;
    check_axis_tolerance(aligned, x_lines, y_lines, config)?;
    check_element_consistency(elements, aligned, endpoints_by_element, config)?;

    let mut warnings = ValidationWarnings::default();

    let fraction = aligned_fraction(aligned);
    if fraction < 0.85 {
        warnings.low_alignment_fraction = Some(fraction);
    }

    Ok(warnings)
}

fn check_z_invariant(aligned: &[AlignedVertex]) -> AlignResult<()> {
    for v in aligned {
        if v.aligned_z.to_bits() != v.original_z.to_bits() {
            return Err(AlignError::ValidationFailed(format!(
                "Z invariant broken for element {} vertex {}",
                v.element_id, v.vertex_index
            )));
        }
    }
    Ok(())
}

fn check_axis_tolerance(
    aligned: &[AlignedVertex],
    x_lines: &[AxisLine],
    y_lines: &[AxisLine],
    config: &AlignmentConfig,
) -> AlignResult<()> {
    let by_id = |lines: &[AxisLine], id: u64| lines.iter().find(|l| l.id == id).map(|l| l.position);

    for v in aligned {
        if let Some(axis_id) = v.axis_x {
            let Some(pos) = by_id(x_lines, axis_id) else {
                return Err(AlignError::ValidationFailed(format!(
                    "vertex {} of element {} references unknown X axis line {}",
                    v.vertex_index, v.element_id, axis_id
                )));
            };
            if (v.aligned_x - pos).abs() > config.rounding_precision {
                return Err(AlignError::ValidationFailed(format!(
                    "vertex {} of element {} exceeds X axis tolerance",
                    v.vertex_index, v.element_id
                )));
            }
        }
        if let Some(axis_id) = v.axis_y {
            let Some(pos) = by_id(y_lines, axis_id) else {
                return Err(AlignError::ValidationFailed(format!(
                    "vertex {} of element {} references unknown Y axis line {}",
                    v.vertex_index, v.element_id, axis_id
                )));
            };
            if (v.aligned_y - pos).abs() > config.rounding_precision {
                return Err(AlignError::ValidationFailed(format!(
                    "vertex {} of element {} exceeds Y axis tolerance",
                    v.vertex_index, v.element_id
                )));
            }
        }
    }
    Ok(())
}

/// Each aligned coordinate value within an element must correspond to
/// exactly one of the element's resolved endpoint targets.
fn check_element_consistency(
    elements: &[Element],
    aligned: &[AlignedVertex],
    endpoints_by_element: &HashMap<u64, Endpoints>,
    config: &AlignmentConfig,
) -> AlignResult<()> {
    let mut by_element: HashMap<u64, Vec<&AlignedVertex>> = HashMap::new();
    for v in aligned {
        by_element.entry(v.element_id).or_default().push(v);
    }

    for element in elements {
        let Some(endpoints) = endpoints_by_element.get(&element.id) else {
            continue;
        };
        let Some(vs) = by_element.get(&element.id) else {
            continue;
        };

        if endpoints.x.is_empty() && endpoints.y.is_empty() {
            continue; // SLAB: no endpoints to be consistent with
        }

        let distinct_x: Vec<f64> = distinct_sorted(vs.iter().map(|v| v.aligned_x), config.rounding_precision);
        let distinct_y: Vec<f64> = distinct_sorted(vs.iter().map(|v| v.aligned_y), config.rounding_precision);

        if !endpoints.x.is_empty() && distinct_x.len() > endpoints.x.len() {
            return Err(AlignError::ValidationFailed(format!(
                "element {} has more distinct aligned X values than endpoints",
                element.id
            )));
        }
        if !endpoints.y.is_empty() && distinct_y.len() > endpoints.y.len() {
            return Err(AlignError::ValidationFailed(format!(
                "element {} has more distinct aligned Y values than endpoints",
                element.id
            )));
        }
    }
    Ok(())
}

fn aligned_fraction(aligned: &[AlignedVertex]) -> f64 {
    if aligned.is_empty() {
        return 1.0;
    }
    let with_axis = aligned.iter().filter(|v| v.has_any_axis()).count();
    with_axis as f64 / aligned.len() as f64
}

/// Reference-model comparison: fraction of common vertices (by element id
/// and vertex index) matching within 5 mm.
pub fn compare_to_reference(aligned: &[AlignedVertex], reference: &[AlignedVertex]) -> f64 {
    if aligned.is_empty() {
        return 1.0;
    }
    let reference_by_key: HashMap<(u64, usize), &AlignedVertex> = reference
        .iter()
        .map(|v| ((v.element_id, v.vertex_index), v))
        .collect();

    let mut common = 0usize;
    let mut matching = 0usize;
    for v in aligned {
        if let Some(r) = reference_by_key.get(&(v.element_id, v.vertex_index)) {
            common += 1;
            let dx = (v.aligned_x - r.aligned_x).abs();
            let dy = (v.aligned_y - r.aligned_y).abs();
            let dz = (v.aligned_z - r.aligned_z).abs();
            if dx <= 0.005 && dy <= 0.005 && dz <= 0.005 {
                matching += 1;
            }
        }
    }
    if common == 0 {
        return 1.0;
    }
    matching as f64 / common as f64
}

/// Element kinds whose count in `final_counts` differs from `reference_counts`
/// by more than 10%. A kind absent from the reference is ignored (nothing to
/// drift against); a kind present in the reference but absent from the final
/// output is reported as 100% drift.
pub fn object_count_drift(
    final_counts: &HashMap<ElementKind, usize>,
    reference_counts: &HashMap<ElementKind, usize>,
) -> Vec<(ElementKind, f64)> {
    let mut drift: Vec<(ElementKind, f64)> = reference_counts
        .iter()
        .filter_map(|(&kind, &reference_count)| {
            if reference_count == 0 {
                return None;
            }
            let final_count = *final_counts.get(&kind).unwrap_or(&0);
            let fraction = (final_count as f64 - reference_count as f64).abs() / reference_count as f64;
            (fraction > 0.10).then_some((kind, fraction))
        })
        .collect();
    drift.sort_by_key(|(kind, _)| *kind);
    drift
}
