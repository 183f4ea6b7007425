//! AlignmentPipeline - orchestrates the six-stage alignment pipeline

use std::collections::{HashMap, HashSet};

use log::info;

use crate::config::AlignmentConfig;
use crate::discovery;
use crate::error::{AlignError, AlignResult};
use crate::model::{AlignedVertex, AxisKind, AxisLine, Element, ElementKind};
use crate::report::AlignmentReport;
use crate::rules::{self, ObjectEdit};
use crate::snap;
use crate::validator::{self, ValidationWarnings};

/// Everything the pipeline produced from one run
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub aligned: Vec<AlignedVertex>,
    pub edits: Vec<ObjectEdit>,
    pub x_lines: Vec<AxisLine>,
    pub y_lines: Vec<AxisLine>,
    pub report: AlignmentReport,
}

/// Optional second input set supplying known-good axis positions and/or a
/// previously aligned vertex stream, used only by the reference-driven
/// axis top-up pass and the reference-comparison checks; entirely absent in
/// the common case.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReferenceInputs<'a> {
    pub x_axis_positions: Option<&'a [f64]>,
    pub y_axis_positions: Option<&'a [f64]>,
    pub aligned: Option<&'a [AlignedVertex]>,
    /// Reference model's own elements, used only for the per-kind
    /// object-count drift check
    pub elements: Option<&'a [Element]>,
}

/// The axis-discovery, snap and object-rule engine, built once per set of
/// tunables and reused across runs
#[derive(Debug, Clone)]
pub struct AlignmentPipeline {
    config: AlignmentConfig,
}

impl AlignmentPipeline {
    pub fn new(config: AlignmentConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AlignmentConfig {
        &self.config
    }

    /// Run the full pipeline: validate input, discover axes, snap every
    /// vertex, apply the seven object rules, then validate the output.
    pub fn run(&self, elements: &[Element], reference: ReferenceInputs<'_>) -> AlignResult<PipelineOutput> {
        self.validate_input(elements)?;

        let all_vertices: Vec<_> = elements.iter().flat_map(|e| e.vertices.iter().copied()).collect();
        info!(
            "ingested {} elements, {} vertices",
            elements.len(),
            all_vertices.len()
        );

        let x_lines = discovery::discover_axis(
            &all_vertices,
            AxisKind::X,
            &self.config,
            reference.x_axis_positions,
        )?;
        let y_lines = discovery::discover_axis(
            &all_vertices,
            AxisKind::Y,
            &self.config,
            reference.y_axis_positions,
        )?;

        let (aligned, snap_stats) = snap::snap_all(elements, &x_lines, &y_lines, &self.config);
        info!(
            "snapped {} vertices ({} escalated, {} unsnapped)",
            aligned.len(),
            snap_stats.escalated,
            snap_stats.unsnapped
        );

        let (edits, rule_stats) = rules::apply_rules(elements, &aligned, &x_lines, &y_lines, &self.config);
        info!("object rules produced {} edits", edits.len());

        let endpoints_by_element = snap::endpoints_for(elements, &self.config);
        let mut warnings: ValidationWarnings = validator::validate(
            elements,
            &aligned,
            &endpoints_by_element,
            &x_lines,
            &y_lines,
            &self.config,
        )?;

        if let Some(reference_aligned) = reference.aligned {
            warnings.reference_match_fraction =
                Some(validator::compare_to_reference(&aligned, reference_aligned));
        }

        if let Some(refs) = reference.x_axis_positions {
            let (recall, missing) = discovery::recall_against(&x_lines, refs, self.config.rounding_precision);
            warnings.x_axis_recall = Some(recall);
            warnings
                .missing_reference_positions
                .extend(missing.into_iter().map(|p| (AxisKind::X, p)));
        }
        if let Some(refs) = reference.y_axis_positions {
            let (recall, missing) = discovery::recall_against(&y_lines, refs, self.config.rounding_precision);
            warnings.y_axis_recall = Some(recall);
            warnings
                .missing_reference_positions
                .extend(missing.into_iter().map(|p| (AxisKind::Y, p)));
        }

        if let Some(reference_elements) = reference.elements {
            let final_counts = final_kind_counts(elements, &edits);
            let reference_counts = kind_counts(reference_elements);
            warnings.object_count_drift = validator::object_count_drift(&final_counts, &reference_counts);
        }

        let report =
            AlignmentReport::build(&aligned, &x_lines, &y_lines, rule_stats, snap_stats, warnings);

        Ok(PipelineOutput {
            aligned,
            edits,
            x_lines,
            y_lines,
            report,
        })
    }

    fn validate_input(&self, elements: &[Element]) -> AlignResult<()> {
        let mut seen_ids = HashSet::new();
        for element in elements {
            if !seen_ids.insert(element.id) {
                return Err(AlignError::DuplicateElementId(element.id));
            }
            for v in &element.vertices {
                if !v.is_finite() {
                    return Err(AlignError::NonFiniteCoordinate(
                        element.name.clone(),
                        v.vertex_index,
                    ));
                }
            }
        }
        Ok(())
    }
}

fn kind_counts(elements: &[Element]) -> HashMap<ElementKind, usize> {
    let mut counts = HashMap::new();
    for e in elements {
        *counts.entry(e.kind).or_insert(0) += 1;
    }
    counts
}

/// Count elements by kind after the object-transform edits are applied:
/// a removed id drops its original kind's count, an added edit contributes
/// the kind it carries.
fn final_kind_counts(elements: &[Element], edits: &[ObjectEdit]) -> HashMap<ElementKind, usize> {
    let kind_by_id: HashMap<u64, ElementKind> = elements.iter().map(|e| (e.id, e.kind)).collect();
    let mut counts = kind_counts(elements);
    for edit in edits {
        match edit {
            ObjectEdit::Remove { element_id } => {
                if let Some(kind) = kind_by_id.get(element_id) {
                    if let Some(count) = counts.get_mut(kind) {
                        *count = count.saturating_sub(1);
                    }
                }
            }
            ObjectEdit::Add { kind, .. } => {
                *counts.entry(*kind).or_insert(0) += 1;
            }
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ElementKind, GeometryKind, Vertex};

    fn multi_floor_column(id: u64, name: &str, x: f64, y: f64) -> Element {
        let zs = [-4.44, -1.56, 2.12, 5.48];
        Element::new(id, name, ElementKind::Column, GeometryKind::Point).with_vertices(
            zs.iter()
                .enumerate()
                .map(|(i, &z)| Vertex::new(id, i, x, y, z))
                .collect(),
        )
    }

    #[test]
    fn single_column_scenario_aligns_to_discovered_axes() {
        let cfg = AlignmentConfig::default().with_min_floors(3);
        let pipeline = AlignmentPipeline::new(cfg);
        let elements = vec![multi_floor_column(1, "C1", -39.700, 22.500)];

        let output = pipeline.run(&elements, ReferenceInputs::default()).unwrap();
        assert_eq!(output.x_lines.len(), 1);
        assert_eq!(output.y_lines.len(), 1);
        for av in &output.aligned {
            assert_eq!(av.aligned_x, -39.700);
            assert_eq!(av.aligned_y, 22.500);
            assert_eq!(av.aligned_z, av.original_z);
        }
    }

    #[test]
    fn non_finite_vertex_is_rejected() {
        let cfg = AlignmentConfig::default();
        let pipeline = AlignmentPipeline::new(cfg);
        let bad = Element::new(1, "C1", ElementKind::Column, GeometryKind::Point)
            .with_vertices(vec![Vertex::new(1, 0, f64::NAN, 0.0, 0.0)]);
        let err = pipeline.run(&[bad], ReferenceInputs::default()).unwrap_err();
        assert!(matches!(err, AlignError::NonFiniteCoordinate(..)));
    }

    #[test]
    fn duplicate_element_id_is_rejected() {
        let cfg = AlignmentConfig::default();
        let pipeline = AlignmentPipeline::new(cfg);
        let elements = vec![
            Element::new(1, "A", ElementKind::Column, GeometryKind::Point),
            Element::new(1, "B", ElementKind::Column, GeometryKind::Point),
        ];
        let err = pipeline.run(&elements, ReferenceInputs::default()).unwrap_err();
        assert!(matches!(err, AlignError::DuplicateElementId(1)));
        assert_eq!(err.exit_code(), 10);
    }

    #[test]
    fn idempotent_on_its_own_output() {
        let cfg = AlignmentConfig::default().with_min_floors(3);
        let pipeline = AlignmentPipeline::new(cfg);
        let elements = vec![
            multi_floor_column(1, "C1", -39.700, 22.500),
            multi_floor_column(2, "C2", -39.702, 22.498),
            multi_floor_column(3, "C3", -39.699, 22.501),
        ];

        let first = pipeline.run(&elements, ReferenceInputs::default()).unwrap();

        let realigned_elements: Vec<Element> = elements
            .iter()
            .map(|e| {
                let vertices = first
                    .aligned
                    .iter()
                    .filter(|av| av.element_id == e.id)
                    .map(|av| Vertex::new(av.element_id, av.vertex_index, av.aligned_x, av.aligned_y, av.aligned_z))
                    .collect();
                Element::new(e.id, &e.name, e.kind, e.geometry_kind).with_vertices(vertices)
            })
            .collect();

        let second = pipeline.run(&realigned_elements, ReferenceInputs::default()).unwrap();
        for av in &second.aligned {
            assert!(av.displacement() < 1e-9);
        }
    }
}
