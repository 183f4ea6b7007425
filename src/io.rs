//! I/O periphery: typed traits the core consumes from/yields to, plus a
//! JSON-file implementation sufficient for tests and the CLI. A real binary
//! CAD format reader is out of scope; an implementer adds another
//! `ModelSource` without touching the core.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AlignError, AlignResult};
use crate::model::{AlignedVertex, Element, ElementKind, GeometryKind, Vertex};
use crate::rules::ObjectEdit;

/// Yields the elements (with their owned vertices) the pipeline consumes
pub trait ModelSource {
    fn elements(&self) -> AlignResult<Vec<Element>>;
}

/// Receives the pipeline's aligned vertices and object edits
pub trait ModelSink {
    fn apply(&mut self, aligned: &[AlignedVertex], edits: &[ObjectEdit]) -> AlignResult<()>;
}

/// On-disk JSON mirror of `(Element, [Vertex])`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonModel {
    pub elements: Vec<Element>,
}

/// Wire shape of an element before its `kind`/`geometry_kind` tags are
/// checked against the discriminated set. Kept separate from [`Element`] so
/// an unrecognized tag surfaces as `AlignError::InvalidInput` rather than a
/// raw `serde_json` parse failure.
#[derive(Debug, Clone, Deserialize)]
struct RawElement {
    id: u64,
    name: String,
    kind: String,
    geometry_kind: String,
    #[serde(default)]
    vertices: Vec<Vertex>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawJsonModel {
    elements: Vec<RawElement>,
}

impl TryFrom<RawElement> for Element {
    type Error = AlignError;

    fn try_from(raw: RawElement) -> Result<Self, Self::Error> {
        let kind = ElementKind::parse(&raw.kind).ok_or_else(|| {
            AlignError::InvalidInput(raw.name.clone(), format!("unknown element kind '{}'", raw.kind))
        })?;
        let geometry_kind = GeometryKind::parse(&raw.geometry_kind).ok_or_else(|| {
            AlignError::InvalidInput(
                raw.name.clone(),
                format!("unknown geometry kind '{}'", raw.geometry_kind),
            )
        })?;
        Ok(Element::new(raw.id, &raw.name, kind, geometry_kind).with_vertices(raw.vertices))
    }
}

pub struct JsonModelSource {
    model: JsonModel,
}

impl JsonModelSource {
    pub fn from_path(path: impl AsRef<Path>) -> AlignResult<Self> {
        let file = BufReader::new(File::open(path)?);
        let raw: RawJsonModel = serde_json::from_reader(file)?;
        let elements = raw
            .elements
            .into_iter()
            .map(Element::try_from)
            .collect::<AlignResult<Vec<_>>>()?;
        Ok(Self {
            model: JsonModel { elements },
        })
    }

    pub fn from_model(model: JsonModel) -> Self {
        Self { model }
    }
}

impl ModelSource for JsonModelSource {
    fn elements(&self) -> AlignResult<Vec<Element>> {
        Ok(self.model.elements.clone())
    }
}

/// Wire representation of a synthesized/removed object, mirroring `ObjectEdit`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JsonObjectEdit {
    Remove {
        element_id: u64,
    },
    Add {
        kind: crate::model::ElementKind,
        geometry_kind: crate::model::GeometryKind,
        name: String,
        points: Vec<(f64, f64, f64)>,
        layer_hint: Option<String>,
    },
}

impl From<&ObjectEdit> for JsonObjectEdit {
    fn from(edit: &ObjectEdit) -> Self {
        match edit.clone() {
            ObjectEdit::Remove { element_id } => JsonObjectEdit::Remove { element_id },
            ObjectEdit::Add {
                kind,
                geometry_kind,
                name,
                points,
                layer_hint,
            } => JsonObjectEdit::Add {
                kind,
                geometry_kind,
                name,
                points,
                layer_hint,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct JsonOutput {
    pub aligned_vertices: Vec<AlignedVertex>,
    pub edits: Vec<JsonObjectEdit>,
}

pub struct JsonModelSink {
    path: std::path::PathBuf,
    output: JsonOutput,
}

impl JsonModelSink {
    pub fn to_path(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            output: JsonOutput::default(),
        }
    }

    pub fn into_output(self) -> JsonOutput {
        self.output
    }
}

impl ModelSink for JsonModelSink {
    fn apply(&mut self, aligned: &[AlignedVertex], edits: &[ObjectEdit]) -> AlignResult<()> {
        self.output.aligned_vertices = aligned.to_vec();
        self.output.edits = edits.iter().map(JsonObjectEdit::from).collect();
        let file = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(file, &self.output)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ElementKind, GeometryKind, Vertex};

    #[test]
    fn json_model_round_trips_elements() {
        let model = JsonModel {
            elements: vec![Element::new(1, "C1", ElementKind::Column, GeometryKind::Point)
                .with_vertices(vec![Vertex::new(1, 0, 0.0, 0.0, 0.0)])],
        };
        let json = serde_json::to_string(&model).unwrap();
        let back: JsonModel = serde_json::from_str(&json).unwrap();
        assert_eq!(back.elements.len(), 1);
        assert_eq!(back.elements[0].name, "C1");
    }

    #[test]
    fn object_edit_converts_to_wire_form() {
        let edit = ObjectEdit::Remove { element_id: 7 };
        let wire = JsonObjectEdit::from(&edit);
        matches!(wire, JsonObjectEdit::Remove { element_id: 7 });
    }

    #[test]
    fn unknown_kind_is_invalid_input() {
        let raw = RawElement {
            id: 1,
            name: "C1".to_string(),
            kind: "FOUNDATION".to_string(),
            geometry_kind: "POINT".to_string(),
            vertices: Vec::new(),
        };
        let err = Element::try_from(raw).unwrap_err();
        assert!(matches!(err, AlignError::InvalidInput(..)));
        assert_eq!(err.exit_code(), 10);
    }
}
