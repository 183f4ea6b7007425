//! Core data model: elements, vertices, axis lines and the floor ladder

mod axis;
mod element;
mod floor;
mod kind;
mod vertex;

pub use axis::AxisLine;
pub use element::Element;
pub use floor::{FloorLadder, FloorSpan};
pub use kind::{AxisKind, ElementKind, GeometryKind};
pub use vertex::{AlignedVertex, Vertex};
