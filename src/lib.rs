//! axis-align - canonical axis discovery and snap-alignment engine for
//! structural 3D models
//!
//! This library implements the alignment pipeline described for the
//! reference structural dataset: discovering canonical X/Y axis-line
//! positions from a raw vertex cloud, resolving each element's distinct
//! endpoint positions, snapping every vertex onto the discovered grid with a
//! two-tier tolerance policy, and applying the object-level transformation
//! rules (slab removal/consolidation, wall simplification, support
//! placement, centerline and grid-line emission) that follow from it.
//!
//! ## Example
//! ```rust
//! use axis_align::prelude::*;
//!
//! let config = AlignmentConfig::default();
//! let pipeline = AlignmentPipeline::new(config);
//!
//! let column = Element::new(1, "C1", ElementKind::Column, GeometryKind::Point)
//!     .with_vertices(vec![
//!         Vertex::new(1, 0, -39.700, 22.500, -4.44),
//!         Vertex::new(1, 1, -39.700, 22.500, -1.56),
//!         Vertex::new(1, 2, -39.700, 22.500, 2.12),
//!     ]);
//!
//! let output = pipeline.run(&[column], ReferenceInputs::default()).unwrap();
//! assert_eq!(output.aligned.len(), 3);
//! ```

pub mod config;
pub mod discovery;
pub mod endpoint;
pub mod error;
pub mod geometry;
pub mod io;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod rules;
pub mod snap;
pub mod validator;

pub mod prelude {
    pub use crate::config::AlignmentConfig;
    pub use crate::error::{AlignError, AlignResult};
    pub use crate::model::{
        AlignedVertex, AxisKind, AxisLine, Element, ElementKind, FloorLadder, GeometryKind, Vertex,
    };
    pub use crate::pipeline::{AlignmentPipeline, PipelineOutput, ReferenceInputs};
    pub use crate::report::AlignmentReport;
    pub use crate::rules::ObjectEdit;
}
