pub mod discretize;
pub mod emit;
pub mod group;
mod index;
pub mod outline;
pub mod primitive;
pub mod stitch;

pub mod errors {
    use dxf2mod_core::geometry::Point2;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum EngineError {
        #[error("unsupported primitive kind {kind} on layer {layer}")]
        UnsupportedPrimitiveKind { kind: String, layer: String },
        #[error("unclosed shape on layer {layer} at {location}")]
        UnclosedShape { layer: String, location: Point2 },
        #[error("ambiguous junction on layer {layer} at {location}: {candidates} primitives meet there")]
        AmbiguousJunction {
            layer: String,
            location: Point2,
            candidates: usize,
        },
        #[error("invalid arc on layer {layer}: {reason}")]
        InvalidArc { layer: String, reason: String },
        #[error("tolerance must be a positive finite number (got {0})")]
        InvalidTolerance(f64),
    }
}

pub use errors::EngineError;
pub use outline::{LayerOutline, trace_outlines};
pub use stitch::{Loop, StitchOptions, Stitcher, stitch_layer};
