//! Face mask detection on still images.
//!
//! An image is stretched to the model's square input, normalized, pushed through an
//! [`pipeline::InferenceEngine`] and the engine's fixed-shape outputs are decoded into
//! labeled boxes in the original image's pixel space.

pub mod app;
pub mod pipeline;

mod error;
pub use error::{Error, Result};

pub use pipeline::{DetectionResult, Detections, MaskDetector, Rect};
