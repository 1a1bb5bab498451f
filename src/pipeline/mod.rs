mod decode;
pub use decode::{to_json, DetectionDecoder, DetectionResult, Detections, Rect};

mod detector;
pub use detector::MaskDetector;

mod engine;
pub use engine::InferenceEngine;

mod labels;
pub use labels::LabelTable;

mod preprocess;
pub use preprocess::{ImagePreprocessor, NormalizedTensor};

mod raw;
pub use raw::RawDetectionSet;

#[cfg(feature = "tflite")]
mod tflite_engine;
#[cfg(feature = "tflite")]
pub use tflite_engine::TFLiteEngine;

mod summarize;
pub use summarize::{summarize_detections, summary_json, DetectionSummary};
