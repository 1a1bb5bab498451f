use serde::Serialize;

use crate::app::config::{DetectorConfig, UnknownClassPolicy};
use crate::pipeline::labels::LabelTable;
use crate::pipeline::raw::RawDetectionSet;
use crate::{Error, Result};

/// Axis-aligned box in the original image's pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub xmin: f32,
    pub ymin: f32,
    pub xmax: f32,
    pub ymax: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionResult {
    pub location: Rect,
    pub label: String,
    pub confidence: f32,
}

pub type Detections = Vec<DetectionResult>;

pub fn to_json(dets: &[DetectionResult]) -> serde_json::Result<String> {
    serde_json::to_string(dets)
}

#[derive(Debug, Clone, Copy)]
pub struct DetectionDecoder {
    threshold: f32,
    clamp_boxes: bool,
    unknown_class: UnknownClassPolicy,
}

impl DetectionDecoder {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            clamp_boxes: false,
            unknown_class: UnknownClassPolicy::default(),
        }
    }

    pub fn from_config(config: &DetectorConfig) -> Self {
        Self::new(config.threshold)
            .clamp_boxes(config.clamp_boxes)
            .unknown_class(config.unknown_class)
    }

    pub fn clamp_boxes(mut self, clamp: bool) -> Self {
        self.clamp_boxes = clamp;
        self
    }

    pub fn unknown_class(mut self, policy: UnknownClassPolicy) -> Self {
        self.unknown_class = policy;
        self
    }

    /// Keeps candidates scoring strictly above the threshold, in raw order. No
    /// suppression is done here; the model is expected to have already done it.
    pub fn decode(
        &self,
        raw: &RawDetectionSet,
        image_width: u32,
        image_height: u32,
        labels: &LabelTable,
    ) -> Result<Detections> {
        let width = image_width as f32;
        let height = image_height as f32;
        let mut detections = Detections::new();

        for index in 0..raw.count() {
            let score = raw.score(index);
            if score <= self.threshold {
                continue;
            }

            let class_id = raw.class_id(index);
            let label = match labels.resolve(class_id) {
                Some(label) => label,
                None => match self.unknown_class {
                    UnknownClassPolicy::Skip => {
                        tracing::warn!("skipping candidate {index}: class {class_id} has no label");
                        continue;
                    }
                    UnknownClassPolicy::Fail => {
                        return Err(Error::UnknownClassId {
                            class_id,
                            labels: labels.len(),
                        });
                    }
                },
            };

            let [ymin, xmin, ymax, xmax] = raw.bbox(index);
            let mut location = Rect {
                xmin: xmin * width,
                ymin: ymin * height,
                xmax: xmax * width,
                ymax: ymax * height,
            };
            if self.clamp_boxes {
                location = Rect {
                    xmin: location.xmin.clamp(0.0, width),
                    ymin: location.ymin.clamp(0.0, height),
                    xmax: location.xmax.clamp(0.0, width),
                    ymax: location.ymax.clamp(0.0, height),
                };
            }

            tracing::trace!(
                "det {label} with score {score} at {},{} - {},{}",
                location.xmin,
                location.ymin,
                location.xmax,
                location.ymax
            );
            detections.push(DetectionResult {
                location,
                label: label.to_string(),
                confidence: score,
            });
        }

        Ok(detections)
    }
}
