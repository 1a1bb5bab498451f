use crate::{Error, Result};

/// Outputs of one inference call: four parallel buffers of fixed capacity plus the
/// number of valid candidates. Slots at or past `count` are never read.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDetectionSet {
    boxes: Box<[[f32; 4]]>,
    class_ids: Box<[f32]>,
    scores: Box<[f32]>,
    count: usize,
}

impl RawDetectionSet {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            boxes: vec![[0.0; 4]; capacity].into_boxed_slice(),
            class_ids: vec![0.0; capacity].into_boxed_slice(),
            scores: vec![0.0; capacity].into_boxed_slice(),
            count: 0,
        }
    }

    /// Builds a set from flat model outputs: `locations` holds `[ymin, xmin, ymax, xmax]`
    /// per candidate, `num_detections` is the float-encoded count.
    pub fn from_tensors(
        capacity: usize,
        locations: &[f32],
        classes: &[f32],
        scores: &[f32],
        num_detections: f32,
    ) -> Result<Self> {
        if locations.len() < 4 * capacity || classes.len() < capacity || scores.len() < capacity {
            return Err(Error::Inference(format!(
                "output tensors too small for {} candidates: {} locations, {} classes, {} scores",
                capacity,
                locations.len(),
                classes.len(),
                scores.len()
            )));
        }
        let mut raw = Self::with_capacity(capacity);
        for (index, bbox) in raw.boxes.iter_mut().enumerate() {
            bbox.copy_from_slice(&locations[4 * index..4 * index + 4]);
        }
        raw.class_ids.copy_from_slice(&classes[..capacity]);
        raw.scores.copy_from_slice(&scores[..capacity]);
        raw.set_count(num_detections);
        Ok(raw)
    }

    /// Stores the model's float count, clamped into `0..=capacity`.
    pub fn set_count(&mut self, num_detections: f32) {
        let count = if num_detections.is_finite() && num_detections > 0.0 {
            num_detections as usize
        } else {
            0
        };
        if count > self.capacity() {
            tracing::warn!("model reported {} detections, capacity is {}", count, self.capacity());
        }
        self.count = count.min(self.capacity());
    }

    /// Writes slot `index`; returns false if it is past capacity.
    pub fn set(&mut self, index: usize, bbox: [f32; 4], class_id: f32, score: f32) -> bool {
        if index >= self.capacity() {
            return false;
        }
        self.boxes[index] = bbox;
        self.class_ids[index] = class_id;
        self.scores[index] = score;
        true
    }

    pub fn capacity(&self) -> usize {
        self.scores.len()
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn bbox(&self, index: usize) -> [f32; 4] {
        self.boxes[index]
    }

    pub fn class_id(&self, index: usize) -> f32 {
        self.class_ids[index]
    }

    pub fn score(&self, index: usize) -> f32 {
        self.scores[index]
    }
}
