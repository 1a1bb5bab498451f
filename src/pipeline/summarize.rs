use std::collections::BTreeMap;

use crate::pipeline::decode::DetectionResult;
use crate::pipeline::labels::LabelTable;

// Returns <label, instance count>
pub type DetectionSummary = BTreeMap<String, u32>;

/// Counts detections per label. Every label in the table is present, zero if unseen.
pub fn summarize_detections(dets: &[DetectionResult], labels: &LabelTable) -> DetectionSummary {
    let mut dets_out: DetectionSummary =
        labels.iter().map(|label| (label.to_string(), 0)).collect();
    for det in dets {
        *dets_out.entry(det.label.clone()).or_insert(0) += 1;
    }
    dets_out
}

pub fn summary_json(summary: &DetectionSummary) -> serde_json::Result<String> {
    serde_json::to_string(summary)
}
