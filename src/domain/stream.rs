use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use super::detection::{DetectionRecord, DetectionStats};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Detecting,
}

/// Resultado de un frame tal como se envía al panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameMeta {
    pub detections: Vec<DetectionRecord>,
    pub stats: DetectionStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsFrameMetaMessage {
    pub r#type: String,
    pub meta: FrameMeta,
}

pub fn summarize_records(records: &[DetectionRecord]) -> String {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(record.label.as_str()).or_insert(0) += 1;
    }
    counts.iter()
        .map(|(label, count)| format!("{} {}", count, label))
        .collect::<Vec<_>>()
        .join(", ")
}
