use tokio::sync::broadcast;

use crate::application::ports::DetectionSink;
use crate::domain::{
    detection::{DetectionRecord, DetectionStats},
    stream::FrameMeta,
};

/// Publica el resultado de cada frame para los clientes del panel.
pub struct BroadcastSink {
    tx: broadcast::Sender<FrameMeta>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FrameMeta> {
        self.tx.subscribe()
    }
}

impl DetectionSink for BroadcastSink {
    fn on_detection(&self, records: &[DetectionRecord]) {
        if self.tx.receiver_count() == 0 {
            return;
        }
        let meta = FrameMeta {
            detections: records.to_vec(),
            stats: DetectionStats::from_records(records),
        };
        let _ = self.tx.send(meta);
    }
}
