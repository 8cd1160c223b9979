use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelId {
    pub name: String,       // logical name, e.g. "yolo11n"
    pub onnx_path: String,  // filesystem path
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YoloParams {
    pub input_size: u32,        // 640 typical
    pub conf_threshold: f32,    // 0..1, corte propio del motor
    pub iou_threshold: f32,     // 0..1
    pub max_detections: usize,  // e.g. 100
}

impl Default for YoloParams {
    fn default() -> Self {
        Self {
            input_size: 640,
            conf_threshold: 0.25,
            iou_threshold: 0.45,
            max_detections: 100,
        }
    }
}

/// Parámetros del bucle de anotación.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorParams {
    /// Se descartan predicciones con score <= este valor.
    pub confidence_threshold: f32,
    /// Espera antes de reintentar tras un fallo de inferencia.
    pub retry_delay_ms: u64,
}

impl DetectorParams {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.3,
            retry_delay_ms: 100,
        }
    }
}
