use clap::Parser;
use serde::Serialize;

use crate::adapters::v4l2::capture::CaptureConfig;
use crate::domain::model::{DetectorParams, ModelId, YoloParams};

/// Clasificador de residuos en vivo con YOLO (ONNX) y cámara V4L2.
#[derive(Debug, Clone, Parser, Serialize)]
#[command(version, about)]
pub struct AppConfig {
    /// Dispositivo de cámara.
    #[arg(long, env = "WASTE_CAMERA", default_value = "/dev/video0")]
    pub camera: String,
    #[arg(long, env = "WASTE_FOURCC", default_value = "MJPG")]
    pub fourcc: String,
    #[arg(long, env = "WASTE_WIDTH", default_value_t = 1280)]
    pub width: u32,
    #[arg(long, env = "WASTE_HEIGHT", default_value_t = 720)]
    pub height: u32,
    #[arg(long, env = "WASTE_FPS", default_value_t = 30)]
    pub fps: u32,

    /// Modelo YOLO exportado a ONNX.
    #[arg(long, env = "WASTE_MODEL", default_value = "models/yolo11n.onnx")]
    pub model_path: String,
    #[arg(long, env = "WASTE_IMGSZ", default_value_t = 640)]
    pub imgsz: u32,
    /// Corte de confianza del propio motor YOLO.
    #[arg(long, env = "WASTE_MODEL_CONF", default_value_t = 0.25)]
    pub model_conf: f32,
    #[arg(long, env = "WASTE_IOU", default_value_t = 0.45)]
    pub iou: f32,
    #[arg(long, env = "WASTE_MAX_DET", default_value_t = 100)]
    pub max_det: usize,

    /// Se descartan detecciones con confianza <= este valor.
    #[arg(long, env = "WASTE_CONFIDENCE", default_value_t = 0.3)]
    pub confidence: f32,
    /// Espera tras un fallo de inferencia, en milisegundos.
    #[arg(long, env = "WASTE_RETRY_MS", default_value_t = 100)]
    pub retry_ms: u64,
    /// Frecuencia del bucle de anotación (frames por segundo de pantalla).
    #[arg(long, env = "WASTE_REFRESH_HZ", default_value_t = 60)]
    pub refresh_hz: u32,
    /// Fuente TTF para las etiquetas del overlay.
    #[arg(long, env = "WASTE_FONT")]
    pub font: Option<String>,

    #[arg(long, env = "WASTE_LISTEN", default_value = "0.0.0.0:8090")]
    pub listen: String,
    #[arg(long, env = "WASTE_STATIC_DIR", default_value = "static")]
    pub static_dir: String,
}

impl AppConfig {
    pub fn capture(&self) -> CaptureConfig {
        CaptureConfig {
            camera_path: self.camera.clone(),
            fourcc: self.fourcc.clone(),
            width: self.width,
            height: self.height,
            fps: self.fps,
        }
    }

    pub fn model(&self) -> ModelId {
        let name = std::path::Path::new(&self.model_path)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "yolo".into());
        ModelId { name, onnx_path: self.model_path.clone() }
    }

    pub fn yolo(&self) -> YoloParams {
        YoloParams {
            input_size: self.imgsz,
            conf_threshold: self.model_conf,
            iou_threshold: self.iou,
            max_detections: self.max_det,
        }
    }

    pub fn detector(&self) -> DetectorParams {
        DetectorParams {
            confidence_threshold: self.confidence,
            retry_delay_ms: self.retry_ms,
        }
    }
}
