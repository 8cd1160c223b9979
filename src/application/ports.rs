use async_trait::async_trait;
use image::RgbImage;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::{
    detection::{BoundingBox, DetectionRecord, RawPrediction},
    errors::DomainResult,
};

/// Modelo de visión ya cargado.
#[async_trait]
pub trait VisionModelPort: Send + Sync {
    async fn detect(&self, frame: &RgbImage) -> DomainResult<Vec<RawPrediction>>;
}

/// Carga (una vez) el modelo de visión.
#[async_trait]
pub trait ModelLoaderPort: Send + Sync {
    async fn load(&self) -> DomainResult<Arc<dyn VisionModelPort>>;
}

#[async_trait]
pub trait CapturePort: Send + Sync {
    async fn acquire(&self) -> DomainResult<Box<dyn VideoSource>>;
}

/// Fuente de vídeo en exclusiva de una sesión, desde `acquire` hasta `release`.
pub trait VideoSource: Send {
    fn current_frame(&mut self) -> DomainResult<RgbImage>;
    fn release(&mut self);
}

/// Superficie de dibujo del overlay. Los colores son RGB.
pub trait DrawSurface: Send {
    fn clear(&mut self);
    fn draw_frame(&mut self, frame: &RgbImage);
    fn stroke_rect(&mut self, rect: &BoundingBox, color: [u8; 3], line_width: u32);
    fn fill_rect(&mut self, rect: &BoundingBox, color: [u8; 3]);
    fn measure_text(&self, text: &str) -> f32;
    fn fill_text(&mut self, text: &str, x: f32, y: f32, color: [u8; 3]);
    /// Se llama al terminar cada frame.
    fn present(&mut self) {}
}

/// Callback del anfitrión, una vez por frame procesado.
pub trait DetectionSink: Send + Sync {
    fn on_detection(&self, records: &[DetectionRecord]);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Siguiente frame de pantalla.
    NextFrame,
    /// Espera fija (reintento tras fallo).
    Delay(Duration),
}

#[async_trait]
pub trait SchedulerPort: Send + Sync {
    async fn wait(&self, tick: Tick);
}
