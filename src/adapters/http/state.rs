use std::sync::Arc;
use tokio::sync::broadcast;

use crate::adapters::sink::BroadcastSink;
use crate::application::services::DetectionSession;
use crate::config::AppConfig;

/// Estado compartido para los manejadores HTTP de Axum.
#[derive(Clone)]
pub struct HttpState {
    /// Sesión de detección en vivo (caso de uso principal).
    pub session: Arc<DetectionSession>,
    /// Detecciones por frame, publicadas por el callback del anfitrión.
    pub detections: Arc<BroadcastSink>,
    /// Frames anotados en JPEG.
    pub frames: broadcast::Sender<Vec<u8>>,
    pub config: Arc<AppConfig>,
}
