mod adapters;
mod application;
mod config;
mod domain;

use clap::Parser;
use std::sync::Arc;
use tower_http::services::ServeDir;

use crate::adapters::{
    canvas::ImageCanvas,
    http::{router, state::HttpState},
    onnx::model_catalog::OnnxModelLoader,
    scheduler::FrameCadenceScheduler,
    sink::BroadcastSink,
    v4l2::capture::V4l2CaptureSource,
};
use crate::application::services::{DetectionSession, SessionPorts};
use crate::config::AppConfig;
use crate::domain::classifier::WasteClassifier;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Inicializar logs (RUST_LOG=info por defecto)
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let config = Arc::new(AppConfig::parse());
    tracing::info!("🔧 Inicializando adaptadores de infraestructura...");

    // 2. Adaptadores (Capa de Infraestructura)
    let mut canvas = ImageCanvas::new(config.width, config.height);
    if let Some(font) = &config.font {
        canvas = canvas.with_font_file(font)?;
    } else {
        tracing::warn!("Sin --font: las etiquetas del overlay se dibujan sin texto");
    }
    let frames = canvas.frames();
    let sink = Arc::new(BroadcastSink::new(16));

    let ports = SessionPorts {
        loader: Arc::new(OnnxModelLoader::new(config.model(), config.yolo())),
        capture: Arc::new(V4l2CaptureSource::new(config.capture())),
        scheduler: Arc::new(FrameCadenceScheduler::new(config.refresh_hz)),
        sink: sink.clone(),
        surface: Box::new(canvas),
    };

    // 3. Caso de uso: sesión de detección en vivo
    let classifier = Arc::new(WasteClassifier::default());
    let session = Arc::new(DetectionSession::new(ports, classifier, config.detector()));

    // 4. Estado de la API
    let state = HttpState {
        session: session.clone(),
        detections: sink,
        frames,
        config: config.clone(),
    };

    let app = router(state)
        .fallback_service(ServeDir::new(&config.static_dir));

    // 5. Lanzar el Servidor
    tracing::info!("🚀 Panel de residuos en http://{}", config.listen);
    tracing::info!("📂 Archivos estáticos servidos desde '{}'", config.static_dir);

    let listener = tokio::net::TcpListener::bind(&config.listen).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    // La cámara se libera también al salir con Ctrl+C.
    session.stop();
    Ok(())
}
