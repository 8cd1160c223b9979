use async_trait::async_trait;
use image::RgbImage;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;

use crate::adapters::onnx::yolo_engine::OnnxYoloEngine;
use crate::application::ports::{ModelLoaderPort, VisionModelPort};
use crate::domain::detection::RawPrediction;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::model::{ModelId, YoloParams};

pub fn validate_model(model: &ModelId) -> DomainResult<()> {
    if model.onnx_path.trim().is_empty() {
        return Err(DomainError::InvalidInput("onnx_path empty".into()));
    }
    if !Path::new(&model.onnx_path).exists() {
        return Err(DomainError::NotFound(format!("model file not found: {}", model.onnx_path)));
    }
    Ok(())
}

/// Carga un modelo YOLO exportado a ONNX.
pub struct OnnxModelLoader {
    model: ModelId,
    params: YoloParams,
}

impl OnnxModelLoader {
    pub fn new(model: ModelId, params: YoloParams) -> Self {
        Self { model, params }
    }
}

#[async_trait]
impl ModelLoaderPort for OnnxModelLoader {
    async fn load(&self) -> DomainResult<Arc<dyn VisionModelPort>> {
        validate_model(&self.model).map_err(|e| DomainError::ModelLoad(e.to_string()))?;

        let path = self.model.onnx_path.clone();
        let engine = tokio::task::spawn_blocking(move || OnnxYoloEngine::load(&path))
            .await
            .map_err(|e| DomainError::ModelLoad(e.to_string()))?
            .map_err(|e| DomainError::ModelLoad(format!("{}: {e:#}", self.model.onnx_path)))?;

        info!("Modelo {} listo ({})", self.model.name, self.model.onnx_path);
        Ok(Arc::new(OnnxVisionModel {
            engine: Arc::new(Mutex::new(engine)),
            params: self.params.clone(),
        }))
    }
}

/// La sesión ONNX es síncrona: cada inferencia corre en el pool bloqueante.
pub struct OnnxVisionModel {
    engine: Arc<Mutex<OnnxYoloEngine>>,
    params: YoloParams,
}

#[async_trait]
impl VisionModelPort for OnnxVisionModel {
    async fn detect(&self, frame: &RgbImage) -> DomainResult<Vec<RawPrediction>> {
        let engine = self.engine.clone();
        let params = self.params.clone();
        let frame = frame.clone();

        tokio::task::spawn_blocking(move || {
            let mut engine = engine
                .lock()
                .map_err(|_| DomainError::Inference("motor ONNX envenenado".into()))?;
            engine
                .infer(&frame, &params)
                .map_err(|e| DomainError::Inference(format!("{e:#}")))
        })
        .await
        .map_err(|e| DomainError::Inference(e.to_string()))?
    }
}
