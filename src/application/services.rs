use image::RgbImage;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, TryLockError};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::{
    application::{
        overlay::OverlayRenderer,
        ports::{
            CapturePort, DetectionSink, DrawSurface, ModelLoaderPort, SchedulerPort, Tick,
            VideoSource, VisionModelPort,
        },
    },
    domain::{
        classifier::WasteClassifier,
        detection::{DetectionRecord, DetectionStats, RawPrediction},
        errors::{DomainError, DomainResult},
        model::DetectorParams,
        stream::{summarize_records, SessionState},
    },
};

/// Colaboradores externos de una sesión.
pub struct SessionPorts {
    pub loader: Arc<dyn ModelLoaderPort>,
    pub capture: Arc<dyn CapturePort>,
    pub scheduler: Arc<dyn SchedulerPort>,
    pub sink: Arc<dyn DetectionSink>,
    pub surface: Box<dyn DrawSurface>,
}

struct Lifecycle {
    state: SessionState,
    /// Cambia en cada `start` y en cada `stop`.
    generation: u64,
    source: Option<Arc<SharedSource>>,
    surface: Box<dyn DrawSurface>,
}

impl Lifecycle {
    fn is_current(&self, generation: u64) -> bool {
        self.state == SessionState::Detecting && self.generation == generation
    }
}

/// Cámara compartida entre el bucle y las instantáneas. Leer un frame puede
/// bloquear hasta que llegue el siguiente, así que vive fuera del candado
/// del ciclo de vida.
struct SharedSource {
    source: Mutex<Box<dyn VideoSource>>,
    released: AtomicBool,
}

impl SharedSource {
    fn new(source: Box<dyn VideoSource>) -> Self {
        Self {
            source: Mutex::new(source),
            released: AtomicBool::new(false),
        }
    }

    fn read(&self) -> DomainResult<RgbImage> {
        let frame = {
            let mut source = self.lock();
            if self.released.load(Ordering::SeqCst) {
                return Err(DomainError::Capture("cámara liberada".into()));
            }
            source.current_frame()
        };
        // Un `release` durante la lectura no pudo tomar la cámara: se libera aquí.
        if self.released.load(Ordering::SeqCst) {
            self.lock().release();
        }
        frame
    }

    /// No espera a una lectura en curso; en ese caso libera quien lee.
    fn release(&self) {
        self.released.store(true, Ordering::SeqCst);
        match self.source.try_lock() {
            Ok(mut source) => source.release(),
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner().release(),
            Err(TryLockError::WouldBlock) => {}
        }
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn VideoSource>> {
        self.source.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Sesión de detección en vivo: captura → inferencia → clasificación → overlay.
///
/// Solo hay una inferencia en vuelo; la siguiente iteración se planifica cuando
/// termina la anterior. Tras `stop` ningún resultado tardío dibuja, notifica ni
/// acumula: cada iteración comprueba su generación bajo el candado del ciclo de vida.
/// La lectura de la cámara y la inferencia corren sin ese candado, así que
/// `stop` y `state` responden aunque la cámara tarde.
///
/// El `DetectionSink` se invoca con ese candado tomado, así que puede leer
/// `stats`/`records` pero no debe llamar a `start`, `stop` ni `capture_image`.
pub struct DetectionSession {
    loader: Arc<dyn ModelLoaderPort>,
    capture: Arc<dyn CapturePort>,
    scheduler: Arc<dyn SchedulerPort>,
    sink: Arc<dyn DetectionSink>,
    classifier: Arc<WasteClassifier>,
    params: DetectorParams,
    model: OnceCell<Arc<dyn VisionModelPort>>,
    lifecycle: Mutex<Lifecycle>,
    records: Mutex<Vec<DetectionRecord>>,
}

impl DetectionSession {
    pub fn new(ports: SessionPorts, classifier: Arc<WasteClassifier>, params: DetectorParams) -> Self {
        Self {
            loader: ports.loader,
            capture: ports.capture,
            scheduler: ports.scheduler,
            sink: ports.sink,
            classifier,
            params,
            model: OnceCell::new(),
            lifecycle: Mutex::new(Lifecycle {
                state: SessionState::Idle,
                generation: 0,
                source: None,
                surface: ports.surface,
            }),
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn classifier(&self) -> &WasteClassifier {
        &self.classifier
    }

    pub fn params(&self) -> &DetectorParams {
        &self.params
    }

    pub fn state(&self) -> SessionState {
        self.lock_lifecycle().state
    }

    /// Idle → Detecting. Carga el modelo la primera vez y adquiere la cámara.
    /// Los fallos de carga o de cámara se propagan y la sesión sigue en Idle.
    ///
    /// Un `stop` que llega mientras se carga el modelo o se abre la cámara
    /// cancela el arranque: la cámara se libera y la sesión queda en Idle.
    pub async fn start(self: &Arc<Self>) -> DomainResult<()> {
        let ticket = {
            let lc = self.lock_lifecycle();
            if lc.state == SessionState::Detecting {
                return Ok(());
            }
            lc.generation
        };

        let model = self
            .model
            .get_or_try_init(|| async {
                info!("Cargando modelo de visión...");
                let model = self.loader.load().await?;
                info!("Modelo cargado");
                Ok::<_, DomainError>(model)
            })
            .await?
            .clone();

        let mut source = self.capture.acquire().await?;

        let generation = {
            let mut lc = self.lock_lifecycle();
            if lc.state == SessionState::Detecting {
                // Otro `start` ganó la carrera mientras esperábamos.
                source.release();
                return Ok(());
            }
            if lc.generation != ticket {
                info!("Arranque cancelado por un stop intermedio");
                source.release();
                return Ok(());
            }
            lc.generation += 1;
            lc.state = SessionState::Detecting;
            lc.source = Some(Arc::new(SharedSource::new(source)));
            lc.generation
        };

        info!("Detección iniciada (sesión {})", generation);
        let this = Arc::clone(self);
        tokio::spawn(async move { this.run_loop(generation, model).await });
        Ok(())
    }

    /// Detecting → Idle. Libera la cámara, vacía la lista y borra el overlay.
    pub fn stop(&self) {
        {
            let mut lc = self.lock_lifecycle();
            if lc.state == SessionState::Detecting {
                info!("Detección detenida (sesión {})", lc.generation);
            }
            lc.state = SessionState::Idle;
            lc.generation += 1;
            if let Some(source) = lc.source.take() {
                source.release();
            }
            lc.surface.clear();
            lc.surface.present();
        }
        self.lock_records().clear();
    }

    /// Procesa las predicciones de un frame: filtra, clasifica, dibuja,
    /// acumula y notifica al anfitrión.
    pub fn on_frame(&self, frame: &RgbImage, predictions: &[RawPrediction]) -> Vec<DetectionRecord> {
        let mut lc = self.lock_lifecycle();
        self.apply_frame(&mut lc, frame, predictions)
    }

    /// Conteo por categoría de la sesión actual, recalculado en cada llamada.
    pub fn stats(&self) -> DetectionStats {
        DetectionStats::from_records(&self.lock_records())
    }

    pub fn records(&self) -> Vec<DetectionRecord> {
        self.lock_records().clone()
    }

    /// Instantánea JPEG del frame actual de la cámara.
    pub fn capture_image(&self, quality: u8) -> DomainResult<Vec<u8>> {
        let source = self
            .lock_lifecycle()
            .source
            .clone()
            .ok_or_else(|| DomainError::OperationFailed("no hay cámara activa".into()))?;
        let frame = source.read()?;

        let mut jpeg = Vec::new();
        let mut enc = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg, quality);
        enc.encode(frame.as_raw(), frame.width(), frame.height(), image::ExtendedColorType::Rgb8)
            .map_err(|e| DomainError::OperationFailed(format!("Error codificando JPEG: {e}")))?;
        Ok(jpeg)
    }

    async fn run_loop(self: Arc<Self>, generation: u64, model: Arc<dyn VisionModelPort>) {
        loop {
            let tick = match self.iterate(generation, model.as_ref()).await {
                Some(Ok(())) => Tick::NextFrame,
                Some(Err(e)) => {
                    warn!("Error detectando objetos: {}", e);
                    Tick::Delay(self.params.retry_delay())
                }
                None => break,
            };

            if !self.lock_lifecycle().is_current(generation) {
                break;
            }
            self.scheduler.wait(tick).await;
        }
        debug!("Bucle de detección terminado (sesión {})", generation);
    }

    /// Una pasada de inferencia. `None` si la sesión ya no está activa.
    async fn iterate(&self, generation: u64, model: &dyn VisionModelPort) -> Option<DomainResult<()>> {
        let source = {
            let lc = self.lock_lifecycle();
            if !lc.is_current(generation) {
                return None;
            }
            lc.source.clone()?
        };

        let frame = match tokio::task::spawn_blocking(move || source.read()).await {
            Ok(Ok(frame)) => frame,
            Ok(Err(e)) => return Some(Err(e)),
            Err(e) => return Some(Err(DomainError::Capture(e.to_string()))),
        };
        if !self.lock_lifecycle().is_current(generation) {
            debug!("Descartando frame tras stop (sesión {})", generation);
            return None;
        }

        let predictions = match model.detect(&frame).await {
            Ok(predictions) => predictions,
            Err(e) => return Some(Err(e)),
        };

        let mut lc = self.lock_lifecycle();
        if !lc.is_current(generation) {
            debug!("Descartando inferencia tardía (sesión {})", generation);
            return None;
        }
        self.apply_frame(&mut lc, &frame, &predictions);
        Some(Ok(()))
    }

    fn apply_frame(
        &self,
        lc: &mut MutexGuard<'_, Lifecycle>,
        frame: &RgbImage,
        predictions: &[RawPrediction],
    ) -> Vec<DetectionRecord> {
        let records = self.classifier.categorize(predictions, self.params.confidence_threshold);
        if !records.is_empty() {
            debug!("Frame: {}", summarize_records(&records));
        }

        OverlayRenderer::render(lc.surface.as_mut(), frame, &records);
        self.lock_records().extend(records.iter().cloned());
        self.sink.on_detection(&records);
        records
    }

    fn lock_lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_records(&self) -> MutexGuard<'_, Vec<DetectionRecord>> {
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
