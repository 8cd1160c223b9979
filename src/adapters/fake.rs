//! Dobles de prueba para los puertos de la aplicación.

use async_trait::async_trait;
use image::RgbImage;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, Notify, Semaphore};

use crate::application::ports::{
    CapturePort, DetectionSink, DrawSurface, ModelLoaderPort, SchedulerPort, Tick, VideoSource,
    VisionModelPort,
};
use crate::domain::{
    detection::{BoundingBox, DetectionRecord, RawPrediction},
    errors::{DomainError, DomainResult},
};

pub fn prediction(class: &str, score: f32, bbox: [f32; 4]) -> RawPrediction {
    RawPrediction { class: class.into(), score, bbox }
}

/// Modelo con respuestas programadas; cuando se agotan devuelve `fallback`.
pub struct FakeModel {
    script: Mutex<VecDeque<DomainResult<Vec<RawPrediction>>>>,
    fallback: Vec<RawPrediction>,
    calls: AtomicUsize,
    pub entered: Notify,
    hold: Option<Semaphore>,
}

impl FakeModel {
    pub fn new(fallback: Vec<RawPrediction>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback,
            calls: AtomicUsize::new(0),
            entered: Notify::new(),
            hold: None,
        }
    }

    /// Cada `detect` espera a `release_one` antes de responder.
    pub fn held(mut self) -> Self {
        self.hold = Some(Semaphore::new(0));
        self
    }

    pub fn then(self, result: DomainResult<Vec<RawPrediction>>) -> Self {
        self.script.lock().unwrap().push_back(result);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn release_one(&self) {
        if let Some(hold) = &self.hold {
            hold.add_permits(1);
        }
    }
}

#[async_trait]
impl VisionModelPort for FakeModel {
    async fn detect(&self, _frame: &RgbImage) -> DomainResult<Vec<RawPrediction>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();
        if let Some(hold) = &self.hold {
            if let Ok(permit) = hold.acquire().await {
                permit.forget();
            }
        }
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}

pub struct FakeLoader {
    model: Option<Arc<FakeModel>>,
    loads: AtomicUsize,
}

impl FakeLoader {
    pub fn new(model: Arc<FakeModel>) -> Self {
        Self { model: Some(model), loads: AtomicUsize::new(0) }
    }

    pub fn failing() -> Self {
        Self { model: None, loads: AtomicUsize::new(0) }
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelLoaderPort for FakeLoader {
    async fn load(&self) -> DomainResult<Arc<dyn VisionModelPort>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        match &self.model {
            Some(model) => Ok(model.clone() as Arc<dyn VisionModelPort>),
            None => Err(DomainError::ModelLoad("modelo de prueba ausente".into())),
        }
    }
}

#[derive(Default)]
pub struct FakeCapture {
    fail: bool,
    acquired: AtomicUsize,
    released: Arc<AtomicUsize>,
    gate: Option<Semaphore>,
    read_delay: Option<Duration>,
    pub entered: Notify,
}

impl FakeCapture {
    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    /// Cada `acquire` espera a `open_gate` antes de entregar la fuente.
    pub fn gated() -> Self {
        Self { gate: Some(Semaphore::new(0)), ..Self::default() }
    }

    /// Fuente cuyo `current_frame` bloquea el hilo durante `delay`.
    pub fn slow(delay: Duration) -> Self {
        Self { read_delay: Some(delay), ..Self::default() }
    }

    pub fn open_gate(&self, permits: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(permits);
        }
    }

    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CapturePort for FakeCapture {
    async fn acquire(&self) -> DomainResult<Box<dyn VideoSource>> {
        if self.fail {
            return Err(DomainError::Capture("permiso denegado".into()));
        }
        self.acquired.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();
        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        Ok(Box::new(FakeSource {
            released: self.released.clone(),
            live: true,
            read_delay: self.read_delay,
        }))
    }
}

struct FakeSource {
    released: Arc<AtomicUsize>,
    live: bool,
    read_delay: Option<Duration>,
}

impl VideoSource for FakeSource {
    fn current_frame(&mut self) -> DomainResult<RgbImage> {
        if let Some(delay) = self.read_delay {
            std::thread::sleep(delay);
        }
        if !self.live {
            return Err(DomainError::Capture("fuente liberada".into()));
        }
        Ok(RgbImage::new(64, 48))
    }

    fn release(&mut self) {
        if self.live {
            self.live = false;
            self.released.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear,
    Frame,
    Stroke { rect: BoundingBox, color: [u8; 3], line_width: u32 },
    Fill { rect: BoundingBox, color: [u8; 3] },
    Text { text: String, x: f32, y: f32, color: [u8; 3] },
    Present,
}

/// Superficie que anota cada llamada. Mide 8 px por carácter.
pub struct RecordingSurface {
    ops: Arc<Mutex<Vec<DrawOp>>>,
}

impl RecordingSurface {
    pub fn new() -> (Self, Arc<Mutex<Vec<DrawOp>>>) {
        let ops = Arc::new(Mutex::new(Vec::new()));
        (Self { ops: ops.clone() }, ops)
    }

    fn push(&self, op: DrawOp) {
        self.ops.lock().unwrap().push(op);
    }
}

impl DrawSurface for RecordingSurface {
    fn clear(&mut self) {
        self.push(DrawOp::Clear);
    }

    fn draw_frame(&mut self, _frame: &RgbImage) {
        self.push(DrawOp::Frame);
    }

    fn stroke_rect(&mut self, rect: &BoundingBox, color: [u8; 3], line_width: u32) {
        self.push(DrawOp::Stroke { rect: *rect, color, line_width });
    }

    fn fill_rect(&mut self, rect: &BoundingBox, color: [u8; 3]) {
        self.push(DrawOp::Fill { rect: *rect, color });
    }

    fn measure_text(&self, text: &str) -> f32 {
        text.chars().count() as f32 * 8.0
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, color: [u8; 3]) {
        self.push(DrawOp::Text { text: text.into(), x, y, color });
    }

    fn present(&mut self) {
        self.push(DrawOp::Present);
    }
}

#[derive(Default)]
pub struct RecordingSink {
    batches: Mutex<Vec<Vec<DetectionRecord>>>,
}

impl RecordingSink {
    pub fn batches(&self) -> Vec<Vec<DetectionRecord>> {
        self.batches.lock().unwrap().clone()
    }
}

impl DetectionSink for RecordingSink {
    fn on_detection(&self, records: &[DetectionRecord]) {
        self.batches.lock().unwrap().push(records.to_vec());
    }
}

/// Planificador paso a paso: publica cada `Tick` pedido y espera a `step`.
pub struct ManualScheduler {
    ticks: mpsc::UnboundedSender<Tick>,
    steps: Semaphore,
}

impl ManualScheduler {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Tick>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { ticks: tx, steps: Semaphore::new(0) }, rx)
    }

    pub fn step(&self) {
        self.steps.add_permits(1);
    }
}

#[async_trait]
impl SchedulerPort for ManualScheduler {
    async fn wait(&self, tick: Tick) {
        let _ = self.ticks.send(tick);
        if let Ok(permit) = self.steps.acquire().await {
            permit.forget();
        }
    }
}
