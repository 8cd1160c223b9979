use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Interval, MissedTickBehavior};

use crate::application::ports::{SchedulerPort, Tick};

/// Marca el ritmo del bucle con la frecuencia de refresco configurada.
///
/// Si una inferencia tarda más que un frame no se acumulan ticks: el siguiente
/// llega un periodo después de consumir el anterior.
pub struct FrameCadenceScheduler {
    frames: Mutex<Interval>,
}

impl FrameCadenceScheduler {
    pub fn new(refresh_hz: u32) -> Self {
        let period = Duration::from_secs_f64(1.0 / refresh_hz.max(1) as f64);
        let mut frames = tokio::time::interval(period);
        frames.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { frames: Mutex::new(frames) }
    }
}

#[async_trait]
impl SchedulerPort for FrameCadenceScheduler {
    async fn wait(&self, tick: Tick) {
        match tick {
            Tick::NextFrame => {
                self.frames.lock().await.tick().await;
            }
            Tick::Delay(delay) => tokio::time::sleep(delay).await,
        }
    }
}
