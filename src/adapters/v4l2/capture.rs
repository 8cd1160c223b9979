use anyhow::{anyhow, Result};
use async_trait::async_trait;
use image::{ImageFormat, RgbImage};
use v4l::format::FourCC;
use v4l::io::mmap::Stream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::Device;

use crate::application::ports::{CapturePort, VideoSource};
use crate::domain::errors::{DomainError, DomainResult};

/// Configuración para inicializar la captura de vídeo.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    pub camera_path: String,
    pub fourcc: String,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

/// Adaptador para la captura física de frames usando V4L2.
///
/// El stream y el dispositivo comparten el descriptor; se cierra cuando se
/// sueltan los dos en `close`.
pub struct V4l2Capture {
    stream: Option<Stream<'static>>,
    device: Option<Device>,
    fourcc: FourCC,
    width: u32,
    height: u32,
}

impl V4l2Capture {
    /// Abre el dispositivo de cámara y configura el formato y el flujo de memoria mapeada (MMAP).
    pub fn open(cfg: &CaptureConfig) -> Result<Self> {
        let dev = Device::with_path(&cfg.camera_path)?;

        // 1. Configurar Formato
        let mut fmt = dev.format()?;
        fmt.fourcc = parse_fourcc(&cfg.fourcc)?;
        fmt.width = cfg.width;
        fmt.height = cfg.height;

        // Aplicar formato (el driver puede ajustar los valores a los más cercanos soportados)
        let actual_fmt = dev.set_format(&fmt)?;

        // 2. Configurar FPS (Frame Interval)
        let mut params = dev.params()?;
        params.interval.numerator = 1;
        params.interval.denominator = cfg.fps.max(1);
        let _ = dev.set_params(&params);

        // 3. Inicializar Stream (MMAP)
        let stream = Stream::with_buffers(&dev, v4l::buffer::Type::VideoCapture, 4)?;

        tracing::info!(
            "Cámara abierta: {}x{} [{}] a {} FPS",
            actual_fmt.width, actual_fmt.height, actual_fmt.fourcc, cfg.fps
        );

        Ok(Self::from_parts(dev, Some(stream), actual_fmt.fourcc, actual_fmt.width, actual_fmt.height))
    }

    fn from_parts(device: Device, stream: Option<Stream<'static>>, fourcc: FourCC, width: u32, height: u32) -> Self {
        Self {
            stream,
            device: Some(device),
            fourcc,
            width,
            height,
        }
    }

    /// Captura el siguiente frame en RGB.
    pub fn next_rgb(&mut self) -> Result<RgbImage> {
        let stream = self.stream.as_mut().ok_or_else(|| anyhow!("captura liberada"))?;
        let (data, _) = stream.next()?;
        let fcc_str = self.fourcc.str().map_err(|_| anyhow!("FourCC inválido"))?;

        match fcc_str {
            "MJPG" => {
                // MJPG es básicamente una secuencia de JPEGs
                let img = image::load_from_memory_with_format(data, ImageFormat::Jpeg)?;
                Ok(img.to_rgb8())
            }
            "YUYV" => Ok(yuyv_to_rgb(data, self.width, self.height)),
            _ => Err(anyhow!("Formato de cámara {} no soportado por este pipeline", fcc_str)),
        }
    }

    /// Detiene el stream, libera los buffers mapeados y cierra el dispositivo.
    pub fn close(&mut self) {
        // Primero el stream: hace stream-off y desmapea sobre el descriptor aún abierto.
        drop(self.stream.take());
        if self.device.take().is_some() {
            tracing::info!("Cámara liberada");
        }
    }
}

impl VideoSource for V4l2Capture {
    fn current_frame(&mut self) -> DomainResult<RgbImage> {
        self.next_rgb().map_err(|e| DomainError::Capture(e.to_string()))
    }

    fn release(&mut self) {
        self.close();
    }
}

/// Puerto de captura: abre la cámara configurada en cada `acquire`.
pub struct V4l2CaptureSource {
    cfg: CaptureConfig,
}

impl V4l2CaptureSource {
    pub fn new(cfg: CaptureConfig) -> Self {
        Self { cfg }
    }
}

#[async_trait]
impl CapturePort for V4l2CaptureSource {
    async fn acquire(&self) -> DomainResult<Box<dyn VideoSource>> {
        let cfg = self.cfg.clone();
        let capture = tokio::task::spawn_blocking(move || V4l2Capture::open(&cfg))
            .await
            .map_err(|e| DomainError::Capture(e.to_string()))?
            .map_err(|e| DomainError::Capture(format!("{}: {e}", self.cfg.camera_path)))?;
        Ok(Box::new(capture))
    }
}

fn parse_fourcc(fourcc: &str) -> Result<FourCC> {
    let b = fourcc.as_bytes();
    if b.len() != 4 {
        return Err(anyhow!("FourCC debe tener 4 caracteres"));
    }
    Ok(FourCC::new(&[b[0], b[1], b[2], b[3]]))
}

/// Convierte un buffer YUYV (YUV 4:2:2) a una RgbImage.
fn yuyv_to_rgb(yuyv: &[u8], w: u32, h: u32) -> RgbImage {
    let mut out = RgbImage::new(w, h);

    // Cada bloque de 4 bytes en YUYV define 2 píxeles: [Y0, U, Y1, V]
    for (i, chunk) in yuyv.chunks_exact(4).enumerate() {
        let y0 = chunk[0] as f32;
        let u  = chunk[1] as f32 - 128.0;
        let y1 = chunk[2] as f32;
        let v  = chunk[3] as f32 - 128.0;

        let pixel_idx = i as u32 * 2;
        let x = pixel_idx % w;
        let y = pixel_idx / w;

        if y < h {
            out.put_pixel(x, y, image::Rgb(bt601(y0, u, v)));
            if x + 1 < w {
                out.put_pixel(x + 1, y, image::Rgb(bt601(y1, u, v)));
            }
        }
    }
    out
}

fn bt601(y: f32, u: f32, v: f32) -> [u8; 3] {
    [
        (y + 1.402 * v).clamp(0.0, 255.0) as u8,
        (y - 0.344136 * u - 0.714136 * v).clamp(0.0, 255.0) as u8,
        (y + 1.772 * u).clamp(0.0, 255.0) as u8,
    ]
}
