use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use anyhow::{Context, Result};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use std::path::Path;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::application::ports::DrawSurface;
use crate::domain::detection::BoundingBox;

const FONT_SIZE: f32 = 14.0;
/// Ancho por carácter cuando no hay fuente cargada.
const FALLBACK_GLYPH_WIDTH: f32 = 8.0;
const JPEG_QUALITY: u8 = 80;

/// Lienzo en memoria. Cada `present` publica el frame anotado como JPEG.
pub struct ImageCanvas {
    buffer: RgbImage,
    font: Option<FontVec>,
    tx: broadcast::Sender<Vec<u8>>,
}

impl ImageCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        let (tx, _) = broadcast::channel(4);
        Self {
            buffer: RgbImage::new(width, height),
            font: None,
            tx,
        }
    }

    /// Carga una fuente TTF/OTF para las etiquetas.
    pub fn with_font_file(mut self, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("leyendo fuente {}", path.display()))?;
        let font = FontVec::try_from_vec(bytes)
            .map_err(|e| anyhow::anyhow!("fuente inválida {}: {e}", path.display()))?;
        self.font = Some(font);
        Ok(self)
    }

    /// Emisor de frames anotados, para suscribirse después de ceder el lienzo.
    pub fn frames(&self) -> broadcast::Sender<Vec<u8>> {
        self.tx.clone()
    }

    #[cfg(test)]
    pub fn image(&self) -> &RgbImage {
        &self.buffer
    }

    fn encode_jpeg(&self) -> Result<Vec<u8>> {
        let mut jpeg = Vec::new();
        let mut enc = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY);
        enc.encode(
            self.buffer.as_raw(),
            self.buffer.width(),
            self.buffer.height(),
            image::ExtendedColorType::Rgb8,
        )?;
        Ok(jpeg)
    }
}

fn to_rect(x: f32, y: f32, width: f32, height: f32) -> Option<Rect> {
    let (w, h) = (width.round(), height.round());
    if !(w >= 1.0 && h >= 1.0) {
        return None;
    }
    Some(Rect::at(x.round() as i32, y.round() as i32).of_size(w as u32, h as u32))
}

impl DrawSurface for ImageCanvas {
    fn clear(&mut self) {
        for pixel in self.buffer.pixels_mut() {
            *pixel = Rgb([0, 0, 0]);
        }
    }

    fn draw_frame(&mut self, frame: &RgbImage) {
        if self.buffer.dimensions() == frame.dimensions() {
            self.buffer.copy_from_slice(frame.as_raw());
        } else {
            self.buffer = frame.clone();
        }
    }

    fn stroke_rect(&mut self, rect: &BoundingBox, color: [u8; 3], line_width: u32) {
        // Trazo centrado en el borde, como un canvas 2D.
        let half = (line_width / 2) as f32;
        for i in 0..line_width {
            let grow = i as f32 - half;
            if let Some(r) = to_rect(rect.x - grow, rect.y - grow, rect.width + 2.0 * grow, rect.height + 2.0 * grow) {
                draw_hollow_rect_mut(&mut self.buffer, r, Rgb(color));
            }
        }
    }

    fn fill_rect(&mut self, rect: &BoundingBox, color: [u8; 3]) {
        if let Some(r) = to_rect(rect.x, rect.y, rect.width, rect.height) {
            draw_filled_rect_mut(&mut self.buffer, r, Rgb(color));
        }
    }

    fn measure_text(&self, text: &str) -> f32 {
        match &self.font {
            Some(font) => text_size(PxScale::from(FONT_SIZE), font, text).0 as f32,
            None => text.chars().count() as f32 * FALLBACK_GLYPH_WIDTH,
        }
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, color: [u8; 3]) {
        let Some(font) = &self.font else {
            debug!("Sin fuente cargada, se omite el texto '{}'", text);
            return;
        };
        // `y` es la línea base; imageproc posiciona por la esquina superior.
        let scale = PxScale::from(FONT_SIZE);
        let top = y - font.as_scaled(scale).ascent();
        draw_text_mut(&mut self.buffer, Rgb(color), x.round() as i32, top.round() as i32, scale, font, text);
    }

    fn present(&mut self) {
        if self.tx.receiver_count() == 0 {
            return;
        }
        match self.encode_jpeg() {
            Ok(jpeg) => {
                let _ = self.tx.send(jpeg);
            }
            Err(e) => warn!("Error codificando overlay: {}", e),
        }
    }
}
