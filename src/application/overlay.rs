use image::RgbImage;

use crate::application::ports::DrawSurface;
use crate::domain::detection::{BoundingBox, DetectionRecord};

const LINE_WIDTH: u32 = 3;
const LABEL_HEIGHT: f32 = 20.0;
const LABEL_PADDING: f32 = 10.0;
const TEXT_COLOR: [u8; 3] = [255, 255, 255];

pub struct OverlayRenderer;

impl OverlayRenderer {
    /// Repinta la superficie completa: frame actual + una caja y una etiqueta por registro.
    pub fn render(surface: &mut dyn DrawSurface, frame: &RgbImage, records: &[DetectionRecord]) {
        surface.clear();
        surface.draw_frame(frame);

        for record in records {
            let bbox = &record.bounding_box;
            if !bbox.is_drawable() {
                continue;
            }

            let color = record.category.overlay_color();
            surface.stroke_rect(bbox, color, LINE_WIDTH);

            let caption = record.caption();
            let text_width = surface.measure_text(&caption);
            let background = BoundingBox {
                x: bbox.x,
                y: bbox.y - LABEL_HEIGHT,
                width: text_width + LABEL_PADDING,
                height: LABEL_HEIGHT,
            };
            surface.fill_rect(&background, color);
            surface.fill_text(&caption, bbox.x + 5.0, bbox.y - 5.0, TEXT_COLOR);
        }

        surface.present();
    }
}
