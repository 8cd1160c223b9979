use serde::{Deserialize, Serialize};

use super::waste::WasteCategory;

/// Salida cruda del modelo de visión, sin categoría.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPrediction {
    pub class: String,
    pub score: f32,
    pub bbox: [f32; 4], // [x, y, ancho, alto]
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub fn from_xywh([x, y, width, height]: [f32; 4]) -> Self {
        Self { x, y, width, height }
    }

    /// Solo se dibujan cajas cuyos cuatro campos son finitos y distintos de cero.
    pub fn is_drawable(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite() && *v != 0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    pub label: String,
    pub confidence: f32,
    pub bounding_box: BoundingBox,
    pub category: WasteCategory,
}

impl DetectionRecord {
    /// Texto de la etiqueta del overlay: "label (category) NN%".
    pub fn caption(&self) -> String {
        let percent = (self.confidence * 100.0).round() as i32;
        format!("{} ({}) {}%", self.label, self.category, percent)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionStats {
    pub biodegradable: usize,
    pub recyclable: usize,
    pub hazardous: usize,
    #[serde(rename = "non-recyclable")]
    pub non_recyclable: usize,
    pub total: usize,
}

impl DetectionStats {
    pub fn from_records(records: &[DetectionRecord]) -> Self {
        let mut stats = Self::default();
        for record in records {
            match record.category {
                WasteCategory::Biodegradable => stats.biodegradable += 1,
                WasteCategory::Recyclable => stats.recyclable += 1,
                WasteCategory::Hazardous => stats.hazardous += 1,
                WasteCategory::NonRecyclable => stats.non_recyclable += 1,
            }
            stats.total += 1;
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(label: &str, category: WasteCategory) -> DetectionRecord {
        DetectionRecord {
            label: label.into(),
            confidence: 0.876,
            bounding_box: BoundingBox::from_xywh([10.0, 20.0, 30.0, 40.0]),
            category,
        }
    }

    #[test]
    fn zero_or_missing_box_is_not_drawable() {
        assert!(BoundingBox::from_xywh([1.0, 2.0, 3.0, 4.0]).is_drawable());
        assert!(!BoundingBox::from_xywh([0.0, 0.0, 0.0, 0.0]).is_drawable());
        assert!(!BoundingBox::from_xywh([5.0, 5.0, 0.0, 10.0]).is_drawable());
        assert!(!BoundingBox::from_xywh([f32::NAN, 5.0, 10.0, 10.0]).is_drawable());
    }

    #[test]
    fn caption_rounds_confidence() {
        let r = record("bottle", WasteCategory::Recyclable);
        assert_eq!(r.caption(), "bottle (recyclable) 88%");
    }

    #[test]
    fn stats_count_every_record() {
        let records = vec![
            record("banana", WasteCategory::Biodegradable),
            record("bottle", WasteCategory::Recyclable),
            record("bottle", WasteCategory::Recyclable),
            record("person", WasteCategory::NonRecyclable),
        ];
        let stats = DetectionStats::from_records(&records);
        assert_eq!(stats.biodegradable, 1);
        assert_eq!(stats.recyclable, 2);
        assert_eq!(stats.hazardous, 0);
        assert_eq!(stats.non_recyclable, 1);
        assert_eq!(stats.total, 4);
    }

    #[test]
    fn stats_of_empty_list_are_zero() {
        assert_eq!(DetectionStats::from_records(&[]), DetectionStats::default());
    }
}
