use serde::{Deserialize, Serialize};
use std::fmt;

/// Las cuatro clases de residuo. Cerrada: una etiqueta sin regla cae en `NonRecyclable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WasteCategory {
    Biodegradable,
    Recyclable,
    Hazardous,
    NonRecyclable,
}

impl WasteCategory {
    pub const ALL: [WasteCategory; 4] = [
        WasteCategory::Biodegradable,
        WasteCategory::Recyclable,
        WasteCategory::Hazardous,
        WasteCategory::NonRecyclable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WasteCategory::Biodegradable => "biodegradable",
            WasteCategory::Recyclable => "recyclable",
            WasteCategory::Hazardous => "hazardous",
            WasteCategory::NonRecyclable => "non-recyclable",
        }
    }

    /// Color del overlay para esta categoría.
    pub fn overlay_color(&self) -> [u8; 3] {
        OVERLAY_COLORS
            .iter()
            .find(|(category, _)| category == self)
            .map(|(_, color)| *color)
            .unwrap_or(FALLBACK_COLOR)
    }

    /// Contenedor e instrucciones de desecho para mostrar en el panel.
    pub fn bin(&self) -> BinGuidance {
        match self {
            WasteCategory::Biodegradable => BinGuidance {
                category: *self,
                name: "Biodegradable",
                bin_color: "Green",
                bin_name: "Green Bin (Compost)",
                instructions: &[
                    "Place in GREEN compost bin",
                    "Can be composted at home or facility",
                    "Breaks down naturally in 2-6 weeks",
                    "Do not mix with recyclables or hazardous waste",
                ],
            },
            WasteCategory::Recyclable => BinGuidance {
                category: *self,
                name: "Recyclable",
                bin_color: "Blue",
                bin_name: "Blue Bin (Recycling)",
                instructions: &[
                    "Place in BLUE recycling bin",
                    "Rinse if dirty, remove caps/lids",
                    "Flatten to save space",
                    "Check local recycling rules",
                ],
            },
            WasteCategory::Hazardous => BinGuidance {
                category: *self,
                name: "Hazardous",
                bin_color: "Red",
                bin_name: "Red Bin (Hazardous)",
                instructions: &[
                    "Place in RED hazardous waste bin",
                    "DO NOT mix with regular waste",
                    "Handle with care - wear gloves if needed",
                    "Take to special collection points",
                ],
            },
            WasteCategory::NonRecyclable => BinGuidance {
                category: *self,
                name: "Non-Recyclable",
                bin_color: "Black",
                bin_name: "Black Bin (General Waste)",
                instructions: &[
                    "Place in BLACK general waste bin",
                    "For landfill disposal only",
                    "Minimize usage when possible",
                    "Ensure waste is properly bagged",
                ],
            },
        }
    }
}

impl fmt::Display for WasteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const OVERLAY_COLORS: [(WasteCategory, [u8; 3]); 4] = [
    (WasteCategory::Biodegradable, [0x4C, 0xAF, 0x50]),
    (WasteCategory::Recyclable, [0x21, 0x96, 0xF3]),
    (WasteCategory::Hazardous, [0xF4, 0x43, 0x36]),
    (WasteCategory::NonRecyclable, [0x9E, 0x9E, 0x9E]),
];

const FALLBACK_COLOR: [u8; 3] = [0x9E, 0x9E, 0x9E];

#[derive(Debug, Clone, Serialize)]
pub struct BinGuidance {
    pub category: WasteCategory,
    pub name: &'static str,
    pub bin_color: &'static str,
    pub bin_name: &'static str,
    pub instructions: &'static [&'static str],
}
