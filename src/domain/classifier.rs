use std::collections::HashMap;

use super::detection::{BoundingBox, DetectionRecord, RawPrediction};
use super::waste::WasteCategory;

use WasteCategory::{Biodegradable, Hazardous, NonRecyclable, Recyclable};

/// Tabla de reglas etiqueta → categoría.
///
/// `patterns` es una lista ordenada: en la coincidencia parcial gana el primer
/// patrón de la lista, así que el orden forma parte del comportamiento.
/// `keywords` se consulta solo si ningún patrón coincide, en el orden de la lista.
#[derive(Debug, Clone)]
pub struct CategoryRules {
    pub patterns: Vec<(String, WasteCategory)>,
    pub keywords: Vec<(WasteCategory, Vec<String>)>,
}

impl CategoryRules {
    pub fn new(
        patterns: &[(&str, WasteCategory)],
        keywords: &[(WasteCategory, &[&str])],
    ) -> Self {
        Self {
            patterns: patterns
                .iter()
                .map(|(p, c)| (p.to_lowercase(), *c))
                .collect(),
            keywords: keywords
                .iter()
                .map(|(c, words)| (*c, words.iter().map(|w| w.to_lowercase()).collect()))
                .collect(),
        }
    }
}

impl Default for CategoryRules {
    fn default() -> Self {
        Self::new(DEFAULT_PATTERNS, DEFAULT_KEYWORDS)
    }
}

const DEFAULT_PATTERNS: &[(&str, WasteCategory)] = &[
    // Biodegradables
    ("apple", Biodegradable),
    ("banana", Biodegradable),
    ("orange", Biodegradable),
    ("broccoli", Biodegradable),
    ("carrot", Biodegradable),
    ("food", Biodegradable),
    ("leaf", Biodegradable),
    ("wood", Biodegradable),
    ("paper", Biodegradable),
    ("paper towel", Biodegradable),
    ("napkin", Biodegradable),
    ("vegetable", Biodegradable),
    ("fruit", Biodegradable),
    ("bread", Biodegradable),
    ("eggshell", Biodegradable),
    ("coffee ground", Biodegradable),
    ("tea bag", Biodegradable),
    ("plant", Biodegradable),
    ("flower", Biodegradable),
    ("grass", Biodegradable),
    ("banana peel", Biodegradable),
    ("orange peel", Biodegradable),
    ("egg", Biodegradable),
    ("cake", Biodegradable),
    ("pizza", Biodegradable),
    ("sandwich", Biodegradable),
    ("meat", Biodegradable),
    ("fish", Biodegradable),
    ("rice", Biodegradable),
    ("pasta", Biodegradable),
    ("potato", Biodegradable),
    ("tomato", Biodegradable),
    ("onion", Biodegradable),
    ("lettuce", Biodegradable),
    ("cucumber", Biodegradable),
    // Reciclables
    ("bottle", Recyclable),
    ("plastic bottle", Recyclable),
    ("glass", Recyclable),
    ("can", Recyclable),
    ("aluminum can", Recyclable),
    ("cardboard", Recyclable),
    ("newspaper", Recyclable),
    ("magazine", Recyclable),
    ("metal", Recyclable),
    ("paper cup", Recyclable),
    ("plastic container", Recyclable),
    ("tin can", Recyclable),
    ("jar", Recyclable),
    ("box", Recyclable),
    ("envelope", Recyclable),
    // Peligrosos
    ("battery", Hazardous),
    ("medicine", Hazardous),
    ("chemical", Hazardous),
    ("thermometer", Hazardous),
    ("light bulb", Hazardous),
    ("aerosol", Hazardous),
    ("paint", Hazardous),
    ("oil", Hazardous),
    ("pesticide", Hazardous),
    ("cleaner", Hazardous),
    // No reciclables
    ("plastic bag", NonRecyclable),
    ("styrofoam", NonRecyclable),
    ("chip bag", NonRecyclable),
    ("candy wrapper", NonRecyclable),
    ("diaper", NonRecyclable),
    ("ceramic", NonRecyclable),
    ("mirror", NonRecyclable),
    ("glassware", NonRecyclable),
    ("lightbulb", NonRecyclable),
    ("waxed paper", NonRecyclable),
];

const DEFAULT_KEYWORDS: &[(WasteCategory, &[&str])] = &[
    (
        Biodegradable,
        &["fruit", "vegetable", "food", "plant", "leaf", "flower", "grass", "wood"],
    ),
    (
        Recyclable,
        &["bottle", "can", "glass", "plastic", "metal", "cardboard", "paper", "box"],
    ),
    (
        Hazardous,
        &["battery", "chemical", "medicine", "paint", "oil", "cleaner"],
    ),
];

/// Asigna una categoría de residuo a cualquier etiqueta del modelo.
pub struct WasteClassifier {
    rules: CategoryRules,
    exact: HashMap<String, WasteCategory>,
}

impl WasteClassifier {
    pub fn new(rules: CategoryRules) -> Self {
        let mut exact = HashMap::with_capacity(rules.patterns.len());
        for (pattern, category) in &rules.patterns {
            // Con patrones repetidos manda el primero, igual que en la búsqueda parcial.
            exact.entry(pattern.clone()).or_insert(*category);
        }
        Self { rules, exact }
    }

    /// Función total: nunca falla, lo desconocido es `NonRecyclable`.
    pub fn classify(&self, label: &str) -> WasteCategory {
        let label = label.to_lowercase();

        if let Some(category) = self.exact.get(&label) {
            return *category;
        }

        // La cadena vacía está contenida en todos los patrones.
        if !label.is_empty() {
            let partial = self
                .rules
                .patterns
                .iter()
                .find(|(pattern, _)| label.contains(pattern.as_str()) || pattern.contains(&label));
            if let Some((_, category)) = partial {
                return *category;
            }
        }

        for (category, words) in &self.rules.keywords {
            if words.iter().any(|w| label.contains(w.as_str())) {
                return *category;
            }
        }

        NonRecyclable
    }

    /// Filtra por confianza y clasifica, manteniendo el orden de entrada.
    pub fn categorize(&self, predictions: &[RawPrediction], threshold: f32) -> Vec<DetectionRecord> {
        predictions
            .iter()
            .filter(|p| p.score > threshold)
            .map(|p| {
                let label = p.class.to_lowercase();
                let category = self.classify(&label);
                DetectionRecord {
                    label,
                    confidence: p.score,
                    bounding_box: BoundingBox::from_xywh(p.bbox),
                    category,
                }
            })
            .collect()
    }
}

impl Default for WasteClassifier {
    fn default() -> Self {
        Self::new(CategoryRules::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(class: &str, score: f32) -> RawPrediction {
        RawPrediction { class: class.into(), score, bbox: [10.0, 10.0, 50.0, 60.0] }
    }

    #[test]
    fn exact_keys_win_regardless_of_case() {
        let classifier = WasteClassifier::default();
        for (pattern, category) in DEFAULT_PATTERNS {
            assert_eq!(classifier.classify(pattern), *category, "{pattern}");
            assert_eq!(classifier.classify(&pattern.to_uppercase()), *category, "{pattern}");
        }
    }

    #[test]
    fn documented_examples() {
        let classifier = WasteClassifier::default();
        assert_eq!(classifier.classify("banana peel"), Biodegradable);
        assert_eq!(classifier.classify("PLASTIC BOTTLE"), Recyclable);
        assert_eq!(classifier.classify("AA battery"), Hazardous);
        assert_eq!(classifier.classify("xyzunknownitem"), NonRecyclable);
    }

    #[test]
    fn partial_match_works_in_both_directions() {
        let classifier = WasteClassifier::default();
        // la etiqueta contiene el patrón
        assert_eq!(classifier.classify("wine glass"), Recyclable);
        // el patrón contiene la etiqueta
        assert_eq!(classifier.classify("peel"), Biodegradable);
        assert_eq!(classifier.classify("cup"), Recyclable);
    }

    #[test]
    fn short_patterns_overmatch() {
        let classifier = WasteClassifier::default();
        assert_eq!(classifier.classify("candy"), Recyclable);
    }

    #[test]
    fn first_pattern_in_table_order_wins() {
        let rules = CategoryRules::new(
            &[("tin", Recyclable), ("tin foil", NonRecyclable)],
            &[],
        );
        let classifier = WasteClassifier::new(rules);
        assert_eq!(classifier.classify("tin foil tray"), Recyclable);
    }

    #[test]
    fn keywords_follow_category_priority() {
        let rules = CategoryRules::new(
            &[],
            &[
                (Biodegradable, &["wood"]),
                (Recyclable, &["metal"]),
                (Hazardous, &["paint"]),
            ],
        );
        let classifier = WasteClassifier::new(rules);
        assert_eq!(classifier.classify("painted metal wood"), Biodegradable);
        assert_eq!(classifier.classify("painted metal"), Recyclable);
        assert_eq!(classifier.classify("paint thinner"), Hazardous);
        // Las palabras clave no se prueban en sentido inverso.
        assert_eq!(classifier.classify("woo"), NonRecyclable);
    }

    #[test]
    fn empty_label_falls_back_to_default() {
        let classifier = WasteClassifier::default();
        assert_eq!(classifier.classify(""), NonRecyclable);
    }

    #[test]
    fn categorize_drops_low_confidence_and_keeps_order() {
        let classifier = WasteClassifier::default();
        let records = classifier.categorize(
            &[prediction("Bottle", 0.9), prediction("banana", 0.2), prediction("Apple", 0.31)],
            0.3,
        );
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].label, "bottle");
        assert_eq!(records[0].category, Recyclable);
        assert_eq!(records[1].label, "apple");
        assert_eq!(records[1].category, Biodegradable);
        assert_eq!(records[1].bounding_box, BoundingBox::from_xywh([10.0, 10.0, 50.0, 60.0]));
    }

    #[test]
    fn threshold_is_strict() {
        let classifier = WasteClassifier::default();
        assert!(classifier.categorize(&[prediction("bottle", 0.3)], 0.3).is_empty());
    }
}
