// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Detection data structures.
//!
//! This module defines the products returned by the remote detection
//! service and the scene summary that accompanies them.

use serde::Deserialize;

/// Bounding box `[ymin, xmin, ymax, xmax]`, each normalized to 0-1000.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct BoundingBox(pub [f64; 4]);

impl BoundingBox {
    pub fn ymin(&self) -> f64 {
        self.0[0]
    }

    pub fn xmin(&self) -> f64 {
        self.0[1]
    }

    pub fn ymax(&self) -> f64 {
        self.0[2]
    }

    pub fn xmax(&self) -> f64 {
        self.0[3]
    }
}

/// Descriptive attributes of a detected product.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Attributes {
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl Attributes {
    /// Non-empty attributes as `(name, value)` pairs, in display order.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        [
            ("color", &self.color),
            ("pattern", &self.pattern),
            ("material", &self.material),
            ("type", &self.kind),
        ]
        .into_iter()
        .filter_map(|(name, value)| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (name, v))
        })
        .collect()
    }
}

/// A single product located in a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedObject {
    pub id: String,
    pub label: String,
    pub confidence: f64,
    pub bbox: BoundingBox,
    pub attributes: Attributes,
    pub shopping_url: String,
    pub thumbnail_url: String,
}

impl DetectedObject {
    /// Confidence as a whole percentage, e.g. `97`.
    pub fn confidence_percent(&self) -> u32 {
        (self.confidence.clamp(0.0, 1.0) * 100.0).round() as u32
    }
}

/// Outcome of a successful detection call.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionResult {
    pub scene: String,
    pub objects: Vec<DetectedObject>,
}

impl DetectionResult {
    /// Result used when the model output cannot be understood.
    pub fn unknown() -> Self {
        Self {
            scene: "Unknown".to_string(),
            objects: Vec::new(),
        }
    }

    /// Look up an object by its identifier.
    pub fn find(&self, id: &str) -> Option<&DetectedObject> {
        self.objects.iter().find(|o| o.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_entries_skip_blank_values() {
        let attributes = Attributes {
            color: Some("Black".to_string()),
            pattern: Some("  ".to_string()),
            material: None,
            kind: Some("Jacket".to_string()),
        };

        assert_eq!(attributes.entries(), vec![("color", "Black"), ("type", "Jacket")]);
    }

    #[test]
    fn test_attributes_read_from_wire_names() {
        let attributes: Attributes =
            serde_json::from_str(r#"{"color": "Red", "type": "Sneaker"}"#).unwrap();
        assert_eq!(attributes.kind.as_deref(), Some("Sneaker"));
        assert_eq!(attributes.pattern, None);

        let bbox: BoundingBox = serde_json::from_str("[1, 2, 3, 4]").unwrap();
        assert_eq!((bbox.ymin(), bbox.xmax()), (1.0, 4.0));
    }

    #[test]
    fn test_confidence_percent_rounds_and_clamps() {
        let mut object = DetectedObject {
            id: "a".to_string(),
            label: "Watch".to_string(),
            confidence: 0.974,
            bbox: BoundingBox([0.0, 0.0, 10.0, 10.0]),
            attributes: Attributes::default(),
            shopping_url: String::new(),
            thumbnail_url: String::new(),
        };
        assert_eq!(object.confidence_percent(), 97);

        object.confidence = 1.7;
        assert_eq!(object.confidence_percent(), 100);
    }
}
