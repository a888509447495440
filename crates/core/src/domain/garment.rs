use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::preferences::Occasion;

/// Color label stored when the classifier could not determine one.
pub const UNKNOWN_COLOR: &str = "unknown";

pub const DEFAULT_CONFIDENCE: f64 = 0.5;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GarmentId(pub String);

impl fmt::Display for GarmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Authenticated subject that owns a wardrobe.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerId(pub String);

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GarmentCategory {
    Top,
    Bottom,
    Shoes,
    Coat,
    Dress,
    Accessory,
}

impl GarmentCategory {
    pub const ALL: [GarmentCategory; 6] = [
        GarmentCategory::Top,
        GarmentCategory::Bottom,
        GarmentCategory::Shoes,
        GarmentCategory::Coat,
        GarmentCategory::Dress,
        GarmentCategory::Accessory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GarmentCategory::Top => "top",
            GarmentCategory::Bottom => "bottom",
            GarmentCategory::Shoes => "shoes",
            GarmentCategory::Coat => "coat",
            GarmentCategory::Dress => "dress",
            GarmentCategory::Accessory => "accessory",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|category| category.as_str() == normalized)
    }
}

impl fmt::Display for GarmentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Garment class as reported by the image classifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GarmentClass {
    TShirt,
    Pullover,
    Shirt,
    Trouser,
    Sneaker,
    AnkleBoot,
    Coat,
    Dress,
    Sandal,
    Bag,
    Unknown,
}

impl GarmentClass {
    pub fn label(&self) -> &'static str {
        match self {
            GarmentClass::TShirt => "T-shirt",
            GarmentClass::Pullover => "Pullover",
            GarmentClass::Shirt => "Shirt",
            GarmentClass::Trouser => "Trouser",
            GarmentClass::Sneaker => "Sneaker",
            GarmentClass::AnkleBoot => "Ankle_boot",
            GarmentClass::Coat => "Coat",
            GarmentClass::Dress => "Dress",
            GarmentClass::Sandal => "Sandal",
            GarmentClass::Bag => "Bag",
            GarmentClass::Unknown => "unknown",
        }
    }

    /// Parses a classifier label. Unrecognized labels map to `Unknown`.
    pub fn from_label(value: &str) -> Self {
        let normalized: String = value
            .trim()
            .chars()
            .filter(|ch| !matches!(ch, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "tshirt" | "tee" => GarmentClass::TShirt,
            "pullover" | "sweater" => GarmentClass::Pullover,
            "shirt" => GarmentClass::Shirt,
            "trouser" | "trousers" | "pants" => GarmentClass::Trouser,
            "sneaker" | "sneakers" => GarmentClass::Sneaker,
            "ankleboot" => GarmentClass::AnkleBoot,
            "coat" => GarmentClass::Coat,
            "dress" => GarmentClass::Dress,
            "sandal" => GarmentClass::Sandal,
            "bag" => GarmentClass::Bag,
            _ => GarmentClass::Unknown,
        }
    }

    /// Ordinal dressiness used by the formality coherence rule.
    pub fn formality(&self) -> i32 {
        match self {
            GarmentClass::TShirt | GarmentClass::Sneaker => 1,
            GarmentClass::Trouser | GarmentClass::Pullover => 2,
            GarmentClass::Shirt | GarmentClass::AnkleBoot => 3,
            GarmentClass::Coat | GarmentClass::Dress => 4,
            GarmentClass::Sandal | GarmentClass::Bag | GarmentClass::Unknown => 2,
        }
    }
}

impl From<String> for GarmentClass {
    fn from(value: String) -> Self {
        Self::from_label(&value)
    }
}

impl From<GarmentClass> for String {
    fn from(value: GarmentClass) -> Self {
        value.label().to_string()
    }
}

impl fmt::Display for GarmentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A classified clothing item owned by exactly one user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Garment {
    pub id: GarmentId,
    pub owner_id: OwnerId,
    pub category: GarmentCategory,
    pub class: GarmentClass,
    pub color: String,
    pub confidence: f64,
    #[serde(default)]
    pub occasions: Vec<Occasion>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub added_at: DateTime<Utc>,
}

impl Garment {
    /// Lower-cased, trimmed color with `grey` folded into `gray`.
    pub fn normalized_color(&self) -> String {
        normalize_color(&self.color)
    }

    pub fn is_class(&self, class: GarmentClass) -> bool {
        self.class == class
    }
}

pub fn normalize_color(color: &str) -> String {
    color.trim().to_lowercase().replace("grey", "gray")
}

/// Colors that carry no information and never break a palette match.
pub fn is_wildcard_color(normalized: &str) -> bool {
    normalized.is_empty() || normalized == UNKNOWN_COLOR
}

/// Classified garment metadata submitted by the upload flow.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GarmentSubmission {
    pub category: Option<String>,
    #[serde(alias = "class_name")]
    pub class: Option<String>,
    pub color: Option<String>,
    pub confidence: Option<f64>,
    #[serde(default)]
    pub occasions: Vec<String>,
    pub image_url: Option<String>,
}

impl GarmentSubmission {
    /// Builds a garment, falling back to defaults for anything missing or invalid.
    pub fn into_garment(self, id: GarmentId, owner_id: OwnerId, now: DateTime<Utc>) -> Garment {
        let category = self
            .category
            .as_deref()
            .and_then(GarmentCategory::parse)
            .unwrap_or(GarmentCategory::Top);
        let class =
            self.class.as_deref().map(GarmentClass::from_label).unwrap_or(GarmentClass::Unknown);
        let color = self
            .color
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| UNKNOWN_COLOR.to_string());
        let confidence = match self.confidence {
            Some(value) if value.is_nan() => 0.0,
            Some(value) => value.clamp(0.0, 1.0),
            None => DEFAULT_CONFIDENCE,
        };

        Garment {
            id,
            owner_id,
            category,
            class,
            color,
            confidence,
            occasions: Occasion::parse_list(&self.occasions),
            image_url: self.image_url.filter(|url| !url.trim().is_empty()),
            added_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn class_labels_parse_leniently() {
        assert_eq!(GarmentClass::from_label("T-shirt"), GarmentClass::TShirt);
        assert_eq!(GarmentClass::from_label("tshirt"), GarmentClass::TShirt);
        assert_eq!(GarmentClass::from_label("Ankle_boot"), GarmentClass::AnkleBoot);
        assert_eq!(GarmentClass::from_label("ankle boot"), GarmentClass::AnkleBoot);
        assert_eq!(GarmentClass::from_label("Kilt"), GarmentClass::Unknown);
    }

    #[test]
    fn unknown_classes_default_to_middle_formality() {
        assert_eq!(GarmentClass::Unknown.formality(), 2);
        assert_eq!(GarmentClass::Sandal.formality(), 2);
        assert_eq!(GarmentClass::TShirt.formality(), 1);
        assert_eq!(GarmentClass::Dress.formality(), 4);
    }

    #[test]
    fn class_serializes_as_classifier_label() {
        let json = serde_json::to_string(&GarmentClass::AnkleBoot).expect("serialize");
        assert_eq!(json, "\"Ankle_boot\"");
        let parsed: GarmentClass = serde_json::from_str("\"Pullover\"").expect("deserialize");
        assert_eq!(parsed, GarmentClass::Pullover);
    }

    #[test]
    fn submission_applies_defaults_and_clamps_confidence() {
        let garment = GarmentSubmission {
            category: Some("sideways".to_string()),
            class: None,
            color: Some("  ".to_string()),
            confidence: Some(4.2),
            occasions: vec!["formal".to_string(), "brunch".to_string()],
            image_url: None,
        }
        .into_garment(GarmentId("g1".to_string()), OwnerId("u1".to_string()), Utc::now());

        assert_eq!(garment.category, GarmentCategory::Top);
        assert_eq!(garment.class, GarmentClass::Unknown);
        assert_eq!(garment.color, UNKNOWN_COLOR);
        assert_eq!(garment.confidence, 1.0);
        assert_eq!(garment.occasions, vec![Occasion::Formal]);
    }

    #[test]
    fn grey_is_folded_into_gray() {
        assert_eq!(normalize_color(" Dark Grey "), "dark gray");
        assert!(is_wildcard_color(&normalize_color("Unknown")));
    }
}
