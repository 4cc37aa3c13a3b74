//! Data models and structures used throughout the studio

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::prompts::DEFAULT_DETAILS;

/// Lightest piece the weight slider allows, in grams
pub const MIN_WEIGHT_GRAMS: u32 = 5;

/// Heaviest piece the weight slider allows, in grams
pub const MAX_WEIGHT_GRAMS: u32 = 50;

/// Metal the piece is cast in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metal {
    Silver,
    Gold,
    Platinum,
}

impl Metal {
    pub const ALL: [Metal; 3] = [Metal::Silver, Metal::Gold, Metal::Platinum];

    pub fn id(self) -> &'static str {
        match self {
            Metal::Silver => "silver",
            Metal::Gold => "gold",
            Metal::Platinum => "platinum",
        }
    }

    /// Display label used in prompts and listings
    pub fn label(self) -> &'static str {
        match self {
            Metal::Silver => "Silver",
            Metal::Gold => "Gold",
            Metal::Platinum => "Platinum",
        }
    }
}

impl fmt::Display for Metal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Metal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metal::ALL
            .into_iter()
            .find(|m| m.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown metal: {}", s))
    }
}

/// Kind of jewelry piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Ring,
    Necklace,
    Earrings,
    Bangles,
    Chain,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Ring,
        Category::Necklace,
        Category::Earrings,
        Category::Bangles,
        Category::Chain,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Category::Ring => "ring",
            Category::Necklace => "necklace",
            Category::Earrings => "earrings",
            Category::Bangles => "bangles",
            Category::Chain => "chain",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}

/// Design parameters edited in the studio form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignParameters {
    pub metal: Metal,
    pub category: Category,
    pub weight_grams: u32,
    pub style: String,
    pub details: String,
}

impl Default for DesignParameters {
    fn default() -> Self {
        Self {
            metal: Metal::Gold,
            category: Category::Ring,
            weight_grams: 10,
            style: "calcutti".to_string(),
            details: String::new(),
        }
    }
}

impl DesignParameters {
    /// Details as stored on records, with the default phrase when left blank
    pub fn details_or_default(&self) -> String {
        if self.details.is_empty() {
            DEFAULT_DETAILS.to_string()
        } else {
            self.details.clone()
        }
    }
}

/// Clamps a weight into the range the slider offers
pub fn clamp_weight(weight_grams: u32) -> u32 {
    weight_grams.clamp(MIN_WEIGHT_GRAMS, MAX_WEIGHT_GRAMS)
}

/// A generated image and the prompt that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedArtifact {
    /// `data:image/png;base64,...` reference
    pub image_data: String,
    pub prompt: String,
}

/// Design fields shared by favorites and ledger entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignFields {
    #[serde(alias = "imageUrl")]
    pub image_data: String,
    pub prompt: String,
    pub metal: Metal,
    pub category: Category,
    pub style: String,
    #[serde(alias = "weight")]
    pub weight_grams: u32,
    pub details: String,
}

impl DesignFields {
    pub fn from_artifact(artifact: &GeneratedArtifact, params: &DesignParameters) -> Self {
        Self {
            image_data: artifact.image_data.clone(),
            prompt: artifact.prompt.clone(),
            metal: params.metal,
            category: params.category,
            style: params.style.clone(),
            weight_grams: params.weight_grams,
            details: params.details_or_default(),
        }
    }
}

/// A saved design in the favorites gallery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRecord {
    pub id: String,
    #[serde(flatten)]
    pub design: DesignFields,
    pub created_at: DateTime<Utc>,
}

/// A booked order in the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub id: String,
    #[serde(flatten)]
    pub design: DesignFields,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advance_payment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Capitalizes the first character of a stored value for display
pub fn format_label(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metal_parses_case_insensitively() {
        assert_eq!("Gold".parse::<Metal>(), Ok(Metal::Gold));
        assert_eq!(" platinum ".parse::<Metal>(), Ok(Metal::Platinum));
        assert!("bronze".parse::<Metal>().is_err());
    }

    #[test]
    fn category_parses_known_ids_only() {
        assert_eq!("earrings".parse::<Category>(), Ok(Category::Earrings));
        assert!("anklet".parse::<Category>().is_err());
    }

    #[test]
    fn weight_is_clamped_to_slider_range() {
        assert_eq!(clamp_weight(0), MIN_WEIGHT_GRAMS);
        assert_eq!(clamp_weight(27), 27);
        assert_eq!(clamp_weight(500), MAX_WEIGHT_GRAMS);
    }

    #[test]
    fn details_fall_back_to_default_phrase() {
        let params = DesignParameters::default();
        assert_eq!(params.details_or_default(), "elegant engraved design");
    }

    #[test]
    fn format_label_capitalizes_first_letter() {
        assert_eq!(format_label("calcutti"), "Calcutti");
        assert_eq!(format_label(""), "");
    }

    #[test]
    fn favorite_serializes_flat_camel_case() {
        let record = FavoriteRecord {
            id: "abc".to_string(),
            design: DesignFields {
                image_data: "data:image/png;base64,AAAA".to_string(),
                prompt: "p".to_string(),
                metal: Metal::Silver,
                category: Category::Chain,
                style: "modern".to_string(),
                weight_grams: 12,
                details: "twisted".to_string(),
            },
            created_at: Utc::now(),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["imageData"], "data:image/png;base64,AAAA");
        assert_eq!(value["weightGrams"], 12);
        assert_eq!(value["metal"], "silver");
        assert!(value.get("design").is_none());
    }

    #[test]
    fn legacy_record_fields_are_accepted() {
        let raw = serde_json::json!({
            "id": "1",
            "imageUrl": "data:image/png;base64,BBBB",
            "prompt": "p",
            "metal": "gold",
            "category": "ring",
            "style": "calcutti",
            "weight": 10,
            "details": "elegant engraved design",
            "createdAt": "2024-05-01T10:00:00Z",
            "extra": true
        });

        let record: FavoriteRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(record.design.image_data, "data:image/png;base64,BBBB");
        assert_eq!(record.design.weight_grams, 10);
    }
}
