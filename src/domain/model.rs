use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro-nutrient estimate for one meal, in kcal and grams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutritionEstimate {
    pub calories: u32,
    pub protein: u32,
    pub carbs: u32,
    pub fats: u32,
}

impl NutritionEstimate {
    /// Builds an estimate from raw provider amounts, rounding to the nearest
    /// integer and clamping negatives and NaN to zero.
    pub fn from_amounts(calories: f64, protein: f64, carbs: f64, fats: f64) -> Self {
        Self {
            calories: round_amount(calories),
            protein: round_amount(protein),
            carbs: round_amount(carbs),
            fats: round_amount(fats),
        }
    }

    /// A zero-calorie answer means the provider could not interpret the input.
    pub fn is_interpretable(&self) -> bool {
        self.calories > 0
    }
}

fn round_amount(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round().min(u32::MAX as f64) as u32
    } else {
        0
    }
}

/// Processing level reported by the vision model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FoodCategory {
    Real,
    #[default]
    Good,
    Ultra,
}

impl FoodCategory {
    /// Unknown labels fall back to `Good`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "real" => FoodCategory::Real,
            "ultra" => FoodCategory::Ultra,
            _ => FoodCategory::Good,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FoodCategory::Real => "real",
            FoodCategory::Good => "good",
            FoodCategory::Ultra => "ultra",
        }
    }
}

impl fmt::Display for FoodCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VisionNutrition {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub fiber: f64,
    pub sugar: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisionAnalysis {
    pub detected_food: String,
    pub estimated_quantity: String,
    pub nutrition: VisionNutrition,
    pub confidence: f64,
    pub ingredients: Vec<String>,
    pub category: FoodCategory,
}

pub const FALLBACK_FOOD_NAME: &str = "Unidentified meal";
pub const FALLBACK_QUANTITY: &str = "1 serving";
pub const FALLBACK_CONFIDENCE: f64 = 0.3;

impl VisionAnalysis {
    /// Placeholder returned whenever the vision path cannot produce a result.
    pub fn fallback() -> Self {
        Self {
            detected_food: FALLBACK_FOOD_NAME.to_string(),
            estimated_quantity: FALLBACK_QUANTITY.to_string(),
            nutrition: VisionNutrition {
                calories: 250.0,
                protein: 10.0,
                carbs: 30.0,
                fats: 10.0,
                fiber: 3.0,
                sugar: 5.0,
            },
            confidence: FALLBACK_CONFIDENCE,
            ingredients: Vec::new(),
            category: FoodCategory::Good,
        }
    }
}

/// Caller's language preference, e.g. `en`, `en-US`, `pt_BR`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    code: String,
}

impl Locale {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }

    pub fn english() -> Self {
        Self::new("en")
    }

    /// Primary language subtag, lowercased.
    pub fn language(&self) -> String {
        self.code
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase()
    }

    /// Empty or unparseable codes count as English.
    pub fn is_non_english(&self) -> bool {
        let language = self.language();
        !language.is_empty() && language != "en"
    }

    pub fn code(&self) -> &str {
        &self.code
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::english()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_amounts_rounds_and_clamps() {
        let estimate = NutritionEstimate::from_amounts(95.4, 0.5, 25.49, -3.0);
        assert_eq!(
            estimate,
            NutritionEstimate {
                calories: 95,
                protein: 1,
                carbs: 25,
                fats: 0
            }
        );
        assert_eq!(NutritionEstimate::from_amounts(f64::NAN, 1.0, 1.0, 1.0).calories, 0);
    }

    #[test]
    fn test_zero_calories_is_not_interpretable() {
        assert!(!NutritionEstimate::from_amounts(0.4, 10.0, 10.0, 10.0).is_interpretable());
        assert!(NutritionEstimate::from_amounts(1.0, 0.0, 0.0, 0.0).is_interpretable());
    }

    #[test]
    fn test_locale_language_detection() {
        assert!(!Locale::new("en-US").is_non_english());
        assert!(!Locale::new("EN_gb").is_non_english());
        assert!(!Locale::new("").is_non_english());
        assert!(Locale::new("pt-BR").is_non_english());
        assert_eq!(Locale::new("zh_TW").language(), "zh");
    }

    #[test]
    fn test_category_labels() {
        assert_eq!(FoodCategory::from_label("REAL"), FoodCategory::Real);
        assert_eq!(FoodCategory::from_label("processed"), FoodCategory::Good);
        assert_eq!(
            serde_json::to_string(&FoodCategory::Ultra).unwrap(),
            "\"ultra\""
        );
    }
}
