//! Food photo classification through a generative vision model.
//!
//! Unlike [`NutritionResolver`](crate::core::resolver::NutritionResolver) this
//! path never returns an error: every failure is logged as a [`Diagnostic`]
//! and replaced by [`VisionAnalysis::fallback`].

use crate::adapters::ImageCompressor;
use crate::domain::model::{FALLBACK_FOOD_NAME, FALLBACK_QUANTITY};
use crate::domain::{FoodCategory, VisionAnalysis, VisionModel, VisionNutrition};
use crate::utils::error::MealLensError;
use serde_json::{Map, Value};
use thiserror::Error;

pub const ANALYSIS_PROMPT: &str = r#"You are a nutrition expert. Identify the food in this photo and estimate its nutrition for the portion shown.
Respond with ONLY a JSON object, no markdown and no commentary, using exactly this shape:
{
  "detectedFood": "name of the dish",
  "estimatedQuantity": "portion size, e.g. 1 bowl (300g)",
  "nutrition": {"calories": 0, "protein": 0, "carbs": 0, "fats": 0, "fiber": 0, "sugar": 0},
  "confidence": 0.0,
  "ingredients": ["ingredient"],
  "category": "real | good | ultra"
}
Nutrient amounts are numbers (kcal for calories, grams otherwise). confidence is between 0 and 1.
category is "real" for whole unprocessed food, "good" for lightly processed food and "ultra" for ultra-processed food."#;

const PROBE_PROMPT: &str = "Reply with the single word OK.";

/// Why a vision analysis fell back to the placeholder.
#[derive(Debug, Error)]
pub enum Diagnostic {
    #[error("image could not be prepared: {0}")]
    Encoding(MealLensError),

    #[error("vision model request failed: {0}")]
    Transport(MealLensError),

    #[error("vision model returned an empty answer")]
    EmptyResponse,

    #[error("no JSON object found in model answer")]
    NoJsonObject,

    #[error("model JSON could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

pub struct VisionFoodAnalyzer {
    model: Box<dyn VisionModel>,
    compressor: ImageCompressor,
}

impl VisionFoodAnalyzer {
    pub fn new(model: Box<dyn VisionModel>) -> Self {
        Self {
            model,
            compressor: ImageCompressor::default(),
        }
    }

    pub fn with_compressor(mut self, compressor: ImageCompressor) -> Self {
        self.compressor = compressor;
        self
    }

    /// Always yields a usable analysis.
    pub async fn analyze(&self, image_bytes: &[u8]) -> VisionAnalysis {
        match self.try_analyze(image_bytes).await {
            Ok(analysis) => analysis,
            Err(diagnostic) => {
                tracing::warn!("⚠️ Vision analysis degraded to placeholder: {}", diagnostic);
                VisionAnalysis::fallback()
            }
        }
    }

    pub async fn try_analyze(&self, image_bytes: &[u8]) -> Result<VisionAnalysis, Diagnostic> {
        let inline = self
            .compressor
            .to_inline(image_bytes)
            .map_err(Diagnostic::Encoding)?;

        let answer = self
            .model
            .generate(ANALYSIS_PROMPT, Some(&inline))
            .await
            .map_err(Diagnostic::Transport)?;

        if answer.trim().is_empty() {
            return Err(Diagnostic::EmptyResponse);
        }

        let analysis = parse_model_answer(&answer)?;
        tracing::info!(
            "Vision model detected '{}' ({} kcal, confidence {:.2})",
            analysis.detected_food,
            analysis.nutrition.calories,
            analysis.confidence
        );
        Ok(analysis)
    }

    /// Connectivity check used for configuration diagnostics.
    pub async fn test_connection(&self) -> bool {
        match self.model.generate(PROBE_PROMPT, None).await {
            Ok(_) => true,
            Err(err) => {
                tracing::warn!("Vision model probe failed: {}", err);
                false
            }
        }
    }
}

/// Finds the balanced `{...}` substring with the earliest start, ignoring braces
/// inside JSON strings. Single pass over the input.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let mut starts: Vec<usize> = Vec::new();
    let mut best: Option<(usize, usize)> = None;
    let mut in_string = false;
    let mut escaped = false;

    for (index, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            // 大括號外的引號不算字串
            '"' if !starts.is_empty() => in_string = true,
            '{' => starts.push(index),
            '}' => {
                if let Some(start) = starts.pop() {
                    let end = index + ch.len_utf8();
                    if starts.is_empty() {
                        return Some(&text[start..end]);
                    }
                    match best {
                        Some((earliest, _)) if earliest < start => {}
                        _ => best = Some((start, end)),
                    }
                }
            }
            _ => {}
        }
    }

    best.map(|(start, end)| &text[start..end])
}

pub fn parse_model_answer(answer: &str) -> Result<VisionAnalysis, Diagnostic> {
    let json = extract_json_object(answer).ok_or(Diagnostic::NoJsonObject)?;
    let object: Map<String, Value> = serde_json::from_str(json)?;
    Ok(coerce_analysis(&object))
}

fn coerce_analysis(object: &Map<String, Value>) -> VisionAnalysis {
    for field in ["detectedFood", "nutrition", "category"] {
        if !object.contains_key(field) {
            tracing::debug!("Model answer is missing '{}', using default", field);
        }
    }

    let empty = Map::new();
    let nutrition = object
        .get("nutrition")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    VisionAnalysis {
        detected_food: coerce_string(object.get("detectedFood"), FALLBACK_FOOD_NAME),
        estimated_quantity: coerce_string(object.get("estimatedQuantity"), FALLBACK_QUANTITY),
        nutrition: VisionNutrition {
            calories: coerce_amount(nutrition.get("calories")),
            protein: coerce_amount(nutrition.get("protein")),
            carbs: coerce_amount(nutrition.get("carbs")),
            fats: coerce_amount(nutrition.get("fats").or_else(|| nutrition.get("fat"))),
            fiber: coerce_amount(nutrition.get("fiber")),
            sugar: coerce_amount(nutrition.get("sugar")),
        },
        confidence: coerce_number(object.get("confidence")).clamp(0.0, 1.0),
        ingredients: coerce_ingredients(object.get("ingredients")),
        category: object
            .get("category")
            .and_then(Value::as_str)
            .map(FoodCategory::from_label)
            .unwrap_or_default(),
    }
}

fn coerce_string(value: Option<&Value>, fallback: &str) -> String {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => fallback.to_string(),
    }
}

/// Nutrient amounts are never negative.
fn coerce_amount(value: Option<&Value>) -> f64 {
    coerce_number(value).max(0.0)
}

/// Best effort: numbers, numeric strings and strings with a leading number
/// such as `"95 kcal"`. Everything else is 0.
fn coerce_number(value: Option<&Value>) -> f64 {
    let number = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => leading_number(s),
        _ => 0.0,
    };
    if number.is_finite() {
        number
    } else {
        0.0
    }
}

fn leading_number(text: &str) -> f64 {
    let text = text.trim();
    let end = text
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && c == '-')))
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    text[..end].parse().unwrap_or(0.0)
}

fn coerce_ingredients(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}
