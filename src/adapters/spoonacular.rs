//! Spoonacular REST client: ingredient-text parsing and food-photo analysis.

use crate::config::SpoonacularConfig;
use crate::domain::{ImageNutritionProvider, IngredientParser, NutritionEstimate};
use crate::utils::error::{MealLensError, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::fmt;

const PROVIDER: &str = "spoonacular";

#[derive(Debug, Deserialize)]
struct ParsedIngredient {
    #[serde(default)]
    nutrition: Option<IngredientNutrition>,
}

#[derive(Debug, Default, Deserialize)]
struct IngredientNutrition {
    #[serde(default)]
    nutrients: Vec<Nutrient>,
}

#[derive(Debug, Deserialize)]
struct Nutrient {
    name: String,
    #[serde(default)]
    amount: f64,
}

#[derive(Debug, Deserialize)]
struct ImageAnalysisResponse {
    nutrition: ImageNutrition,
}

#[derive(Debug, Default, Deserialize)]
struct ImageNutrition {
    #[serde(default)]
    calories: NutrientValue,
    #[serde(default)]
    protein: NutrientValue,
    #[serde(default)]
    carbs: NutrientValue,
    #[serde(default)]
    fat: NutrientValue,
}

#[derive(Debug, Default, Deserialize)]
struct NutrientValue {
    #[serde(default)]
    value: f64,
}

#[derive(Clone)]
pub struct SpoonacularClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl SpoonacularClient {
    pub fn new(config: &SpoonacularConfig, client: Client) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            client,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl fmt::Debug for SpoonacularClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpoonacularClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

/// Sums the macro nutrients over every parsed ingredient.
/// Returns `None` when the provider recognised no ingredients.
fn sum_ingredients(ingredients: &[ParsedIngredient]) -> Option<NutritionEstimate> {
    if ingredients.is_empty() {
        return None;
    }

    let (mut calories, mut protein, mut carbs, mut fats) = (0.0, 0.0, 0.0, 0.0);
    for nutrient in ingredients
        .iter()
        .filter_map(|i| i.nutrition.as_ref())
        .flat_map(|n| n.nutrients.iter())
    {
        match nutrient.name.to_ascii_lowercase().as_str() {
            "calories" => calories += nutrient.amount,
            "protein" => protein += nutrient.amount,
            "carbohydrates" => carbs += nutrient.amount,
            "fat" => fats += nutrient.amount,
            _ => {}
        }
    }

    Some(NutritionEstimate::from_amounts(calories, protein, carbs, fats))
}

#[async_trait]
impl IngredientParser for SpoonacularClient {
    async fn parse_ingredients(&self, text: &str) -> Result<Option<NutritionEstimate>> {
        let url = self.endpoint("/recipes/parseIngredients");
        tracing::debug!("Making ingredient parse request to: {}", url);

        let response = self
            .client
            .post(&url)
            .query(&[("apiKey", self.api_key.as_str())])
            .form(&[
                ("ingredientList", text),
                ("servings", "1"),
                ("includeNutrition", "true"),
            ])
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Ingredient parse response status: {}", status);

        if !status.is_success() {
            return Err(MealLensError::ProviderResponse {
                provider: PROVIDER.to_string(),
                message: format!("parseIngredients returned {}", status),
            });
        }

        let ingredients: Vec<ParsedIngredient> =
            response
                .json()
                .await
                .map_err(|e| MealLensError::ProviderResponse {
                    provider: PROVIDER.to_string(),
                    message: format!("unreadable parseIngredients body: {}", e),
                })?;

        Ok(sum_ingredients(&ingredients))
    }
}

#[async_trait]
impl ImageNutritionProvider for SpoonacularClient {
    async fn analyze_image(&self, jpeg: Vec<u8>) -> Result<NutritionEstimate> {
        let url = self.endpoint("/food/images/analyze");
        tracing::debug!("Uploading {} byte image to: {}", jpeg.len(), url);

        let part = Part::bytes(jpeg)
            .file_name("meal.jpg")
            .mime_str("image/jpeg")?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&url)
            .query(&[("apiKey", self.api_key.as_str())])
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Image analysis response status: {}", status);

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MealLensError::ImageAnalysis {
                status: status.as_u16(),
                message,
            });
        }

        let analysis: ImageAnalysisResponse =
            response
                .json()
                .await
                .map_err(|e| MealLensError::ProviderResponse {
                    provider: PROVIDER.to_string(),
                    message: format!("unreadable image analysis body: {}", e),
                })?;

        let nutrition = analysis.nutrition;
        Ok(NutritionEstimate::from_amounts(
            nutrition.calories.value,
            nutrition.protein.value,
            nutrition.carbs.value,
            nutrition.fat.value,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client_for(server: &MockServer) -> SpoonacularClient {
        let config = SpoonacularConfig {
            base_url: server.base_url(),
            api_key: "test-key".to_string(),
        };
        SpoonacularClient::new(&config, Client::new())
    }

    fn nutrient(name: &str, amount: f64) -> serde_json::Value {
        serde_json::json!({"name": name, "amount": amount, "unit": "g"})
    }

    #[tokio::test]
    async fn test_parse_sums_nutrients_across_ingredients() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/recipes/parseIngredients")
                .query_param("apiKey", "test-key")
                .body_contains("ingredientList=2+eggs")
                .body_contains("includeNutrition=true");
            then.status(200).json_body(serde_json::json!([
                {"name": "eggs", "nutrition": {"nutrients": [
                    nutrient("Calories", 143.0),
                    nutrient("Protein", 12.6),
                    nutrient("Fat", 9.5),
                    nutrient("Carbohydrates", 0.7),
                    nutrient("Sodium", 142.0)
                ]}},
                {"name": "toast", "nutrition": {"nutrients": [
                    nutrient("Calories", 75.2),
                    nutrient("Protein", 2.6),
                    nutrient("Carbohydrates", 13.9)
                ]}}
            ]));
        });

        let result = client_for(&server)
            .parse_ingredients("2 eggs")
            .await
            .unwrap();

        api_mock.assert();
        assert_eq!(
            result,
            Some(NutritionEstimate {
                calories: 218,
                protein: 15,
                carbs: 15,
                fats: 10
            })
        );
    }

    #[tokio::test]
    async fn test_parse_empty_array_is_none() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/recipes/parseIngredients");
            then.status(200).json_body(serde_json::json!([]));
        });

        let result = client_for(&server).parse_ingredients("xyz").await.unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_parse_error_status_is_provider_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/recipes/parseIngredients");
            then.status(402).body("quota exceeded");
        });

        let err = client_for(&server)
            .parse_ingredients("rice")
            .await
            .unwrap_err();
        assert!(matches!(err, MealLensError::ProviderResponse { .. }));
    }

    #[tokio::test]
    async fn test_analyze_image_rounds_macros() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/food/images/analyze")
                .query_param("apiKey", "test-key")
                .header_exists("content-type");
            then.status(200).json_body(serde_json::json!({
                "category": {"name": "pizza", "probability": 0.91},
                "nutrition": {
                    "recipesUsed": 25,
                    "calories": {"value": 297.6, "unit": "calories"},
                    "fat": {"value": 11.4, "unit": "g"},
                    "protein": {"value": 12.5, "unit": "g"},
                    "carbs": {"value": 33.5, "unit": "g"}
                }
            }));
        });

        let estimate = client_for(&server)
            .analyze_image(vec![0xFF, 0xD8, 0xFF])
            .await
            .unwrap();

        api_mock.assert();
        assert_eq!(
            estimate,
            NutritionEstimate {
                calories: 298,
                protein: 13,
                carbs: 34,
                fats: 11
            }
        );
    }

    #[tokio::test]
    async fn test_analyze_image_failure_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/food/images/analyze");
            then.status(500).body("boom");
        });

        let err = client_for(&server)
            .analyze_image(vec![1, 2, 3])
            .await
            .unwrap_err();
        match err {
            MealLensError::ImageAnalysis { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
