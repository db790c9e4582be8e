use crate::domain::model::NutritionEstimate;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Ingredient-text parser (Spoonacular `parseIngredients`).
#[async_trait]
pub trait IngredientParser: Send + Sync {
    /// `Ok(None)` means the provider answered but returned no ingredient entries.
    async fn parse_ingredients(&self, text: &str) -> Result<Option<NutritionEstimate>>;
}

/// Image nutrition analyzer (Spoonacular `food/images/analyze`).
#[async_trait]
pub trait ImageNutritionProvider: Send + Sync {
    async fn analyze_image(&self, jpeg: Vec<u8>) -> Result<NutritionEstimate>;
}

/// Machine translation (LibreTranslate).
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String>;
}

/// Image payload ready to be embedded in a generative request.
#[derive(Debug, Clone)]
pub struct InlineImage {
    pub mime_type: &'static str,
    pub base64_data: String,
}

/// Generative vision-language model (Gemini).
#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Returns the model's free-form text answer.
    async fn generate(&self, prompt: &str, image: Option<&InlineImage>) -> Result<String>;
}
