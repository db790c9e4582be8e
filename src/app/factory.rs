use crate::adapters::{GeminiClient, ImageCompressor, LibreTranslateClient, SpoonacularClient};
use crate::config::AppConfig;
use crate::core::{NutritionResolver, VisionFoodAnalyzer};
use crate::utils::error::{MealLensError, Result};

fn compressor(config: &AppConfig) -> ImageCompressor {
    ImageCompressor::new(config.resolver.max_image_width, config.resolver.jpeg_quality)
}

/// Wires the Spoonacular and (optional) LibreTranslate clients into a resolver.
pub fn build_resolver(config: &AppConfig) -> Result<NutritionResolver> {
    let client = config.http_client()?;
    let spoonacular = SpoonacularClient::new(&config.spoonacular, client.clone());

    let mut resolver = NutritionResolver::new(Box::new(spoonacular.clone()), Box::new(spoonacular))
        .with_locale(config.locale())
        .with_compressor(compressor(config));

    if let Some(translation) = &config.translation {
        resolver = resolver.with_translator(Box::new(LibreTranslateClient::new(translation, client)));
    } else {
        tracing::debug!("No translation provider configured");
    }

    Ok(resolver)
}

pub fn build_vision_analyzer(config: &AppConfig) -> Result<VisionFoodAnalyzer> {
    let gemini = config
        .gemini
        .as_ref()
        .ok_or_else(|| MealLensError::MissingConfigError {
            field: "gemini".to_string(),
        })?;

    let model = GeminiClient::new(gemini, config.http_client()?);
    Ok(VisionFoodAnalyzer::new(Box::new(model)).with_compressor(compressor(config)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
[resolver]
locale = "es"

[spoonacular]
api_key = "spoon-key"

[translation]
base_url = "http://localhost:5000"
"#;

    #[test]
    fn test_build_resolver_uses_configured_locale() {
        let config = AppConfig::from_toml_str(CONFIG).unwrap();
        let resolver = build_resolver(&config).unwrap();
        assert_eq!(resolver.locale().code(), "es");
    }

    #[test]
    fn test_vision_requires_gemini_section() {
        let config = AppConfig::from_toml_str(CONFIG).unwrap();
        assert!(matches!(
            build_vision_analyzer(&config),
            Err(MealLensError::MissingConfigError { .. })
        ));
    }
}
