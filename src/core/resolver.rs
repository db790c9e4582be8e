//! Text and photo resolution against the dedicated nutrition providers.
//!
//! Text goes through a fixed waterfall:
//!
//! ```text
//! Direct ──ok──────────────────────────────▶ Succeeded
//!   │ soft failure
//!   ├── non-English locale ──▶ Translating ──err──▶ Failed(Translation)
//!   │                              │ ok
//!   └── otherwise ─────────────▶ Retrying ──ok──▶ Succeeded
//!                                  └─ soft failure ─▶ Failed(UnresolvedNutrition)
//! ```
//!
//! The parser is called at most twice and the translator at most once.

use crate::adapters::ImageCompressor;
use crate::domain::{ImageNutritionProvider, IngredientParser, Locale, NutritionEstimate, Translator};
use crate::utils::error::{MealLensError, Result};

const TARGET_LANGUAGE: &str = "en";

#[derive(Debug)]
pub enum WaterfallState {
    Direct {
        text: String,
    },
    Translating {
        text: String,
        source_language: String,
    },
    Retrying {
        text: String,
        original: String,
    },
    Succeeded(NutritionEstimate),
    Failed(MealLensError),
}

/// Trims and collapses whitespace runs to single spaces.
pub fn normalize_description(description: &str) -> String {
    description.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub struct NutritionResolver {
    parser: Box<dyn IngredientParser>,
    image_provider: Box<dyn ImageNutritionProvider>,
    translator: Option<Box<dyn Translator>>,
    compressor: ImageCompressor,
    locale: Locale,
}

impl NutritionResolver {
    pub fn new(
        parser: Box<dyn IngredientParser>,
        image_provider: Box<dyn ImageNutritionProvider>,
    ) -> Self {
        Self {
            parser,
            image_provider,
            translator: None,
            compressor: ImageCompressor::default(),
            locale: Locale::english(),
        }
    }

    pub fn with_translator(mut self, translator: Box<dyn Translator>) -> Self {
        self.translator = Some(translator);
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn with_compressor(mut self, compressor: ImageCompressor) -> Self {
        self.compressor = compressor;
        self
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// Resolves a description using the configured locale.
    pub async fn resolve_from_text(&self, description: &str) -> Result<NutritionEstimate> {
        self.resolve_from_text_with_locale(description, &self.locale)
            .await
    }

    pub async fn resolve_from_text_with_locale(
        &self,
        description: &str,
        locale: &Locale,
    ) -> Result<NutritionEstimate> {
        let text = normalize_description(description);
        if text.is_empty() {
            return Err(MealLensError::EmptyInput);
        }

        tracing::debug!("Resolving '{}' (locale {})", text, locale.code());

        let mut state = WaterfallState::Direct { text };
        loop {
            state = match state {
                WaterfallState::Succeeded(estimate) => return Ok(estimate),
                WaterfallState::Failed(err) => return Err(err),
                pending => self.step(pending, locale).await,
            };
        }
    }

    /// Performs exactly one waterfall transition. Terminal states are returned unchanged.
    pub async fn step(&self, state: WaterfallState, locale: &Locale) -> WaterfallState {
        match state {
            WaterfallState::Direct { text } => {
                if let Some(estimate) = self.attempt_parse(&text).await {
                    return WaterfallState::Succeeded(estimate);
                }
                match &self.translator {
                    Some(_) if locale.is_non_english() => WaterfallState::Translating {
                        text,
                        source_language: locale.language(),
                    },
                    _ => WaterfallState::Retrying {
                        original: text.clone(),
                        text,
                    },
                }
            }
            WaterfallState::Translating {
                text,
                source_language,
            } => match self.translate(&text, &source_language).await {
                Ok(translated) => WaterfallState::Retrying {
                    text: translated,
                    original: text,
                },
                Err(err) => WaterfallState::Failed(err),
            },
            WaterfallState::Retrying { text, original } => match self.attempt_parse(&text).await {
                Some(estimate) => WaterfallState::Succeeded(estimate),
                None => {
                    tracing::info!("❌ No nutrition data found for '{}'", original);
                    WaterfallState::Failed(MealLensError::UnresolvedNutrition {
                        description: original,
                    })
                }
            },
            terminal => terminal,
        }
    }

    /// Any provider error, empty result or zero-calorie result is a soft failure.
    async fn attempt_parse(&self, text: &str) -> Option<NutritionEstimate> {
        match self.parser.parse_ingredients(text).await {
            Ok(Some(estimate)) if estimate.is_interpretable() => {
                tracing::debug!("Parsed '{}' as {} kcal", text, estimate.calories);
                Some(estimate)
            }
            Ok(Some(_)) => {
                tracing::warn!("Parser returned zero calories for '{}'", text);
                None
            }
            Ok(None) => {
                tracing::warn!("Parser recognised no ingredients in '{}'", text);
                None
            }
            Err(err) => {
                tracing::warn!("Parser call failed for '{}': {}", text, err);
                None
            }
        }
    }

    async fn translate(&self, text: &str, source_language: &str) -> Result<String> {
        let translator = self
            .translator
            .as_ref()
            .ok_or_else(|| MealLensError::Translation {
                message: "no translation provider configured".to_string(),
            })?;

        let translated = translator
            .translate(text, source_language, TARGET_LANGUAGE)
            .await
            .map_err(|err| match err {
                MealLensError::Translation { .. } => err,
                other => MealLensError::Translation {
                    message: other.to_string(),
                },
            })?;

        let translated = normalize_description(&translated);
        if translated.is_empty() {
            return Err(MealLensError::Translation {
                message: "translation provider returned empty text".to_string(),
            });
        }

        tracing::debug!("Translated '{}' -> '{}'", text, translated);
        Ok(translated)
    }

    /// One upload to the image provider; no fallback.
    pub async fn resolve_from_image(&self, image_bytes: &[u8]) -> Result<NutritionEstimate> {
        let jpeg = self.compressor.compress(image_bytes)?;

        self.image_provider
            .analyze_image(jpeg)
            .await
            .map_err(|err| match err {
                MealLensError::ImageAnalysis { .. } => err,
                other => MealLensError::ImageAnalysis {
                    status: 0,
                    message: other.to_string(),
                },
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Parser fake keyed by exact input text; unknown text yields no ingredients.
    #[derive(Clone, Default)]
    struct ScriptedParser {
        answers: Arc<HashMap<String, u32>>,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl ScriptedParser {
        fn with(answers: &[(&str, u32)]) -> Self {
            Self {
                answers: Arc::new(
                    answers
                        .iter()
                        .map(|(k, v)| (k.to_string(), *v))
                        .collect(),
                ),
                calls: Arc::default(),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl IngredientParser for ScriptedParser {
        async fn parse_ingredients(&self, text: &str) -> Result<Option<NutritionEstimate>> {
            self.calls.lock().unwrap().push(text.to_string());
            Ok(self.answers.get(text).map(|calories| NutritionEstimate {
                calories: *calories,
                protein: 1,
                carbs: 2,
                fats: 3,
            }))
        }
    }

    #[derive(Clone, Default)]
    struct FixedTranslator {
        output: Option<String>,
        calls: Arc<Mutex<u32>>,
    }

    #[async_trait]
    impl Translator for FixedTranslator {
        async fn translate(&self, _text: &str, _source: &str, _target: &str) -> Result<String> {
            *self.calls.lock().unwrap() += 1;
            self.output.clone().ok_or(MealLensError::Translation {
                message: "unavailable".to_string(),
            })
        }
    }

    struct NoImages;

    #[async_trait]
    impl ImageNutritionProvider for NoImages {
        async fn analyze_image(&self, _jpeg: Vec<u8>) -> Result<NutritionEstimate> {
            Err(MealLensError::ImageAnalysis {
                status: 503,
                message: "down".to_string(),
            })
        }
    }

    fn resolver(parser: &ScriptedParser, translator: &FixedTranslator) -> NutritionResolver {
        NutritionResolver::new(Box::new(parser.clone()), Box::new(NoImages))
            .with_translator(Box::new(translator.clone()))
    }

    #[test]
    fn test_normalize_description() {
        assert_eq!(normalize_description("  2   eggs\t and\ntoast  "), "2 eggs and toast");
        assert_eq!(normalize_description(" \t\n "), "");
    }

    #[tokio::test]
    async fn test_direct_step_success_is_terminal() {
        let parser = ScriptedParser::with(&[("apple", 95)]);
        let translator = FixedTranslator::default();
        let resolver = resolver(&parser, &translator);

        let next = resolver
            .step(
                WaterfallState::Direct {
                    text: "apple".to_string(),
                },
                &Locale::new("de"),
            )
            .await;

        assert!(matches!(next, WaterfallState::Succeeded(e) if e.calories == 95));
    }

    #[tokio::test]
    async fn test_direct_step_soft_failure_moves_to_translating_for_non_english() {
        let parser = ScriptedParser::with(&[]);
        let translator = FixedTranslator::default();
        let resolver = resolver(&parser, &translator);

        let next = resolver
            .step(
                WaterfallState::Direct {
                    text: "Apfel".to_string(),
                },
                &Locale::new("de-AT"),
            )
            .await;

        match next {
            WaterfallState::Translating {
                text,
                source_language,
            } => {
                assert_eq!(text, "Apfel");
                assert_eq!(source_language, "de");
            }
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_direct_step_soft_failure_moves_to_retrying_for_english() {
        let parser = ScriptedParser::with(&[]);
        let translator = FixedTranslator::default();
        let resolver = resolver(&parser, &translator);

        let next = resolver
            .step(
                WaterfallState::Direct {
                    text: "glorp".to_string(),
                },
                &Locale::english(),
            )
            .await;

        assert!(matches!(next, WaterfallState::Retrying { ref text, .. } if text == "glorp"));
    }

    #[tokio::test]
    async fn test_translating_failure_is_fatal() {
        let parser = ScriptedParser::with(&[]);
        let translator = FixedTranslator::default();
        let resolver = resolver(&parser, &translator);

        let next = resolver
            .step(
                WaterfallState::Translating {
                    text: "arroz".to_string(),
                    source_language: "es".to_string(),
                },
                &Locale::new("es"),
            )
            .await;

        assert!(matches!(
            next,
            WaterfallState::Failed(MealLensError::Translation { .. })
        ));
        assert!(parser.calls().is_empty());
    }

    #[tokio::test]
    async fn test_retrying_failure_reports_original_description() {
        let parser = ScriptedParser::with(&[]);
        let translator = FixedTranslator::default();
        let resolver = resolver(&parser, &translator);

        let next = resolver
            .step(
                WaterfallState::Retrying {
                    text: "rice".to_string(),
                    original: "arroz".to_string(),
                },
                &Locale::new("es"),
            )
            .await;

        match next {
            WaterfallState::Failed(MealLensError::UnresolvedNutrition { description }) => {
                assert_eq!(description, "arroz")
            }
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_terminal_state_is_unchanged() {
        let parser = ScriptedParser::with(&[]);
        let translator = FixedTranslator::default();
        let resolver = resolver(&parser, &translator);

        let next = resolver
            .step(WaterfallState::Failed(MealLensError::EmptyInput), &Locale::english())
            .await;

        assert!(matches!(next, WaterfallState::Failed(MealLensError::EmptyInput)));
        assert!(parser.calls().is_empty());
    }

    #[tokio::test]
    async fn test_full_waterfall_translates_and_retries() {
        let parser = ScriptedParser::with(&[("two eggs", 143)]);
        let translator = FixedTranslator {
            output: Some("two  eggs ".to_string()),
            ..Default::default()
        };
        let resolver = resolver(&parser, &translator).with_locale(Locale::new("pt-BR"));

        let estimate = resolver.resolve_from_text("  dois   ovos ").await.unwrap();

        assert_eq!(estimate.calories, 143);
        assert_eq!(parser.calls(), vec!["dois ovos", "two eggs"]);
        assert_eq!(*translator.calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_non_english_without_translator_retries_original_text() {
        let parser = ScriptedParser::with(&[]);
        let resolver =
            NutritionResolver::new(Box::new(parser.clone()), Box::new(NoImages))
                .with_locale(Locale::new("fr"));

        let err = resolver.resolve_from_text("pomme").await.unwrap_err();

        assert!(matches!(err, MealLensError::UnresolvedNutrition { .. }));
        assert_eq!(parser.calls(), vec!["pomme", "pomme"]);
    }

    #[tokio::test]
    async fn test_image_provider_failure_propagates() {
        let parser = ScriptedParser::with(&[]);
        let translator = FixedTranslator::default();
        let resolver = resolver(&parser, &translator);

        let mut png = Vec::new();
        image::DynamicImage::new_rgb8(16, 16)
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let err = resolver.resolve_from_image(&png).await.unwrap_err();
        assert!(matches!(err, MealLensError::ImageAnalysis { status: 503, .. }));
    }
}
