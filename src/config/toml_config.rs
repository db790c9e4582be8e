use crate::domain::Locale;
use crate::utils::error::{MealLensError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_SPOONACULAR_URL: &str = "https://api.spoonacular.com";
pub const DEFAULT_LIBRETRANSLATE_URL: &str = "https://libretranslate.com";
pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Provider endpoints, credentials and resolver tuning. Loaded once at
/// startup and shared read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub resolver: ResolverSettings,
    pub spoonacular: SpoonacularConfig,
    pub translation: Option<TranslationConfig>,
    pub gemini: Option<GeminiConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverSettings {
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default = "default_max_image_width")]
    pub max_image_width: u32,
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
    pub request_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpoonacularConfig {
    #[serde(default = "default_spoonacular_url")]
    pub base_url: String,
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    #[serde(default = "default_libretranslate_url")]
    pub base_url: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default = "default_gemini_url")]
    pub base_url: String,
    pub api_key: String,
    #[serde(default = "default_gemini_model")]
    pub model: String,
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_max_image_width() -> u32 {
    800
}

fn default_jpeg_quality() -> u8 {
    70
}

fn default_spoonacular_url() -> String {
    DEFAULT_SPOONACULAR_URL.to_string()
}

fn default_libretranslate_url() -> String {
    DEFAULT_LIBRETRANSLATE_URL.to_string()
}

fn default_gemini_url() -> String {
    DEFAULT_GEMINI_URL.to_string()
}

fn default_gemini_model() -> String {
    DEFAULT_GEMINI_MODEL.to_string()
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            max_image_width: default_max_image_width(),
            jpeg_quality: default_jpeg_quality(),
            request_timeout_seconds: None,
        }
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(MealLensError::Io)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| MealLensError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 沒有設定檔時，直接從環境變數組出配置
    pub fn from_env() -> Result<Self> {
        let api_key =
            std::env::var("SPOONACULAR_API_KEY").map_err(|_| MealLensError::MissingConfigError {
                field: "SPOONACULAR_API_KEY".to_string(),
            })?;

        let translation_url = std::env::var("LIBRETRANSLATE_URL").ok();
        let translation_key = std::env::var("LIBRETRANSLATE_API_KEY").ok();
        let translation = if translation_url.is_some() || translation_key.is_some() {
            Some(TranslationConfig {
                base_url: translation_url.unwrap_or_else(default_libretranslate_url),
                api_key: translation_key,
            })
        } else {
            None
        };

        let gemini = std::env::var("GEMINI_API_KEY")
            .ok()
            .map(|api_key| GeminiConfig {
                base_url: default_gemini_url(),
                api_key,
                model: std::env::var("GEMINI_MODEL").unwrap_or_else(|_| default_gemini_model()),
            });

        Ok(Self {
            resolver: ResolverSettings {
                locale: std::env::var("MEAL_LENS_LOCALE").unwrap_or_else(|_| default_locale()),
                ..ResolverSettings::default()
            },
            spoonacular: SpoonacularConfig {
                base_url: default_spoonacular_url(),
                api_key,
            },
            translation,
            gemini,
        })
    }

    /// 替換環境變數 (例如 ${SPOONACULAR_API_KEY})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| MealLensError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn locale(&self) -> Locale {
        Locale::new(self.resolver.locale.clone())
    }

    /// Shared transport for all adapters; only the timeout is configurable.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder();
        if let Some(seconds) = self.resolver.request_timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        Ok(builder.build()?)
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("resolver.locale", &self.resolver.locale)?;
        validation::validate_positive_number(
            "resolver.max_image_width",
            self.resolver.max_image_width,
            1,
        )?;
        validation::validate_range("resolver.jpeg_quality", self.resolver.jpeg_quality, 1, 100)?;
        if let Some(seconds) = self.resolver.request_timeout_seconds {
            validation::validate_range("resolver.request_timeout_seconds", seconds, 1, 600)?;
        }

        validation::validate_url("spoonacular.base_url", &self.spoonacular.base_url)?;
        validation::validate_api_key("spoonacular.api_key", &self.spoonacular.api_key)?;

        if let Some(translation) = &self.translation {
            validation::validate_url("translation.base_url", &translation.base_url)?;
            if let Some(key) = &translation.api_key {
                validation::validate_api_key("translation.api_key", key)?;
            }
        }

        if let Some(gemini) = &self.gemini {
            validation::validate_url("gemini.base_url", &gemini.base_url)?;
            validation::validate_api_key("gemini.api_key", &gemini.api_key)?;
            validation::validate_non_empty_string("gemini.model", &gemini.model)?;
        }

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }
}
