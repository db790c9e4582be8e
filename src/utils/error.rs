use thiserror::Error;

#[derive(Error, Debug)]
pub enum MealLensError {
    #[error("Food description is empty")]
    EmptyInput,

    #[error("Translation failed: {message}")]
    Translation { message: String },

    #[error("Could not resolve nutrition for '{description}'")]
    UnresolvedNutrition { description: String },

    #[error("Image analysis failed (status {status}): {message}")]
    ImageAnalysis { status: u16, message: String },

    #[error("Image could not be decoded or encoded: {0}")]
    InvalidImage(#[from] image::ImageError),

    #[error("API request failed: {0}")]
    Api(#[from] reqwest::Error),

    #[error("Unexpected response from {provider}: {message}")]
    ProviderResponse { provider: String, message: String },

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Provider,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl MealLensError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            MealLensError::EmptyInput | MealLensError::InvalidImage(_) => ErrorCategory::Input,
            MealLensError::Translation { .. }
            | MealLensError::UnresolvedNutrition { .. }
            | MealLensError::ImageAnalysis { .. }
            | MealLensError::Api(_)
            | MealLensError::ProviderResponse { .. } => ErrorCategory::Provider,
            MealLensError::ConfigValidationError { .. }
            | MealLensError::InvalidConfigValueError { .. }
            | MealLensError::MissingConfigError { .. } => ErrorCategory::Configuration,
            MealLensError::Csv(_) | MealLensError::Io(_) | MealLensError::Serialization(_) => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            MealLensError::EmptyInput | MealLensError::UnresolvedNutrition { .. } => {
                ErrorSeverity::Low
            }
            MealLensError::Translation { .. }
            | MealLensError::ImageAnalysis { .. }
            | MealLensError::Api(_)
            | MealLensError::ProviderResponse { .. } => ErrorSeverity::Medium,
            MealLensError::InvalidImage(_)
            | MealLensError::ConfigValidationError { .. }
            | MealLensError::InvalidConfigValueError { .. }
            | MealLensError::MissingConfigError { .. } => ErrorSeverity::High,
            MealLensError::Csv(_) | MealLensError::Io(_) | MealLensError::Serialization(_) => {
                ErrorSeverity::Critical
            }
        }
    }

    /// 給終端使用者看的訊息，不含供應商細節
    pub fn user_friendly_message(&self) -> String {
        match self {
            MealLensError::EmptyInput => "Please describe what you ate.".to_string(),
            MealLensError::Translation { .. } => {
                "We couldn't translate your description right now.".to_string()
            }
            MealLensError::UnresolvedNutrition { description } => {
                format!("We couldn't find nutrition data for \"{}\".", description)
            }
            MealLensError::ImageAnalysis { .. } => {
                "We couldn't analyze this photo right now.".to_string()
            }
            MealLensError::InvalidImage(_) => "This file doesn't look like a photo.".to_string(),
            MealLensError::Api(_) | MealLensError::ProviderResponse { .. } => {
                "A nutrition service is unavailable.".to_string()
            }
            MealLensError::ConfigValidationError { field, .. }
            | MealLensError::InvalidConfigValueError { field, .. }
            | MealLensError::MissingConfigError { field } => {
                format!("Configuration problem with '{}'.", field)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Input => match self {
                MealLensError::EmptyInput => "Enter a food description such as \"2 eggs and toast\".",
                _ => "Use a JPEG or PNG photo of the meal.",
            },
            ErrorCategory::Provider => match self {
                MealLensError::UnresolvedNutrition { .. } => {
                    "Try naming the ingredients with quantities, e.g. \"100g rice\"."
                }
                _ => "Check your network connection and API keys, then try again.",
            },
            ErrorCategory::Configuration => {
                "Check the config file and the environment variables it references."
            }
            ErrorCategory::System => "Check file paths and permissions.",
        }
    }
}

pub type Result<T> = std::result::Result<T, MealLensError>;
