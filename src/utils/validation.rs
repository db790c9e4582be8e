use crate::utils::error::{MealLensError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(MealLensError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(MealLensError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(MealLensError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: u32, min_value: u32) -> Result<()> {
    if value < min_value {
        return Err(MealLensError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

/// API key 仍保留 `${VAR}` 代表環境變數沒有設定
pub fn validate_api_key(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(MealLensError::MissingConfigError {
            field: field_name.to_string(),
        });
    }
    if value.starts_with("${") && value.ends_with('}') {
        return Err(MealLensError::ConfigValidationError {
            field: field_name.to_string(),
            message: format!("environment variable {} is not set", value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(MealLensError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(MealLensError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("spoonacular.base_url", "https://api.spoonacular.com").is_ok());
        assert!(validate_url("translation.base_url", "http://localhost:5000").is_ok());
        assert!(validate_url("spoonacular.base_url", "").is_err());
        assert!(validate_url("spoonacular.base_url", "invalid-url").is_err());
        assert!(validate_url("spoonacular.base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_api_key() {
        assert!(validate_api_key("gemini.api_key", "abc123").is_ok());
        assert!(matches!(
            validate_api_key("gemini.api_key", "  "),
            Err(MealLensError::MissingConfigError { .. })
        ));
        assert!(matches!(
            validate_api_key("gemini.api_key", "${GEMINI_API_KEY}"),
            Err(MealLensError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("resolver.jpeg_quality", 70u8, 1, 100).is_ok());
        assert!(validate_range("resolver.jpeg_quality", 0u8, 1, 100).is_err());
        assert!(validate_positive_number("resolver.max_image_width", 0, 1).is_err());
    }
}
