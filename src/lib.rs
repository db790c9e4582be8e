pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

pub use config::AppConfig;
pub use crate::core::{NutritionResolver, VisionFoodAnalyzer};
pub use domain::{FoodCategory, Locale, NutritionEstimate, VisionAnalysis};
pub use utils::error::{MealLensError, Result};
