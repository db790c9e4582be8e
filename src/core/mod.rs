pub mod resolver;
pub mod vision;

pub use crate::domain::{Locale, NutritionEstimate, VisionAnalysis};
pub use crate::utils::error::Result;
pub use resolver::{normalize_description, NutritionResolver, WaterfallState};
pub use vision::{extract_json_object, Diagnostic, VisionFoodAnalyzer};
