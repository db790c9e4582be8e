// Domain layer: nutrition models and provider ports. No HTTP here.

pub mod model;
pub mod ports;

pub use model::{FoodCategory, Locale, NutritionEstimate, VisionAnalysis, VisionNutrition};
pub use ports::{ImageNutritionProvider, IngredientParser, InlineImage, Translator, VisionModel};
