// Adapters layer: concrete clients for the external nutrition, translation
// and vision services, plus the image codec they share.

pub mod gemini;
pub mod image_codec;
pub mod libretranslate;
pub mod spoonacular;

pub use gemini::GeminiClient;
pub use image_codec::ImageCompressor;
pub use libretranslate::LibreTranslateClient;
pub use spoonacular::SpoonacularClient;
