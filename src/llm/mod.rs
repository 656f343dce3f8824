pub mod gemini;
pub mod media;

pub use gemini::{
    generate_portrait, GeminiClient, GenerationRequest, GenerationResult, ModelFamily,
};
