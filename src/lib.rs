pub mod catalog;
pub mod config;
pub mod credentials;
pub mod error;
pub mod export;
pub mod gallery;
pub mod llm;
pub mod pipeline;
pub mod prompt;
pub mod state;
pub mod utils;

pub use error::ForgeError;
pub use llm::{generate_portrait, GenerationResult};
pub use prompt::{build_prompt, TraitSelection};
