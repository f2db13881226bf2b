// src/services/mod.rs
//
// Shared services module containing the outbound integrations
// used by the domain modules

pub mod oauth;
pub mod openai;

// Re-export commonly used types for convenience
pub use openai::OpenAIService;
