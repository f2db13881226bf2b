// Common module - shared types and utilities across all modules

pub mod error;
pub mod gender;
pub mod helpers;
pub mod id_generator;
pub mod mbti;
pub mod migrations;
pub mod state;
pub mod validation;

// Re-export commonly used types for convenience
pub use error::ApiError;
pub use gender::Gender;
pub use helpers::safe_email_log;
pub use id_generator::*;
pub use mbti::Mbti;
pub use state::{AppState, ProviderRegistry};
pub use validation::{ValidationResult, Validator};
