// MBTI personality type value object

use serde::{Deserialize, Serialize};
use std::fmt;

/// All sixteen MBTI type codes
const VALID_TYPES: [&str; 16] = [
    "INTJ", "INTP", "ENTJ", "ENTP", "INFJ", "INFP", "ENFJ", "ENFP", "ISTJ", "ISFJ", "ESTJ",
    "ESFJ", "ISTP", "ISFP", "ESTP", "ESFP",
];

/// Validated MBTI type code, stored uppercase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mbti(String);

impl Mbti {
    /// Parses an MBTI code, case-insensitively
    pub fn new(value: &str) -> Result<Self, String> {
        let upper = value.trim().to_uppercase();
        if VALID_TYPES.contains(&upper.as_str()) {
            Ok(Mbti(upper))
        } else {
            Err(format!("invalid MBTI type: {}", value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Mbti {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
