use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque correlation key shared by the landing form and the survey.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct Token(String);

impl Token {
    /// Generate a fresh token (random v4 UUID, hyphenated lowercase).
    pub fn generate() -> Self {
        Token(Uuid::new_v4().to_string())
    }

    /// Wrap a value received from a remote sender. Surrounding whitespace is
    /// stripped; empty values and values containing NUL are rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.contains('\0') {
            None
        } else {
            Some(Token(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
