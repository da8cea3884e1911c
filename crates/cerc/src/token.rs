use std::borrow::Borrow;
use std::fmt;

use uuid::Uuid;

/// Correlation token of one probe attempt.
///
/// Tokens are random UUIDs (v4). Uniqueness is assumed, not checked: a
/// collision would make two attempts share a tracker entry, which the
/// 122 random bits make negligible.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token(String);

impl Token {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Lets maps keyed by `Token` be queried with a plain `&str`.
impl Borrow<str> for Token {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
