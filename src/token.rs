//! Rendering tokens.
//!
//! The rendering service identifies a resume by an opaque 24-character
//! alphanumeric token. Validating it up front turns typos into a clear
//! [`Resume2PdfError::InvalidToken`] instead of a confusing 404 from the
//! service.

use crate::error::Resume2PdfError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Exact length of a rendering token.
pub const TOKEN_LEN: usize = 24;

/// A validated rendering token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RenderingToken(String);

impl RenderingToken {
    /// Validate `raw` and wrap it. Surrounding whitespace is ignored.
    pub fn parse(raw: &str) -> Result<Self, Resume2PdfError> {
        let token = raw.trim();
        if token.len() == TOKEN_LEN && token.bytes().all(|b| b.is_ascii_alphanumeric()) {
            Ok(Self(token.to_string()))
        } else {
            Err(Resume2PdfError::InvalidToken {
                token: raw.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for RenderingToken {
    type Err = Resume2PdfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RenderingToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RenderingToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_24_alphanumeric() {
        let t = RenderingToken::parse("AbCdEf0123456789GhIjKlMn").expect("valid token");
        assert_eq!(t.as_str(), "AbCdEf0123456789GhIjKlMn");
        assert_eq!(t.to_string().len(), TOKEN_LEN);
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let t: RenderingToken = "  AbCdEf0123456789GhIjKlMn\n".parse().unwrap();
        assert_eq!(t.as_str(), "AbCdEf0123456789GhIjKlMn");
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(RenderingToken::parse("").is_err());
        assert!(RenderingToken::parse("AbCdEf0123456789GhIjKlM").is_err()); // 23
        assert!(RenderingToken::parse("AbCdEf0123456789GhIjKlMnO").is_err()); // 25
    }

    #[test]
    fn rejects_non_alphanumeric() {
        assert!(RenderingToken::parse("AbCdEf0123456789GhIjKl-n").is_err());
        assert!(RenderingToken::parse("AbCdEf0123456789GhIjKl n").is_err());
        assert!(RenderingToken::parse("AbCdEf0123456789GhIjKl_n").is_err());
    }

    #[test]
    fn rejects_non_ascii_letters() {
        // 24 chars, but 'é' is not ASCII alphanumeric
        let raw = "AbCdEf0123456789GhIjKlMé";
        assert_eq!(raw.chars().count(), 24);
        assert!(RenderingToken::parse(raw).is_err());
    }

    #[test]
    fn error_keeps_raw_input() {
        match RenderingToken::parse("short") {
            Err(Resume2PdfError::InvalidToken { token }) => assert_eq!(token, "short"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
