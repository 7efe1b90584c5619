//! XFCC codec errors.

use thiserror::Error;

/// Result type for the XFCC codec.
pub type Result<T> = std::result::Result<T, XfccError>;

/// Failure while decoding an `x-forwarded-client-cert` value.
///
/// Every variant carries the offending text so callers can log exactly
/// what was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XfccError {
    /// A field token has no `=` separator, or its value is not a
    /// well-formed quoted string.
    #[error("malformed field `{token}`: {reason}")]
    MalformedField { token: String, reason: &'static str },

    /// A field key is not one of `By`, `Hash`, `URI`, `DNS`, `Subject`.
    #[error("unknown field `{key}` in `{token}`")]
    UnknownField { key: String, token: String },

    /// The header ends inside a quoted value or on a dangling escape.
    #[error("malformed header near `{segment}`: {reason}")]
    MalformedHeader { segment: String, reason: &'static str },
}

/// Fieldless view of [`XfccError`] for policy decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MalformedField,
    UnknownField,
    MalformedHeader,
}

impl XfccError {
    pub(crate) fn malformed_field(token: &str, reason: &'static str) -> Self {
        Self::MalformedField {
            token: token.to_string(),
            reason,
        }
    }

    pub(crate) fn unknown_field(key: &str, token: &str) -> Self {
        Self::UnknownField {
            key: key.to_string(),
            token: token.to_string(),
        }
    }

    pub(crate) fn malformed_header(segment: &str, reason: &'static str) -> Self {
        Self::MalformedHeader {
            segment: segment.to_string(),
            reason,
        }
    }

    /// The error kind, without the offending text.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedField { .. } => ErrorKind::MalformedField,
            Self::UnknownField { .. } => ErrorKind::UnknownField,
            Self::MalformedHeader { .. } => ErrorKind::MalformedHeader,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_include_offending_text() {
        let err = XfccError::unknown_field("Foo", "Foo=\"x\"");
        assert_eq!(err.to_string(), "unknown field `Foo` in `Foo=\"x\"`");
        assert_eq!(err.kind(), ErrorKind::UnknownField);

        let err = XfccError::malformed_header("By=\"abc", "unterminated quoted value");
        assert!(err.to_string().contains("By=\"abc"));
        assert_eq!(err.kind(), ErrorKind::MalformedHeader);
    }
}
