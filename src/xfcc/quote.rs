//! Quoted-value encoding for XFCC field values.
//!
//! A value travels as `"..."` with `"` and `\` escaped by a leading
//! backslash. No other escape sequence exists.

use super::error::{Result, XfccError};

/// Wrap a value in double quotes, escaping `"` and `\`.
pub fn enquote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Strip the surrounding quotes from a token and decode its escapes.
///
/// Fails with [`XfccError::MalformedField`] when the token is not
/// enclosed in quotes, contains a bare quote, or uses an escape other
/// than `\"` and `\\`.
pub fn unquote(token: &str) -> Result<String> {
    let inner = token
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .ok_or_else(|| XfccError::malformed_field(token, "value is not enclosed in double quotes"))?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped @ ('"' | '\\')) => out.push(escaped),
                Some(_) => {
                    return Err(XfccError::malformed_field(token, "invalid escape sequence"));
                }
                None => {
                    return Err(XfccError::malformed_field(token, "value ends with a dangling escape"));
                }
            },
            '"' => return Err(XfccError::malformed_field(token, "unescaped quote inside value")),
            c => out.push(c),
        }
    }

    Ok(out)
}
