//! XFCC header parsing and serialization.
//!
//! Wire grammar:
//!
//! ```text
//! header       := entry (',' entry)*
//! entry        := (field (';' field)*)?
//! field        := key '=' quoted-value
//! key          := 'By' | 'Hash' | 'URI' | 'DNS' | 'Subject'
//! quoted-value := '"' (escaped-char | plain-char)* '"'
//! escaped-char := '\' ('"' | '\')
//! ```
//!
//! Delimiters inside quoted values are literal, so segmentation is done
//! by a single-pass scanner that tracks quote and escape state rather
//! than by splitting on `,` and `;`.

use super::chain::HeaderChain;
use super::entry::{CertificateEntry, EntryBuilder, Field};
use super::error::{Result, XfccError};
use super::quote::{enquote, unquote};

const ENTRY_SEPARATOR: u8 = b',';
const FIELD_SEPARATOR: u8 = b';';
const KEY_VALUE_SEPARATOR: u8 = b'=';

/// Quote/escape tracking for the segment scanner.
///
/// All delimiters are ASCII, so scanning bytes never lands inside a
/// multi-byte UTF-8 sequence.
#[derive(Debug, Default)]
struct QuoteState {
    in_quotes: bool,
    escaped: bool,
}

impl QuoteState {
    /// Consume one byte. Returns true if the byte lies outside any quoted value.
    fn advance(&mut self, b: u8) -> bool {
        if self.in_quotes {
            if self.escaped {
                self.escaped = false;
            } else if b == b'\\' {
                self.escaped = true;
            } else if b == b'"' {
                self.in_quotes = false;
            }
            false
        } else if b == b'"' {
            self.in_quotes = true;
            false
        } else {
            true
        }
    }

    /// Check that input ended outside any quoted value.
    fn finish(&self, tail: &str) -> Result<()> {
        if self.escaped {
            return Err(XfccError::malformed_header(tail, "trailing escape character"));
        }
        if self.in_quotes {
            return Err(XfccError::malformed_header(tail, "unterminated quoted value"));
        }
        Ok(())
    }
}

/// Split on `delim` wherever it appears outside a quoted value.
fn split_unquoted(input: &str, delim: u8) -> Result<Vec<&str>> {
    let mut parts = Vec::new();
    let mut state = QuoteState::default();
    let mut start = 0;

    for (i, b) in input.bytes().enumerate() {
        if state.advance(b) && b == delim {
            parts.push(&input[start..i]);
            start = i + 1;
        }
    }

    let tail = &input[start..];
    state.finish(tail)?;
    parts.push(tail);
    Ok(parts)
}

/// Position of the first `needle` outside a quoted value.
fn find_unquoted(input: &str, needle: u8) -> Option<usize> {
    let mut state = QuoteState::default();
    input
        .bytes()
        .position(|b| state.advance(b) && b == needle)
}

/// Parse a raw header value into its chain of entries.
///
/// An empty string is an absent header and yields an empty chain. Any
/// structural problem aborts the whole parse.
pub fn parse(raw: &str) -> Result<HeaderChain> {
    if raw.is_empty() {
        return Ok(HeaderChain::new());
    }

    split_unquoted(raw, ENTRY_SEPARATOR)?
        .into_iter()
        .map(parse_entry)
        .collect()
}

/// Parse one `,`-delimited segment. An empty segment is an entry with
/// every field absent.
pub fn parse_entry(segment: &str) -> Result<CertificateEntry> {
    let mut builder = EntryBuilder::default();
    if segment.is_empty() {
        return Ok(builder.build());
    }

    for token in split_unquoted(segment, FIELD_SEPARATOR)? {
        let (field, value) = parse_field(token)?;
        builder.set(field, value);
    }

    Ok(builder.build())
}

fn parse_field(token: &str) -> Result<(Field, String)> {
    let eq = find_unquoted(token, KEY_VALUE_SEPARATOR)
        .ok_or_else(|| XfccError::malformed_field(token, "missing `=` separator"))?;
    let (key, quoted) = (&token[..eq], &token[eq + 1..]);

    let field = Field::from_key(key).ok_or_else(|| XfccError::unknown_field(key, token))?;
    let value = unquote(quoted)?;

    Ok((field, value))
}

/// Serialize a chain to its canonical header value.
pub fn serialize(chain: &HeaderChain) -> String {
    chain
        .iter()
        .map(serialize_entry)
        .collect::<Vec<_>>()
        .join(",")
}

/// Serialize one entry. Absent fields are omitted; an entry with no
/// fields becomes the empty string.
pub fn serialize_entry(entry: &CertificateEntry) -> String {
    let mut pairs = Vec::new();

    for field in Field::ALL {
        for value in entry.values(field) {
            // every DNS element is emitted, empty or not
            if field == Field::Dns || !value.is_empty() {
                pairs.push(format!("{}={}", field, enquote(value)));
            }
        }
    }

    pairs.join(";")
}
