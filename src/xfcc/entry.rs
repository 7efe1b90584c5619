//! A single hop's certificate summary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Wire keys of an XFCC entry, in serialization order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// SAN of the proxy that terminated the hop.
    By,
    /// SHA-256 digest of the client certificate.
    Hash,
    /// URI-type SAN of the client certificate.
    Uri,
    /// DNS-type SAN of the client certificate (repeatable).
    Dns,
    /// Subject DN of the client certificate.
    Subject,
}

impl Field {
    /// All keys in the order they are serialized.
    pub const ALL: [Field; 5] = [Field::By, Field::Hash, Field::Uri, Field::Dns, Field::Subject];

    /// Match a wire key. Matching is case-sensitive.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "By" => Some(Field::By),
            "Hash" => Some(Field::Hash),
            "URI" => Some(Field::Uri),
            "DNS" => Some(Field::Dns),
            "Subject" => Some(Field::Subject),
            _ => None,
        }
    }

    /// The wire spelling of this key.
    pub fn key(self) -> &'static str {
        match self {
            Field::By => "By",
            Field::Hash => "Hash",
            Field::Uri => "URI",
            Field::Dns => "DNS",
            Field::Subject => "Subject",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Plain field values used to construct a [`CertificateEntry`].
///
/// An empty string means the field is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFields {
    pub by: String,
    pub hash: String,
    pub san_uri: String,
    pub san_dns: Vec<String>,
    pub subject: String,
}

/// One proxy hop's view of the client certificate.
///
/// Entries are immutable: build one from [`EntryFields`] or obtain one
/// from the parser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CertificateEntry {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    by: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    hash: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    san_uri: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    san_dns: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    subject: String,
}

impl CertificateEntry {
    /// SAN of the proxy that terminated this hop.
    pub fn by(&self) -> &str {
        &self.by
    }

    /// Hex SHA-256 digest of the peer certificate.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// URI-type SAN of the client certificate.
    pub fn san_uri(&self) -> &str {
        &self.san_uri
    }

    /// DNS-type SANs of the client certificate, in wire order.
    pub fn san_dns(&self) -> &[String] {
        &self.san_dns
    }

    /// Subject DN of the client certificate.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// True when every field is absent.
    pub fn is_empty(&self) -> bool {
        self.by.is_empty()
            && self.hash.is_empty()
            && self.san_uri.is_empty()
            && self.san_dns.is_empty()
            && self.subject.is_empty()
    }

    /// Values stored under `field`. Single-valued fields yield one element,
    /// which is empty when absent.
    pub fn values(&self, field: Field) -> &[String] {
        match field {
            Field::By => std::slice::from_ref(&self.by),
            Field::Hash => std::slice::from_ref(&self.hash),
            Field::Uri => std::slice::from_ref(&self.san_uri),
            Field::Dns => &self.san_dns,
            Field::Subject => std::slice::from_ref(&self.subject),
        }
    }

    /// Give back the field values.
    pub fn into_fields(self) -> EntryFields {
        EntryFields {
            by: self.by,
            hash: self.hash,
            san_uri: self.san_uri,
            san_dns: self.san_dns,
            subject: self.subject,
        }
    }
}

impl From<EntryFields> for CertificateEntry {
    fn from(fields: EntryFields) -> Self {
        Self {
            by: fields.by,
            hash: fields.hash,
            san_uri: fields.san_uri,
            san_dns: fields.san_dns,
            subject: fields.subject,
        }
    }
}

impl fmt::Display for CertificateEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&super::codec::serialize_entry(self))
    }
}

/// Accumulates fields while the parser walks one segment.
#[derive(Debug, Default)]
pub(crate) struct EntryBuilder {
    fields: EntryFields,
}

impl EntryBuilder {
    /// Record a decoded value. `DNS` appends; every other key overwrites.
    pub(crate) fn set(&mut self, field: Field, value: String) {
        match field {
            Field::By => self.fields.by = value,
            Field::Hash => self.fields.hash = value,
            Field::Uri => self.fields.san_uri = value,
            Field::Dns => self.fields.san_dns.push(value),
            Field::Subject => self.fields.subject = value,
        }
    }

    pub(crate) fn build(self) -> CertificateEntry {
        CertificateEntry::from(self.fields)
    }
}
