//! Ordered per-hop entries of one XFCC header.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::codec;
use super::entry::CertificateEntry;
use super::error::XfccError;

/// All entries of an `x-forwarded-client-cert` header, in wire order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeaderChain(Vec<CertificateEntry>);

impl HeaderChain {
    /// An empty chain (header absent).
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn entries(&self) -> &[CertificateEntry] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CertificateEntry> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<&CertificateEntry> {
        self.0.first()
    }

    pub fn last(&self) -> Option<&CertificateEntry> {
        self.0.last()
    }

    /// Return a new chain with `entry` added after the existing hops.
    pub fn with_hop(mut self, entry: CertificateEntry) -> Self {
        self.0.push(entry);
        self
    }

    /// Return a new chain with `entry` placed before the existing hops.
    pub fn with_hop_first(mut self, entry: CertificateEntry) -> Self {
        self.0.insert(0, entry);
        self
    }
}

impl From<Vec<CertificateEntry>> for HeaderChain {
    fn from(entries: Vec<CertificateEntry>) -> Self {
        Self(entries)
    }
}

impl FromIterator<CertificateEntry> for HeaderChain {
    fn from_iter<I: IntoIterator<Item = CertificateEntry>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for HeaderChain {
    type Item = CertificateEntry;
    type IntoIter = std::vec::IntoIter<CertificateEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a HeaderChain {
    type Item = &'a CertificateEntry;
    type IntoIter = std::slice::Iter<'a, CertificateEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for HeaderChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&codec::serialize(self))
    }
}

impl FromStr for HeaderChain {
    type Err = XfccError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        codec::parse(s)
    }
}
