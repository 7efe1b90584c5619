//! Reading the inbound chain and computing the forwarded one.

use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use tracing::{debug, warn};

use super::config::{ForwardMode, HopPosition, MalformedPolicy, XfccConfig};
use crate::xfcc::{self, CertificateEntry, HeaderChain};

/// Extracts and forwards XFCC chains for one configuration.
///
/// The parsed chain is handed back to the caller, which passes it on to
/// whatever needs it for the rest of the request.
#[derive(Debug, Clone, Default)]
pub struct XfccExtractor {
    config: XfccConfig,
}

impl XfccExtractor {
    pub fn new(config: XfccConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &XfccConfig {
        &self.config
    }

    /// Parse the inbound chain from a request's headers.
    ///
    /// A missing header yields an empty chain. Repeated values under one
    /// header name are combined with `,` in the order they were received.
    /// The same header under more than one spelling has no defined order
    /// and is handled like a malformed header.
    pub fn extract(&self, headers: &HashMap<String, Vec<String>>) -> Result<HeaderChain> {
        if !self.config.enabled {
            return Ok(HeaderChain::new());
        }

        let decoded = self.combined_value(headers).and_then(|raw| {
            if raw.is_empty() {
                Ok(HeaderChain::new())
            } else {
                self.decode(&raw)
            }
        });

        match decoded {
            Ok(chain) => {
                if self.config.log_chains && !chain.is_empty() {
                    debug!(
                        header = %self.config.header_name,
                        hops = chain.len(),
                        chain = ?chain,
                        "Parsed XFCC chain"
                    );
                }
                Ok(chain)
            }
            Err(e) => match self.config.on_malformed {
                MalformedPolicy::Reject => {
                    warn!(error = %e, header = %self.config.header_name, "Rejecting malformed XFCC header");
                    Err(e)
                }
                MalformedPolicy::TreatAsAbsent => {
                    warn!(error = %e, header = %self.config.header_name, "Ignoring malformed XFCC header");
                    Ok(HeaderChain::new())
                }
            },
        }
    }

    /// Join the header's values. Fails if the header appears under several
    /// spellings, since the map cannot tell which arrived first.
    fn combined_value(&self, headers: &HashMap<String, Vec<String>>) -> Result<String> {
        let mut matching = headers
            .iter()
            .filter(|(name, _)| name.eq_ignore_ascii_case(&self.config.header_name));

        let values = match (matching.next(), matching.next()) {
            (None, _) => return Ok(String::new()),
            (Some((_, values)), None) => values,
            (Some(_), Some(_)) => {
                return Err(anyhow!(
                    "{} header present under multiple spellings; hop order is ambiguous",
                    self.config.header_name
                ));
            }
        };

        Ok(values
            .iter()
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .collect::<Vec<_>>()
            .join(","))
    }

    fn decode(&self, raw: &str) -> Result<HeaderChain> {
        if raw.len() > self.config.max_header_bytes {
            return Err(anyhow!(
                "{} header is {} bytes, limit is {}",
                self.config.header_name,
                raw.len(),
                self.config.max_header_bytes
            ));
        }

        xfcc::parse(raw).with_context(|| format!("Invalid {} header", self.config.header_name))
    }

    /// The chain to send upstream, or `None` if the header should be dropped.
    ///
    /// `own` is this hop's entry. Without one, `append_forward` behaves like
    /// `forward_only` and `sanitize_set` like `sanitize`.
    pub fn forward_chain(
        &self,
        inbound: &HeaderChain,
        own: Option<&CertificateEntry>,
    ) -> Option<HeaderChain> {
        if !self.config.enabled {
            return None;
        }

        let chain = match (self.config.forward_mode, own) {
            (ForwardMode::Sanitize, _) | (ForwardMode::SanitizeSet, None) => return None,
            (ForwardMode::ForwardOnly, _) | (ForwardMode::AppendForward, None) => inbound.clone(),
            (ForwardMode::AppendForward, Some(own)) => match self.config.hop_position {
                HopPosition::Append => inbound.clone().with_hop(own.clone()),
                HopPosition::Prepend => inbound.clone().with_hop_first(own.clone()),
            },
            (ForwardMode::SanitizeSet, Some(own)) => HeaderChain::from(vec![own.clone()]),
        };

        (!chain.is_empty()).then_some(chain)
    }

    /// Serialized form of [`forward_chain`](Self::forward_chain). Chains that
    /// serialize to nothing are not forwarded.
    pub fn forward_value(
        &self,
        inbound: &HeaderChain,
        own: Option<&CertificateEntry>,
    ) -> Option<String> {
        self.forward_chain(inbound, own)
            .map(|chain| xfcc::serialize(&chain))
            .filter(|value| !value.is_empty())
    }

    /// Rewrite the header in an outgoing header map.
    ///
    /// Every spelling of the header is removed first. Returns the value that
    /// was set, if any.
    pub fn apply_forward(
        &self,
        headers: &mut HashMap<String, Vec<String>>,
        inbound: &HeaderChain,
        own: Option<&CertificateEntry>,
    ) -> Option<String> {
        let name = &self.config.header_name;
        headers.retain(|key, _| !key.eq_ignore_ascii_case(name));

        let value = self.forward_value(inbound, own);
        match value {
            Some(ref v) => {
                debug!(header = %name, mode = ?self.config.forward_mode, "Forwarding XFCC header");
                headers.insert(name.clone(), vec![v.clone()]);
            }
            None => {
                debug!(header = %name, mode = ?self.config.forward_mode, "Stripped XFCC header");
            }
        }
        value
    }
}
