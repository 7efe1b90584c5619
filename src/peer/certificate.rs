//! Summarizing a peer certificate as an XFCC entry.

use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use sha2::{Digest, Sha256};
use tracing::debug;
use x509_parser::prelude::*;

use crate::xfcc::{CertificateEntry, EntryFields};

/// Build this hop's entry from a DER-encoded client certificate.
///
/// `by` is the SAN of the proxy's own certificate. Only the textual summary
/// is extracted; nothing about the certificate is verified.
pub fn entry_from_der(by: &str, der: &[u8]) -> Result<CertificateEntry> {
    let (_, cert) = X509Certificate::from_der(der)
        .map_err(|e| anyhow!("Failed to parse X.509 certificate: {:?}", e))?;

    let hash = hex::encode(Sha256::digest(der));
    let subject = cert.subject().to_string();

    // XFCC carries a single URI; DNS names are repeatable
    let mut san_uri = None;
    let mut san_dns = Vec::new();

    if let Ok(Some(san_ext)) = cert.subject_alternative_name() {
        for name in &san_ext.value.general_names {
            match name {
                GeneralName::URI(uri) => {
                    if san_uri.is_none() {
                        san_uri = Some(uri.to_string());
                    }
                }
                GeneralName::DNSName(dns) => {
                    san_dns.push(dns.to_string());
                }
                _ => {}
            }
        }
    }

    debug!(
        subject = %subject,
        hash = %hash,
        san_uri = ?san_uri,
        san_dns = ?san_dns,
        "Summarized peer certificate"
    );

    Ok(CertificateEntry::from(EntryFields {
        by: by.to_string(),
        hash,
        san_uri: san_uri.unwrap_or_default(),
        san_dns,
        subject,
    }))
}

/// Build this hop's entry from certificate text as a proxy passes it:
/// PEM, URL-encoded PEM, or bare base64 DER.
pub fn entry_from_pem(by: &str, cert_data: &str) -> Result<CertificateEntry> {
    let der = decode_cert_data(cert_data)?;
    entry_from_der(by, &der)
}

/// Decode certificate text to DER bytes.
fn decode_cert_data(data: &str) -> Result<Vec<u8>> {
    let data = data.trim();

    let decoded = if data.contains('%') {
        urlencoding::decode(data)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| data.to_string())
    } else {
        data.to_string()
    };

    const BEGIN: &str = "-----BEGIN CERTIFICATE-----";
    const END: &str = "-----END CERTIFICATE-----";

    let base64_content: String = if let Some(start) = decoded.find(BEGIN) {
        let end = decoded
            .find(END)
            .ok_or_else(|| anyhow!("Invalid PEM: missing END marker"))?;
        if end < start {
            return Err(anyhow!("Invalid PEM: END marker precedes BEGIN marker"));
        }

        decoded[start + BEGIN.len()..end]
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect()
    } else {
        decoded.chars().filter(|c| !c.is_whitespace()).collect()
    };

    STANDARD
        .decode(base64_content.as_bytes())
        .context("Failed to base64 decode certificate")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcgen::{CertificateParams, DistinguishedName, DnType, Ia5String, KeyPair, SanType};

    /// Self-signed certificate as (DER, PEM).
    fn make_cert(cn: &str, sans: &[SanType]) -> (Vec<u8>, String) {
        let mut params = CertificateParams::default();
        let mut dn = DistinguishedName::new();
        dn.push(DnType::CommonName, cn);
        params.distinguished_name = dn;
        params.subject_alt_names = sans.to_vec();

        let key_pair = KeyPair::generate().unwrap();
        let cert = params.self_signed(&key_pair).unwrap();
        (cert.der().to_vec(), cert.pem())
    }

    fn dns_san(s: &str) -> SanType {
        SanType::DnsName(Ia5String::try_from(s).unwrap())
    }

    fn uri_san(s: &str) -> SanType {
        SanType::URI(Ia5String::try_from(s).unwrap())
    }

    #[test]
    fn test_entry_from_der() {
        let (der, _) = make_cert(
            "client",
            &[
                uri_san("spiffe://cluster.local/ns/default/sa/client"),
                dns_san("client.example.com"),
                uri_san("spiffe://cluster.local/ns/other/sa/ignored"),
                dns_san("alt.example.com"),
            ],
        );

        let entry = entry_from_der("spiffe://cluster.local/ns/edge/sa/gateway", &der).unwrap();

        assert_eq!(entry.by(), "spiffe://cluster.local/ns/edge/sa/gateway");
        assert_eq!(entry.hash(), hex::encode(Sha256::digest(&der)));
        assert_eq!(entry.hash().len(), 64);
        assert_eq!(entry.san_uri(), "spiffe://cluster.local/ns/default/sa/client");
        assert_eq!(entry.san_dns(), ["client.example.com", "alt.example.com"]);
        assert!(entry.subject().contains("CN=client"));
    }

    #[test]
    fn test_entry_from_der_without_uri() {
        let (der, _) = make_cert("svc", &[dns_san("svc.internal")]);
        let entry = entry_from_der("", &der).unwrap();
        assert_eq!(entry.by(), "");
        assert_eq!(entry.san_uri(), "");
        assert_eq!(entry.san_dns(), ["svc.internal"]);
    }

    #[test]
    fn test_entry_from_pem_formats() {
        let (der, pem) = make_cert("client", &[dns_san("client.example.com")]);
        let expected = entry_from_der("proxy", &der).unwrap();

        assert_eq!(entry_from_pem("proxy", &pem).unwrap(), expected);

        let encoded = urlencoding::encode(&pem);
        assert_eq!(entry_from_pem("proxy", &encoded).unwrap(), expected);

        let bare = STANDARD.encode(&der);
        assert_eq!(entry_from_pem("proxy", &bare).unwrap(), expected);
    }

    #[test]
    fn test_entry_survives_header_roundtrip() {
        let (der, _) = make_cert("client", &[uri_san("spiffe://a/b"), dns_san("a.example.com")]);
        let entry = entry_from_der("spiffe://proxy", &der).unwrap();

        let raw = crate::xfcc::serialize_entry(&entry);
        assert_eq!(crate::xfcc::parse_entry(&raw).unwrap(), entry);
    }

    #[test]
    fn test_invalid_certificate_data() {
        assert!(entry_from_pem("proxy", "not a certificate").is_err());
        assert!(entry_from_pem("proxy", "-----BEGIN CERTIFICATE-----\nAAAA").is_err());
        assert!(entry_from_der("proxy", b"\x30\x03\x02\x01").is_err());
    }
}
