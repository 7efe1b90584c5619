//! Zentinel XFCC
//!
//! Codec and forwarding layer for the `x-forwarded-client-cert` header,
//! which carries per-hop client certificate summaries through a chain of
//! TLS-terminating proxies.

pub mod forward;
pub mod peer;
pub mod xfcc;

pub use forward::{
    ForwardMode, HopPosition, MalformedPolicy, XfccConfig, XfccConfigJson, XfccExtractor,
    XFCC_HEADER,
};
pub use peer::{entry_from_der, entry_from_pem};
pub use xfcc::{CertificateEntry, EntryFields, ErrorKind, Field, HeaderChain, XfccError};
