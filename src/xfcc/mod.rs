//! x-forwarded-client-cert (XFCC) header codec.
//!
//! Each proxy that terminates TLS appends a summary of the certificate it
//! saw. This module turns the header text into a [`HeaderChain`] and back.

pub mod chain;
pub mod codec;
pub mod entry;
pub mod error;
pub mod quote;

pub use chain::HeaderChain;
pub use codec::{parse, parse_entry, serialize, serialize_entry};
pub use entry::{CertificateEntry, EntryFields, Field};
pub use error::{ErrorKind, Result, XfccError};
pub use quote::{enquote, unquote};
