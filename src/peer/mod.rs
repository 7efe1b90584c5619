//! Peer certificate summaries.
//!
//! Builds the entry a proxy contributes for its own hop from the client
//! certificate handed over after TLS termination.

pub mod certificate;

pub use certificate::{entry_from_der, entry_from_pem};
