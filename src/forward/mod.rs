//! Request-path handling of the XFCC header.
//!
//! Reads the inbound chain from a request's headers and computes what this
//! hop forwards upstream. Chains are returned to the caller as plain values.

pub mod config;
pub mod extractor;

pub use config::{
    ForwardMode, HopPosition, MalformedPolicy, XfccConfig, XfccConfigJson, XFCC_HEADER,
};
pub use extractor::XfccExtractor;
