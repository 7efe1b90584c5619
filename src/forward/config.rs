//! XFCC handling configuration.

use serde::{Deserialize, Serialize};

/// Canonical header name.
pub const XFCC_HEADER: &str = "x-forwarded-client-cert";

/// What to send upstream in place of the inbound header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForwardMode {
    /// Never forward the header.
    Sanitize,
    /// Forward the inbound chain unchanged.
    ForwardOnly,
    /// Forward the inbound chain plus this hop's entry.
    #[default]
    AppendForward,
    /// Forward only this hop's entry.
    SanitizeSet,
}

/// Where this hop's entry is placed in `append_forward` mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HopPosition {
    #[default]
    Append,
    Prepend,
}

/// What to do with a header that fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedPolicy {
    /// Surface the error to the caller.
    #[default]
    Reject,
    /// Log it and continue as if no header had been sent.
    TreatAsAbsent,
}

/// XFCC extraction and forwarding configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct XfccConfig {
    /// Enable XFCC handling.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Header carrying the chain.
    /// Default: x-forwarded-client-cert
    #[serde(default = "default_header_name")]
    pub header_name: String,

    /// Upstream forwarding behaviour.
    #[serde(default)]
    pub forward_mode: ForwardMode,

    /// Placement of this hop's entry when appending.
    #[serde(default)]
    pub hop_position: HopPosition,

    /// Handling of headers that fail to parse.
    #[serde(default)]
    pub on_malformed: MalformedPolicy,

    /// Upper bound on the combined inbound header length.
    #[serde(default = "default_max_header_bytes")]
    pub max_header_bytes: usize,

    /// Log parsed chains for debugging.
    #[serde(default)]
    pub log_chains: bool,
}

fn default_true() -> bool {
    true
}

fn default_header_name() -> String {
    XFCC_HEADER.to_string()
}

fn default_max_header_bytes() -> usize {
    16 * 1024
}

impl Default for XfccConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            header_name: default_header_name(),
            forward_mode: ForwardMode::default(),
            hop_position: HopPosition::default(),
            on_malformed: MalformedPolicy::default(),
            max_header_bytes: default_max_header_bytes(),
            log_chains: false,
        }
    }
}

impl XfccConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.header_name.is_empty() {
            return Err("header_name must not be empty".to_string());
        }

        // RFC 9110 token characters
        let is_tchar = |c: char| c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c);
        if !self.header_name.chars().all(is_tchar) {
            return Err(format!("header_name is not a valid HTTP field name: {:?}", self.header_name));
        }

        if self.max_header_bytes == 0 {
            return Err("max_header_bytes must be greater than zero".to_string());
        }

        if !self.enabled && self.forward_mode != ForwardMode::Sanitize {
            tracing::warn!("XFCC handling disabled; inbound headers will be stripped");
        }

        Ok(())
    }
}

/// JSON configuration for dynamic reconfiguration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct XfccConfigJson {
    pub enabled: Option<bool>,
    pub header_name: Option<String>,
    pub forward_mode: Option<ForwardMode>,
    pub hop_position: Option<HopPosition>,
    pub on_malformed: Option<MalformedPolicy>,
    pub max_header_bytes: Option<usize>,
    pub log_chains: Option<bool>,
}

impl XfccConfigJson {
    /// Apply JSON config to existing config.
    pub fn apply_to(&self, config: &mut XfccConfig) {
        if let Some(enabled) = self.enabled {
            config.enabled = enabled;
        }
        if let Some(ref header) = self.header_name {
            config.header_name = header.clone();
        }
        if let Some(mode) = self.forward_mode {
            config.forward_mode = mode;
        }
        if let Some(position) = self.hop_position {
            config.hop_position = position;
        }
        if let Some(policy) = self.on_malformed {
            config.on_malformed = policy;
        }
        if let Some(max) = self.max_header_bytes {
            config.max_header_bytes = max;
        }
        if let Some(log) = self.log_chains {
            config.log_chains = log;
        }
    }
}
