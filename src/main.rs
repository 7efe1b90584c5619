//! Zentinel XFCC tool
//!
//! Decodes, encodes and forwards `x-forwarded-client-cert` header values.
//! Results go to stdout; logs go to stderr as JSON.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::collections::HashMap;
use std::io::Read;
use std::path::PathBuf;
use tracing::{debug, info};

use zentinel_agent_xfcc::{
    entry_from_pem, CertificateEntry, ForwardMode, HeaderChain, HopPosition, XfccConfig,
    XfccConfigJson, XfccExtractor,
};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "zentinel-xfcc")]
#[command(about = "Inspect and forward x-forwarded-client-cert headers")]
struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true, env = "XFCC_VERBOSE")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a header value and print the chain as JSON
    Decode {
        /// Header value (read from stdin when omitted)
        header: Option<String>,
    },

    /// Serialize a JSON array of entries into a header value
    Encode {
        /// JSON entries (read from stdin when omitted)
        json: Option<String>,
    },

    /// Print the header value this hop would send upstream
    Forward {
        /// Inbound header value
        #[arg(long, default_value = "")]
        inbound: String,

        /// SAN of this proxy's own certificate
        #[arg(long, env = "XFCC_BY", requires = "cert")]
        by: Option<String>,

        /// Client certificate (PEM or base64 DER) observed on this hop
        #[arg(long, env = "XFCC_CLIENT_CERT")]
        cert: Option<PathBuf>,

        /// JSON file with XFCC settings (kebab-case keys, all optional)
        #[arg(long, env = "XFCC_CONFIG")]
        config: Option<PathBuf>,

        /// Forwarding mode (overrides the config file)
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,

        /// Put this hop's entry before the inbound hops
        #[arg(long)]
        prepend: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Sanitize,
    ForwardOnly,
    AppendForward,
    SanitizeSet,
}

impl From<ModeArg> for ForwardMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Sanitize => ForwardMode::Sanitize,
            ModeArg::ForwardOnly => ForwardMode::ForwardOnly,
            ModeArg::AppendForward => ForwardMode::AppendForward,
            ModeArg::SanitizeSet => ForwardMode::SanitizeSet,
        }
    }
}

/// Read an argument, falling back to stdin.
fn read_input(arg: Option<String>) -> Result<String> {
    match arg {
        Some(value) => Ok(value),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf.trim_end_matches(['\r', '\n']).to_string())
        }
    }
}

/// Apply an optional JSON settings file onto the default config.
fn load_config(path: Option<&PathBuf>) -> Result<XfccConfig> {
    let mut config = XfccConfig::default();

    if let Some(path) = path {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let json_config: XfccConfigJson = serde_json::from_str(&text)
            .with_context(|| format!("Invalid XFCC config in {:?}", path))?;
        json_config.apply_to(&mut config);
    }

    Ok(config)
}

fn decode(raw: &str) -> Result<String> {
    let chain: HeaderChain = raw.parse().context("Failed to parse XFCC header")?;
    debug!(hops = chain.len(), "Decoded header");
    serde_json::to_string_pretty(&chain).context("Failed to render chain")
}

fn encode(json: &str) -> Result<String> {
    let chain: HeaderChain = serde_json::from_str(json).context("Invalid JSON entries")?;
    debug!(hops = chain.len(), "Encoding chain");
    Ok(chain.to_string())
}

fn forward(
    config: XfccConfig,
    inbound: &str,
    own: Option<&CertificateEntry>,
) -> Result<Option<String>> {
    config.validate().map_err(|e| anyhow!("Invalid XFCC config: {}", e))?;

    let extractor = XfccExtractor::new(config);
    let headers = HashMap::from([(
        extractor.config().header_name.clone(),
        vec![inbound.to_string()],
    )]);

    let chain = extractor.extract(&headers)?;
    Ok(extractor.forward_value(&chain, own))
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "{}={},zentinel_agent_xfcc={}",
            env!("CARGO_CRATE_NAME"),
            log_level,
            log_level
        ))
        .with_writer(std::io::stderr)
        .json()
        .init();

    match args.command {
        Command::Decode { header } => {
            let raw = read_input(header)?;
            println!("{}", decode(&raw)?);
        }
        Command::Encode { json } => {
            let json = read_input(json)?;
            println!("{}", encode(&json)?);
        }
        Command::Forward {
            inbound,
            by,
            cert,
            config,
            mode,
            prepend,
        } => {
            let mut config = load_config(config.as_ref())?;
            if let Some(mode) = mode {
                config.forward_mode = mode.into();
            }
            if prepend {
                config.hop_position = HopPosition::Prepend;
            }

            let own = match cert {
                Some(path) => {
                    let text = std::fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read certificate {:?}", path))?;
                    Some(entry_from_pem(by.as_deref().unwrap_or_default(), &text)?)
                }
                None => None,
            };

            info!(
                mode = ?config.forward_mode,
                own_entry = own.is_some(),
                "Computing forwarded header"
            );

            match forward(config, &inbound, own.as_ref())? {
                Some(value) => println!("{}", value),
                None => info!("Header would not be forwarded"),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use zentinel_agent_xfcc::EntryFields;

    const INBOUND: &str = r#"By="spiffe://edge";Hash="h1";URI="spiffe://client""#;

    fn own_entry() -> CertificateEntry {
        CertificateEntry::from(EntryFields {
            by: "spiffe://mesh".to_string(),
            hash: "h2".to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn test_decode_prints_json() {
        let json = decode(INBOUND).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["by"], "spiffe://edge");
        assert_eq!(value[0]["san_uri"], "spiffe://client");
        assert!(value[0].get("subject").is_none());
    }

    #[test]
    fn test_decode_malformed() {
        assert!(decode(r#"Foo="x""#).is_err());
    }

    #[test]
    fn test_encode_from_json() {
        let header = encode(r#"[{"by": "front", "san_dns": ["a.com", "b.com"]}, {"hash": "h2"}]"#).unwrap();
        assert_eq!(header, r#"By="front";DNS="a.com";DNS="b.com",Hash="h2""#);
    }

    #[test]
    fn test_encode_rejects_unknown_keys() {
        assert!(encode(r#"[{"issuer": "x"}]"#).is_err());
    }

    #[test]
    fn test_forward_appends_own_entry() {
        let value = forward(XfccConfig::default(), INBOUND, Some(&own_entry())).unwrap();
        assert_eq!(
            value.as_deref(),
            Some(r#"By="spiffe://edge";Hash="h1";URI="spiffe://client",By="spiffe://mesh";Hash="h2""#)
        );
    }

    #[test]
    fn test_forward_sanitize() {
        let config = XfccConfig {
            forward_mode: ForwardMode::Sanitize,
            ..Default::default()
        };
        assert_eq!(forward(config, INBOUND, Some(&own_entry())).unwrap(), None);
    }

    #[test]
    fn test_forward_invalid_config() {
        let config = XfccConfig {
            header_name: String::new(),
            ..Default::default()
        };
        assert!(forward(config, INBOUND, None).is_err());
    }

    #[test]
    fn test_load_config_applies_json_overrides() {
        let path = std::env::temp_dir().join(format!("zentinel-xfcc-config-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{"header-name": "x-client-chain", "forward-mode": "sanitize_set"}"#,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.header_name, "x-client-chain");
        assert_eq!(config.forward_mode, ForwardMode::SanitizeSet);
        assert_eq!(config.max_header_bytes, XfccConfig::default().max_header_bytes);

        let defaults = load_config(None).unwrap();
        assert_eq!(defaults.header_name, "x-forwarded-client-cert");
    }

    #[test]
    fn test_by_requires_cert() {
        let result = Args::try_parse_from(["zentinel-xfcc", "forward", "--by", "spiffe://mesh"]);
        assert!(result.is_err());

        let result = Args::try_parse_from([
            "zentinel-xfcc",
            "forward",
            "--by",
            "spiffe://mesh",
            "--cert",
            "client.pem",
        ]);
        assert!(result.is_ok());
    }

    #[test]
    fn test_mode_arg_mapping() {
        assert_eq!(ForwardMode::from(ModeArg::SanitizeSet), ForwardMode::SanitizeSet);
        assert_eq!(ForwardMode::from(ModeArg::ForwardOnly), ForwardMode::ForwardOnly);
    }
}
