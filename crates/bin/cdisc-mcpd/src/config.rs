use clap::{Parser, builder::BoolishValueParser};
use std::error::Error;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.library.cdisc.org/api";
const DEFAULT_MCP_HTTP_ADDR: &str = "127.0.0.1:4120";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Parser, Debug)]
#[command(name = "cdisc-mcpd", version, about = "CDISC Library MCP daemon.")]
struct CliArgs {
    /// API key for the hosted CDISC Library.
    #[arg(long, env = "CDISC_LIBRARY_API_KEY")]
    api_key: Option<String>,

    #[arg(long, env = "CDISC_LIBRARY_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    #[arg(
        long,
        env = "CDISC_REQUEST_TIMEOUT_SECS",
        default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS
    )]
    request_timeout_secs: u64,

    /// Serve over stdio instead of streamable HTTP.
    #[arg(
        long = "stdio",
        env = "CDISC_ENABLE_STDIO",
        default_value_t = false,
        value_parser = BoolishValueParser::new()
    )]
    enable_stdio: bool,

    #[arg(long, env = "CDISC_MCP_HTTP_ADDR", default_value = DEFAULT_MCP_HTTP_ADDR)]
    mcp_http_addr: SocketAddr,
}

/// Runtime configuration loaded from CLI arguments and environment variables.
#[derive(Clone)]
pub struct CdiscConfig {
    pub api_key: String,
    pub base_url: String,
    pub request_timeout: Duration,
    pub enable_stdio: bool,
    pub mcp_http_addr: SocketAddr,
}

#[derive(Debug)]
pub enum ConfigError {
    MissingSetting(&'static str),
    InvalidSetting { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSetting(name) => write!(f, "missing required setting: {name}"),
            Self::InvalidSetting { name, value } => {
                write!(f, "invalid {name} value: {value}")
            }
        }
    }
}

impl Error for ConfigError {}

impl CdiscConfig {
    pub fn from_args() -> Result<Self, ConfigError> {
        let args = CliArgs::parse();
        Self::try_from(args)
    }
}

impl TryFrom<CliArgs> for CdiscConfig {
    type Error = ConfigError;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let api_key = args
            .api_key
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::MissingSetting("CDISC_LIBRARY_API_KEY"))?;

        if args.base_url.trim().is_empty() {
            return Err(ConfigError::InvalidSetting {
                name: "CDISC_LIBRARY_BASE_URL",
                value: args.base_url,
            });
        }
        if args.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "CDISC_REQUEST_TIMEOUT_SECS",
                value: args.request_timeout_secs.to_string(),
            });
        }

        Ok(Self {
            api_key,
            base_url: args.base_url,
            request_timeout: Duration::from_secs(args.request_timeout_secs),
            enable_stdio: args.enable_stdio,
            mcp_http_addr: args.mcp_http_addr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> CliArgs {
        CliArgs {
            api_key: Some("test-key".to_string()),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            enable_stdio: false,
            mcp_http_addr: DEFAULT_MCP_HTTP_ADDR.parse().expect("valid MCP addr"),
        }
    }

    #[test]
    fn missing_api_key_is_rejected() {
        let mut args = base_args();
        args.api_key = None;
        assert!(matches!(
            CdiscConfig::try_from(args),
            Err(ConfigError::MissingSetting("CDISC_LIBRARY_API_KEY"))
        ));

        let mut args = base_args();
        args.api_key = Some("   ".to_string());
        assert!(matches!(
            CdiscConfig::try_from(args),
            Err(ConfigError::MissingSetting("CDISC_LIBRARY_API_KEY"))
        ));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut args = base_args();
        args.request_timeout_secs = 0;
        assert!(matches!(
            CdiscConfig::try_from(args),
            Err(ConfigError::InvalidSetting {
                name: "CDISC_REQUEST_TIMEOUT_SECS",
                ..
            })
        ));
    }

    #[test]
    fn defaults_parse_into_a_valid_config() {
        let config = CdiscConfig::try_from(base_args()).expect("config should parse");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(!config.enable_stdio);
    }
}
