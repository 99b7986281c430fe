use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use ga4_mcp_core::DEFAULT_WORKERS;
use ga4_mcp_providers::constants::DATA_API_BASE_URL;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Transport {
    Stdio,
    StreamableHttp,
}

#[derive(Debug, Parser)]
#[command(name = "ga4-mcp", version, about = "Google Analytics 4 MCP server")]
pub struct Args {
    /// Default GA4 property ID used when a call does not name one
    #[arg(long, env = "GA4_PROPERTY_ID")]
    pub property_id: Option<String>,

    #[arg(long, env = "GA4_MCP_TRANSPORT", value_enum)]
    pub transport: Option<Transport>,

    /// Bind host for the HTTP transport
    #[arg(long, env = "GA4_MCP_HOST")]
    pub host: Option<String>,

    /// Bind port for the HTTP transport
    #[arg(long, env = "GA4_MCP_PORT")]
    pub port: Option<u16>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Worker threads for analytics API calls
    #[arg(long, env = "GA4_MCP_WORKERS")]
    pub workers: Option<usize>,

    #[arg(long, env = "GA4_API_BASE_URL")]
    pub api_base_url: Option<String>,

    /// Optional YAML file with the same settings
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Settings read from `--config`. Anything set on the command line or in the
/// environment takes precedence.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub property_id: Option<String>,
    pub transport: Option<Transport>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub debug: Option<bool>,
    pub workers: Option<usize>,
    pub api_base_url: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub property_id: Option<String>,
    pub transport: Transport,
    pub host: String,
    pub port: u16,
    pub debug: bool,
    pub workers: usize,
    pub api_base_url: String,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self> {
        let file = match &args.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        let config = Self::merge(args, file);
        config.validate()?;
        Ok(config)
    }

    pub fn merge(args: Args, file: FileConfig) -> Self {
        Self {
            property_id: args
                .property_id
                .or(file.property_id)
                .filter(|id| !id.is_empty()),
            transport: args
                .transport
                .or(file.transport)
                .unwrap_or(Transport::Stdio),
            host: args
                .host
                .or(file.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: args.port.or(file.port).unwrap_or(DEFAULT_PORT),
            debug: args.debug || file.debug.unwrap_or(false),
            workers: args.workers.or(file.workers).unwrap_or(DEFAULT_WORKERS),
            api_base_url: args
                .api_base_url
                .or(file.api_base_url)
                .unwrap_or_else(|| DATA_API_BASE_URL.to_string()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            bail!("workers must be at least 1");
        }
        if self.transport == Transport::StreamableHttp && self.port == 0 {
            bail!("port must be non-zero for the streamable-http transport");
        }
        if self.api_base_url.trim().is_empty() {
            bail!("api_base_url must not be empty");
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
