use anyhow::Result;
use clap::Parser;
use ga4_mcp_app::config::{Args, Config};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = Config::from_args(Args::parse())?;
    ga4_mcp_app::logging::init(config.debug);
    ga4_mcp_app::run(config).await
}
