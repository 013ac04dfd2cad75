//! CLI for web3curl.

mod commands;

use anyhow::Result;
use clap::{ArgAction, Parser};
use web3curl_core::config;

use commands::run_fetch;

/// Fetch a web3:// URL and print or save the response body.
#[derive(Debug, Parser)]
#[command(name = "web3curl")]
#[command(about = "web3curl: fetch web3:// URLs from EVM chains", long_about = None)]
pub struct Cli {
    /// URL to fetch, e.g. web3://vitalik.eth/ or web3://0x.../path
    #[arg(value_name = "WEB3_URL")]
    pub url: String,

    /// Use RPC endpoint URL for chain ID. Repeat to give a chain several endpoints, tried in order.
    #[arg(
        long = "chain-rpc",
        visible_alias = "web3-chain",
        value_name = "ID=URL",
        action = ArgAction::Append
    )]
    pub chain_rpc: Vec<String>,

    /// Use ADDRESS as the ENS registry on chain ID (chain must already be known).
    #[arg(long = "chain-ens-registry", value_name = "ID=ADDRESS", action = ArgAction::Append)]
    pub chain_ens_registry: Vec<String>,

    /// Print the resolution trace to stderr; repeat for more detail (up to -vvv).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Write the body to PATH instead of the terminal. "-" forces terminal output even for binary data.
    #[arg(short, long, value_name = "PATH|-")]
    pub output: Option<String>,
}

impl Cli {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load()?;
        tracing::debug!("loaded config: {:?}", cfg);
        run_fetch(cli, &cfg).await
    }
}

#[cfg(test)]
mod tests;
