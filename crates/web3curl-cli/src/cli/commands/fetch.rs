//! Fetch command: resolve a web3:// URL, print the trace, stream the body.

use anyhow::Result;
use std::io;
use web3curl_core::config::Web3CurlConfig;
use web3curl_core::output::{self, Destination};
use web3curl_core::pipeline::{self, StageResult};
use web3curl_core::registry;
use web3curl_core::rpc::CurlTransport;
use web3curl_core::trace;
use web3curl_core::web3::{ClientOptions, Web3Client};

use crate::cli::Cli;

/// Builds the client from config and overrides, then runs the fetch on a
/// blocking thread (libcurl calls block).
pub async fn run_fetch(cli: Cli, cfg: &Web3CurlConfig) -> Result<()> {
    let defaults = registry::extend_defaults(registry::default_networks(), &cfg.networks()?);
    let registry = registry::merge(&defaults, &cli.chain_rpc, &cli.chain_ens_registry)?;
    tracing::debug!(networks = registry.networks().len(), "effective registry built");

    let transport = CurlTransport::new(cfg.connect_timeout(), cfg.request_timeout());
    let client = Web3Client::new(
        registry,
        transport,
        ClientOptions {
            max_chunks: cfg.max_chunks,
        },
    );
    let verbosity = cli.verbose.min(trace::MAX_VERBOSITY);
    let destination = Destination::from_arg(cli.output.as_deref());
    let url = cli.url;

    tokio::task::spawn_blocking(move || fetch_blocking(&client, &url, verbosity, destination))
        .await?
}

fn print_trace(verbosity: u8, results: &[StageResult]) {
    for line in trace::emit(verbosity, results) {
        eprintln!("{}", line);
    }
}

fn fetch_blocking(
    client: &Web3Client,
    url: &str,
    verbosity: u8,
    destination: Destination,
) -> Result<()> {
    let outcome = match pipeline::run(client, url) {
        Ok(outcome) => outcome,
        Err(failure) => {
            print_trace(verbosity, &failure.trace);
            return Err(failure.into());
        }
    };
    print_trace(verbosity, &outcome.trace);

    let stdout = io::stdout();
    let summary = output::consume(outcome.response.body, destination, stdout.lock())?;
    tracing::info!(
        url,
        destination = %summary.destination,
        chunks = summary.chunks,
        bytes = summary.bytes,
        "fetch complete"
    );
    Ok(())
}
