use super::parse;
use crate::cli::Cli;
use clap::Parser;

#[test]
fn cli_parse_url_only() {
    let cli = parse(&["web3curl", "web3://vitalik.eth/"]);
    assert_eq!(cli.url, "web3://vitalik.eth/");
    assert!(cli.chain_rpc.is_empty());
    assert!(cli.chain_ens_registry.is_empty());
    assert_eq!(cli.verbose, 0);
    assert!(cli.output.is_none());
}

#[test]
fn cli_parse_repeated_chain_rpc_keeps_order() {
    let cli = parse(&[
        "web3curl",
        "--chain-rpc",
        "9999=http://a",
        "--web3-chain",
        "9999=http://b",
        "--chain-rpc=1=http://c",
        "web3://0x5a985f13345e820aa9618826b85f74c3986e1463:9999/",
    ]);
    assert_eq!(
        cli.chain_rpc,
        vec!["9999=http://a", "9999=http://b", "1=http://c"]
    );
}

#[test]
fn cli_parse_ens_registry_override() {
    let cli = parse(&[
        "web3curl",
        "--chain-ens-registry",
        "1=0x00000000000C2E074eC69A0dFb2997BA6C7d2e1e",
        "web3://vitalik.eth/",
    ]);
    assert_eq!(
        cli.chain_ens_registry,
        vec!["1=0x00000000000C2E074eC69A0dFb2997BA6C7d2e1e"]
    );
}

#[test]
fn cli_parse_verbosity_counts() {
    assert_eq!(parse(&["web3curl", "-v", "web3://a.eth/"]).verbose, 1);
    assert_eq!(parse(&["web3curl", "-vv", "web3://a.eth/"]).verbose, 2);
    assert_eq!(
        parse(&["web3curl", "-vvvvv", "web3://a.eth/"]).verbose,
        5,
        "clamped later, not at parse time"
    );
    assert_eq!(
        parse(&["web3curl", "--verbose", "--verbose", "web3://a.eth/"]).verbose,
        2
    );
}

#[test]
fn cli_parse_output() {
    let cli = parse(&["web3curl", "-o", "page.html", "web3://a.eth/"]);
    assert_eq!(cli.output.as_deref(), Some("page.html"));
    let cli = parse(&["web3curl", "--output", "-", "web3://a.eth/"]);
    assert_eq!(cli.output.as_deref(), Some("-"));
}

#[test]
fn cli_requires_url() {
    assert!(Cli::try_parse_from(["web3curl"]).is_err());
    assert!(Cli::try_parse_from(["web3curl", "-v"]).is_err());
}
