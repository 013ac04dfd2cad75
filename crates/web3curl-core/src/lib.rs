pub mod config;
pub mod logging;

pub mod output;
pub mod pipeline;
pub mod registry;
pub mod rpc;
pub mod trace;
pub mod web3;
