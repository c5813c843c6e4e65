//! Host-side radio bring-up.
//!
//! Runs board bring-up against a simulated RFM69 module, so a configuration
//! can be checked without hardware.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin node -- --board pro-mini
//! RFM69_BOARD=ada-m0 cargo run --bin node -- --config node.json --band 433
//! ```
//!
//! The board is taken from `--board`, then a non-empty `RFM69_BOARD`, then
//! the config file, then the compiled-in default. Exit status is 0 on success, 1 if
//! bring-up fails and 2 on bad arguments or configuration.

use log::{error, info};
use rfm69_node::cli::{resolve_board, Args, Command, USAGE};
use rfm69_node::config::BOARD_ENV_VAR;
use rfm69_node::{initialize_radio, ConfigError, FrequencyBand, RadioConfig, SimulatedRadio};
use std::process::ExitCode;

fn load_config(args: &Args) -> Result<RadioConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => RadioConfig::load(path)?,
        None => RadioConfig::default(),
    };

    let env_board = std::env::var(BOARD_ENV_VAR).ok();
    config.board = resolve_board(args.board, env_board.as_deref(), config.board)?;

    Ok(config)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match Command::parse(std::env::args().skip(1)) {
        Ok(Command::Run(args)) => args,
        Ok(Command::Help) => {
            println!("{}", USAGE);
            return ExitCode::SUCCESS;
        }
        Err(msg) => {
            eprintln!("{}", msg);
            eprintln!("{}", USAGE);
            return ExitCode::from(2);
        }
    };

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::from(2);
        }
    };

    let band = match args
        .band
        .or_else(|| FrequencyBand::for_frequency(config.frequency_mhz))
    {
        Some(band) => band,
        None => {
            error!(
                "{} MHz is not in any module band; pass --band",
                config.frequency_mhz
            );
            return ExitCode::from(2);
        }
    };

    info!("=== RFM69 node bring-up ({}, {} module) ===", config.board, band);

    let mut radio = SimulatedRadio::new(band);
    match initialize_radio(&mut radio, &config) {
        Ok(()) => {
            info!(
                "Node {} ready on network {}, sending to {}, max message {} bytes",
                config.node_id, config.network_id, config.recipient_id, config.max_message_len
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
