#[macro_use] extern crate clap;

pub mod graphics;
pub mod interface;

use std::process;

use env_logger::Env;
use log::error;

use interface::cli::{config_from_env, ConfigError};
use interface::window;

/// `RUST_LOG` wins; otherwise each `-v` turns the default up a notch.
fn init_logger(verbosity: u64) {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();
}

fn main() {
    let config = match config_from_env() {
        Ok(config) => config,
        // Covers --help and --version too, which clap reports as "errors"
        Err(ConfigError::Cli(e)) => e.exit(),
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(2);
        }
    };

    init_logger(config.verbosity);

    if let Err(e) = window::run(config) {
        error!("{}", e);
        process::exit(1);
    }
}
