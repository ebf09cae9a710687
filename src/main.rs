use std::path::PathBuf;
use std::process;

use env_logger::Env;
use log::error;
use structopt::StructOpt;

use crate::Command::*;

mod cache;
mod commands;
mod config;
mod connector;
mod errors;
mod packager;

const CONFIG_FILE: &str = "updater-cli.toml";

#[derive(Debug, StructOpt)]
#[structopt(about = "publishes app update artifacts to the update server")]
struct Opts {
    /// Configuration file, defaults to updater-cli.toml in the working directory
    #[structopt(short, long)]
    config: Option<PathBuf>,
    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    /// Package and publish a new app version
    Update {
        /// Overrides the application name from the configuration
        name: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let opts = Opts::from_args();

    let config_file = opts.config.unwrap_or_else(|| PathBuf::from(CONFIG_FILE));

    let result = match opts.cmd {
        Update { name } => commands::update(&config_file, name).await,
    };

    if let Err(e) = result {
        error!("{}", e);
        process::exit(e.exit_code());
    }
}
