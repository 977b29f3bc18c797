//! Herma - upload companion for the Euphrosyne lab platform

use clap::Parser;

mod cli;
mod client;
mod config;
mod error;
mod store;
mod transfer;
mod upload;

use cli::{Cli, Commands};
use error::Result;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut builder = env_logger::Builder::from_default_env();
    if cli.debug {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();

    if let Err(err) = run(cli).await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init => cli::init::run(cli.config.as_deref()),
        Commands::Login { email } => cli::login::run(cli.config.as_deref(), email).await,
        Commands::Logout => cli::login::logout(),
        Commands::Status => cli::status::run(cli.config.as_deref()),
        Commands::Projects => cli::projects::run(cli.config.as_deref()).await,
        Commands::Upload(args) => cli::upload::run(cli.config.as_deref(), args).await,
        Commands::Version => {
            println!("herma version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
