//! CLI command definitions and handlers

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::client::DataType;

pub mod context;
pub mod init;
pub mod login;
pub mod projects;
pub mod status;
pub mod upload;

pub use context::CommandContext;

/// Herma - upload companion for the Euphrosyne lab platform
#[derive(Parser, Debug)]
#[command(name = "herma")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Override config file location
    #[arg(long, global = true, env = "HERMA_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "HERMA_DEBUG", hide_env = true)]
    pub debug: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Herma configuration
    Init,

    /// Sign in to Euphrosyne and store the session tokens
    Login {
        /// Email to sign in with (prompted if omitted)
        #[arg(long)]
        email: Option<String>,
    },

    /// Drop the stored session tokens
    Logout,

    /// Show configuration and session status
    Status,

    /// List the projects visible to the current session
    Projects,

    /// Upload a run data folder to cloud storage
    Upload(UploadArgs),

    /// Display version information
    Version,
}

/// Arguments for the upload command; missing values are prompted for
#[derive(clap::Args, Debug, Default)]
pub struct UploadArgs {
    /// Project name
    #[arg(long)]
    pub project: Option<String>,

    /// Run label within the project
    #[arg(long)]
    pub run: Option<String>,

    /// Kind of data being uploaded
    #[arg(long, value_enum)]
    pub data_type: Option<DataTypeArg>,

    /// Local folder whose contents are uploaded
    #[arg(long)]
    pub folder: Option<PathBuf>,
}

/// CLI-facing data type values
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DataTypeArg {
    RawData,
    ProcessedData,
}

impl From<DataTypeArg> for DataType {
    fn from(arg: DataTypeArg) -> Self {
        match arg {
            DataTypeArg::RawData => DataType::RawData,
            DataTypeArg::ProcessedData => DataType::ProcessedData,
        }
    }
}
