//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "clusterhub")]
#[command(about = "clusterhub - clustering algorithms behind a REST facade", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .clusterhub/config.yaml)
    #[arg(short, long, global = true, env = "CLUSTERHUB_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to (overrides configuration)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides configuration)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List the registered clustering algorithms
    Algorithms,

    /// Run one algorithm over a local ARFF file
    Run {
        /// Algorithm code (see `algorithms`)
        #[arg(short, long)]
        algorithm: i64,

        /// ARFF dataset file
        #[arg(short, long)]
        file: PathBuf,

        /// Option string, e.g. "O;N 3"
        #[arg(short, long)]
        options: Option<String>,
    },
}
