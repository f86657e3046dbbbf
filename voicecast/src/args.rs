use std::{net::SocketAddr, path::PathBuf};

use clap::{Parser, Subcommand};

/// PlayDiffusion voice-cloning worker
#[derive(Debug, Parser)]
#[command(name = "voicecast", about = "Voice-cloning TTS worker backed by PlayDiffusion and S3 storage")]
pub struct Args {
    /// Path to configuration file; without one, configuration is read from the environment
    #[arg(short, long, global = true, env = "VOICECAST_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the job endpoint over HTTP
    Serve {
        /// Override the listen address
        #[arg(long, env = "VOICECAST_LISTEN")]
        listen: Option<SocketAddr>,
    },
    /// Run a single job event from a JSON file and print the result
    Invoke {
        /// Path to the job event (`{"input": {...}}`)
        #[arg(short, long)]
        payload: PathBuf,
    },
}
