pub use clap::Parser;

use std::path::PathBuf;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "station")]
#[command(about = "Community station CLI and server")]
pub struct Args {
    /// Remote station to talk to for client commands
    #[arg(long, global = true, default_value = "http://localhost:3000")]
    pub remote: Url,

    /// Path to the station config directory (defaults to ~/.station)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: crate::Command,
}
