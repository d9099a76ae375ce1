//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use restsnap_config::ConfigOverrides;
use restsnap_core::TextEncoding;

#[derive(Parser)]
#[command(
    name = "restsnap",
    about = "restsnap - file-driven snapshot testing for HTTP/REST endpoints",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, help = "Disable colored output")]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Execute every case and compare it against its sample
    Run {
        #[command(flatten)]
        args: RunArgs,
    },

    /// Print the discovered case names in execution order
    List {
        /// Directory holding request spec files
        #[arg(long, env = "RESTSNAP_REQUESTS")]
        requests: Option<PathBuf>,

        /// Configuration file (TOML, YAML or JSON)
        #[arg(long, env = "RESTSNAP_CONFIG")]
        config: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Directory where captured responses are written
    #[arg(long, env = "RESTSNAP_RESPONSES")]
    pub responses: Option<PathBuf>,

    /// Directory holding golden samples
    #[arg(long, env = "RESTSNAP_SAMPLES")]
    pub samples: Option<PathBuf>,

    /// Directory holding request spec and body files
    #[arg(long, env = "RESTSNAP_REQUESTS")]
    pub requests: Option<PathBuf>,

    /// Directory for the error log
    #[arg(long, env = "RESTSNAP_ERRORS")]
    pub errors: Option<PathBuf>,

    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, env = "RESTSNAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Text encoding of bodies and samples
    #[arg(long, env = "RESTSNAP_ENCODING", help = "utf-8, latin-1 or ascii")]
    pub encoding: Option<TextEncoding>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Compare bodies only; status and headers are neither recorded nor checked
    #[arg(long)]
    pub body_only: bool,
}

impl RunArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            requests: self.requests.clone(),
            responses: self.responses.clone(),
            samples: self.samples.clone(),
            errors: self.errors.clone(),
            encoding: self.encoding,
            timeout_secs: self.timeout_secs,
            body_only: self.body_only,
        }
    }
}
