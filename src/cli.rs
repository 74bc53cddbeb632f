use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hostconf")]
#[command(version)]
#[command(about = "Converge a host toward its declared files, packages and services", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Converge the host toward the declared resources
    Apply(ConfigArgs),

    /// Check a resource file without touching the host
    Validate(ConfigArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Resource file (JSON array, or TOML with [[resources]])
    #[arg(short, long, env = "HOSTCONF_CONFIG")]
    pub config: PathBuf,
}
