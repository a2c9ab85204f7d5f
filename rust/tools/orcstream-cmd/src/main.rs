use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod utils;

#[derive(Parser)]
#[command(name = "orcstream-cmd")]
#[command(about = "Command-line utility for reading ORC stream regions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a stream region and print its size and a hex preview
    Dump {
        #[command(flatten)]
        region: commands::RegionArgs,

        /// Number of decoded bytes to print
        #[arg(long, default_value_t = 256)]
        limit: usize,
    },

    /// List the blocks of a compressed stream region
    Blocks {
        #[command(flatten)]
        region: commands::RegionArgs,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Dump { region, limit } => commands::dump::run(region, limit),
        Commands::Blocks { region } => commands::blocks::run(region),
    }
}
