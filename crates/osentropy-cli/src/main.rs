//! CLI for osentropy — random bytes from whatever the OS offers.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "osentropy")]
#[command(about = "osentropy — random bytes from whatever the OS offers")]
#[command(version = osentropy_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read random bytes from the OS and print them as hex
    Bytes {
        /// Number of bytes to read
        #[arg(short = 'n', long, default_value = "32")]
        count: usize,

        /// Do not wait for the kernel entropy pool to be seeded
        #[arg(long)]
        nonblock: bool,

        /// Write raw bytes to stdout instead of hex
        #[arg(long)]
        raw: bool,
    },

    /// Initialize the hash-randomization secret and print it.
    /// Honors OSENTROPY_HASHSEED unless --seed is given.
    Secret {
        /// "random" or an integer in [0, 4294967295]
        #[arg(long)]
        seed: Option<String>,
    },

    /// Show the selected backend and a quick quality check of its output
    Probe {
        /// Sample size in bytes
        #[arg(long, default_value = "4096")]
        samples: usize,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Bytes {
            count,
            nonblock,
            raw,
        } => commands::bytes::run(count, nonblock, raw),
        Commands::Secret { seed } => commands::secret::run(seed.as_deref()),
        Commands::Probe { samples, json } => commands::probe::run(samples, json),
    }

    osentropy_core::fini_random();
}
