//! Lockbox CLI
//!
//! Command-line tools for Lockbox containers.
//!
//! # Commands
//!
//! - `keygen` - Generate a random container key
//! - `seal` - Encrypt a file or stdin into a container
//! - `unseal` - Decrypt a container back to a file or stdout
//! - `inspect` - Walk frame metadata without a key

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Lockbox command-line container tools.
#[derive(Parser)]
#[command(name = "lockbox")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a random 256-bit key and write it hex-encoded
    Keygen {
        /// Path to write the key file to
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Encrypt a file into a container, one record per chunk
    Seal {
        /// Path to a hex-encoded key file
        #[arg(short, long)]
        key: PathBuf,

        /// Path of the container to create or append to
        #[arg(short, long)]
        out: PathBuf,

        /// Record size in bytes for chunking the input
        #[arg(long, default_value = "65536")]
        chunk_size: usize,

        /// Sync every appended frame to disk before returning
        #[arg(long)]
        sync: bool,

        /// Input file, or `-` for stdin
        input: PathBuf,
    },

    /// Decrypt a container, concatenating its records
    Unseal {
        /// Path to a hex-encoded key file
        #[arg(short, long)]
        key: PathBuf,

        /// Output file, or `-` for stdout
        #[arg(short, long)]
        out: PathBuf,

        /// The container to read
        container: PathBuf,
    },

    /// Walk frame metadata without decrypting (no key needed)
    Inspect {
        /// The container to inspect
        container: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Keygen { out } => commands::keygen::run(&out)?,
        Commands::Seal {
            key,
            out,
            chunk_size,
            sync,
            input,
        } => commands::seal::run(&key, &out, chunk_size, sync, &input)?,
        Commands::Unseal {
            key,
            out,
            container,
        } => commands::unseal::run(&key, &out, &container)?,
        Commands::Inspect { container } => commands::inspect::run(&container)?,
    }

    Ok(())
}
