use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::LevelFilter;

mod build;
mod check;
mod config;
mod logger;
mod path;

use config::SignatureLayout;
use logger::RunnerLogger;

// —————————————————————————————— CLI Parsing ——————————————————————————————— //

#[derive(Parser)]
struct CliArgs {
    #[command(subcommand)]
    command: Subcommands,
    #[arg(short, long, action, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Subcommands {
    /// Build the harness firmware image
    Build(BuildArgs),
    /// Decode a signature dump taken after a run
    Check(CheckArgs),
}

#[derive(Args)]
struct BuildArgs {
    #[arg(long)]
    /// Path to the configuration file to use
    config: Option<PathBuf>,
}

#[derive(Args)]
struct CheckArgs {
    /// Path to the signature dump
    dump: PathBuf,
    #[arg(long)]
    /// Path to the configuration the firmware was built with, used to pick the layout
    config: Option<PathBuf>,
    #[arg(long, value_enum)]
    /// Signature layout, overrides the configuration
    layout: Option<SignatureLayout>,
    #[arg(long, value_enum, default_value_t = DumpFormat::Hex)]
    /// Format of the dump
    format: DumpFormat,
    #[arg(long, value_parser = parse_u32)]
    /// Expected golden checksum (record layout only)
    expected_checksum: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DumpFormat {
    /// Raw little endian words
    Bin,
    /// Whitespace separated hexadecimal words
    Hex,
}

/// Parses a decimal or `0x` prefixed hexadecimal integer.
fn parse_u32(value: &str) -> Result<u32, String> {
    let parsed = match value.strip_prefix("0x") {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed.map_err(|err| format!("invalid integer '{}': {}", value, err))
}

// —————————————————————————————— Entry Point ——————————————————————————————— //

fn main() -> ExitCode {
    let args = CliArgs::parse();
    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    RunnerLogger::init(level);

    match args.command {
        Subcommands::Build(args) => build::build(&args),
        Subcommands::Check(args) => check::check(&args),
    }
}
