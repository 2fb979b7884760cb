//! Command line interface based on clap.
//!
//! Defines [`Cli`]: the requested date bounds (`--debut`, `--fin`), the
//! `--debug` switch and overrides for the configuration file and output
//! directory.

use std::path::PathBuf;

use clap::Parser;

/// Asynchronous download of SHOM REFMAR tide gauge observations.
#[derive(Debug, Parser)]
#[command(name = "marees", version, about)]
pub struct Cli {
    /// Start date (YYYY-MM-DD), default 2024-01-01.
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub debut: Option<String>,

    /// End date (YYYY-MM-DD), default today.
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub fin: Option<String>,

    /// Enables debug logging.
    #[arg(long, default_value_t = false)]
    pub debug: bool,

    /// Configuration file, default marees.toml when present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory receiving the downloaded file.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}
