//! CLI argument definitions for cardgen.

use crate::layout::OverflowPolicy;
use clap::Parser;
use std::path::PathBuf;

/// Version string with build metadata, e.g. `0.1.0 (a1b2c3d 2026-10-17T09:00:00Z)`.
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("CARDGEN_GIT_COMMIT"),
    " ",
    env!("CARDGEN_BUILD_TIMESTAMP"),
    ")"
);

/// cardgen - Print a backlog export as color-coded index cards.
///
/// Reads the XML export, draws one card per item (four per landscape A4
/// page) and opens the resulting PDF.
#[derive(Parser, Debug)]
#[command(name = "cardgen")]
#[command(author, version = LONG_VERSION, about = "Turn an exported backlog into printable index cards", long_about = None)]
pub struct Cli {
    /// Backlog export (XML)
    pub input: PathBuf,

    /// Output PDF [default: input path with a .pdf extension]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Config file to use instead of the project and system config
    #[arg(long, env = "CARDGEN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Seed for the assignee color shuffle
    #[arg(long)]
    pub seed: Option<u64>,

    /// What to do when there are more assignees than palette colors
    #[arg(long, value_parser = parse_overflow)]
    pub overflow: Option<OverflowPolicy>,

    /// Do not open the PDF after generating it
    #[arg(long)]
    pub no_open: bool,

    /// Lay out the deck and print placements without writing a file
    #[arg(long)]
    pub dry_run: bool,

    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human")]
    pub human_readable: bool,

    /// Debug logging (overridden by CARDGEN_LOG)
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_overflow(s: &str) -> Result<OverflowPolicy, String> {
    s.parse()
}
