//! cardgen CLI - Print a backlog export as color-coded index cards.

use cardgen::cli::Cli;
use cardgen::commands::{self, GenerateRequest, Output};
use cardgen::config::ConfigOverrides;
use cardgen::sys;
use clap::Parser;
use std::env;
use std::process;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() {
    let cli = Cli::parse();
    let human = cli.human_readable;

    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        }
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("CARDGEN_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "cardgen=debug,warn"
        } else {
            "cardgen=warn"
        })
    });

    let format = env::var("CARDGEN_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn run(cli: Cli) -> Result<(), cardgen::Error> {
    let mut overrides = ConfigOverrides::new();
    if let Some(path) = cli.config {
        overrides = overrides.with_config_file(path);
    }
    if let Some(seed) = cli.seed {
        overrides = overrides.with_seed(seed);
    }
    if let Some(policy) = cli.overflow {
        overrides = overrides.with_overflow_policy(policy);
    }
    if cli.no_open {
        overrides = overrides.with_open_viewer(false);
    }

    let request = GenerateRequest {
        input: cli.input,
        output: cli.output,
        overrides,
        dry_run: cli.dry_run,
    };
    let result = commands::generate(&request)?;
    output(&result, cli.human_readable);

    if let (true, Some(path)) = (result.open_viewer, &result.output) {
        if let Err(e) = sys::open_in_viewer(path) {
            warn!(error = %e, "could not open the generated file");
        }
    }
    Ok(())
}

fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}
