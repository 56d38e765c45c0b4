// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use runway::{cli, commands};

fn init_logging() {
    let filter = EnvFilter::try_from_env("RUNWAY_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    match matches.subcommand() {
        Some(("report", sub)) => commands::report::handle(sub)?,
        Some(("months", sub)) => commands::months::handle(sub)?,
        Some(("categories", sub)) => commands::categories::handle(sub)?,
        Some(("export", sub)) => commands::exporter::handle(sub)?,
        Some(("doctor", sub)) => commands::doctor::handle(sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
