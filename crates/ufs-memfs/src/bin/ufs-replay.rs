// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;

use ufs_core::CoreConfig;
use ufs_logging::CliLoggingArgs;
use ufs_memfs::{Replay, Scenario};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Replay create/open requests against an in-memory file system"
)]
struct Cli {
    /// Scenario file (TOML)
    scenario: PathBuf,

    /// Core configuration file replacing the scenario's [core] table
    #[arg(long, env = "UFS_CORE_CONFIG")]
    config: Option<PathBuf>,

    /// Print only the summary line
    #[arg(long)]
    quiet: bool,

    /// Fail when any request result differs from its `expect` value
    #[arg(long)]
    check: bool,

    #[command(flatten)]
    logging: CliLoggingArgs,
}

fn main() -> Result<()> {
    let Cli {
        scenario: scenario_path,
        config,
        quiet,
        check,
        logging,
    } = Cli::parse();
    logging.init("ufs-replay")?;

    let mut scenario = Scenario::load(&scenario_path)
        .with_context(|| format!("loading scenario {}", scenario_path.display()))?;
    if let Some(config_path) = config {
        scenario.core = CoreConfig::load(&config_path)
            .with_context(|| format!("loading core config {}", config_path.display()))?;
    }
    info!(
        scenario = scenario.name.as_deref().unwrap_or("unnamed"),
        requests = scenario.requests.len(),
        "starting replay"
    );

    let mut replay = Replay::new(&scenario).context("seeding file system")?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for (index, request) in scenario.requests.iter().enumerate() {
        let outcome = replay.execute(index, request);
        if !quiet {
            serde_json::to_writer(&mut out, &outcome)?;
            writeln!(out)?;
        }
    }

    let summary = replay.finish();
    serde_json::to_writer(&mut out, &summary)?;
    writeln!(out)?;
    out.flush()?;

    if check && summary.mismatches > 0 {
        bail!("{} request(s) did not match their expectation", summary.mismatches);
    }
    Ok(())
}
