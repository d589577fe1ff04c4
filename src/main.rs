// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! embernode CLI - run a CommonJS script on the Boa engine

use anyhow::Context as _;
use clap::Parser;
use embernode_runtime::engine::boa;
use embernode_runtime::{InstanceRegistry, Runtime, RuntimeConfig, VERSION};
use owo_colors::OwoColorize;
use std::path::PathBuf;

/// Exit status after Ctrl-C, as a shell reports SIGINT
const INTERRUPTED: i32 = 130;

#[derive(Parser)]
#[command(
    name = "embernode",
    about = "Run Node-style scripts on an embedded JavaScript engine",
    version = VERSION,
    author = "Pegasus Heavy Industries"
)]
struct Cli {
    /// Script to run as the main module
    script: Option<PathBuf>,

    /// JSON runtime configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Return once no timers or next-ticks are pending
    #[arg(long)]
    exit_when_idle: bool,

    /// Enable verbose logging
    #[arg(long)]
    verbose: bool,

    /// Arguments passed to the script
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("embernode=debug,embernode_runtime=debug")
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("embernode=warn")
            .init();
    }

    let Some(script) = cli.script else {
        return Ok(());
    };

    let mut config = match &cli.config {
        Some(path) => RuntimeConfig::load_from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => RuntimeConfig::default(),
    };
    config.load_from_env()?;
    if cli.exit_when_idle {
        config.exit_when_idle = true;
    }

    let script = std::path::absolute(&script)
        .with_context(|| format!("invalid script path {}", script.display()))?;
    if config.base_dir.is_none() {
        config.base_dir = script.parent().map(PathBuf::from);
    }

    let mut argv = vec!["embernode".to_string(), script.display().to_string()];
    argv.extend(cli.args);
    let config = config.with_argv(argv);

    let mut context = boa::new_context(InstanceRegistry::shared());
    let runtime = match Runtime::new(&mut context, config) {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e.describe(&mut context));
            std::process::exit(1);
        }
    };

    tracing::debug!(script = %script.display(), "running main module");
    if let Err(e) = runtime.require_main(&mut context, &script.to_string_lossy()) {
        eprintln!("{}: {}", "Error".red().bold(), e.describe(&mut context));
        std::process::exit(1);
    }

    let result = tokio::select! {
        result = runtime.run_event_loop(&mut context) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::debug!("interrupted");
            runtime.stop();
            Ok(INTERRUPTED)
        }
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{}: {}", "Uncaught".red().bold(), e.describe(&mut context));
            std::process::exit(1);
        }
    }
}
