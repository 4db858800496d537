use crate::config::SetupConfig;
use crate::download::http::HttpTransport;
use crate::models::{Args, ReleaseChannel};
use crate::runner::{self, RunOptions};
use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const ISSUES_URL: &str = "https://github.com/santacrab2/PKHeX-Plugins/issues";

/// Main CLI entry point
pub fn run() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let code = match execute(&args) {
        Ok(()) => {
            println!("PKHeX and Plugins setup completed.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            if let Some(err) = e.downcast_ref::<crate::SetupError>() {
                tracing::debug!("Setup failed with a {:?} error", err.kind());
                if let Some(hint) = runner::failure_hint(err) {
                    eprintln!("{hint}");
                }
            }
            ExitCode::FAILURE
        }
    };

    if args.interactive {
        println!("Press Enter to Exit.");
        let _ = read_line();
    }
    code
}

fn execute(args: &Args) -> Result<()> {
    let channel = if args.interactive {
        println!("Press Enter for Stable. Type 'dev' for development build.");
        ReleaseChannel::from_prompt(&read_line().context("Failed to read channel selection")?)
    } else {
        args.channel
    };

    println!("PKHeX and PKHeX-Plugins downloader ({channel})");
    println!("Please report any issues with this setup file via GitHub issues at {ISSUES_URL}");
    println!();

    let config =
        SetupConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    let install_dir = match &args.dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };

    let transport = HttpTransport::new(&config.user_agent);
    let outcome = runner::run_setup(
        &transport,
        &config,
        &RunOptions {
            channel,
            install_dir,
        },
    )?;

    tracing::info!(
        "Installed {} files and {} plugin files from {} ({})",
        outcome.install.base_files,
        outcome.install.plugin_files,
        outcome.channel,
        outcome.plugin_release
    );
    println!("Plugins installed to {}", outcome.install.plugins_path.display());
    Ok(())
}

fn read_line() -> io::Result<String> {
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}
