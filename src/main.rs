//! phishnet: URL safety scanner
//!
//! Runs URLs through an ordered chain of filters declared in a chain file
//! and reports whether they are safe to open.

mod cli;
mod config;
mod domain;
mod service;

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};
use config::{Config, ConfigService};
use domain::FilterRegistry;
use service::ScanService;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = ConfigService::load(cli.config.as_deref())?;

    // Initialize logging if debug mode
    if cli.debug || config.debug {
        domain::logger::init(&config)?;
    }

    let registry = Arc::new(FilterRegistry::with_builtin_filters());

    match cli.command {
        Commands::Scan {
            url,
            chain,
            json,
            open,
        } => {
            let scanner = build_service(&config, chain, registry)?;
            let report = scanner.scan(&url)?;

            if json {
                println!("{}", serde_json::to_string(&report)?);
            } else if report.allowed {
                if !cli.quiet {
                    println!("Allowed: {}", report.url);
                    println!("{}", report.trace);
                }
            } else {
                println!("Denied entry to site: {}", report.url);
                println!("{}", report.trace);
            }

            if open && report.allowed {
                service::open_in_browser(&report.url)?;
            }

            process::exit(report.exit_code());
        }
        Commands::Init { path } => {
            let config_path = if let Some(p) = path {
                ConfigService::generate_at(&p)?;
                p
            } else {
                ConfigService::generate_default()?;
                ConfigService::default_path()
            };
            if !cli.quiet {
                eprintln!("Configuration file created at: {}", config_path.display());
            }
        }
        Commands::Check { chain } => {
            config::validate(&config)?;
            let scanner = build_service(&config, chain, registry)?;
            if !cli.quiet {
                let names: Vec<_> = scanner.chain().names().collect();
                eprintln!(
                    "Configuration is valid. {} filter(s): {}",
                    names.len(),
                    names.join(" -> ")
                );
            }
        }
        Commands::Filters => {
            for name in registry.names() {
                println!("{}", name);
            }
        }
        Commands::Version => {
            println!("phishnet {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

/// Build the scan service from an explicit chain file or the configured one.
fn build_service(
    config: &Config,
    chain: Option<PathBuf>,
    registry: Arc<FilterRegistry>,
) -> Result<ScanService> {
    match chain {
        Some(path) => ScanService::from_chain_file(&path, registry),
        None => ScanService::from_config(config, registry),
    }
}
