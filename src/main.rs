//! Canary Catalog - command line entry point
//!
//! `update` runs one fetch/merge/persist pass; `list` queries the catalog.

use std::process::ExitCode;

use clap::Parser;

use canary_catalog::catalog::{filter_releases, Catalog};
use canary_catalog::cli::{render_release_line, Cli, Commands, ListArgs};
use canary_catalog::github::GithubClient;
use canary_catalog::logging::{init_logger, log_error, log_info, RunInfo};
use canary_catalog::{update_catalog, CatalogConfig, Result};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.build_config()?;

    match cli.selected_command() {
        Commands::Update(_) => run_update(&config, cli.quiet),
        Commands::List(args) => run_list(&config, &args),
    }
}

fn run_update(config: &CatalogConfig, quiet: bool) -> Result<()> {
    let run_info = RunInfo {
        app_version: env!("CARGO_PKG_VERSION").to_string(),
        output_path: config.output_path.display().to_string(),
        primary_repo: config.primary_repo.clone(),
        merge_strategy: config.merge_strategy.to_string(),
        authenticated: config.token().is_some(),
    };
    init_logger(config.log_file.as_deref(), quiet, &run_info);
    log_info(&format!("canary-catalog v{} starting up...", run_info.app_version));

    let client = GithubClient::new(config);
    let summary = update_catalog(&client, config)?;
    println!("{}", summary.message());
    Ok(())
}

fn run_list(config: &CatalogConfig, args: &ListArgs) -> Result<()> {
    let catalog = Catalog::load(&config.output_path)?.unwrap_or_default();
    let filter = args.filter();
    let mut matches = filter_releases(catalog.records(), &filter);
    if let Some(limit) = args.limit {
        matches.truncate(limit);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&matches)?);
        return Ok(());
    }

    if matches.is_empty() {
        println!("No results found.");
        return Ok(());
    }
    for record in matches {
        println!("{}", render_release_line(record));
    }
    Ok(())
}
