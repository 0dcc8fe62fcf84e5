//! Command line front-end

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::catalog::query::published_day;
use crate::catalog::{AssetPlatform, MergeStrategy, ReleaseFilter, ReleaseRecord};
use crate::config::CatalogConfig;
use crate::error::Result;

#[derive(Parser, Debug)]
#[command(name = "canary-catalog")]
#[command(version)]
#[command(about = "Maintain a sorted JSON catalog of canary build releases from GitHub")]
pub struct Cli {
    /// TOML config file; flags override its values
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Catalog JSON file
    #[arg(long, global = true)]
    pub output: Option<PathBuf>,

    /// Hide debug lines on stderr
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Defaults to `update` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch new releases and rewrite the catalog
    Update(UpdateArgs),

    /// Search the catalog without touching the network
    List(ListArgs),
}

#[derive(Args, Debug, Default, Clone)]
pub struct UpdateArgs {
    /// full-rescan or incremental
    #[arg(long)]
    pub strategy: Option<MergeStrategy>,

    #[arg(long)]
    pub primary_repo: Option<String>,

    #[arg(long)]
    pub per_page: Option<u32>,

    /// Also append diagnostics to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Leave the release page `url` out of new records
    #[arg(long)]
    pub no_url: bool,
}

#[derive(Args, Debug, Default, Clone)]
pub struct ListArgs {
    /// Match against changelog title or tag
    #[arg(long, short)]
    pub search: Option<String>,

    /// Earliest publish day, YYYY-MM-DD
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Latest publish day, YYYY-MM-DD
    #[arg(long)]
    pub to: Option<NaiveDate>,

    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Print matching records as JSON
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// The subcommand to run, `update` with no overrides if none was given
    pub fn selected_command(&self) -> Commands {
        match &self.command {
            Some(Commands::Update(args)) => Commands::Update(args.clone()),
            Some(Commands::List(args)) => Commands::List(args.clone()),
            None => Commands::Update(UpdateArgs::default()),
        }
    }

    /// Config file (or defaults) with command line overrides applied
    pub fn build_config(&self) -> Result<CatalogConfig> {
        let mut config = match &self.config {
            Some(path) => CatalogConfig::load(path)?,
            None => CatalogConfig::default(),
        };

        if let Some(ref output) = self.output {
            config.output_path = output.clone();
        }

        if let Some(Commands::Update(args)) = &self.command {
            if let Some(strategy) = args.strategy {
                config.merge_strategy = strategy;
            }
            if let Some(ref repo) = args.primary_repo {
                config.primary_repo = repo.clone();
            }
            if let Some(per_page) = args.per_page {
                config.per_page = per_page;
            }
            if let Some(ref log_file) = args.log_file {
                config.log_file = Some(log_file.clone());
            }
            if args.no_url {
                config.include_url = false;
            }
        }

        Ok(config)
    }
}

impl ListArgs {
    pub fn filter(&self) -> ReleaseFilter {
        ReleaseFilter {
            search: self.search.clone(),
            from: self.from,
            to: self.to,
        }
    }
}

// ============================================================================
// List Rendering
// ============================================================================

/// One line per release: date, tag, title, platforms
pub fn render_release_line(record: &ReleaseRecord) -> String {
    let date = published_day(record)
        .map(|d| d.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| "unknown date".to_string());

    let mut platforms: Vec<&str> = Vec::new();
    for asset in &record.assets {
        let name = AssetPlatform::from_asset_name(&asset.name).display_name();
        if !platforms.contains(&name) {
            platforms.push(name);
        }
    }

    format!(
        "{:<13} {:<10} {} [{}]",
        date,
        record.tag_name,
        record.display_title(),
        platforms.join(", ")
    )
}
