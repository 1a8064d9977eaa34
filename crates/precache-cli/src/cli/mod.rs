//! CLI for pre-caching WordPress core, themes and plugins.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use precache_core::cache::{resolve_cache_dir, FileCache};
use precache_core::config::{self, PrecacheConfig};
use precache_core::fetcher::CurlFetcher;
use precache_core::package::{FileType, ItemKind};
use precache_core::pipeline::{CoreRequest, Pipeline};
use precache_core::registry::HttpRegistry;
use std::path::Path;
use std::sync::Arc;

use commands::{run_checksum, run_core, run_items, run_list};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "wp-precache")]
#[command(
    about = "Download WordPress core, themes and plugins into the WP-CLI cache",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Cache a WordPress core release.
    Core {
        /// Release to cache (default: the current release for the locale).
        #[arg(long)]
        version: Option<String>,
        /// Locale of the release, e.g. fr_FR (default from config).
        #[arg(long)]
        locale: Option<String>,
        /// Archive format: zip or tar.gz.
        #[arg(long, default_value = "tar.gz", value_name = "TYPE")]
        file_type: FileType,
    },

    /// Cache one or more themes from the theme directory.
    Theme {
        /// Theme slugs.
        #[arg(required = true)]
        slugs: Vec<String>,
        /// Version to cache instead of the current one; `dev` selects trunk.
        #[arg(long)]
        version: Option<String>,
        /// Process up to N slugs concurrently (default from config).
        #[arg(long, value_name = "N")]
        jobs: Option<usize>,
    },

    /// Cache one or more plugins from the plugin directory.
    Plugin {
        /// Plugin slugs.
        #[arg(required = true)]
        slugs: Vec<String>,
        /// Version to cache instead of the current one; `dev` selects trunk.
        #[arg(long)]
        version: Option<String>,
        /// Process up to N slugs concurrently (default from config).
        #[arg(long, value_name = "N")]
        jobs: Option<usize>,
    },

    /// List cached artifacts.
    List,

    /// Compute MD5 and SHA-256 of a file.
    Checksum {
        /// Path to the file.
        path: String,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Core {
                version,
                locale,
                file_type,
            } => {
                let request = CoreRequest {
                    version,
                    locale: locale.unwrap_or_else(|| cfg.default_locale.clone()),
                    file_type,
                };
                run_core(build_pipeline(&cfg)?, request).await?;
            }
            CliCommand::Theme {
                slugs,
                version,
                jobs,
            } => {
                let jobs = jobs.unwrap_or(cfg.jobs);
                run_items(build_pipeline(&cfg)?, ItemKind::Theme, slugs, version, jobs).await?;
            }
            CliCommand::Plugin {
                slugs,
                version,
                jobs,
            } => {
                let jobs = jobs.unwrap_or(cfg.jobs);
                run_items(build_pipeline(&cfg)?, ItemKind::Plugin, slugs, version, jobs).await?;
            }
            CliCommand::List => {
                let root = resolve_cache_dir(cfg.cache_dir.as_deref())?;
                run_list(&FileCache::new(root))?;
            }
            CliCommand::Checksum { path } => run_checksum(Path::new(&path)).await?,
        }

        Ok(())
    }
}

/// Wires the libcurl registry and fetcher to the on-disk cache.
fn build_pipeline(cfg: &PrecacheConfig) -> Result<Pipeline> {
    let cache_root = resolve_cache_dir(cfg.cache_dir.as_deref())?;
    tracing::debug!(cache = %cache_root.display(), "using cache directory");
    let registry = HttpRegistry::new(cfg.endpoints(), cfg.metadata_timeout());
    Ok(Pipeline::new(
        Arc::new(registry),
        Arc::new(CurlFetcher),
        Arc::new(FileCache::new(cache_root)),
        cfg.scratch_dir(),
    )
    .with_endpoints(cfg.endpoints())
    .with_download_timeout(cfg.download_timeout()))
}

#[cfg(test)]
mod tests;
