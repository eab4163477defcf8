//! CLI for the ADL bulk media downloader.

mod commands;

use adl_core::config;
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use commands::{run_adapters, run_completions, run_fetch, run_man, run_pack, run_saved, run_serve};

/// Top-level CLI for ADL.
#[derive(Debug, Parser)]
#[command(name = "adl")]
#[command(
    about = "ADL: download every track on a page to disk or into a ZIP archive",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

/// Options shared by commands that run a single job.
#[derive(Debug, Clone, Args)]
pub struct JobArgs {
    /// Page URL to scrape for tracks.
    pub url: String,

    /// Download name (directory or archive stem). Derived from the URL when omitted.
    #[arg(long)]
    pub name: Option<String>,

    /// Adapter tag to use instead of detecting one from the page.
    #[arg(long, value_name = "TAG")]
    pub plugin: Option<String>,

    /// Concurrent track fetches (clamped to the configured maximum).
    #[arg(long, short = 'w', value_name = "N")]
    pub workers: Option<usize>,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Serve the HTTP API and WebSocket updates.
    Serve {
        /// Listen address; overrides `bind` from config.toml.
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
        /// Root for server-mode downloads; overrides `download_dir`.
        #[arg(long, value_name = "DIR")]
        download_dir: Option<PathBuf>,
    },

    /// Download every track of a page into `<download_dir>/<name>/`.
    Fetch {
        #[command(flatten)]
        job: JobArgs,
        /// Root for the download; overrides `download_dir`.
        #[arg(long, value_name = "DIR")]
        download_dir: Option<PathBuf>,
    },

    /// Download every track of a page into a ZIP archive.
    Pack {
        #[command(flatten)]
        job: JobArgs,
        /// Archive path (default: `<name>.zip` in the current directory).
        #[arg(long, short = 'o', value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// List the available scrape adapters.
    Adapters,

    /// List saved server-mode downloads.
    Saved {
        /// Delete the named download instead of listing.
        #[arg(long, value_name = "NAME")]
        delete: Option<String>,
    },

    /// Print shell completions to stdout.
    Completions {
        shell: Shell,
    },

    /// Print the man page to stdout.
    Man,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let mut cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Serve { bind, download_dir } => {
                if let Some(dir) = download_dir {
                    cfg.download_dir = dir;
                }
                run_serve(cfg, bind).await?;
            }
            CliCommand::Fetch { job, download_dir } => {
                if let Some(dir) = download_dir {
                    cfg.download_dir = dir;
                }
                run_fetch(cfg, job).await?;
            }
            CliCommand::Pack { job, output } => run_pack(cfg, job, output).await?,
            CliCommand::Adapters => run_adapters(&cfg),
            CliCommand::Saved { delete } => run_saved(&cfg, delete.as_deref())?,
            CliCommand::Completions { shell } => run_completions(shell),
            CliCommand::Man => run_man()?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
