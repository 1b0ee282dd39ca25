//! CLI for the direct link manager.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use dlm_core::config;
use dlm_core::ManagerConfig;

use commands::{run_config, run_resolve};

/// Top-level CLI for the direct link manager.
#[derive(Debug, Parser)]
#[command(name = "dlm")]
#[command(about = "DLM: resolve filespace paths into direct links via the local daemon", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Resolve one or more paths into direct links.
    Resolve {
        /// Paths under the mount point (absolute or mount-relative).
        paths: Vec<String>,

        /// Also read newline-separated paths from stdin.
        #[arg(long)]
        stdin: bool,

        #[command(flatten)]
        session: SessionArgs,
    },

    /// Show the config file location and the effective configuration.
    Config {
        #[command(flatten)]
        session: SessionArgs,
    },
}

/// Flags that override values from the config file.
#[derive(Debug, Default, Args)]
pub struct SessionArgs {
    /// Daemon REST API port on localhost.
    #[arg(long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Where the filespace is mounted.
    #[arg(long, value_name = "PATH")]
    pub mount_point: Option<String>,

    /// Daemon API version (2 or 3).
    #[arg(long, value_name = "VERSION")]
    pub api_version: Option<u32>,

    /// Maximum concurrent requests to the daemon.
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,

    /// Filespace name, required to build v2 links.
    #[arg(long, value_name = "NAME")]
    pub filespace: Option<String>,
}

impl SessionArgs {
    /// Overlays every flag that was given onto `cfg`.
    pub fn apply(&self, mut cfg: ManagerConfig) -> ManagerConfig {
        if let Some(port) = self.port {
            cfg.port = port;
        }
        if let Some(mount_point) = &self.mount_point {
            cfg.mount_point = mount_point.clone();
        }
        if let Some(version) = self.api_version {
            cfg.version = version;
        }
        if let Some(workers) = self.workers {
            cfg.max_workers = workers;
        }
        if let Some(filespace) = &self.filespace {
            cfg.filespace = Some(filespace.clone());
        }
        cfg
    }
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Resolve {
                paths,
                stdin,
                session,
            } => run_resolve(session.apply(cfg), paths, stdin).await?,
            CliCommand::Config { session } => run_config(&session.apply(cfg))?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
