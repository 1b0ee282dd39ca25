//! `dlm config` – show where config and logs live and what is in effect.

use anyhow::Result;
use dlm_core::{config, logging};
use dlm_core::ManagerConfig;

pub fn run_config(cfg: &ManagerConfig) -> Result<()> {
    println!("# config: {}", config::config_path()?.display());
    println!("# log: {}", logging::log_file_path()?.display());
    print!("{}", toml::to_string_pretty(cfg)?);
    if let Err(e) = cfg.validate() {
        eprintln!("warning: {}", e);
    }
    Ok(())
}
