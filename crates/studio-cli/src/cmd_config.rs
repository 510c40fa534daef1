use std::path::Path;

use clap::Subcommand;
use studio_store::{ConfigKey, StudioConfig, StudioPaths};

// ── CLI Schema ──

#[derive(Subcommand)]
pub enum ConfigCmd {
    /// Set a config value
    Set {
        /// Config key: editor_name or server_url
        key: String,
        /// Value, stored as a string
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// Remove a config value
    Unset {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
}

// ── Dispatch ──

pub fn run(cmd: ConfigCmd, repo_root: &Path) -> anyhow::Result<()> {
    match cmd {
        ConfigCmd::Set { key, value } => set(repo_root, &key, &value),
        ConfigCmd::Get { key } => get(repo_root, &key),
        ConfigCmd::Unset { key } => unset(repo_root, &key),
        ConfigCmd::List => list(repo_root),
    }
}

// ── Command Implementations ──

fn workspace_paths(repo_root: &Path) -> anyhow::Result<StudioPaths> {
    let paths = StudioPaths::discover(repo_root);
    if !paths.is_initialized() {
        anyhow::bail!("No .studio/ workspace found. Run `studio init` first.");
    }
    Ok(paths)
}

/// `studio config set <key> <value>`
pub fn set(repo_root: &Path, key: &str, value: &str) -> anyhow::Result<()> {
    let key: ConfigKey = key.parse()?;
    let paths = workspace_paths(repo_root)?;
    let mut config = StudioConfig::read(&paths.config_json)?;
    config.set(key, value)?;
    config.save(&paths)?;
    println!("{key} = {}", config.get(key).unwrap_or_default());
    Ok(())
}

/// `studio config get <key>`
pub fn get(repo_root: &Path, key: &str) -> anyhow::Result<()> {
    let key: ConfigKey = key.parse()?;
    let paths = workspace_paths(repo_root)?;
    let config = StudioConfig::read(&paths.config_json)?;
    println!("{}", config.get(key).unwrap_or("(not set)"));
    Ok(())
}

/// `studio config unset <key>`
pub fn unset(repo_root: &Path, key: &str) -> anyhow::Result<()> {
    let key: ConfigKey = key.parse()?;
    let paths = workspace_paths(repo_root)?;
    let mut config = StudioConfig::read(&paths.config_json)?;
    config.unset(key);
    config.save(&paths)?;
    Ok(())
}

/// `studio config list`
pub fn list(repo_root: &Path) -> anyhow::Result<()> {
    let paths = workspace_paths(repo_root)?;
    let config = StudioConfig::read(&paths.config_json)?;
    for key in ConfigKey::ALL {
        println!("{key} = {}", config.get(key).unwrap_or("(not set)"));
    }
    Ok(())
}
