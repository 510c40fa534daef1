use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::paths::StudioPaths;

/// The settings `studio config` knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    EditorName,
    ServerUrl,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 2] = [ConfigKey::EditorName, ConfigKey::ServerUrl];

    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::EditorName => "editor_name",
            ConfigKey::ServerUrl => "server_url",
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        ConfigKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown config key `{s}` (expected editor_name or server_url)"))
    }
}

/// `.studio/config.json`. Unknown keys in the file are ignored and dropped on save.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudioConfig {
    /// Name shown to other editors in contention warnings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor_name: Option<String>,
    /// Base URL of the studio server used by `studio edit`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,
}

impl StudioConfig {
    /// Load from `.studio/config.json`, falling back to defaults when the
    /// file is missing or does not parse.
    pub fn load(paths: &StudioPaths) -> Self {
        match Self::read(&paths.config_json) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!(path = %paths.config_json.display(), error = %e, "ignoring unreadable config");
                Self::default()
            }
        }
    }

    /// Strict read; a missing file is the default config.
    pub fn read(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, paths: &StudioPaths) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        write_atomic(&paths.config_json, json.as_bytes())
    }

    pub fn get(&self, key: ConfigKey) -> Option<&str> {
        match key {
            ConfigKey::EditorName => self.editor_name.as_deref(),
            ConfigKey::ServerUrl => self.server_url.as_deref(),
        }
    }

    /// Validate and store `value` under `key`.
    pub fn set(&mut self, key: ConfigKey, value: &str) -> anyhow::Result<()> {
        let value = value.trim();
        match key {
            ConfigKey::EditorName => {
                if value.is_empty() {
                    anyhow::bail!("editor_name must not be blank");
                }
                self.editor_name = Some(value.to_string());
            }
            ConfigKey::ServerUrl => {
                let rest = value
                    .strip_prefix("http://")
                    .or_else(|| value.strip_prefix("https://"))
                    .ok_or_else(|| anyhow::anyhow!("server_url must start with http:// or https://"))?;
                if rest.trim_end_matches('/').is_empty() {
                    anyhow::bail!("server_url has no host");
                }
                self.server_url = Some(value.trim_end_matches('/').to_string());
            }
        }
        Ok(())
    }

    pub fn unset(&mut self, key: ConfigKey) {
        match key {
            ConfigKey::EditorName => self.editor_name = None,
            ConfigKey::ServerUrl => self.server_url = None,
        }
    }
}

/// Replace `path` with `data` through a synced temp file in the same directory.
pub fn write_atomic(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    let mut staged = tempfile::NamedTempFile::new_in(dir)?;
    staged.write_all(data)?;
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|e| e.error)?;
    Ok(())
}
