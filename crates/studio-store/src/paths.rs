use std::path::{Path, PathBuf};

/// All well-known paths under `.studio/`.
#[derive(Debug, Clone)]
pub struct StudioPaths {
    pub root: PathBuf,
    pub studio_dir: PathBuf,
    pub db_file: PathBuf,
    pub config_json: PathBuf,
    pub html_caches_dir: PathBuf,
}

impl StudioPaths {
    /// Derive all paths from a workspace root. Pure computation, no I/O.
    pub fn discover(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let studio_dir = root.join(".studio");
        Self {
            db_file: studio_dir.join("studio.db"),
            config_json: studio_dir.join("config.json"),
            html_caches_dir: studio_dir.join("html_caches"),
            studio_dir,
            root,
        }
    }

    /// Create all required directories. Idempotent.
    pub fn ensure_layout(&self) -> anyhow::Result<()> {
        for dir in [&self.studio_dir, &self.html_caches_dir] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// Check whether `.studio/` exists.
    pub fn is_initialized(&self) -> bool {
        self.studio_dir.is_dir()
    }

    /// Per-project mockup directory under `html_caches/<id>/`.
    pub fn project_html_dir(&self, project_id: i64) -> PathBuf {
        self.html_caches_dir.join(project_id.to_string())
    }

    /// Walk up from `start` looking for a directory containing `.studio/`.
    pub fn find_root(start: &Path) -> Option<PathBuf> {
        let mut cur = start.to_path_buf();
        loop {
            if cur.join(".studio").is_dir() {
                return Some(cur);
            }
            if !cur.pop() {
                return None;
            }
        }
    }
}
