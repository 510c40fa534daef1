use std::path::Path;

use studio_store::{SqliteStore, StudioPaths};

pub fn execute(repo_root: &Path) -> anyhow::Result<()> {
    let paths = StudioPaths::discover(repo_root);
    let existed = paths.is_initialized();

    paths.ensure_layout()?;
    // Creates the database on first run and migrates it on later ones.
    let store = SqliteStore::open_or_create(&paths.db_file)?;
    let version = store.schema_version()?;

    if existed {
        println!("Already initialized at {}", paths.studio_dir.display());
    } else {
        println!("Initialized {} (schema v{version})", paths.studio_dir.display());
    }
    Ok(())
}

/// Open the workspace database, refusing to create one outside `studio init`.
pub fn open_store(repo_root: &Path) -> anyhow::Result<(StudioPaths, SqliteStore)> {
    let paths = StudioPaths::discover(repo_root);
    if !paths.is_initialized() {
        anyhow::bail!("No .studio/ workspace found. Run `studio init` first.");
    }
    let store = SqliteStore::open(&paths.db_file)?;
    Ok((paths, store))
}
