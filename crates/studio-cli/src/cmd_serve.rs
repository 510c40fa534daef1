use std::path::Path;

use studio_serve::ServeConfig;

pub fn execute(repo_root: &Path, bind: &str, port: u16) -> anyhow::Result<()> {
    let config = ServeConfig {
        bind: bind.to_string(),
        port,
    };
    tokio::runtime::Runtime::new()?.block_on(studio_serve::serve(repo_root, config))
}
