use std::path::Path;

use clap::Subcommand;
use studio_core::clock::format_rfc3339;
use studio_store::ProjectUpdate;

use crate::cmd_init::open_store;

// ── CLI Schema ──

#[derive(Subcommand)]
pub enum ProjectCmd {
    /// Create a project
    Create {
        /// Project name
        name: String,
        /// Optional description
        #[arg(long, default_value = "")]
        description: String,
    },
    /// List projects, most recently updated first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one project
    Show { id: i64 },
    /// Rename or re-describe a project
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a project with its pages and edit sessions
    Delete { id: i64 },
    /// Print the pages configuration of a project
    Pages { id: i64 },
}

// ── Dispatch ──

pub fn run(cmd: ProjectCmd, repo_root: &Path) -> anyhow::Result<()> {
    match cmd {
        ProjectCmd::Create { name, description } => create(repo_root, &name, &description),
        ProjectCmd::List { json } => list(repo_root, json),
        ProjectCmd::Show { id } => show(repo_root, id),
        ProjectCmd::Update {
            id,
            name,
            description,
        } => update(
            repo_root,
            id,
            ProjectUpdate {
                name,
                description,
                design_system: None,
            },
        ),
        ProjectCmd::Delete { id } => delete(repo_root, id),
        ProjectCmd::Pages { id } => pages(repo_root, id),
    }
}

// ── Command Implementations ──

/// `studio project create <name>`
pub fn create(repo_root: &Path, name: &str, description: &str) -> anyhow::Result<()> {
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("project name must not be empty");
    }
    let (paths, store) = open_store(repo_root)?;
    let id = store.create_project(name, description)?;
    std::fs::create_dir_all(paths.project_html_dir(id))?;
    println!("Created project {id}: {name}");
    Ok(())
}

/// `studio project list`
pub fn list(repo_root: &Path, json: bool) -> anyhow::Result<()> {
    let (_, store) = open_store(repo_root)?;
    let projects = store.list_projects()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&projects)?);
        return Ok(());
    }
    if projects.is_empty() {
        println!("(no projects)");
        return Ok(());
    }
    for p in &projects {
        println!("{:>4}  {:<24}  {}", p.id, p.name, format_rfc3339(p.updated_at));
    }
    Ok(())
}

/// `studio project show <id>`
pub fn show(repo_root: &Path, id: i64) -> anyhow::Result<()> {
    let (_, store) = open_store(repo_root)?;
    let project = store
        .get_project(id)?
        .ok_or_else(|| anyhow::anyhow!("project {id} not found"))?;
    println!("{}", serde_json::to_string_pretty(&project)?);
    Ok(())
}

/// `studio project update <id> [--name] [--description]`
pub fn update(repo_root: &Path, id: i64, change: ProjectUpdate) -> anyhow::Result<()> {
    let (_, store) = open_store(repo_root)?;
    if !store.update_project(id, &change)? {
        anyhow::bail!("project {id} not found");
    }
    println!("Updated project {id}");
    Ok(())
}

/// `studio project delete <id>`
pub fn delete(repo_root: &Path, id: i64) -> anyhow::Result<()> {
    let (paths, store) = open_store(repo_root)?;
    if !store.delete_project(id)? {
        anyhow::bail!("project {id} not found");
    }
    let html_dir = paths.project_html_dir(id);
    if html_dir.exists() {
        std::fs::remove_dir_all(&html_dir)?;
    }
    println!("Deleted project {id}");
    Ok(())
}

/// `studio project pages <id>`
pub fn pages(repo_root: &Path, id: i64) -> anyhow::Result<()> {
    let (_, store) = open_store(repo_root)?;
    let pages = store
        .pages_config(id)?
        .ok_or_else(|| anyhow::anyhow!("project {id} not found"))?;
    println!("{}", serde_json::to_string_pretty(&pages)?);
    Ok(())
}
