mod cmd_config;
mod cmd_edit;
mod cmd_init;
mod cmd_project;
mod cmd_serve;
mod cmd_session;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "studio", version, about = "App Page Studio project server and edit sessions")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Initialize a new .studio/ workspace
    Init,
    /// Start the HTTP API server
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
        /// Port to listen on
        #[arg(long, default_value = "3000")]
        port: u16,
    },
    /// Manage projects
    Project {
        #[command(subcommand)]
        cmd: cmd_project::ProjectCmd,
    },
    /// Inspect or drive edit sessions directly against the local database
    Session {
        #[command(subcommand)]
        cmd: cmd_session::SessionCmd,
    },
    /// Interactive editing session against a running server
    Edit {
        /// Project to open on start
        project: Option<i64>,
        /// Server base URL (default: config `server_url`, then http://127.0.0.1:3000)
        #[arg(long)]
        server: Option<String>,
        /// Editor name shown to others (default: config `editor_name`)
        #[arg(long)]
        name: Option<String>,
    },
    /// Manage workspace config (.studio/config.json)
    Config {
        #[command(subcommand)]
        cmd: cmd_config::ConfigCmd,
    },
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging();
    let cwd = std::env::current_dir()?;
    let repo_root = studio_store::StudioPaths::find_root(&cwd).unwrap_or_else(|| cwd.clone());

    match cli.cmd {
        Command::Init => cmd_init::execute(&cwd),
        Command::Serve { bind, port } => cmd_serve::execute(&repo_root, &bind, port),
        Command::Project { cmd } => cmd_project::run(cmd, &repo_root),
        Command::Session { cmd } => cmd_session::run(cmd, &repo_root),
        Command::Edit {
            project,
            server,
            name,
        } => cmd_edit::execute(&repo_root, project, server.as_deref(), name.as_deref()),
        Command::Config { cmd } => cmd_config::run(cmd, &repo_root),
    }
}
