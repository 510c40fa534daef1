use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use studio_agent::{ConsoleUi, HttpSessionApi, PagesApi, SaveDecision, SessionAgent};
use studio_store::{StudioConfig, StudioPaths};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

/// How long ctrl-c waits for an in-flight command before exiting without release.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(3);

#[derive(Debug, PartialEq, Eq)]
enum EditCmd {
    Open(i64),
    Save(Option<PathBuf>),
    TakeOver,
    Status,
    Close,
    Help,
    Quit,
}

fn parse_line(line: &str) -> Result<Option<EditCmd>, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let cmd = match head {
        "open" => {
            let id = words
                .next()
                .ok_or("usage: open <project-id>")?
                .parse::<i64>()
                .map_err(|_| "project id must be a number".to_string())?;
            EditCmd::Open(id)
        }
        "save" => EditCmd::Save(words.next().map(PathBuf::from)),
        "take" | "takeover" => EditCmd::TakeOver,
        "status" => EditCmd::Status,
        "close" => EditCmd::Close,
        "help" | "?" => EditCmd::Help,
        "quit" | "exit" => EditCmd::Quit,
        other => return Err(format!("unknown command `{other}` (try `help`)")),
    };
    Ok(Some(cmd))
}

const HELP: &str = "\
commands:
  open <id>   open a project for editing (releases the current one)
  save [file] save the project's pages, or the JSON in <file>, after checking
              ownership (asks before taking over from another editor)
  take        take over the open project now
  status      show session and ownership state
  close       release the open project
  quit        release and exit";

/// `studio edit [project]`
pub fn execute(
    repo_root: &Path,
    project: Option<i64>,
    server: Option<&str>,
    name: Option<&str>,
) -> anyhow::Result<()> {
    let config = StudioConfig::load(&StudioPaths::discover(repo_root));
    let server_url = server
        .map(str::to_string)
        .or(config.server_url)
        .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
    let editor_name = name.map(str::to_string).or(config.editor_name).unwrap_or_default();

    let rt = tokio::runtime::Runtime::new()?;
    let http = HttpSessionApi::new(&server_url);
    let agent = Arc::new(Mutex::new(SessionAgent::new(
        Arc::new(http.clone()),
        Arc::new(ConsoleUi),
        &editor_name,
    )));

    {
        let agent = rt.block_on(agent.lock());
        println!(
            "Editing as {} (session {}) via {server_url}",
            agent.editor_name(),
            agent.session_id()
        );
    }

    let cancel = CancellationToken::new();
    ctrlc_cancel(cancel.clone());
    rt.spawn(release_on_cancel(Arc::clone(&agent), cancel));

    if let Some(id) = project {
        // Failures are already reported through the UI.
        let _ = rt.block_on(async { agent.lock().await.open_project(id).await });
    }

    let stdin = std::io::stdin();
    loop {
        print!("studio> ");
        std::io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let cmd = match parse_line(&line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(msg) => {
                eprintln!("{msg}");
                continue;
            }
        };
        if cmd == EditCmd::Quit {
            break;
        }
        rt.block_on(async {
            let mut agent = agent.lock().await;
            run_command(&mut agent, &http, cmd).await
        });
    }

    rt.block_on(async { agent.lock().await.close().await });
    Ok(())
}

async fn run_command(agent: &mut SessionAgent, pages: &dyn PagesApi, cmd: EditCmd) {
    match cmd {
        EditCmd::Open(id) => {
            if let Ok(out) = agent.open_project(id).await {
                if out.is_new_editor {
                    println!("Editing project {id}");
                }
            }
        }
        EditCmd::Save(file) => {
            let doc = match file.as_deref().map(read_pages_file).transpose() {
                Ok(doc) => doc,
                Err(e) => {
                    eprintln!("{e:#}");
                    return;
                }
            };
            match agent.save(pages, doc).await {
                Ok(SaveDecision::Aborted) => println!("Save cancelled"),
                Ok(_) => println!("Saved"),
                Err(_) => {}
            }
        }
        EditCmd::TakeOver => {
            if agent.force_take_over().await.is_ok() {
                println!("You are now the editor");
            }
        }
        EditCmd::Status => {
            let status = agent.status();
            println!("session:    {}", agent.session_id());
            match agent.project() {
                Some(id) => println!("project:    {id}"),
                None => println!("project:    (none)"),
            }
            println!("editor:     {}", status.current_editor.as_deref().unwrap_or("-"));
            println!("owned:      {}", status.is_current_editor);
            println!("heartbeat:  {}", agent.is_heartbeating());
        }
        EditCmd::Close => {
            agent.close().await;
            println!("Closed");
        }
        EditCmd::Help => println!("{HELP}"),
        EditCmd::Quit => {}
    }
}

fn read_pages_file(path: &Path) -> anyhow::Result<serde_json::Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("{} is not valid JSON", path.display()))
}

/// On ctrl-c, release the open project (best-effort) and exit.
async fn release_on_cancel(agent: Arc<Mutex<SessionAgent>>, cancel: CancellationToken) {
    cancel.cancelled().await;
    match tokio::time::timeout(SHUTDOWN_GRACE, agent.lock()).await {
        Ok(mut agent) => agent.close().await,
        Err(_) => tracing::warn!("command still running, exiting without release"),
    }
    std::process::exit(130);
}

fn ctrlc_cancel(cancel: CancellationToken) {
    let _ = ctrlc::set_handler(move || {
        cancel.cancel();
    });
}
