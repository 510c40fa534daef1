use std::path::Path;

use clap::Subcommand;
use serde::Serialize;
use studio_core::clock::format_rfc3339;
use studio_core::{editor_name_or_default, is_expired, Clock, SystemClock, SESSION_TIMEOUT};
use studio_session::{require_session_id, Coordinator};
use studio_store::SqliteStore;

use crate::cmd_init::open_store;

// ── CLI Schema ──

#[derive(Subcommand)]
pub enum SessionCmd {
    /// Claim a project for a session, or report who holds it
    Register {
        project: i64,
        session: String,
        /// Editor name shown to others
        #[arg(long)]
        name: Option<String>,
    },
    /// Renew a session's heartbeat
    Heartbeat { project: i64, session: String },
    /// Ask whether a session may save
    Check { project: i64, session: String },
    /// Give up a session
    Release { project: i64, session: String },
    /// Take a project over from whoever holds it
    Force {
        project: i64,
        session: String,
        #[arg(long)]
        name: Option<String>,
    },
    /// List stored session rows, including ones not yet swept
    List,
}

// ── Dispatch ──

pub fn run(cmd: SessionCmd, repo_root: &Path) -> anyhow::Result<()> {
    match cmd {
        SessionCmd::Register {
            project,
            session,
            name,
        } => {
            let sid = require_session_id(Some(session.as_str()))?;
            let editor = editor_name_or_default(name.as_deref());
            print_json(&coordinator(repo_root)?.register(project, &sid, &editor)?)
        }
        SessionCmd::Heartbeat { project, session } => {
            let sid = require_session_id(Some(session.as_str()))?;
            print_json(&coordinator(repo_root)?.heartbeat(project, &sid)?)
        }
        SessionCmd::Check { project, session } => {
            let sid = require_session_id(Some(session.as_str()))?;
            print_json(&coordinator(repo_root)?.check(project, &sid)?)
        }
        SessionCmd::Release { project, session } => {
            let sid = require_session_id(Some(session.as_str()))?;
            print_json(&coordinator(repo_root)?.release(project, &sid)?)
        }
        SessionCmd::Force {
            project,
            session,
            name,
        } => {
            let sid = require_session_id(Some(session.as_str()))?;
            let editor = editor_name_or_default(name.as_deref());
            print_json(&coordinator(repo_root)?.force_acquire(project, &sid, &editor)?)
        }
        SessionCmd::List => list(repo_root),
    }
}

fn coordinator(repo_root: &Path) -> anyhow::Result<Coordinator<SqliteStore>> {
    let (_, store) = open_store(repo_root)?;
    Ok(Coordinator::with_system_clock(store))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ── Command Implementations ──

/// `studio session list`
pub fn list(repo_root: &Path) -> anyhow::Result<()> {
    let (_, store) = open_store(repo_root)?;
    print!("{}", render_sessions(&store, &SystemClock)?);
    Ok(())
}

fn render_sessions(store: &SqliteStore, clock: &dyn Clock) -> anyhow::Result<String> {
    let sessions = store.all_sessions()?;
    if sessions.is_empty() {
        return Ok("(no edit sessions)\n".to_string());
    }
    let now = clock.now();
    let mut out = String::new();
    for s in &sessions {
        let state = if is_expired(s, now, SESSION_TIMEOUT) {
            "expired"
        } else {
            "live"
        };
        out.push_str(&format!(
            "project {:<4} {:<32} {:<16} {:<7} last heartbeat {}\n",
            s.project_id,
            s.session_id.as_str(),
            s.display_name(),
            state,
            format_rfc3339(s.last_heartbeat),
        ));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use studio_core::{ManualClock, SessionId};
    use studio_store::SessionStore;
    use time::macros::datetime;

    #[test]
    fn list_marks_expired_rows() {
        let tmp = tempfile::tempdir().unwrap();
        crate::cmd_init::execute(tmp.path()).unwrap();
        let (_, store) = open_store(tmp.path()).unwrap();
        let pid = store.create_project("Shop", "").unwrap();

        let t0 = datetime!(2026-03-01 10:00 UTC);
        store
            .upsert_own(pid, &SessionId::new("A"), "Alice", t0)
            .unwrap();

        let clock = ManualClock::new(t0 + time::Duration::minutes(1));
        let out = render_sessions(&store, &clock).unwrap();
        assert!(out.contains("Alice"));
        assert!(out.contains("live"));

        clock.advance(time::Duration::minutes(10));
        let out = render_sessions(&store, &clock).unwrap();
        assert!(out.contains("expired"));
    }

    #[test]
    fn register_then_check_through_commands() {
        let tmp = tempfile::tempdir().unwrap();
        crate::cmd_init::execute(tmp.path()).unwrap();
        let (_, store) = open_store(tmp.path()).unwrap();
        let pid = store.create_project("Shop", "").unwrap();
        drop(store);

        run(
            SessionCmd::Register {
                project: pid,
                session: "A".into(),
                name: Some("Alice".into()),
            },
            tmp.path(),
        )
        .unwrap();

        let (_, store) = open_store(tmp.path()).unwrap();
        let rows = store.all_sessions().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].editor_name, "Alice");
        drop(store);

        assert!(run(
            SessionCmd::Register {
                project: 999,
                session: "A".into(),
                name: None,
            },
            tmp.path(),
        )
        .is_err());
        assert!(run(
            SessionCmd::Check {
                project: pid,
                session: "  ".into(),
            },
            tmp.path(),
        )
        .is_err());
    }
}
