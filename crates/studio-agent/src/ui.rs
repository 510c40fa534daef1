use std::io::{BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use time::OffsetDateTime;

/// What the agent shows the human editing the project.
pub trait EditorUi: Send + Sync {
    /// Persistent warning: someone else holds the project.
    fn show_contention(&self, editor: &str, since: Option<OffsetDateTime>);

    fn clear_contention(&self);

    /// Ask whether to override `editor` and save anyway.
    fn confirm_override(&self, editor: &str) -> bool;

    /// Transient message after a failed user action.
    fn notify(&self, message: &str);
}

/// Terminal UI: warnings on stderr, confirmation read from stdin.
pub struct ConsoleUi;

impl EditorUi for ConsoleUi {
    fn show_contention(&self, editor: &str, since: Option<OffsetDateTime>) {
        match since {
            Some(ts) => eprintln!(
                "[studio] {editor} is editing this project (since {})",
                studio_core::clock::format_rfc3339(ts)
            ),
            None => eprintln!("[studio] {editor} is editing this project"),
        }
    }

    fn clear_contention(&self) {
        eprintln!("[studio] you are the current editor");
    }

    fn confirm_override(&self, editor: &str) -> bool {
        eprint!("[studio] {editor} is editing this project. Save anyway and take over? [y/N] ");
        let _ = std::io::stderr().flush();
        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim(), "y" | "Y" | "yes")
    }

    fn notify(&self, message: &str) {
        eprintln!("[studio] {message}");
    }
}

/// Something the agent asked the UI to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Contention(String),
    Cleared,
    Confirm(String),
    Notice(String),
}

/// Records UI calls and answers confirmations with a fixed reply (for testing).
pub struct RecordingUi {
    events: Mutex<Vec<UiEvent>>,
    approve: AtomicBool,
}

impl RecordingUi {
    pub fn new(approve_overrides: bool) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            approve: AtomicBool::new(approve_overrides),
        }
    }

    pub fn set_approve(&self, approve: bool) {
        self.approve.store(approve, Ordering::SeqCst);
    }

    pub fn events(&self) -> Vec<UiEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Last contention/cleared event, i.e. what the banner shows now.
    pub fn banner(&self) -> Option<String> {
        self.events()
            .into_iter()
            .rev()
            .find_map(|e| match e {
                UiEvent::Contention(name) => Some(Some(name)),
                UiEvent::Cleared => Some(None),
                _ => None,
            })
            .flatten()
    }

    pub fn notices(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                UiEvent::Notice(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: UiEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
    }
}

impl EditorUi for RecordingUi {
    fn show_contention(&self, editor: &str, _since: Option<OffsetDateTime>) {
        self.push(UiEvent::Contention(editor.to_string()));
    }

    fn clear_contention(&self) {
        self.push(UiEvent::Cleared);
    }

    fn confirm_override(&self, editor: &str) -> bool {
        self.push(UiEvent::Confirm(editor.to_string()));
        self.approve.load(Ordering::SeqCst)
    }

    fn notify(&self, message: &str) {
        self.push(UiEvent::Notice(message.to_string()));
    }
}
