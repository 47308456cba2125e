//! Context passed to long-running operations
//!
//! Operations report progress and ask for confirmation through callbacks, so
//! the same code drives the terminal front-end and the tests.

use std::sync::Arc;

/// Severity of a user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Info,
    Success,
    Warning,
    Failure,
}

#[derive(Clone)]
pub struct TaskContext {
    pub notice_callback: Arc<dyn Fn(Notice, String) + Send + Sync>,
    /// `(step, total, message)`, steps start at 1
    pub progress_callback: Arc<dyn Fn(usize, usize, String) + Send + Sync>,
    /// `(question, default answer) -> answer`
    pub confirm_callback: Arc<dyn Fn(&str, bool) -> bool + Send + Sync>,
    pub assume_yes: bool,
}

impl TaskContext {
    pub fn new(
        notice: impl Fn(Notice, String) + Send + Sync + 'static,
        progress: impl Fn(usize, usize, String) + Send + Sync + 'static,
        confirm: impl Fn(&str, bool) -> bool + Send + Sync + 'static,
        assume_yes: bool,
    ) -> Self {
        Self {
            notice_callback: Arc::new(notice),
            progress_callback: Arc::new(progress),
            confirm_callback: Arc::new(confirm),
            assume_yes,
        }
    }

    /// Context that prints nothing and answers every question with `answer`
    pub fn silent(answer: bool) -> Self {
        Self::new(|_, _| {}, |_, _, _| {}, move |_, _| answer, false)
    }

    /// Like [`TaskContext::silent`], but records every notice and progress line
    #[cfg(test)]
    pub fn recording(answer: bool) -> (Self, Arc<parking_lot::Mutex<Vec<String>>>) {
        use parking_lot::Mutex;

        let lines = Arc::new(Mutex::new(Vec::new()));
        let notices = lines.clone();
        let steps = lines.clone();
        let ctx = Self::new(
            move |kind, msg| notices.lock().push(format!("{:?}: {}", kind, msg)),
            move |step, total, msg| steps.lock().push(format!("[{}/{}] {}", step, total, msg)),
            move |_, _| answer,
            false,
        );
        (ctx, lines)
    }

    pub fn notify(&self, kind: Notice, msg: impl Into<String>) {
        (self.notice_callback)(kind, msg.into());
    }

    pub fn info(&self, msg: impl Into<String>) {
        self.notify(Notice::Info, msg);
    }

    pub fn success(&self, msg: impl Into<String>) {
        self.notify(Notice::Success, msg);
    }

    pub fn warning(&self, msg: impl Into<String>) {
        self.notify(Notice::Warning, msg);
    }

    pub fn failure(&self, msg: impl Into<String>) {
        self.notify(Notice::Failure, msg);
    }

    pub fn progress(&self, step: usize, total: usize, msg: impl Into<String>) {
        (self.progress_callback)(step, total, msg.into());
    }

    /// Ask the user; always `true` when `assume_yes` is set
    pub fn confirm(&self, question: &str, default: bool) -> bool {
        self.assume_yes || (self.confirm_callback)(question, default)
    }
}
