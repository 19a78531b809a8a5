//! Core logging types: resource entries, status, and the [`Log`] trait.

/// Per-resource result for summary reporting.
#[derive(Debug, Clone)]
pub struct TaskEntry {
    /// Resource description, e.g. `conf system/inputs.conf`.
    pub name: String,
    /// Final status of the resource.
    pub status: TaskStatus,
    /// Optional detail message (e.g., resolved path or error description).
    pub message: Option<String>,
}

/// Outcome of converging one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// The file was written or deleted.
    Changed,
    /// The file already matched; nothing was done.
    Unchanged,
    /// Dry run; the change was only reported.
    DryRun,
    /// The resource failed.
    Failed,
}

/// Abstraction over logging backends.
///
/// Command code logs through this trait so tests can run commands against an
/// isolated [`Logger`](crate::logging::Logger).
pub trait Log {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
    /// Record a resource result for the summary.
    fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>);
}
