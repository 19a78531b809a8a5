//! Top-level subcommand orchestration.
pub mod apply;
pub mod remove;
pub mod resolve;
pub mod version;

use anyhow::Result;
use std::path::PathBuf;

use crate::cli::{GlobalOpts, TargetOpts};
use crate::exec::SystemExecutor;
use crate::logging::{Log, Logger, TaskStatus};
use crate::operations::{PendingRestarts, SystemConfStore};
use crate::platform::Os;
use crate::resources::ResourceChange;
use crate::resources::conf::{ConfHost, ConfResource};
use crate::state::RunState;
use crate::state::installation::StandardInstallDirs;

/// Environment variable consulted when `--state` is not given.
pub const STATE_ENV: &str = "SPLUNK_CONF_STATE";

/// Shared state produced by the common command setup sequence.
///
/// Holds the run-state snapshot and the production collaborators that every
/// conf resource in the run borrows.
#[derive(Debug)]
pub struct CommandSetup {
    /// Platform the files live on.
    pub os: Os,
    /// Installations and the run-wide override.
    pub state: RunState,
    /// Services that need a restart after this run.
    pub restarts: PendingRestarts,
    executor: SystemExecutor,
}

impl CommandSetup {
    /// Detect the platform and load the run state.
    ///
    /// # Errors
    ///
    /// Returns an error if the run state file exists but cannot be parsed.
    pub fn init(global: &GlobalOpts, log: &Logger) -> Result<Self> {
        let os = Os::detect();
        log.debug(&format!("platform: {os}"));

        let state = match state_path(global) {
            Some(path) => {
                log.debug(&format!("run state: {}", path.display()));
                RunState::load(&path)?
            }
            None => {
                log.debug("no run state given; using default install directories");
                RunState::default()
            }
        };
        log.debug(&format!(
            "{} installation(s) recorded",
            state.installations.len()
        ));

        Ok(Self {
            os,
            state,
            restarts: PendingRestarts::new(),
            executor: SystemExecutor,
        })
    }

    /// File store backed by the real filesystem.
    #[must_use]
    pub fn store(&self) -> SystemConfStore<'_> {
        SystemConfStore::new(&self.executor, self.os)
    }

    /// Collaborators for conf resources, reading and writing through `store`.
    #[must_use]
    pub fn host<'a>(&'a self, store: &'a SystemConfStore<'a>) -> ConfHost<'a> {
        ConfHost {
            reader: store,
            writer: store,
            ownership: store,
            notifier: &self.restarts,
            registry: &self.state,
            defaults: &StandardInstallDirs,
            conf_override: self.state.conf_override(),
            os: self.os,
        }
    }
}

/// Resolve the run state file from CLI arguments or the environment.
#[must_use]
pub fn state_path(global: &GlobalOpts) -> Option<PathBuf> {
    global
        .state
        .clone()
        .or_else(|| std::env::var_os(STATE_ENV).map(PathBuf::from))
}

/// Build the conf resource addressed by `target`.
#[must_use]
pub fn target_resource<'a>(host: ConfHost<'a>, target: &TargetOpts) -> ConfResource<'a> {
    ConfResource::new(host, target.path.clone())
        .package(target.package)
        .scope(target.scope)
        .install_dir(target.install_dir.clone())
}

/// Log and record the outcome of one resource operation.
pub fn report(
    log: &dyn Log,
    name: &str,
    outcome: &Result<ResourceChange>,
    changed_verb: &str,
    detail: &str,
) {
    match outcome {
        Ok(ResourceChange::Applied) => {
            log.info(&format!("{changed_verb} {detail}"));
            log.record_task(name, TaskStatus::Changed, Some(detail));
        }
        Ok(ResourceChange::AlreadyCorrect) => {
            log.debug(&format!("{detail} already up to date"));
            log.record_task(name, TaskStatus::Unchanged, None);
        }
        Err(e) => {
            log.error(&format!("{name}: {e:#}"));
            log.record_task(name, TaskStatus::Failed, Some(&format!("{e:#}")));
        }
    }
}

/// Print the summary, list pending restarts, and bail if anything failed.
///
/// Restarts are queued before a file is written, so they are only listed
/// when every resource succeeded.
///
/// # Errors
///
/// Returns an error if one or more resources recorded a failure.
pub fn finish(log: &Logger, restarts: &PendingRestarts) -> Result<()> {
    log.print_summary();

    let count = log.failure_count();
    if count > 0 {
        for service in restarts.services() {
            log.debug(&format!("restart of {service} withheld after failure"));
        }
        anyhow::bail!("{count} resource(s) failed");
    }

    for service in restarts.services() {
        log.warn(&format!("restart required: {service}"));
    }
    Ok(())
}
