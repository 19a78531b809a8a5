//! Host collaborator abstractions for dependency injection.
//!
//! [`ConfResource`](crate::resources::conf::ConfResource) only talks to the
//! host through these traits so that resolution and merge logic can be
//! unit-tested without touching the real filesystem.  Production code uses
//! [`SystemConfStore`] and [`PendingRestarts`]; tests use the in-memory store
//! in `resources::test_helpers` and the mockall-generated mocks.

use std::cell::RefCell;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::conf::Configuration;
use crate::conf::ini;
use crate::error::ConfError;
use crate::exec::Executor;
use crate::platform::Os;
use crate::resources::helpers::fs::{ensure_parent_dir, remove_existing, replace_file};

/// Reads a `.conf` file.
pub trait ConfigFileReader {
    /// Parse the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfError::NotFound`] if the file does not exist, or a parse
    /// or I/O error otherwise.
    fn read(&self, path: &Path) -> Result<Configuration, ConfError>;
}

/// Persists or deletes a `.conf` file.
pub trait ConfigFileWriter {
    /// Write `config` to `path`, creating parent directories, and set its
    /// ownership.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or its ownership set.
    fn write(
        &self,
        path: &Path,
        config: &Configuration,
        owner: &str,
        group: &str,
    ) -> Result<(), ConfError>;

    /// Delete the file at `path`; returns `false` if it was already absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    fn delete(&self, path: &Path) -> Result<bool, ConfError>;
}

/// Reports the current ownership of a file.
#[cfg_attr(test, mockall::automock)]
pub trait FileOwnershipReader {
    /// Owner of `path`; `None` when the file is absent or ownership is not
    /// tracked on this platform.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but its owner cannot be read.
    fn current_owner(&self, path: &Path) -> Result<Option<String>, ConfError>;

    /// Group of `path`; `None` when the file is absent or ownership is not
    /// tracked on this platform.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but its group cannot be read.
    fn current_group(&self, path: &Path) -> Result<Option<String>, ConfError>;
}

/// Tells the service that owns a conf file to pick up changes.
#[cfg_attr(test, mockall::automock)]
pub trait ServiceNotifier {
    /// Request a restart of `service` that happens before the run converges.
    fn notify_before_converge(&self, service: &str);
}

/// Production store that reads and writes real files.
///
/// Writes go to a sibling temporary file that gets its ownership first and is
/// then renamed over the target, so a reader never sees a half-written or
/// wrongly owned conf file.  Ownership is read with
/// `stat` and set with `chown` on Linux; Windows does not track it.
#[derive(Debug)]
pub struct SystemConfStore<'a> {
    executor: &'a dyn Executor,
    os: Os,
}

impl<'a> SystemConfStore<'a> {
    /// Create a store that runs ownership commands through `executor`.
    #[must_use]
    pub const fn new(executor: &'a dyn Executor, os: Os) -> Self {
        Self { executor, os }
    }

    fn stat(&self, path: &Path, format: &str) -> Result<Option<String>, ConfError> {
        if self.os.is_windows() || !path.exists() {
            return Ok(None);
        }
        let display = path.to_string_lossy();
        let result = self
            .executor
            .run("stat", &["-c", format, &*display])
            .map_err(|e| ConfError::Ownership {
                path: path.to_path_buf(),
                reason: format!("{e:#}"),
            })?;
        Ok(Some(result.stdout.trim().to_string()))
    }

    /// Set ownership of `file`; failures are reported against `target`.
    fn chown(&self, file: &Path, target: &Path, owner: &str, group: &str) -> Result<(), ConfError> {
        if self.os.is_windows() {
            return Ok(());
        }
        let spec = format!("{owner}:{group}");
        let display = file.to_string_lossy();
        self.executor
            .run("chown", &[spec.as_str(), &*display])
            .map(|_| ())
            .map_err(|e| ConfError::Ownership {
                path: target.to_path_buf(),
                reason: format!("{e:#}"),
            })
    }
}

impl ConfigFileReader for SystemConfStore<'_> {
    fn read(&self, path: &Path) -> Result<Configuration, ConfError> {
        match std::fs::read_to_string(path) {
            Ok(content) => ini::parse_str(&content, path),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(ConfError::NotFound {
                path: path.to_path_buf(),
            }),
            Err(e) => Err(ConfError::io(path, e)),
        }
    }
}

impl ConfigFileWriter for SystemConfStore<'_> {
    fn write(
        &self,
        path: &Path,
        config: &Configuration,
        owner: &str,
        group: &str,
    ) -> Result<(), ConfError> {
        ensure_parent_dir(path).map_err(|e| ConfError::io(path, e))?;

        let tmp = temp_sibling(path);
        std::fs::write(&tmp, ini::render(config)).map_err(|e| ConfError::io(&tmp, e))?;
        if let Err(e) = self.chown(&tmp, path, owner, group) {
            let _ = remove_existing(&tmp);
            return Err(e);
        }
        replace_file(&tmp, path).map_err(|e| ConfError::io(path, e))
    }

    fn delete(&self, path: &Path) -> Result<bool, ConfError> {
        remove_existing(path).map_err(|e| ConfError::io(path, e))
    }
}

impl FileOwnershipReader for SystemConfStore<'_> {
    fn current_owner(&self, path: &Path) -> Result<Option<String>, ConfError> {
        self.stat(path, "%U")
    }

    fn current_group(&self, path: &Path) -> Result<Option<String>, ConfError> {
        self.stat(path, "%G")
    }
}

/// `.<name>.tmp` next to `path`.
fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map_or_else(|| "conf".into(), |n| n.to_string_lossy());
    path.with_file_name(format!(".{name}.tmp"))
}

/// Notifier that queues restart requests for the run summary.
///
/// Restarting Splunk is the host's job; this records which services need it
/// (each at most once, in request order).
#[derive(Debug, Default)]
pub struct PendingRestarts {
    services: RefCell<Vec<String>>,
}

impl PendingRestarts {
    /// Empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Services that were notified, in order.
    #[must_use]
    pub fn services(&self) -> Vec<String> {
        self.services.borrow().clone()
    }
}

impl ServiceNotifier for PendingRestarts {
    fn notify_before_converge(&self, service: &str) {
        let mut services = self.services.borrow_mut();
        if !services.iter().any(|s| s == service) {
            services.push(service.to_string());
        }
    }
}
