// Shared helpers for integration tests.
//
// Provides an in-memory conf store, a recording notifier, and a fixture that
// wires them into a `ConfHost` next to a run state parsed from TOML, so each
// integration test can drive `ConfResource` without touching real files.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use splunk_conf::conf::Configuration;
use splunk_conf::error::ConfError;
use splunk_conf::operations::{
    ConfigFileReader, ConfigFileWriter, FileOwnershipReader, ServiceNotifier,
};
use splunk_conf::platform::Os;
use splunk_conf::resources::conf::{ConfHost, ConfResource};
use splunk_conf::state::RunState;
use splunk_conf::state::installation::StandardInstallDirs;

/// A file held by [`MemoryStore`]: body plus owner and group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub config: Configuration,
    pub owner: String,
    pub group: String,
}

/// In-memory replacement for the filesystem-backed conf store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: RefCell<HashMap<PathBuf, Entry>>,
    writes: RefCell<usize>,
}

impl MemoryStore {
    /// Seed `path` with `config`, owned by `owner:owner`.
    pub fn seed(&self, path: impl Into<PathBuf>, config: Configuration, owner: &str) {
        self.files.borrow_mut().insert(
            path.into(),
            Entry {
                config,
                owner: owner.to_string(),
                group: owner.to_string(),
            },
        );
    }

    /// Current content of `path`.
    pub fn get(&self, path: impl AsRef<Path>) -> Option<Entry> {
        self.files.borrow().get(path.as_ref()).cloned()
    }

    /// Number of writes so far.
    pub fn writes(&self) -> usize {
        *self.writes.borrow()
    }
}

impl ConfigFileReader for MemoryStore {
    fn read(&self, path: &Path) -> Result<Configuration, ConfError> {
        self.files
            .borrow()
            .get(path)
            .map(|e| e.config.clone())
            .ok_or_else(|| ConfError::NotFound {
                path: path.to_path_buf(),
            })
    }
}

impl ConfigFileWriter for MemoryStore {
    fn write(
        &self,
        path: &Path,
        config: &Configuration,
        owner: &str,
        group: &str,
    ) -> Result<(), ConfError> {
        *self.writes.borrow_mut() += 1;
        self.files.borrow_mut().insert(
            path.to_path_buf(),
            Entry {
                config: config.clone(),
                owner: owner.to_string(),
                group: group.to_string(),
            },
        );
        Ok(())
    }

    fn delete(&self, path: &Path) -> Result<bool, ConfError> {
        Ok(self.files.borrow_mut().remove(path).is_some())
    }
}

impl FileOwnershipReader for MemoryStore {
    fn current_owner(&self, path: &Path) -> Result<Option<String>, ConfError> {
        Ok(self.get(path).map(|e| e.owner))
    }

    fn current_group(&self, path: &Path) -> Result<Option<String>, ConfError> {
        Ok(self.get(path).map(|e| e.group))
    }
}

/// Notifier that records every restart request.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub requests: RefCell<Vec<String>>,
}

impl ServiceNotifier for RecordingNotifier {
    fn notify_before_converge(&self, service: &str) {
        self.requests.borrow_mut().push(service.to_string());
    }
}

/// Run state, store, and notifier for one test.
#[derive(Debug)]
pub struct Fixture {
    pub state: RunState,
    pub store: MemoryStore,
    pub notifier: RecordingNotifier,
}

impl Fixture {
    /// Build a fixture from a run-state TOML document.
    pub fn from_state(toml: &str) -> Self {
        Self {
            state: toml::from_str(toml).expect("parse run state"),
            store: MemoryStore::default(),
            notifier: RecordingNotifier::default(),
        }
    }

    /// Collaborators for a Linux host.
    pub fn host(&self) -> ConfHost<'_> {
        ConfHost {
            reader: &self.store,
            writer: &self.store,
            ownership: &self.store,
            notifier: &self.notifier,
            registry: &self.state,
            defaults: &StandardInstallDirs,
            conf_override: self.state.conf_override(),
            os: Os::Linux,
        }
    }

    /// A conf resource for `raw_path` on this fixture.
    pub fn resource(&self, raw_path: &str) -> ConfResource<'_> {
        ConfResource::new(self.host(), raw_path)
    }

    /// Restart requests made so far.
    pub fn restarts(&self) -> Vec<String> {
        self.notifier.requests.borrow().clone()
    }
}

/// Run state with a current Splunk Enterprise installation at `/opt/splunk`.
pub const SPLUNK_STATE: &str = r#"
[current_installation]
name = "splunk"
path = "/opt/splunk"
package = "splunk"
version = "6.3.4"
build = "cae2458f4aef"
x64 = true

[[installations]]
name = "splunk"
path = "/opt/splunk"
package = "splunk"
version = "6.3.4"
build = "cae2458f4aef"
x64 = true
"#;

/// Run state with a Universal Forwarder at a custom root and no current
/// installation.
pub const FORWARDER_STATE: &str = r#"
[[installations]]
name = "splunkforwarder"
path = "/srv/splunkforwarder"
package = "universal_forwarder"
version = "9.1.2"
build = "b6b9c8185839"
"#;
