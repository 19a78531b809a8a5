//! Shared run state: known installations and the optional path override.
//!
//! The state file is produced by whatever installs and discovers Splunk
//! packages on the host.  This crate only reads it:
//!
//! ```toml
//! [current_installation]
//! name = "splunk"
//! path = "/opt/splunk"
//! package = "splunk"
//! version = "6.3.4"
//! build = "cae2458f4aef"
//! x64 = true
//!
//! [[installations]]
//! name = "splunk"
//! path = "/opt/splunk"
//! package = "splunk"
//! version = "6.3.4"
//! build = "cae2458f4aef"
//! x64 = true
//!
//! [conf_override]
//! conf_path = "apps/test_app/local"
//! scope = "none"
//! user = "otherbody"
//! ```
pub mod installation;

use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::config::toml_loader::load_config;
use crate::resolve::Scope;
use installation::{InstallationRecord, InstallationRegistry};

/// Run-wide redirection of where a conf file lives and who owns it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfOverride {
    /// Directory, relative to `etc/`, used instead of the category.
    #[serde(rename = "conf_path")]
    pub relative_conf_path: Option<String>,
    /// Scope to apply; `none` drops the scope segment entirely.
    pub scope: Option<Scope>,
    /// Owner to set on written files.
    pub user: Option<String>,
}

/// Immutable snapshot of the shared run state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunState {
    /// Every known installation.
    pub installations: Vec<InstallationRecord>,
    /// The installation selected for this run.
    pub current_installation: Option<InstallationRecord>,
    /// Optional conf path override.
    pub conf_override: Option<ConfOverride>,
}

impl RunState {
    /// Load the run state from a TOML file; a missing file yields an empty state.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        load_config(path)
    }

    /// The override in effect for this run, if any.
    #[must_use]
    pub const fn conf_override(&self) -> Option<&ConfOverride> {
        self.conf_override.as_ref()
    }
}

impl InstallationRegistry for RunState {
    fn installations(&self) -> Vec<&InstallationRecord> {
        self.installations.iter().collect()
    }

    fn current(&self) -> Option<&InstallationRecord> {
        self.current_installation.as_ref()
    }
}
