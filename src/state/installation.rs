//! Installed package facts and the read-only lookup over them.
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfError;
use crate::platform::Os;

/// Installable package flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Package {
    /// Full Splunk Enterprise (the primary agent).
    Splunk,
    /// Splunk Universal Forwarder.
    UniversalForwarder,
}

impl Package {
    /// Snake-case identifier, also the conventional service account name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Splunk => "splunk",
            Self::UniversalForwarder => "universal_forwarder",
        }
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Package {
    type Err = ConfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "splunk" => Ok(Self::Splunk),
            "universal_forwarder" => Ok(Self::UniversalForwarder),
            _ => Err(ConfError::UnknownPackage(s.to_string())),
        }
    }
}

/// Facts about one installed package instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallationRecord {
    /// Installation name (by convention the package name).
    pub name: String,
    /// Absolute install root (`$SPLUNK_HOME`).
    #[serde(rename = "path")]
    pub install_root: PathBuf,
    /// Which package is installed there.
    pub package: Package,
    /// Version string, e.g. `6.3.4`.
    pub version: String,
    /// Build identifier, e.g. `cae2458f4aef`.
    pub build: String,
    /// Whether the 64-bit build is installed.
    #[serde(rename = "x64", default)]
    pub is_64_bit: bool,
}

/// Source of installation records, owned by whatever discovers installations.
pub trait InstallationRegistry {
    /// All known installations.
    fn installations(&self) -> Vec<&InstallationRecord>;

    /// The installation selected for the current run, if any.
    fn current(&self) -> Option<&InstallationRecord>;
}

/// Read-only query facade over an [`InstallationRegistry`].
///
/// Query rules:
/// - directory given: the record installed at that directory, if its package
///   agrees with the package filter;
/// - only a package given: the current installation when it is of that
///   package, otherwise the first installation of that package;
/// - neither: the current installation.
pub struct InstallationLookup<'a> {
    registry: &'a dyn InstallationRegistry,
}

impl fmt::Debug for InstallationLookup<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstallationLookup")
            .field("registry", &"<dyn InstallationRegistry>")
            .finish()
    }
}

impl<'a> InstallationLookup<'a> {
    /// Wrap a registry.
    #[must_use]
    pub const fn new(registry: &'a dyn InstallationRegistry) -> Self {
        Self { registry }
    }

    /// Find the installation matching `package` and/or `install_dir`.
    #[must_use]
    pub fn lookup(
        &self,
        package: Option<Package>,
        install_dir: Option<&Path>,
    ) -> Option<&'a InstallationRecord> {
        let matches_package =
            |record: &InstallationRecord| package.is_none_or(|p| record.package == p);

        if let Some(dir) = install_dir {
            return self
                .registry
                .installations()
                .into_iter()
                .find(|r| same_dir(&r.install_root, dir) && matches_package(r));
        }

        match package {
            None => self.registry.current(),
            Some(_) => self
                .registry
                .current()
                .filter(|r| matches_package(r))
                .or_else(|| {
                    self.registry
                        .installations()
                        .into_iter()
                        .find(|r| matches_package(r))
                }),
        }
    }
}

/// Compare directories ignoring trailing separators and `.` segments.
fn same_dir(a: &Path, b: &Path) -> bool {
    a.components().eq(b.components())
}

/// Platform- and package-specific default install roots.
pub trait DefaultInstallDirTable {
    /// Default root for `package` on `os`.
    fn get(&self, package: Package, os: Os) -> PathBuf;
}

/// The vendor's standard install locations.
///
/// # Examples
///
/// ```
/// use splunk_conf::platform::Os;
/// use splunk_conf::state::installation::{DefaultInstallDirTable, Package, StandardInstallDirs};
/// use std::path::PathBuf;
///
/// let dirs = StandardInstallDirs;
/// assert_eq!(dirs.get(Package::Splunk, Os::Linux), PathBuf::from("/opt/splunk"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardInstallDirs;

impl DefaultInstallDirTable for StandardInstallDirs {
    fn get(&self, package: Package, os: Os) -> PathBuf {
        let dir = match (package, os) {
            (Package::Splunk, Os::Linux) => "/opt/splunk",
            (Package::Splunk, Os::Windows) => r"C:\Program Files\Splunk",
            (Package::UniversalForwarder, Os::Linux) => "/opt/splunkforwarder",
            (Package::UniversalForwarder, Os::Windows) => {
                r"C:\Program Files\SplunkUniversalForwarder"
            }
        };
        PathBuf::from(dir)
    }
}
