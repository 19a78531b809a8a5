//! Absolute conf file path resolution.
//!
//! A raw conf path such as `system/local/inputs.conf` or
//! `apps/search/props.conf` names a category, an optional scope directory,
//! and a file.  Resolution places it under `<install root>/etc/`:
//!
//! | decision     | sources, highest precedence first                          |
//! |--------------|------------------------------------------------------------|
//! | package      | explicit, installation record                              |
//! | scope        | explicit, embedded in path, override, `local`              |
//! | install root | explicit directory, installation record, platform default |
//! | subpath      | override (scope `none`), override directory, category      |
use std::fmt;
use std::path::{Path, PathBuf};

use super::Scope;
use super::precedence::Precedence;
use crate::error::ConfError;
use crate::platform::Os;
use crate::state::ConfOverride;
use crate::state::installation::{DefaultInstallDirTable, InstallationRecord, Package};

/// Caller-supplied inputs for locating one conf file.
#[derive(Debug, Clone, Copy, Default)]
pub struct TargetRequest<'a> {
    /// Relative conf path, e.g. `system/test.conf`.
    pub raw_path: &'a str,
    /// Explicit package identity.
    pub package: Option<Package>,
    /// Explicit scope.
    pub scope: Option<Scope>,
    /// Explicit install root.
    pub install_dir: Option<&'a Path>,
}

/// Everything resolution decided about a conf file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// Install root the file lives under.
    pub install_root: PathBuf,
    /// Which source supplied the install root.
    pub root_source: &'static str,
    /// Effective scope.
    pub scope: Scope,
    /// Established package identity.
    pub package: Package,
    /// Category directory relative to `etc/`, e.g. `apps/search`.
    pub category: String,
    /// Bare file name.
    pub file_name: String,
    /// Normalized absolute path under `<install_root>/etc/`.
    pub absolute_path: PathBuf,
}

impl fmt::Display for ResolvedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (package {}, scope {}, root from {})",
            self.absolute_path.display(),
            self.package,
            self.scope,
            self.root_source
        )
    }
}

/// A raw conf path split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RawConfPath<'a> {
    category: Vec<&'a str>,
    embedded_scope: Option<Scope>,
    file_name: &'a str,
}

/// Resolve a conf file location.
///
/// `installation` is the record found by
/// [`InstallationLookup`](crate::state::installation::InstallationLookup) for
/// the request's package and directory; `defaults` supplies the root when
/// neither the caller nor an installation does.
///
/// # Examples
///
/// ```
/// use splunk_conf::platform::Os;
/// use splunk_conf::resolve::Scope;
/// use splunk_conf::resolve::path::{TargetRequest, resolve};
/// use splunk_conf::state::installation::{Package, StandardInstallDirs};
/// use std::path::Path;
///
/// let request = TargetRequest {
///     raw_path: "system/test.conf",
///     package: Some(Package::Splunk),
///     ..TargetRequest::default()
/// };
/// let target = resolve(&request, None, None, &StandardInstallDirs, Os::Linux).unwrap();
/// assert_eq!(target.scope, Scope::Local);
/// assert_eq!(target.absolute_path, Path::new("/opt/splunk/etc/system/local/test.conf"));
/// ```
///
/// # Errors
///
/// - [`ConfError::InvalidPath`] if the raw path (or the override directory)
///   is absolute, contains `..`, or lacks a category or file name, or if
///   the explicit install directory is relative.
/// - [`ConfError::UnresolvedPackage`] if neither the request nor the
///   installation establishes a package.
pub fn resolve(
    request: &TargetRequest<'_>,
    conf_override: Option<&ConfOverride>,
    installation: Option<&InstallationRecord>,
    defaults: &dyn DefaultInstallDirTable,
    os: Os,
) -> Result<ResolvedTarget, ConfError> {
    let raw = parse_raw_path(request.raw_path)?;

    let package = Precedence::new()
        .then("package", request.package)
        .then("installation", installation.map(|i| i.package))
        .resolve()
        .ok_or(ConfError::UnresolvedPackage)?
        .value;

    if let Some(dir) = request.install_dir
        && !(dir.has_root() || dir.is_absolute())
    {
        return Err(invalid(
            &dir.display().to_string(),
            "install directory must be absolute",
        ));
    }

    let override_scope = conf_override.and_then(|o| o.scope);
    let mut scope = Precedence::new()
        .then("scope", request.scope)
        .then("path", raw.embedded_scope)
        .then("override", override_scope)
        .or("fallback", Scope::Local)
        .value;

    let root = Precedence::new()
        .then("install_dir", request.install_dir.map(Path::to_path_buf))
        .then("installation", installation.map(|i| i.install_root.clone()))
        .or("default", defaults.get(package, os));

    let override_dir = conf_override
        .and_then(|o| o.relative_conf_path.as_deref())
        .map(relative_segments)
        .transpose()?;

    let mut absolute_path = root.value.join("etc");
    absolute_path.extend(override_dir.as_deref().unwrap_or(raw.category.as_slice()));
    if override_scope == Some(Scope::Unscoped) {
        scope = Scope::Unscoped;
    }
    if let Some(segment) = scope.segment() {
        absolute_path.push(segment);
    }
    absolute_path.push(raw.file_name);

    Ok(ResolvedTarget {
        install_root: root.value,
        root_source: root.source,
        scope,
        package,
        category: raw.category.join("/"),
        file_name: raw.file_name.to_string(),
        absolute_path,
    })
}

/// Split a raw conf path into category, embedded scope, and file name.
fn parse_raw_path(raw: &str) -> Result<RawConfPath<'_>, ConfError> {
    let segments = relative_segments(raw)?;
    let Some((&file_name, rest)) = segments.split_last() else {
        return Err(invalid(raw, "path is empty"));
    };

    let (category, embedded_scope) = match rest.split_last() {
        Some((last, leading)) => match Scope::from_segment(last) {
            Some(scope) => (leading.to_vec(), Some(scope)),
            None => (rest.to_vec(), None),
        },
        None => (Vec::new(), None),
    };

    if category.is_empty() {
        return Err(invalid(raw, "missing category (e.g. system/ or apps/<app>/)"));
    }

    Ok(RawConfPath {
        category,
        embedded_scope,
        file_name,
    })
}

/// Non-empty segments of a relative path, rejecting absolute paths and `..`.
fn relative_segments(path: &str) -> Result<Vec<&str>, ConfError> {
    if path.starts_with(['/', '\\']) || path.get(1..2) == Some(":") {
        return Err(invalid(path, "must be relative to etc/"));
    }
    let segments: Vec<&str> = path
        .split(['/', '\\'])
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();
    if segments.contains(&"..") {
        return Err(invalid(path, "must not contain '..'"));
    }
    Ok(segments)
}

fn invalid(path: &str, reason: &str) -> ConfError {
    ConfError::InvalidPath {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}
