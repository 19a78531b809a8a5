//! A managed Splunk `.conf` file.
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;

use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::conf::coerce::{Declared, coerce};
use crate::conf::merge::{filter, merge};
use crate::conf::{Configuration, ini};
use crate::error::ConfError;
use crate::operations::{ConfigFileReader, ConfigFileWriter, FileOwnershipReader, ServiceNotifier};
use crate::platform::Os;
use crate::resolve::Scope;
use crate::resolve::ownership::{self, Ownership, OwnershipRequest};
use crate::resolve::path::{self, ResolvedTarget, TargetRequest};
use crate::state::ConfOverride;
use crate::state::installation::{
    DefaultInstallDirTable, InstallationLookup, InstallationRecord, InstallationRegistry, Package,
};

/// Host collaborators and run-wide inputs shared by every conf resource in a
/// run.
#[derive(Clone, Copy)]
pub struct ConfHost<'a> {
    /// Reads existing conf files.
    pub reader: &'a dyn ConfigFileReader,
    /// Writes and deletes conf files.
    pub writer: &'a dyn ConfigFileWriter,
    /// Reports current file ownership.
    pub ownership: &'a dyn FileOwnershipReader,
    /// Receives restart requests.
    pub notifier: &'a dyn ServiceNotifier,
    /// Known installations.
    pub registry: &'a dyn InstallationRegistry,
    /// Default install roots.
    pub defaults: &'a dyn DefaultInstallDirTable,
    /// Run-wide override, if any.
    pub conf_override: Option<&'a ConfOverride>,
    /// Platform the files live on.
    pub os: Os,
}

impl fmt::Debug for ConfHost<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfHost")
            .field("reader", &"<dyn ConfigFileReader>")
            .field("writer", &"<dyn ConfigFileWriter>")
            .field("ownership", &"<dyn FileOwnershipReader>")
            .field("notifier", &"<dyn ServiceNotifier>")
            .field("registry", &"<dyn InstallationRegistry>")
            .field("defaults", &"<dyn DefaultInstallDirTable>")
            .field("conf_override", &self.conf_override)
            .field("os", &self.os)
            .finish()
    }
}

/// Everything an apply would do, computed without side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfPlan {
    /// Where the file lives.
    pub target: ResolvedTarget,
    /// Parsed file on disk; `None` when absent.
    pub existing: Option<Configuration>,
    /// Body that would be written.
    pub body: Configuration,
    /// Owner and group that would be set.
    pub ownership: Ownership,
    /// Owner of the existing file.
    pub current_owner: Option<String>,
    /// Group of the existing file.
    pub current_group: Option<String>,
}

impl ConfPlan {
    /// Whether the file on disk already has the planned body (including
    /// order) and ownership.
    #[must_use]
    pub fn is_converged(&self) -> bool {
        self.body_matches() && self.ownership_matches()
    }

    fn body_matches(&self) -> bool {
        self.existing
            .as_ref()
            .is_some_and(|existing| ini::render(existing) == ini::render(&self.body))
    }

    /// Ownership that cannot be read (Windows) is treated as matching.
    fn ownership_matches(&self) -> bool {
        self.current_owner
            .as_deref()
            .is_none_or(|o| o == self.ownership.owner.value)
            && self
                .current_group
                .as_deref()
                .is_none_or(|g| g == self.ownership.group.value)
    }

    /// One-line description of how the file differs from the plan.
    #[must_use]
    pub fn drift(&self) -> Option<String> {
        if self.existing.is_none() {
            return Some("absent".to_string());
        }
        let mut parts = Vec::new();
        if !self.body_matches() {
            parts.push("content differs".to_string());
        }
        if !self.ownership_matches() {
            parts.push(format!(
                "owned by {}:{}",
                self.current_owner.as_deref().unwrap_or("?"),
                self.current_group.as_deref().unwrap_or("?")
            ));
        }
        (!parts.is_empty()).then(|| parts.join(", "))
    }
}

/// A conf file under a Splunk installation, converged by [`Applicable::apply`]
/// or deleted by [`Applicable::remove`].
///
/// # Examples
///
/// ```ignore
/// let resource = ConfResource::new(host, "system/inputs.conf")
///     .package(Package::UniversalForwarder)
///     .config(declared);
/// resource.apply()?;
/// ```
#[derive(Debug, Clone)]
pub struct ConfResource<'a> {
    host: ConfHost<'a>,
    raw_path: String,
    package: Option<Package>,
    scope: Option<Scope>,
    install_dir: Option<PathBuf>,
    user: Option<String>,
    config: Option<Declared>,
    reset: bool,
}

impl<'a> ConfResource<'a> {
    /// Resource for `raw_path` (relative to `etc/`) with no other inputs.
    #[must_use]
    pub fn new(host: ConfHost<'a>, raw_path: impl Into<String>) -> Self {
        Self {
            host,
            raw_path: raw_path.into(),
            package: None,
            scope: None,
            install_dir: None,
            user: None,
            config: None,
            reset: false,
        }
    }

    /// Set the explicit package.
    #[must_use]
    pub const fn package(mut self, package: Option<Package>) -> Self {
        self.package = package;
        self
    }

    /// Set the explicit scope.
    #[must_use]
    pub const fn scope(mut self, scope: Option<Scope>) -> Self {
        self.scope = scope;
        self
    }

    /// Set the explicit install root.
    #[must_use]
    pub fn install_dir(mut self, install_dir: Option<PathBuf>) -> Self {
        self.install_dir = install_dir;
        self
    }

    /// Set the explicit owning user.
    #[must_use]
    pub fn user(mut self, user: Option<String>) -> Self {
        self.user = user;
        self
    }

    /// Set the declared configuration.
    #[must_use]
    pub fn config(mut self, config: impl Into<Declared>) -> Self {
        self.config = Some(config.into());
        self
    }

    /// Discard the on-disk content instead of merging with it.
    #[must_use]
    pub const fn reset(mut self, reset: bool) -> Self {
        self.reset = reset;
        self
    }

    fn request(&self) -> TargetRequest<'_> {
        TargetRequest {
            raw_path: &self.raw_path,
            package: self.package,
            scope: self.scope,
            install_dir: self.install_dir.as_deref(),
        }
    }

    fn installation(
        &self,
        package: Option<Package>,
        dir: Option<&Path>,
    ) -> Option<&'a InstallationRecord> {
        InstallationLookup::new(self.host.registry).lookup(package, dir)
    }

    /// Resolve where the file lives.
    ///
    /// # Errors
    ///
    /// Returns [`ConfError::UnresolvedPackage`] or [`ConfError::InvalidPath`].
    pub fn target(&self) -> Result<ResolvedTarget, ConfError> {
        let request = self.request();
        let installation = self.installation(request.package, request.install_dir);
        path::resolve(
            &request,
            self.host.conf_override,
            installation,
            self.host.defaults,
            self.host.os,
        )
    }

    /// Compute what [`Applicable::apply`] would write, without writing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfError::MissingConfiguration`] without a declared
    /// configuration, a resolution or coercion error, or any read failure
    /// other than the file being absent.
    pub fn plan(&self) -> Result<ConfPlan, ConfError> {
        let declared = self
            .config
            .as_ref()
            .ok_or(ConfError::MissingConfiguration)?;
        let target = self.target()?;
        let installation =
            self.installation(Some(target.package), Some(&target.install_root));

        let existing = match self.host.reader.read(&target.absolute_path) {
            Ok(config) => Some(config),
            Err(ConfError::NotFound { .. }) => None,
            Err(e) => return Err(e),
        };

        let declared = coerce(declared)?;
        let base = existing.clone().unwrap_or_default();
        let body = filter(merge(&base, &declared, self.reset));

        let current_owner = self.host.ownership.current_owner(&target.absolute_path)?;
        let current_group = self.host.ownership.current_group(&target.absolute_path)?;
        let conf_override = self.host.conf_override;
        let ownership = ownership::resolve(&OwnershipRequest {
            explicit_user: self.user.as_deref(),
            override_user: conf_override.and_then(|o| o.user.as_deref()),
            current_owner: current_owner.as_deref(),
            current_group: current_group.as_deref(),
            installation,
            package: target.package,
        });

        Ok(ConfPlan {
            target,
            existing,
            body,
            ownership,
            current_owner,
            current_group,
        })
    }
}

impl Applicable for ConfResource<'_> {
    fn description(&self) -> String {
        format!("conf {}", self.raw_path)
    }

    fn apply(&self) -> Result<ResourceChange> {
        let plan = self.plan()?;
        if plan.is_converged() {
            return Ok(ResourceChange::AlreadyCorrect);
        }
        self.host
            .notifier
            .notify_before_converge(plan.target.package.as_str());
        self.host.writer.write(
            &plan.target.absolute_path,
            &plan.body,
            &plan.ownership.owner.value,
            &plan.ownership.group.value,
        )?;
        Ok(ResourceChange::Applied)
    }

    fn remove(&self) -> Result<ResourceChange> {
        let target = self.target()?;
        if self.host.writer.delete(&target.absolute_path)? {
            Ok(ResourceChange::Applied)
        } else {
            Ok(ResourceChange::AlreadyCorrect)
        }
    }
}

impl Resource for ConfResource<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        let plan = self.plan()?;
        Ok(match plan.drift() {
            None => ResourceState::Correct,
            Some(_) if plan.existing.is_none() => ResourceState::Missing,
            Some(current) => ResourceState::Incorrect { current },
        })
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::operations::{MockFileOwnershipReader, MockServiceNotifier};
    use crate::resources::test_helpers::MemoryConfStore;
    use crate::state::RunState;
    use crate::state::installation::StandardInstallDirs;

    const LINUX_ROOT: &str = "/opt/splunk";

    fn record(package: Package, root: &str) -> InstallationRecord {
        InstallationRecord {
            name: package.to_string(),
            install_root: PathBuf::from(root),
            package,
            version: "6.3.4".to_string(),
            build: "cae2458f4aef".to_string(),
            is_64_bit: true,
        }
    }

    fn state_with_current(root: &str) -> RunState {
        let install = record(Package::Splunk, root);
        RunState {
            installations: vec![install.clone()],
            current_installation: Some(install),
            conf_override: None,
        }
    }

    fn declared() -> Declared {
        Declared::map([(
            Declared::from("a"),
            Declared::map([
                (Declared::from("foo"), Declared::from("bar")),
                (Declared::from("one"), Declared::from(1)),
            ]),
        )])
    }

    fn existing() -> Configuration {
        Configuration::new().with("a", "foo", "bar")
    }

    fn expected() -> Configuration {
        Configuration::new().with("a", "foo", "bar").with("a", "one", "1")
    }

    fn silent_notifier() -> MockServiceNotifier {
        let mut notifier = MockServiceNotifier::new();
        notifier.expect_notify_before_converge().return_const(());
        notifier
    }

    fn host<'a>(
        store: &'a MemoryConfStore,
        notifier: &'a dyn ServiceNotifier,
        state: &'a RunState,
    ) -> ConfHost<'a> {
        ConfHost {
            reader: store,
            writer: store,
            ownership: store,
            notifier,
            registry: state,
            defaults: &StandardInstallDirs,
            conf_override: state.conf_override(),
            os: Os::Linux,
        }
    }

    fn conf_path(root: &str, scope: &str) -> PathBuf {
        PathBuf::from(root).join(format!("etc/system/{scope}/test.conf"))
    }

    // ------------------------------------------------------------------
    // apply
    // ------------------------------------------------------------------

    #[test]
    fn apply_merges_with_existing_and_keeps_owner() {
        let path = conf_path(LINUX_ROOT, "local");
        let store = MemoryConfStore::new().with_file(&path, existing(), "fauxhai");
        let notifier = silent_notifier();
        let state = state_with_current(LINUX_ROOT);
        let resource = ConfResource::new(host(&store, &notifier, &state), "system/test.conf")
            .package(Some(Package::Splunk))
            .scope(Some(Scope::Local))
            .config(declared());

        assert_eq!(resource.apply().unwrap(), ResourceChange::Applied);

        let file = store.file(&path).unwrap();
        assert_eq!(file.config, expected());
        assert_eq!(file.owner, "fauxhai");
    }

    #[test]
    fn apply_with_all_parameters_uses_given_user_and_scope() {
        let path = conf_path(LINUX_ROOT, "default");
        let store = MemoryConfStore::new().with_file(&path, existing(), "fauxhai");
        let notifier = silent_notifier();
        let state = state_with_current(LINUX_ROOT);
        let resource = ConfResource::new(host(&store, &notifier, &state), "system/test.conf")
            .package(Some(Package::Splunk))
            .scope(Some(Scope::Default))
            .user(Some("splunk".to_string()))
            .config(declared());

        resource.apply().unwrap();
        let file = store.file(&path).unwrap();
        assert_eq!(file.owner, "splunk");
        assert_eq!(file.group, "splunk");
    }

    #[test]
    fn apply_reset_discards_disk_but_still_reads() {
        let path = conf_path(LINUX_ROOT, "local");
        let on_disk = existing().with("a", "extra", "x").with("z", "k", "v");
        let store = MemoryConfStore::new().with_file(&path, on_disk, "fauxhai");
        let notifier = silent_notifier();
        let state = state_with_current(LINUX_ROOT);
        let resource = ConfResource::new(host(&store, &notifier, &state), "system/test.conf")
            .package(Some(Package::Splunk))
            .config(declared())
            .reset(true);

        resource.apply().unwrap();
        assert_eq!(store.reads(), 1, "reset still reads the existing file");
        assert_eq!(store.file(&path).unwrap().config, expected());
    }

    #[test]
    fn apply_creates_missing_file_with_package_owner() {
        let path = conf_path(LINUX_ROOT, "local");
        let store = MemoryConfStore::new();
        let notifier = silent_notifier();
        let state = state_with_current(LINUX_ROOT);
        let resource = ConfResource::new(host(&store, &notifier, &state), "system/test.conf")
            .package(Some(Package::Splunk))
            .config(declared());

        assert_eq!(
            resource.current_state().unwrap(),
            ResourceState::Missing
        );
        resource.apply().unwrap();
        let file = store.file(&path).unwrap();
        assert_eq!(file.config, expected());
        assert_eq!(file.owner, "splunk");
    }

    #[test]
    fn apply_twice_is_a_no_op() {
        let path = conf_path(LINUX_ROOT, "local");
        let store = MemoryConfStore::new().with_file(&path, existing(), "fauxhai");
        let mut notifier = MockServiceNotifier::new();
        notifier
            .expect_notify_before_converge()
            .withf(|service| service == "splunk")
            .times(1)
            .return_const(());
        let state = state_with_current(LINUX_ROOT);
        let resource = ConfResource::new(host(&store, &notifier, &state), "system/test.conf")
            .package(Some(Package::Splunk))
            .config(declared());

        assert_eq!(resource.apply().unwrap(), ResourceChange::Applied);
        let first = store.file(&path).unwrap();
        assert_eq!(resource.apply().unwrap(), ResourceChange::AlreadyCorrect);
        assert_eq!(store.file(&path).unwrap(), first);
        assert_eq!(store.writes(), 1);
        assert!(!resource.needs_change().unwrap());
    }

    #[test]
    fn apply_is_stable_against_reparsed_file() {
        let path = conf_path(LINUX_ROOT, "local");
        let padded = Declared::map([(
            Declared::from("s"),
            Declared::map([
                (Declared::from("motd"), Declared::from("  padded  ")),
                (Declared::from("search"), Declared::from("index=main \n\n | stats count")),
            ]),
        )]);
        let on_disk = ini::parse_str(
            &ini::render(&coerce(&padded).unwrap()),
            Path::new("test.conf"),
        )
        .unwrap();
        let store = MemoryConfStore::new().with_file(&path, on_disk, "splunk");
        let notifier = silent_notifier();
        let state = state_with_current(LINUX_ROOT);
        let resource = ConfResource::new(host(&store, &notifier, &state), "system/test.conf")
            .package(Some(Package::Splunk))
            .config(padded);

        assert_eq!(resource.apply().unwrap(), ResourceChange::AlreadyCorrect);
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn apply_without_package_uses_current_installation() {
        let root = "/etc/splunk";
        let path = conf_path(root, "local");
        let store = MemoryConfStore::new().with_file(&path, existing(), "fauxhai");
        let notifier = silent_notifier();
        let state = state_with_current(root);
        let resource = ConfResource::new(host(&store, &notifier, &state), "system/test.conf")
            .scope(Some(Scope::Local))
            .config(declared());

        let target = resource.target().unwrap();
        assert_eq!(target.package, Package::Splunk);
        assert_eq!(target.install_root, PathBuf::from(root));
        resource.apply().unwrap();
        assert_eq!(store.file(&path).unwrap().config, expected());
    }

    #[test]
    fn apply_with_install_dir_infers_package_from_installation() {
        let root = "/etc/splunk";
        let store = MemoryConfStore::new();
        let notifier = silent_notifier();
        let install = record(Package::UniversalForwarder, root);
        let state = RunState {
            installations: vec![install],
            ..RunState::default()
        };
        let resource = ConfResource::new(host(&store, &notifier, &state), "system/test.conf")
            .install_dir(Some(PathBuf::from(root)))
            .config(declared());

        let target = resource.target().unwrap();
        assert_eq!(target.package, Package::UniversalForwarder);
        assert_eq!(target.absolute_path, conf_path(root, "local"));
    }

    #[test]
    fn apply_without_package_or_current_installation_fails() {
        let store = MemoryConfStore::new();
        let notifier = MockServiceNotifier::new();
        let state = RunState {
            installations: vec![record(Package::Splunk, LINUX_ROOT)],
            ..RunState::default()
        };
        let resource = ConfResource::new(host(&store, &notifier, &state), "system/test.conf")
            .scope(Some(Scope::Local))
            .config(declared());

        let err = resource.apply().unwrap_err();
        assert!(err.to_string().ends_with("package is required"), "{err}");
        assert_eq!(store.reads(), 0, "nothing read before failing");
    }

    #[test]
    fn apply_without_config_fails_even_with_reset() {
        let store = MemoryConfStore::new();
        let notifier = MockServiceNotifier::new();
        let state = state_with_current(LINUX_ROOT);
        for reset in [false, true] {
            let resource =
                ConfResource::new(host(&store, &notifier, &state), "system/test.conf")
                    .package(Some(Package::Splunk))
                    .reset(reset);
            let err = resource.apply().unwrap_err();
            assert!(
                matches!(
                    err.downcast_ref::<ConfError>(),
                    Some(ConfError::MissingConfiguration)
                ),
                "{err}"
            );
            assert!(err.to_string().ends_with("config is required"));
        }
        assert_eq!(store.reads(), 0);
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn apply_propagates_read_failures() {
        let path = conf_path(LINUX_ROOT, "local");
        let store = MemoryConfStore::new().with_unreadable(&path);
        let notifier = MockServiceNotifier::new();
        let state = state_with_current(LINUX_ROOT);
        let resource = ConfResource::new(host(&store, &notifier, &state), "system/test.conf")
            .package(Some(Package::Splunk))
            .config(declared());

        let err = resource.apply().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfError>(),
            Some(ConfError::Io { .. })
        ));
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn apply_rejects_list_values_before_writing() {
        let store = MemoryConfStore::new();
        let notifier = MockServiceNotifier::new();
        let state = state_with_current(LINUX_ROOT);
        let declared = Declared::map([(
            Declared::from("a"),
            Declared::map([(
                Declared::from("hosts"),
                Declared::List(vec![Declared::from("x")]),
            )]),
        )]);
        let resource = ConfResource::new(host(&store, &notifier, &state), "system/test.conf")
            .package(Some(Package::Splunk))
            .config(declared);

        assert!(resource.apply().is_err());
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn apply_with_unscoped_override_redirects_path_and_owner() {
        let store = MemoryConfStore::new();
        let notifier = silent_notifier();
        let mut state = state_with_current(LINUX_ROOT);
        state.conf_override = Some(ConfOverride {
            relative_conf_path: Some("apps/test_app/local".to_string()),
            scope: Some(Scope::Unscoped),
            user: Some("otherbody".to_string()),
        });
        let resource = ConfResource::new(host(&store, &notifier, &state), "system/test.conf")
            .package(Some(Package::Splunk))
            .user(Some("splunk".to_string()))
            .scope(Some(Scope::Local))
            .config(declared());

        resource.apply().unwrap();
        let path = PathBuf::from(LINUX_ROOT).join("etc/apps/test_app/local/test.conf");
        let file = store.file(&path).unwrap();
        assert_eq!(file.owner, "otherbody");
        assert_eq!(file.group, "splunk");
    }

    #[test]
    fn apply_rewrites_when_only_ownership_drifted() {
        let path = conf_path(LINUX_ROOT, "local");
        let store = MemoryConfStore::new().with_file(&path, expected(), "root");
        let notifier = silent_notifier();
        let state = state_with_current(LINUX_ROOT);
        let resource = ConfResource::new(host(&store, &notifier, &state), "system/test.conf")
            .package(Some(Package::Splunk))
            .user(Some("splunk".to_string()))
            .config(declared());

        assert_eq!(
            resource.current_state().unwrap(),
            ResourceState::Incorrect {
                current: "owned by root:root".to_string()
            }
        );
        assert_eq!(resource.apply().unwrap(), ResourceChange::Applied);
        assert_eq!(store.file(&path).unwrap().owner, "splunk");
    }

    #[test]
    fn plan_reads_ownership_through_collaborator() {
        let path = conf_path(LINUX_ROOT, "local");
        let store = MemoryConfStore::new().with_file(&path, existing(), "fauxhai");
        let mut owners = MockFileOwnershipReader::new();
        owners
            .expect_current_owner()
            .returning(|_| Ok(Some("administrator".to_string())));
        owners
            .expect_current_group()
            .returning(|_| Ok(Some(r"host\NONE".to_string())));
        let notifier = MockServiceNotifier::new();
        let state = state_with_current(LINUX_ROOT);
        let host = ConfHost {
            ownership: &owners,
            ..host(&store, &notifier, &state)
        };
        let plan = ConfResource::new(host, "system/test.conf")
            .package(Some(Package::Splunk))
            .config(declared())
            .plan()
            .unwrap();

        assert_eq!(plan.ownership.owner.value, "administrator");
        assert_eq!(plan.ownership.group.value, r"host\NONE");
        assert_eq!(plan.drift().as_deref(), Some("content differs"));
    }

    // ------------------------------------------------------------------
    // remove
    // ------------------------------------------------------------------

    #[test]
    fn remove_deletes_without_config() {
        let path = conf_path(LINUX_ROOT, "local");
        let store = MemoryConfStore::new().with_file(&path, existing(), "fauxhai");
        let notifier = MockServiceNotifier::new();
        let state = state_with_current(LINUX_ROOT);
        let resource = ConfResource::new(host(&store, &notifier, &state), "system/test.conf")
            .package(Some(Package::Splunk));

        assert_eq!(resource.remove().unwrap(), ResourceChange::Applied);
        assert!(store.file(&path).is_none());
        assert_eq!(resource.remove().unwrap(), ResourceChange::AlreadyCorrect);
        assert_eq!(store.reads(), 0, "remove never reads");
    }

    #[test]
    fn remove_without_package_fails() {
        let store = MemoryConfStore::new();
        let notifier = MockServiceNotifier::new();
        let state = RunState::default();
        let resource = ConfResource::new(host(&store, &notifier, &state), "system/test.conf");

        let err = resource.remove().unwrap_err();
        assert!(err.to_string().ends_with("package is required"));
    }

    #[test]
    fn description_names_raw_path() {
        let store = MemoryConfStore::new();
        let notifier = MockServiceNotifier::new();
        let state = RunState::default();
        let resource = ConfResource::new(host(&store, &notifier, &state), "apps/search/props.conf");
        assert_eq!(resource.description(), "conf apps/search/props.conf");
    }
}
