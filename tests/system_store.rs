#![allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
//! End-to-end apply against the real filesystem.
//!
//! Ownership commands are skipped by presenting the host as Windows, so the
//! tests run unprivileged on any platform.

use serde_json::json;
use splunk_conf::exec::SystemExecutor;
use splunk_conf::operations::{PendingRestarts, SystemConfStore};
use splunk_conf::platform::Os;
use splunk_conf::resources::conf::{ConfHost, ConfResource};
use splunk_conf::resources::{Applicable, ResourceChange};
use splunk_conf::state::RunState;
use splunk_conf::state::installation::{Package, StandardInstallDirs};

#[test]
fn writes_merged_file_and_skips_rewrite() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("splunk");
    let target = root
        .join("etc")
        .join("apps")
        .join("search")
        .join("local")
        .join("inputs.conf");
    std::fs::create_dir_all(target.parent().unwrap()).unwrap();
    std::fs::write(
        &target,
        "# hand edited\nhost = idx01\n\n[monitor:///var/log]\nindex = main\n",
    )
    .unwrap();

    let state = RunState::default();
    let restarts = PendingRestarts::new();
    let store = SystemConfStore::new(&SystemExecutor, Os::Windows);
    let host = ConfHost {
        reader: &store,
        writer: &store,
        ownership: &store,
        notifier: &restarts,
        registry: &state,
        defaults: &StandardInstallDirs,
        conf_override: None,
        os: Os::Windows,
    };
    let resource = ConfResource::new(host, "apps/search/inputs.conf")
        .package(Some(Package::Splunk))
        .install_dir(Some(root))
        .config(json!({
            "monitor:///var/log": {"disabled": false},
            "script://./bin/check.sh": {"interval": 60, "sourcetype": "check"}
        }));

    assert_eq!(resource.apply().unwrap(), ResourceChange::Applied);
    insta::assert_snapshot!(std::fs::read_to_string(&target).unwrap(), @r"
    # Managed by splunk-conf. Comments and formatting are not preserved.

    [default]
    host = idx01

    [monitor:///var/log]
    index = main
    disabled = false

    [script://./bin/check.sh]
    interval = 60
    sourcetype = check
    ");

    assert_eq!(resource.apply().unwrap(), ResourceChange::AlreadyCorrect);
    assert_eq!(restarts.services(), ["splunk"]);
}
