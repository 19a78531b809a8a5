#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for converging conf files through the public API.
//!
//! Each test parses a run state from TOML, wires an in-memory store into a
//! [`ConfHost`](splunk_conf::resources::conf::ConfHost), and drives
//! `ConfResource` the way the `apply` command does.

mod common;

use std::path::{Path, PathBuf};

use common::{FORWARDER_STATE, Fixture, SPLUNK_STATE};
use serde_json::json;
use splunk_conf::conf::Configuration;
use splunk_conf::resolve::Scope;
use splunk_conf::resources::{Applicable, Resource, ResourceChange, ResourceState};
use splunk_conf::state::installation::Package;

const SYSTEM_TEST: &str = "/opt/splunk/etc/system/local/test.conf";

// ---------------------------------------------------------------------------
// Merge and convergence
// ---------------------------------------------------------------------------

#[test]
fn merges_into_existing_file_and_converges() {
    let fx = Fixture::from_state(SPLUNK_STATE);
    fx.store.seed(
        SYSTEM_TEST,
        Configuration::new()
            .with("a", "foo", "bar")
            .with("b", "keep", "me"),
        "fauxhai",
    );
    let resource = fx
        .resource("system/test.conf")
        .config(json!({"a": {"one": 1}, "c": {"enabled": true}}));

    assert_eq!(resource.apply().unwrap(), ResourceChange::Applied);
    let written = fx.store.get(SYSTEM_TEST).unwrap();
    assert_eq!(
        written.config,
        Configuration::new()
            .with("a", "foo", "bar")
            .with("a", "one", "1")
            .with("b", "keep", "me")
            .with("c", "enabled", "true")
    );
    assert_eq!(written.owner, "fauxhai", "existing owner is kept");
    assert_eq!(fx.restarts(), ["splunk"]);

    assert_eq!(resource.apply().unwrap(), ResourceChange::AlreadyCorrect);
    assert_eq!(fx.store.writes(), 1);
    assert_eq!(fx.restarts().len(), 1, "no restart without a change");
    assert_eq!(resource.current_state().unwrap(), ResourceState::Correct);
}

#[test]
fn null_declarations_remove_entries() {
    let fx = Fixture::from_state(SPLUNK_STATE);
    fx.store.seed(
        SYSTEM_TEST,
        Configuration::new()
            .with("a", "foo", "bar")
            .with("a", "drop", "x")
            .with("b", "gone", "y"),
        "splunk",
    );

    fx.resource("system/test.conf")
        .config(json!({"a": {"drop": null}, "b": null}))
        .apply()
        .unwrap();

    assert_eq!(
        fx.store.get(SYSTEM_TEST).unwrap().config,
        Configuration::new().with("a", "foo", "bar")
    );
}

#[test]
fn removing_keys_from_absent_section_changes_nothing() {
    let fx = Fixture::from_state(SPLUNK_STATE);
    fx.store.seed(
        SYSTEM_TEST,
        Configuration::new().with("a", "foo", "bar"),
        "splunk",
    );

    let change = fx
        .resource("system/test.conf")
        .config(json!({"gone": {"k": null}}))
        .apply()
        .unwrap();

    assert_eq!(change, ResourceChange::AlreadyCorrect);
    assert_eq!(fx.store.writes(), 0);
    assert!(fx.restarts().is_empty());
    assert!(fx.store.get(SYSTEM_TEST).unwrap().config.section("gone").is_none());
}

#[test]
fn reset_replaces_existing_content() {
    let fx = Fixture::from_state(SPLUNK_STATE);
    fx.store.seed(
        SYSTEM_TEST,
        Configuration::new().with("old", "k", "v"),
        "splunk",
    );

    fx.resource("system/test.conf")
        .config(json!({"new": {"k": "v"}}))
        .reset(true)
        .apply()
        .unwrap();

    assert_eq!(
        fx.store.get(SYSTEM_TEST).unwrap().config,
        Configuration::new().with("new", "k", "v")
    );
}

#[test]
fn drift_in_ownership_is_repaired() {
    let fx = Fixture::from_state(SPLUNK_STATE);
    fx.store.seed(
        SYSTEM_TEST,
        Configuration::new().with("a", "foo", "bar"),
        "root",
    );
    let resource = fx
        .resource("system/test.conf")
        .user(Some("splunk".to_string()))
        .config(json!({"a": {"foo": "bar"}}));

    assert!(matches!(
        resource.current_state().unwrap(),
        ResourceState::Incorrect { .. }
    ));
    assert_eq!(resource.apply().unwrap(), ResourceChange::Applied);
    let written = fx.store.get(SYSTEM_TEST).unwrap();
    assert_eq!((written.owner.as_str(), written.group.as_str()), ("splunk", "splunk"));
}

// ---------------------------------------------------------------------------
// Resolution through the run state
// ---------------------------------------------------------------------------

#[test]
fn new_file_under_forwarder_installation() {
    let fx = Fixture::from_state(FORWARDER_STATE);
    let resource = fx
        .resource("apps/search/props.conf")
        .package(Some(Package::UniversalForwarder))
        .scope(Some(Scope::Default))
        .config(json!({"source::x": {"TZ": "UTC"}}));

    assert_eq!(resource.current_state().unwrap(), ResourceState::Missing);
    resource.apply().unwrap();

    let path = "/srv/splunkforwarder/etc/apps/search/default/props.conf";
    let written = fx.store.get(path).unwrap();
    assert_eq!(written.owner, "splunkforwarder");
    assert_eq!(written.group, "splunkforwarder");
    assert_eq!(fx.restarts(), ["universal_forwarder"]);
}

#[test]
fn install_dir_identifies_the_package() {
    let fx = Fixture::from_state(FORWARDER_STATE);
    let target = fx
        .resource("system/outputs.conf")
        .install_dir(Some(PathBuf::from("/srv/splunkforwarder")))
        .target()
        .unwrap();

    assert_eq!(target.package, Package::UniversalForwarder);
    assert_eq!(
        target.absolute_path,
        Path::new("/srv/splunkforwarder/etc/system/local/outputs.conf")
    );
}

#[test]
fn missing_package_is_reported() {
    let fx = Fixture::from_state(FORWARDER_STATE);
    let err = fx
        .resource("system/outputs.conf")
        .config(json!({"tcpout": {"defaultGroup": "idx"}}))
        .apply()
        .unwrap_err();

    assert_eq!(err.to_string(), "package is required");
    assert_eq!(fx.store.writes(), 0);
}

#[test]
fn unscoped_override_redirects_the_file() {
    let state = format!(
        "{SPLUNK_STATE}\n[conf_override]\nconf_path = \"apps/test_app/local\"\nscope = \"none\"\nuser = \"otherbody\"\n"
    );
    let fx = Fixture::from_state(&state);

    fx.resource("system/test.conf")
        .config(json!({"a": {"foo": "bar"}}))
        .apply()
        .unwrap();

    let written = fx
        .store
        .get("/opt/splunk/etc/apps/test_app/local/test.conf")
        .unwrap();
    assert_eq!(written.owner, "otherbody");
    assert_eq!(written.group, "splunk");
    assert!(fx.store.get(SYSTEM_TEST).is_none());
}

#[test]
fn missing_config_is_rejected_before_resolution() {
    let fx = Fixture::from_state("");
    let err = fx.resource("system/test.conf").apply().unwrap_err();
    assert_eq!(err.to_string(), "config is required");
}
