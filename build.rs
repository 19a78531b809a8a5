//! Build script: embeds version metadata.

use std::process::Command;

fn main() {
    // SPLUNK_CONF_VERSION from the environment wins (release builds);
    // otherwise describe the working tree.
    if let Ok(version) = std::env::var("SPLUNK_CONF_VERSION") {
        println!("cargo:rustc-env=SPLUNK_CONF_VERSION={version}");
    } else if let Ok(output) = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        && output.status.success()
    {
        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        println!("cargo:rustc-env=SPLUNK_CONF_VERSION={version}");
    }

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");
    println!("cargo:rerun-if-env-changed=SPLUNK_CONF_VERSION");
}
