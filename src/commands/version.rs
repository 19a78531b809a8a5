//! Command: print version information.

/// Print the splunk-conf version to stdout.
#[allow(clippy::print_stdout)]
pub fn run() {
    let version = option_env!("SPLUNK_CONF_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
    println!("splunk-conf {version}");
}
