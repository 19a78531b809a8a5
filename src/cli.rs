//! Command-line interface definition.
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::resolve::Scope;
use crate::state::installation::Package;

/// Top-level CLI entry point for the Splunk conf file manager.
#[derive(Parser, Debug)]
#[command(
    name = "splunk-conf",
    about = "Idempotent management of Splunk configuration files",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared across all subcommands.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Run state file describing installations (falls back to `SPLUNK_CONF_STATE`)
    #[arg(long, global = true)]
    pub state: Option<PathBuf>,

    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a conf file so it contains the declared settings
    Apply(ApplyOpts),
    /// Delete a conf file
    Remove(TargetOpts),
    /// Show where a conf file resolves to
    Resolve(TargetOpts),
    /// Print version information
    Version,
}

impl Command {
    /// Name used for the log file of this run.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Apply(_) => "apply",
            Self::Remove(_) => "remove",
            Self::Resolve(_) => "resolve",
            Self::Version => "version",
        }
    }
}

/// Which conf file to act on.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetOpts {
    /// Conf path relative to `etc/`, e.g. `system/inputs.conf` or `apps/search/local/props.conf`
    pub path: String,

    /// Package that owns the file (splunk, universal_forwarder)
    #[arg(long)]
    pub package: Option<Package>,

    /// Scope directory (default, local, none)
    #[arg(long)]
    pub scope: Option<Scope>,

    /// Installation root to use instead of the recorded or default one
    #[arg(long)]
    pub install_dir: Option<PathBuf>,
}

/// Options for the `apply` subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct ApplyOpts {
    /// Target conf file.
    #[command(flatten)]
    pub target: TargetOpts,

    /// Owner (and group) for the written file
    #[arg(long)]
    pub user: Option<String>,

    /// Declared settings: TOML, or JSON when the extension is `.json`
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Replace the file content instead of merging into it
    #[arg(long)]
    pub reset: bool,
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::unreachable
)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_apply_with_all_options() {
        let cli = Cli::parse_from([
            "splunk-conf",
            "apply",
            "system/test.conf",
            "--package",
            "universal_forwarder",
            "--scope",
            "default",
            "--install-dir",
            "/opt/uf",
            "--user",
            "fauxhai",
            "--config",
            "test.toml",
            "--reset",
        ]);
        let Command::Apply(opts) = cli.command else {
            unreachable!("expected apply, got {:?}", cli.command);
        };
        assert_eq!(opts.target.path, "system/test.conf");
        assert_eq!(opts.target.package, Some(Package::UniversalForwarder));
        assert_eq!(opts.target.scope, Some(Scope::Default));
        assert_eq!(opts.target.install_dir, Some(PathBuf::from("/opt/uf")));
        assert_eq!(opts.user.as_deref(), Some("fauxhai"));
        assert_eq!(opts.config, Some(PathBuf::from("test.toml")));
        assert!(opts.reset);
    }

    #[test]
    fn parse_package_with_dash() {
        let cli = Cli::parse_from([
            "splunk-conf",
            "remove",
            "system/test.conf",
            "--package",
            "universal-forwarder",
        ]);
        let Command::Remove(opts) = cli.command else {
            unreachable!("expected remove, got {:?}", cli.command);
        };
        assert_eq!(opts.package, Some(Package::UniversalForwarder));
    }

    #[test]
    fn parse_scope_none() {
        let cli = Cli::parse_from(["splunk-conf", "resolve", "x/y.conf", "--scope", "none"]);
        let Command::Resolve(opts) = cli.command else {
            unreachable!("expected resolve, got {:?}", cli.command);
        };
        assert_eq!(opts.scope, Some(Scope::Unscoped));
    }

    #[test]
    fn rejects_unknown_package() {
        let err = Cli::try_parse_from([
            "splunk-conf",
            "apply",
            "system/test.conf",
            "--package",
            "heavy_forwarder",
        ])
        .unwrap_err();
        assert!(err.to_string().contains("heavy_forwarder"));
    }

    #[test]
    fn path_is_required() {
        assert!(Cli::try_parse_from(["splunk-conf", "apply"]).is_err());
    }

    #[test]
    fn parse_global_options() {
        let cli = Cli::parse_from([
            "splunk-conf",
            "-d",
            "-v",
            "--state",
            "/var/lib/splunk-conf/state.toml",
            "version",
        ]);
        assert!(cli.global.dry_run);
        assert!(cli.verbose);
        assert_eq!(
            cli.global.state,
            Some(PathBuf::from("/var/lib/splunk-conf/state.toml"))
        );
        assert_eq!(cli.command.name(), "version");
    }

    #[test]
    fn global_options_after_subcommand() {
        let cli = Cli::parse_from(["splunk-conf", "apply", "system/a.conf", "--dry-run"]);
        assert!(cli.global.dry_run);
        assert_eq!(cli.command.name(), "apply");
    }
}
