//! `splunk-conf` binary entry point.
use anyhow::Result;
use clap::Parser;

use splunk_conf::cli::{Cli, Command};
use splunk_conf::commands;
use splunk_conf::logging::{self, Logger};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();

    if matches!(args.command, Command::Version) {
        commands::version::run();
        return Ok(());
    }

    let name = args.command.name();
    logging::init_subscriber(args.verbose, name);
    let log = Logger::new(name);

    match &args.command {
        Command::Apply(opts) => commands::apply::run(&args.global, opts, &log),
        Command::Remove(opts) => commands::remove::run(&args.global, opts, &log),
        Command::Resolve(opts) => commands::resolve::run(&args.global, opts, &log),
        Command::Version => Ok(()),
    }
}
