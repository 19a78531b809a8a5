//! Remove command implementation.
use anyhow::Result;

use crate::cli::{GlobalOpts, TargetOpts};
use crate::logging::{Logger, TaskStatus};
use crate::resources::Applicable;

use super::{CommandSetup, finish, report, target_resource};

/// Run the remove command.
///
/// # Errors
///
/// Returns an error if the run state cannot be loaded or the file could not
/// be deleted.
pub fn run(global: &GlobalOpts, opts: &TargetOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let store = setup.store();
    let resource = target_resource(setup.host(&store), opts);
    let name = resource.description();

    log.stage(&format!("Removing {}", opts.path));
    match resource.target() {
        Ok(target) if global.dry_run => {
            let path = target.absolute_path.display().to_string();
            if target.absolute_path.exists() {
                log.dry_run(&format!("would delete {path}"));
                log.record_task(&name, TaskStatus::DryRun, Some(&path));
            } else {
                log.debug(&format!("{path} already absent"));
                log.record_task(&name, TaskStatus::Unchanged, None);
            }
        }
        Ok(target) => {
            let path = target.absolute_path.display().to_string();
            report(log, &name, &resource.remove(), "deleted", &path);
        }
        Err(e) => report(log, &name, &Err(e.into()), "deleted", &opts.path),
    }

    finish(log, &setup.restarts)
}
