//! Apply command implementation.
use anyhow::Result;

use crate::cli::{ApplyOpts, GlobalOpts};
use crate::config::declared;
use crate::logging::{Logger, TaskStatus};
use crate::resources::conf::ConfResource;
use crate::resources::{Applicable, ResourceChange};

use super::{CommandSetup, finish, report, target_resource};

/// Run the apply command.
///
/// # Errors
///
/// Returns an error if the run state or declared config cannot be loaded, or
/// if the conf file could not be converged.
pub fn run(global: &GlobalOpts, opts: &ApplyOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let store = setup.store();

    let mut resource = target_resource(setup.host(&store), &opts.target)
        .user(opts.user.clone())
        .reset(opts.reset);
    if let Some(path) = &opts.config {
        log.debug(&format!("declared config: {}", path.display()));
        resource = resource.config(declared::load(path)?);
    }

    log.stage(&format!("Applying {}", opts.target.path));
    if global.dry_run {
        preview(&resource, log);
    } else {
        let outcome = resource.apply();
        let detail = resource.target().map_or_else(
            |_| opts.target.path.clone(),
            |t| t.absolute_path.display().to_string(),
        );
        report(log, &resource.description(), &outcome, "wrote", &detail);
    }

    finish(log, &setup.restarts)
}

/// Log what apply would change without touching the file.
fn preview(resource: &ConfResource<'_>, log: &Logger) {
    let name = resource.description();
    match resource.plan() {
        Ok(plan) => {
            let path = plan.target.absolute_path.display().to_string();
            if let Some(drift) = plan.drift() {
                log.dry_run(&format!(
                    "would write {path} as {}:{} ({drift})",
                    plan.ownership.owner.value, plan.ownership.group.value
                ));
                log.record_task(&name, TaskStatus::DryRun, Some(&path));
            } else {
                report(log, &name, &Ok(ResourceChange::AlreadyCorrect), "wrote", &path);
            }
        }
        Err(e) => report(log, &name, &Err(e.into()), "wrote", ""),
    }
}
