//! Resolve command: show where a conf file lives and why.
use anyhow::Result;

use crate::cli::{GlobalOpts, TargetOpts};
use crate::logging::Logger;

use super::{CommandSetup, target_resource};

/// Run the resolve command.
///
/// # Errors
///
/// Returns an error if the run state cannot be loaded or the target cannot
/// be resolved.
pub fn run(global: &GlobalOpts, opts: &TargetOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let store = setup.store();
    let resource = target_resource(setup.host(&store), opts);

    log.stage(&format!("Resolving {}", opts.path));
    let target = resource.target()?;
    log.info(&format!("path:     {}", target.absolute_path.display()));
    log.info(&format!("package:  {}", target.package));
    log.info(&format!("scope:    {}", target.scope));
    log.info(&format!("category: {}", target.category));
    log.info(&format!(
        "root:     {} (from {})",
        target.install_root.display(),
        target.root_source
    ));
    if let Some(o) = setup.state.conf_override() {
        log.debug(&format!("override in effect: {o:?}"));
    }
    Ok(())
}
