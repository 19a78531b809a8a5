//! Owner and group for a written conf file.
use super::precedence::{Precedence, Resolved};
use crate::state::installation::{InstallationRecord, Package};

/// Inputs to ownership resolution.
#[derive(Debug, Clone, Copy)]
pub struct OwnershipRequest<'a> {
    /// User the caller asked for.
    pub explicit_user: Option<&'a str>,
    /// User from the run-wide override.
    pub override_user: Option<&'a str>,
    /// Owner of the file already on disk.
    pub current_owner: Option<&'a str>,
    /// Group of the file already on disk.
    pub current_group: Option<&'a str>,
    /// Installation the file belongs to.
    pub installation: Option<&'a InstallationRecord>,
    /// Established package identity.
    pub package: Package,
}

/// Resolved owner and group, each with the source that supplied it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ownership {
    /// File owner.
    pub owner: Resolved<String>,
    /// File group.
    pub group: Resolved<String>,
}

/// Decide who owns the file.
///
/// - owner: override user, explicit user, current owner, package convention
/// - group: explicit user, current group, package convention
///
/// The package convention (the installation's name, else the package name)
/// only applies to a file that does not exist yet.  The override user never
/// decides the group.
#[must_use]
pub fn resolve(request: &OwnershipRequest<'_>) -> Ownership {
    let convention = request
        .installation
        .map_or_else(|| request.package.to_string(), |i| i.name.clone());

    let owner = Precedence::new()
        .then("override", request.override_user)
        .then("user", request.explicit_user)
        .then("current", request.current_owner)
        .or("package", convention.as_str())
        .map(str::to_string);

    let group = Precedence::new()
        .then("user", request.explicit_user)
        .then("current", request.current_group)
        .or("package", convention.as_str())
        .map(str::to_string);

    Ownership { owner, group }
}
