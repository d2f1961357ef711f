//! Static role → permission registry.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::models::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Permission {
    DefectsView,
    DefectsCreate,
    DefectsEdit,
    DefectsAdvance,
    DefectsComment,
    DefectsAssign,
    DefectsDelete,
    AttachmentsUpload,
    ProjectsView,
    ProjectsManage,
    ReportsView,
    ReportsExport,
    ProfileEdit,
}

impl Permission {
    pub const ALL: [Permission; 13] = [
        Permission::DefectsView,
        Permission::DefectsCreate,
        Permission::DefectsEdit,
        Permission::DefectsAdvance,
        Permission::DefectsComment,
        Permission::DefectsAssign,
        Permission::DefectsDelete,
        Permission::AttachmentsUpload,
        Permission::ProjectsView,
        Permission::ProjectsManage,
        Permission::ReportsView,
        Permission::ReportsExport,
        Permission::ProfileEdit,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            Permission::DefectsView => "defects:view",
            Permission::DefectsCreate => "defects:create",
            Permission::DefectsEdit => "defects:edit",
            Permission::DefectsAdvance => "defects:advance",
            Permission::DefectsComment => "defects:comment",
            Permission::DefectsAssign => "defects:assign",
            Permission::DefectsDelete => "defects:delete",
            Permission::AttachmentsUpload => "attachments:upload",
            Permission::ProjectsView => "projects:view",
            Permission::ProjectsManage => "projects:manage",
            Permission::ReportsView => "reports:view",
            Permission::ReportsExport => "reports:export",
            Permission::ProfileEdit => "profile:edit",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.tag())
    }
}

impl FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|p| p.tag() == s)
            .ok_or_else(|| format!("Unknown permission '{}'", s))
    }
}

const ENGINEER: &[Permission] = &[
    Permission::DefectsView,
    Permission::DefectsCreate,
    Permission::DefectsEdit,
    Permission::DefectsAdvance,
    Permission::DefectsComment,
    Permission::AttachmentsUpload,
    Permission::ProfileEdit,
];

const OBSERVER: &[Permission] = &[
    Permission::DefectsView,
    Permission::ProjectsView,
    Permission::ReportsView,
    Permission::ReportsExport,
    Permission::ProfileEdit,
];

fn granted(role: Role) -> &'static [Permission] {
    match role {
        Role::Engineer => ENGINEER,
        Role::Manager => &Permission::ALL,
        Role::Observer => OBSERVER,
        Role::Unknown => &[],
    }
}

/// Permissions granted to `role`. `Role::Unknown` gets the empty set.
pub fn permissions_for(role: Role) -> BTreeSet<Permission> {
    granted(role).iter().copied().collect()
}

pub fn role_has(role: Role, permission: Permission) -> bool {
    granted(role).contains(&permission)
}

/// Tag-based lookup; an unrecognised tag is never granted.
pub fn has_permission(role: Role, tag: &str) -> bool {
    tag.parse::<Permission>()
        .map(|permission| role_has(role, permission))
        .unwrap_or(false)
}
