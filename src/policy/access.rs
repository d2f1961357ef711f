//! Access predicates over an actor and a resource.
//!
//! Every function is pure and total. A missing actor, or one whose role the
//! client does not recognise, is denied.

use crate::models::{Defect, DefectStatus, Role, User};
use crate::policy::roles::{role_has, Permission};
use crate::policy::transitions::{is_allowed_transition, next_status};

fn role_of(actor: Option<&User>) -> Role {
    actor.map(User::role).unwrap_or(Role::Unknown)
}

/// Managers edit any defect; engineers edit only the ones they authored.
pub fn can_edit_defect(actor: Option<&User>, defect: &Defect) -> bool {
    let Some(actor) = actor else {
        return false;
    };
    match actor.role() {
        Role::Manager => true,
        Role::Engineer => actor.id == defect.author_id,
        Role::Observer | Role::Unknown => false,
    }
}

/// Managers advance any defect; anyone else only the ones assigned to them.
/// An unrecognised role never advances, assigned or not.
pub fn can_advance_status(actor: Option<&User>, defect: &Defect) -> bool {
    let Some(actor) = actor else {
        return false;
    };
    match actor.role() {
        Role::Manager => true,
        Role::Unknown => false,
        Role::Engineer | Role::Observer => defect.assignee_id == Some(actor.id),
    }
}

pub fn can_manage_projects(actor: Option<&User>) -> bool {
    role_of(actor) == Role::Manager
}

pub fn can_view_reports(actor: Option<&User>) -> bool {
    matches!(role_of(actor), Role::Manager | Role::Observer)
}

pub fn can_export_reports(actor: Option<&User>) -> bool {
    role_has(role_of(actor), Permission::ReportsExport)
}

pub fn can_create_defect(actor: Option<&User>) -> bool {
    role_has(role_of(actor), Permission::DefectsCreate)
}

pub fn can_comment(actor: Option<&User>) -> bool {
    role_has(role_of(actor), Permission::DefectsComment)
}

pub fn can_upload_attachment(actor: Option<&User>, defect: &Defect) -> bool {
    role_has(role_of(actor), Permission::AttachmentsUpload) && !defect.status.is_terminal()
}

pub fn can_assign_defect(actor: Option<&User>) -> bool {
    role_has(role_of(actor), Permission::DefectsAssign)
}

pub fn can_delete_defect(actor: Option<&User>) -> bool {
    role_has(role_of(actor), Permission::DefectsDelete)
}

pub fn can_cancel_defect(actor: Option<&User>, defect: &Defect) -> bool {
    can_edit_defect(actor, defect) && !defect.status.is_terminal()
}

/// Status offered by the "advance" action, if the actor may use it.
pub fn advance_target(actor: Option<&User>, defect: &Defect) -> Option<DefectStatus> {
    if !can_advance_status(actor, defect) {
        return None;
    }
    next_status(defect.status)
}

/// Whether `actor` may move `defect` to `to`.
///
/// Stepping to the chain successor needs advance rights; cancelling or
/// touching status through the edit form needs edit rights. Either way the
/// move itself must be allowed by the transition table.
pub fn can_set_status(actor: Option<&User>, defect: &Defect, to: DefectStatus) -> bool {
    if !is_allowed_transition(defect.status, to) {
        return false;
    }
    if to == defect.status {
        return can_edit_defect(actor, defect) || can_advance_status(actor, defect);
    }
    if next_status(defect.status) == Some(to) && can_advance_status(actor, defect) {
        return true;
    }
    can_edit_defect(actor, defect)
}

/// An actor bound once, for repeated checks from the same view.
#[derive(Debug, Clone, Default)]
pub struct Policy {
    actor: Option<User>,
}

impl Policy {
    pub fn new(actor: Option<User>) -> Self {
        Self { actor }
    }

    pub fn actor(&self) -> Option<&User> {
        self.actor.as_ref()
    }

    pub fn role(&self) -> Role {
        role_of(self.actor())
    }

    pub fn allows(&self, permission: Permission) -> bool {
        role_has(self.role(), permission)
    }

    pub fn can_edit_defect(&self, defect: &Defect) -> bool {
        can_edit_defect(self.actor(), defect)
    }

    pub fn can_advance_status(&self, defect: &Defect) -> bool {
        can_advance_status(self.actor(), defect)
    }

    pub fn advance_target(&self, defect: &Defect) -> Option<DefectStatus> {
        advance_target(self.actor(), defect)
    }

    pub fn can_set_status(&self, defect: &Defect, to: DefectStatus) -> bool {
        can_set_status(self.actor(), defect, to)
    }

    pub fn can_cancel_defect(&self, defect: &Defect) -> bool {
        can_cancel_defect(self.actor(), defect)
    }

    pub fn can_manage_projects(&self) -> bool {
        can_manage_projects(self.actor())
    }

    pub fn can_view_reports(&self) -> bool {
        can_view_reports(self.actor())
    }

    pub fn can_export_reports(&self) -> bool {
        can_export_reports(self.actor())
    }

    pub fn can_create_defect(&self) -> bool {
        can_create_defect(self.actor())
    }

    pub fn can_comment(&self) -> bool {
        can_comment(self.actor())
    }

    pub fn can_delete_defect(&self) -> bool {
        can_delete_defect(self.actor())
    }
}
