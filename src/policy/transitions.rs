//! Defect status chain: `new → in_progress → on_review → closed`, with
//! `cancelled` reachable from any open state. `closed` and `cancelled` absorb.

use thiserror::Error;

use crate::models::DefectStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Status cannot change from '{from}' to '{to}'")]
pub struct TransitionError {
    pub from: DefectStatus,
    pub to: DefectStatus,
}

/// The single "advance" successor of `current`.
pub fn next_status(current: DefectStatus) -> Option<DefectStatus> {
    match current {
        DefectStatus::New => Some(DefectStatus::InProgress),
        DefectStatus::InProgress => Some(DefectStatus::OnReview),
        DefectStatus::OnReview => Some(DefectStatus::Closed),
        DefectStatus::Closed | DefectStatus::Cancelled => None,
    }
}

/// Rule applied to every status change the client sends, whether it comes
/// from the advance action or the edit form.
pub fn is_allowed_transition(from: DefectStatus, to: DefectStatus) -> bool {
    if from == to {
        return true;
    }
    if to == DefectStatus::Cancelled {
        return !from.is_terminal();
    }
    next_status(from) == Some(to)
}

pub fn check_transition(from: DefectStatus, to: DefectStatus) -> Result<(), TransitionError> {
    if is_allowed_transition(from, to) {
        Ok(())
    } else {
        Err(TransitionError { from, to })
    }
}

/// States reachable in one step, excluding staying put.
pub fn reachable_from(current: DefectStatus) -> Vec<DefectStatus> {
    DefectStatus::ALL
        .into_iter()
        .filter(|&to| to != current && is_allowed_transition(current, to))
        .collect()
}
