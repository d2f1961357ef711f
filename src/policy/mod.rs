pub mod access;
pub mod roles;
pub mod transitions;

pub use access::Policy;
pub use roles::{has_permission, permissions_for, Permission};
pub use transitions::{check_transition, is_allowed_transition, next_status, TransitionError};
