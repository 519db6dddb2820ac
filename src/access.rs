//! Single place where role-based access is decided. The router and every
//! admin screen guard ask these functions instead of checking roles inline.

use crate::entity::{Identity, ViewId};

/// Whether `identity` may see `view`. Nobody may see anything while
/// signed out or blocked.
pub fn can_access(identity: Option<&Identity>, view: ViewId) -> bool {
    match identity {
        None => false,
        Some(identity) if identity.is_blocked() => false,
        Some(identity) => !view.is_admin_only() || identity.is_admin(),
    }
}

/// Whether `identity` may run administrative mutations.
pub fn can_administer(identity: Option<&Identity>) -> bool {
    identity.is_some_and(|identity| identity.is_admin() && !identity.is_blocked())
}
