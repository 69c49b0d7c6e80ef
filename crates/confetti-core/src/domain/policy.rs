//! Authorization policy for store mutations.
//!
//! `decide` is a pure function: given who is acting, what they want to do
//! and on whom, it returns the verdict without touching any store or
//! transport. Rules are evaluated in order; the first that applies wins.

use std::fmt;

use super::errors::CoreError;
use super::ids::UserId;

/// Identity and privileges of whoever issued a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: UserId,
    pub is_admin: bool,
    pub is_developer: bool,
}

impl Actor {
    pub fn member(id: UserId) -> Self {
        Self {
            id,
            is_admin: false,
            is_developer: false,
        }
    }

    pub fn admin(id: UserId) -> Self {
        Self {
            is_admin: true,
            ..Self::member(id)
        }
    }

    pub fn developer(id: UserId) -> Self {
        Self {
            is_developer: true,
            ..Self::member(id)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SetBirthday,
    ClearBirthday,
    SetChannel,
    Prune,
    WipeStore,
    ResetFlags,
    DebugSimulate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    NotDeveloper,
    NotAdministrator,
    OtherUserRequiresAdministrator,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            DenyReason::NotDeveloper => "not a developer",
            DenyReason::NotAdministrator => "not an administrator",
            DenyReason::OtherUserRequiresAdministrator => {
                "requires administrator to act on another user"
            }
        };
        f.write_str(reason)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Convert a denial into `CoreError::Unauthorized`.
    pub fn into_result(self) -> Result<(), CoreError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(CoreError::Unauthorized(reason)),
        }
    }
}

/// Decide whether `actor` may perform `action` on `target`.
///
/// `target` is only meaningful for `SetBirthday` / `ClearBirthday`; `None`
/// means the actor is acting on their own record.
pub fn decide(actor: &Actor, action: Action, target: Option<UserId>) -> Decision {
    match action {
        Action::WipeStore | Action::ResetFlags | Action::DebugSimulate => {
            if actor.is_developer {
                Decision::Allow
            } else {
                Decision::Deny(DenyReason::NotDeveloper)
            }
        }
        Action::SetChannel => {
            if actor.is_admin {
                Decision::Allow
            } else {
                Decision::Deny(DenyReason::NotAdministrator)
            }
        }
        Action::SetBirthday | Action::ClearBirthday => {
            let target = target.unwrap_or(actor.id);
            if target == actor.id || actor.is_admin {
                Decision::Allow
            } else {
                Decision::Deny(DenyReason::OtherUserRequiresAdministrator)
            }
        }
        // Prune only drops records of users who already left the community.
        Action::Prune => Decision::Allow,
    }
}
