//! MemberResolver port - live membership lookup from the transport.

use crate::domain::UserId;

/// A live community member as seen by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// Platform mention markup, e.g. `<@42>`.
    pub mention: String,
}

/// Looks up members in the transport's membership cache.
///
/// `None` means the user is not (or no longer) a member.
pub trait MemberResolver: Send + Sync {
    fn resolve_member(&self, user_id: UserId) -> Option<Member>;

    fn is_member(&self, user_id: UserId) -> bool {
        self.resolve_member(user_id).is_some()
    }
}
