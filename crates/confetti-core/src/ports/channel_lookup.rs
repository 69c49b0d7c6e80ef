//! ChannelLookup port - the transport's best-effort default channel.

use crate::domain::{ChannelId, CommunityId};

/// Used only when no explicit binding exists for the community.
pub trait ChannelLookup: Send + Sync {
    fn default_channel(&self, community: CommunityId) -> Option<ChannelId>;
}
