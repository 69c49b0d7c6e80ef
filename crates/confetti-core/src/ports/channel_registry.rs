//! ChannelRegistry port - community → notification channel binding.

use crate::domain::{ChannelId, CommunityId, CoreError};

pub trait ChannelRegistry: Send + Sync {
    /// Bind (or re-bind) the community's notification channel.
    fn set_channel(&self, community: CommunityId, channel: ChannelId) -> Result<(), CoreError>;

    /// Absence is not an error; callers pick the fallback.
    fn get_channel(&self, community: CommunityId) -> Result<Option<ChannelId>, CoreError>;
}
