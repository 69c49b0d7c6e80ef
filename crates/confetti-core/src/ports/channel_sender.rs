//! ChannelSender port - posts a message to a channel.

use async_trait::async_trait;

use crate::domain::{ChannelId, TransportError};

#[async_trait]
pub trait ChannelSender: Send + Sync {
    async fn send(&self, channel: ChannelId, text: &str) -> Result<(), TransportError>;
}
