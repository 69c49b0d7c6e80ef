//! Console transport: greetings go to stdout, membership comes from the
//! config roster.

use std::collections::HashMap;

use async_trait::async_trait;
use confetti_core::config::Config;
use confetti_core::domain::{ChannelId, CommunityId, TransportError, UserId};
use confetti_core::ports::{ChannelLookup, ChannelSender, Member, MemberResolver, ReadinessGate};

pub struct ConsoleTransport {
    members: HashMap<UserId, Member>,
    default_channel: Option<ChannelId>,
}

impl ConsoleTransport {
    pub fn from_config(config: &Config) -> Self {
        let members = config
            .members
            .iter()
            .map(|entry| {
                let id = UserId::new(entry.id);
                let mention = entry
                    .mention
                    .clone()
                    .unwrap_or_else(|| format!("<@{}>", entry.id));
                (id, Member { mention })
            })
            .collect();
        Self {
            members,
            default_channel: config.default_channel(),
        }
    }
}

impl MemberResolver for ConsoleTransport {
    fn resolve_member(&self, user_id: UserId) -> Option<Member> {
        self.members.get(&user_id).cloned()
    }
}

impl ChannelLookup for ConsoleTransport {
    fn default_channel(&self, _community: CommunityId) -> Option<ChannelId> {
        self.default_channel
    }
}

#[async_trait]
impl ChannelSender for ConsoleTransport {
    async fn send(&self, channel: ChannelId, text: &str) -> Result<(), TransportError> {
        println!("[{channel}] {text}");
        Ok(())
    }
}

// stdout is always there
#[async_trait]
impl ReadinessGate for ConsoleTransport {
    async fn await_ready(&self) {}
}
