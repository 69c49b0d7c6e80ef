//! Ports - the seams between the core and its collaborators.
//!
//! Stores are synchronous: each call is one short transaction and never
//! spans a network round-trip. Transport capabilities that wait on the
//! network (`ChannelSender`, `ReadinessGate`) are async.

pub mod channel_lookup;
pub mod channel_registry;
pub mod channel_sender;
pub mod clock;
pub mod event_store;
pub mod member_resolver;
pub mod readiness;

pub use self::channel_lookup::ChannelLookup;
pub use self::channel_registry::ChannelRegistry;
pub use self::channel_sender::ChannelSender;
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::event_store::EventStore;
pub use self::member_resolver::{Member, MemberResolver};
pub use self::readiness::ReadinessGate;
