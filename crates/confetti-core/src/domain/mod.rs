//! Domain model (ids, calendar days, records, policy, errors, reports).

pub mod birthday;
pub mod calendar;
pub mod errors;
pub mod ids;
pub mod policy;
pub mod report;

pub use birthday::BirthdayRecord;
pub use calendar::CalendarDay;
pub use errors::{CoreError, ErrorKind, TransportError};
pub use ids::{ChannelId, CommunityId, UserId};
pub use policy::{Action, Actor, Decision, DenyReason, decide};
pub use report::{CycleMode, CycleReport, CycleState, DispatchFailure};
