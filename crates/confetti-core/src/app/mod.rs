//! App - application layer.
//!
//! Combines the ports into the running system.
//!
//! # Components
//! - **AppBuilder**: wiring and fail-fast validation
//! - **NotificationScheduler**: scan → dispatch → mark cycle
//! - **SchedulerLoop**: periodic driver gated on transport readiness
//! - **CommandService**: policy-checked mutations and developer triggers

pub mod builder;
pub mod commands;
pub mod scheduler;
pub mod scheduler_loop;
pub mod template;

pub use self::builder::{App, AppBuilder, BuildError};
pub use self::commands::{CommandOutcome, CommandService};
pub use self::scheduler::{NotificationScheduler, SchedulerPorts, SchedulerSettings};
pub use self::scheduler_loop::SchedulerLoop;
pub use self::template::MessageTemplate;
