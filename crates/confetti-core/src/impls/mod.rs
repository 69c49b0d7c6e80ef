//! Impls - adapters for the ports.
//!
//! # Included
//! - **SqliteStore**: durable event store + channel registry (production)
//! - **InMemoryStore**: same contract, nothing persisted (tests, dry runs)
//! - **AlwaysReady / ReadySignal**: readiness gates

pub mod inmem_store;
pub mod readiness;
mod schema;
pub mod sqlite_store;


pub use self::inmem_store::InMemoryStore;
pub use self::readiness::{AlwaysReady, ReadySignal};
pub use self::sqlite_store::{SqliteStore, StoreError};
