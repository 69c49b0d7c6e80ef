//! confetti-core
//!
//! Idempotent birthday notifier: stores birthdays, decides who may change
//! them, and once per period greets today's birthdays exactly once.
//!
//! # Modules
//! - **domain**: ids, calendar days, records, authorization policy, errors
//! - **ports**: EventStore, ChannelRegistry, transport ports, Clock
//! - **impls**: in-memory and SQLite stores, readiness gates
//! - **app**: scheduler, scheduler loop, command service, builder
//! - **config**: TOML deployment config
//! - **observability**: tracing setup

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod observability;
pub mod ports;
