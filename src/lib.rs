//! Splunk configuration file management engine.
//!
//! Idempotently converges `.conf` files under a Splunk or Universal Forwarder
//! installation: it resolves where a file lives, merges declared settings
//! into what is on disk, decides which account owns the result, and writes
//! only when something changed.
//!
//! The public API is organised into layers:
//!
//! - **[`conf`]**: the canonical `.conf` model, coercion, merge, and file format
//! - **[`resolve`]**: pure resolution of target paths and ownership
//! - **[`state`]**: installation records and the run-wide override
//! - **[`resources`]**: the idempotent [`ConfResource`](resources::conf::ConfResource)
//! - **[`commands`]**: top-level subcommand orchestration (`apply`, `remove`, `resolve`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod conf;
pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod operations;
pub mod platform;
pub mod resolve;
pub mod resources;
pub mod state;
