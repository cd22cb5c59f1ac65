//! # Core
//!
//! Everything around the inference layer that isn't HTTP: where settings
//! come from, how failures reach the user, and what callers record per call.
//!
//! ```text
//!   config.toml ─┐
//!   env vars ────┼──▶ config::resolve() ──▶ ProviderConfig ──▶ inference::Router
//!   CLI flags ───┘                                                  │
//!                                  notify::Notifier ◀── failures ───┤
//!                                  usage::UsageRecord ◀── result ───┘
//! ```
//!
//! ## Modules
//!
//! - [`config`]: layered settings resolved into a read-only `ProviderConfig`
//! - [`notify`]: the `Notifier` seam used by the transport
//! - [`usage`]: per-call `UsageRecord` for token accounting

pub mod config;
pub mod notify;
pub mod usage;
