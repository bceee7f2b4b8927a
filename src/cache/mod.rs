//! Session-scoped cache for vehicle option lists
//!
//! Responses are cached in memory and keyed by endpoint, shop and
//! parameters. Nothing is written to disk; a new process starts cold.

pub mod client;
pub mod key;
pub mod memory;

use std::time::Duration;

/// How long a cached option list stays fresh
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

pub use client::CachedVehicleClient;
pub use key::cache_key;
pub use memory::ResponseCache;
