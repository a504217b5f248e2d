//! Online/offline status derived from `last_seen`.

use crate::types::Timestamp;

/// Default freshness window: a user seen within five minutes is online.
pub const DEFAULT_ONLINE_WINDOW_SECS: i64 = 5 * 60;

/// Whether a user last seen at `last_seen` counts as online at `now`.
pub fn is_online(last_seen: Option<Timestamp>, now: Timestamp, window_secs: i64) -> bool {
    match last_seen {
        Some(seen) => (now - seen).num_seconds() < window_secs,
        None => false,
    }
}
