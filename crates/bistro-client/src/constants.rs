//! Editor configuration defaults.
//!
//! Centralizes the values [`EditorConfig`](crate::EditorConfig) falls back to
//! when a field is missing from the config file.

use std::time::Duration;

/// Autosave is on unless the config turns it off.
pub const DEFAULT_AUTOSAVE_ENABLED: bool = true;

/// Interval between autosave ticks.
pub const DEFAULT_AUTOSAVE_INTERVAL: Duration = Duration::from_secs(30);

/// Shortest autosave interval; zero or smaller requests are raised to this.
pub const MIN_AUTOSAVE_INTERVAL: Duration = Duration::from_secs(1);

/// Window in which a repeated drop of the same gesture is ignored.
pub const DEFAULT_DROP_DEBOUNCE: Duration = bistro_canvas::DEFAULT_DROP_DEBOUNCE;

/// Undo stack depth.
pub const DEFAULT_HISTORY_LIMIT: usize = bistro_canvas::DEFAULT_HISTORY_LIMIT;

/// Buffered notices per [`BroadcastNotifier`](crate::BroadcastNotifier) subscriber
/// before the slowest one starts lagging.
pub const NOTICE_CHANNEL_CAPACITY: usize = 64;
