//! Glyphs used by the dashboard.

// Session status
pub const READY_ON: &str = "●"; // pulse, lit half
pub const READY_OFF: &str = "○"; // pulse, dark half
pub const WAITING: &str = "○";
pub const UNKNOWN: &str = "?";
pub const READY_SUFFIX: &str = "← ready";

// Header indicators
pub const NOTIFY_ON: &str = "●";
pub const NOTIFY_OFF: &str = "○";
pub const NOTIFIER_FAILED: &str = "⚠";
pub const SOURCE_DOWN: &str = "⊘";
