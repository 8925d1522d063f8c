//! Message enum for the keyboard surface.
//!
//! Key events are mapped to messages by `input::dispatch` and handled by
//! `ScanLoop::handle`, between ticks, on the control thread.

/// All user actions the dashboard understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// Quit the application
    Quit,
    /// Flip the process-wide notifications-enabled flag
    ToggleNotifications,
    /// Run a scan now, out of cadence
    Refresh,
    /// Fire the fixed test notification, bypassing the dispatcher
    TestNotification,
    /// No operation (for unhandled keys)
    None,
}
