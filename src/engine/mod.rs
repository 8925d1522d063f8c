//! Session state engine
//!
//! ```text
//! ScanLoop ── SessionSource.list ──▶ SessionRegistry.ingest (StatusClassifier)
//!    │                                      │
//!    │                              SessionRegistry.diff
//!    │                                      │
//!    │                       NotificationDispatcher.evaluate
//!    ▼                                      ▼
//! Presenter ◀──── snapshot          notifier sink ◀──── Notification
//! ```

pub mod classifier;
pub mod dispatcher;
pub mod registry;
pub mod scan_loop;

pub use classifier::StatusClassifier;
pub use dispatcher::NotificationDispatcher;
pub use registry::{NotificationLedger, NotificationRecord, SessionRegistry};
pub use scan_loop::{AnimationPhase, Effect, EngineState, LoopEvent, ScanLoop, View};
