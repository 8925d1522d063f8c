pub mod claude;
pub mod notifier;

use crate::data::RawRecord;
use crate::error::SourceError;

/// Where raw session records come from.
///
/// Implementations are pure data access: every call re-reads the backing
/// store from scratch and returns what it finds, without classifying or
/// filtering on status. `list` may block on disk I/O; the scan loop always
/// calls it off the control thread.
pub trait SessionSource: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &str;

    fn list(&self) -> Result<Vec<RawRecord>, SourceError>;
}

/// Source backed by a fixed list, for replays and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    records: Vec<RawRecord>,
}

impl StaticSource {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self { records }
    }
}

impl SessionSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    fn list(&self) -> Result<Vec<RawRecord>, SourceError> {
        Ok(self.records.clone())
    }
}
