use crate::bytes;
use crate::level::Severity;
use crate::timestamp;

/// Inclusive bounds in epoch seconds. Either side may be open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimeRange {
    pub since: Option<i64>,
    pub until: Option<i64>,
}

impl TimeRange {
    pub fn is_active(&self) -> bool { self.since.is_some() || self.until.is_some() }

    pub fn contains(&self, epoch_seconds: i64) -> bool {
        if let Some(s) = self.since && epoch_seconds < s { return false; }
        if let Some(u) = self.until && epoch_seconds > u { return false; }
        true
    }
}

/// Decides whether a raw line counts as matched.
#[derive(Clone, Debug, Default)]
pub struct FilterPipeline {
    pub time: TimeRange,
    pub contains: Option<String>,
    pub level: Option<Severity>,
}

impl FilterPipeline {
    pub fn accepts(&self, line: impl AsRef<[u8]>) -> bool {
        let line = line.as_ref();
        if self.time.is_active() {
            // With a time filter, lines without a leading timestamp never match.
            match timestamp::parse_prefix(line) {
                Some(ts) if self.time.contains(ts.epoch_seconds) => {}
                _ => return false,
            }
        }
        if let Some(needle) = self.contains.as_deref() && !bytes::contains(line, needle.as_bytes()) { return false; }
        if let Some(level) = self.level && !level.matches(line) { return false; }
        true
    }
}
