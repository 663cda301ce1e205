use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use crate::bytes;

/// Severity keyword found in a log line. Declaration order is detection priority.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity { Error, Warn, Info, Debug }

impl Severity {
    pub const ALL: [Severity; 4] = [Severity::Error, Severity::Warn, Severity::Info, Severity::Debug];

    /// Case-insensitive parse of `error|warn|info|debug`.
    pub fn parse(raw: &str) -> Option<Severity> {
        let lower = raw.to_ascii_lowercase();
        Severity::ALL.into_iter().find(|s| s.name() == lower)
    }

    pub fn name(self) -> &'static str {
        match self { Severity::Error => "error", Severity::Warn => "warn", Severity::Info => "info", Severity::Debug => "debug" }
    }

    /// Rank, 0 for the highest priority.
    pub fn index(self) -> usize { self as usize }

    /// True when the keyword occurs anywhere in `line`, ignoring ASCII case.
    pub fn matches(self, line: impl AsRef<[u8]>) -> bool {
        bytes::contains(&line.as_ref().to_ascii_lowercase(), self.name().as_bytes())
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown level '{0}', expected one of error|warn|info|debug")]
pub struct UnknownSeverity(pub String);

impl FromStr for Severity {
    type Err = UnknownSeverity;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Severity::parse(s).ok_or_else(|| UnknownSeverity(s.to_string()))
    }
}

/// First severity keyword present in `line`, tested Error, Warn, Info, Debug.
pub fn detect(line: impl AsRef<[u8]>) -> Option<Severity> {
    let lower = line.as_ref().to_ascii_lowercase();
    Severity::ALL.into_iter().find(|s| bytes::contains(&lower, s.name().as_bytes()))
}
