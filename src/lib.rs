//! Streams log files, filters lines by substring, severity keyword and
//! timestamp range, and ranks the most frequent normalized lines.

mod bytes;
pub mod error;
pub mod filter;
pub mod frequency;
pub mod level;
pub mod normalize;
pub mod summarize;
pub mod timestamp;

pub use error::{SummarizeError, SummarizeResult};
pub use frequency::TopLine;
pub use level::{Severity, detect};
pub use normalize::{normalize_bytes, normalize_line};
pub use summarize::{LevelCounts, SummarizeOptions, Summarizer, SummaryResult, summarize};
