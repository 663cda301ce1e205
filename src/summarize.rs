use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::{SummarizeError, SummarizeResult};
use crate::filter::{FilterPipeline, TimeRange};
use crate::frequency::{FrequencyTable, TopLine};
use crate::level::{self, Severity};
use crate::timestamp;

pub const DEFAULT_TOP_N: usize = 10;
const TIMESTAMP_FORMS: &str = "expected YYYY-MM-DDTHH:MM:SSZ or YYYY-MM-DD HH:MM:SS";

#[derive(Clone, Debug)]
pub struct SummarizeOptions {
    pub files: Vec<PathBuf>,
    pub contains: Option<String>,
    pub level: Option<Severity>,
    pub since: Option<String>,
    pub until: Option<String>,
    pub top_n: usize,
}

impl Default for SummarizeOptions {
    fn default() -> Self {
        Self { files: vec![], contains: None, level: None, since: None, until: None, top_n: DEFAULT_TOP_N }
    }
}

/// Per-severity counters for matched lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LevelCounts([u64; 4]);

impl LevelCounts {
    pub fn get(&self, level: Severity) -> u64 { self.0[level.index()] }
    pub fn bump(&mut self, level: Severity) { self.0[level.index()] += 1; }
    pub fn total(&self) -> u64 { self.0.iter().sum() }
}

impl Serialize for LevelCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut st = serializer.serialize_struct("LevelCounts", 4)?;
        st.serialize_field("error", &self.get(Severity::Error))?;
        st.serialize_field("warn", &self.get(Severity::Warn))?;
        st.serialize_field("info", &self.get(Severity::Info))?;
        st.serialize_field("debug", &self.get(Severity::Debug))?;
        st.end()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct SummaryResult {
    pub files_processed: u64,
    pub total_lines: u64,
    pub matched_lines: u64,
    pub matched_by_level: LevelCounts,
    pub top_lines: Vec<TopLine>,
}

/// Stateless engine handle; equivalent to calling [`summarize`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Summarizer;

impl Summarizer {
    pub fn summarize(&self, options: &SummarizeOptions) -> SummarizeResult<SummaryResult> { summarize(options) }
}

fn parse_bound(flag: &str, raw: Option<&str>) -> SummarizeResult<Option<i64>> {
    match raw {
        None => Ok(None),
        Some(s) => timestamp::parse_exact(s)
            .map(Some)
            .ok_or_else(|| SummarizeError::InvalidArgument(format!("invalid --{} timestamp '{}'; {}", flag, s, TIMESTAMP_FORMS))),
    }
}

fn build_pipeline(options: &SummarizeOptions) -> SummarizeResult<FilterPipeline> {
    if options.files.is_empty() {
        return Err(SummarizeError::InvalidArgument("no input files supplied".to_string()));
    }
    let since = parse_bound("since", options.since.as_deref())?;
    let until = parse_bound("until", options.until.as_deref())?;
    if let (Some(s), Some(u)) = (since, until) && s > u {
        return Err(SummarizeError::InvalidArgument("--since must be less than or equal to --until".to_string()));
    }
    Ok(FilterPipeline { time: TimeRange { since, until }, contains: options.contains.clone(), level: options.level })
}

/// Streams every file in order and builds the summary. Fails fast on the
/// first file that cannot be opened or read; no partial result is returned.
pub fn summarize(options: &SummarizeOptions) -> SummarizeResult<SummaryResult> {
    let pipeline = build_pipeline(options)?;
    let mut table = FrequencyTable::new();
    let mut result = SummaryResult::default();

    for path in &options.files {
        let (total, matched) = scan_file(path, &pipeline, &mut table, &mut result)?;
        result.files_processed += 1;
        log::debug!("{}: {} lines, {} matched", path.display(), total, matched);
    }

    log::debug!("{} distinct normalized lines", table.distinct());
    result.top_lines = table.top(options.top_n);
    Ok(result)
}

fn scan_file(path: &Path, pipeline: &FilterPipeline, table: &mut FrequencyTable, result: &mut SummaryResult) -> SummarizeResult<(u64, u64)> {
    let f = File::open(path).map_err(|source| SummarizeError::FileOpen { path: path.to_path_buf(), source })?;
    let mut br = BufReader::new(f);
    let mut buf: Vec<u8> = Vec::new();
    let (mut total, mut matched) = (0u64, 0u64);
    loop {
        buf.clear();
        let read = br.read_until(b'\n', &mut buf).map_err(|source| SummarizeError::FileRead { path: path.to_path_buf(), source })?;
        if read == 0 { break; }
        if buf.last() == Some(&b'\n') { buf.pop(); }
        total += 1;
        result.total_lines += 1;
        if !pipeline.accepts(&buf) { continue; }
        matched += 1;
        result.matched_lines += 1;
        if let Some(sev) = level::detect(&buf) { result.matched_by_level.bump(sev); }
        table.record(&buf);
    }
    Ok((total, matched))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_path(prefix: &str) -> PathBuf {
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!("{}_{}_{}.log", prefix, std::process::id(), n))
    }

    fn write_temp_bytes(prefix: &str, content: &[u8]) -> PathBuf {
        let p = temp_path(prefix);
        std::fs::write(&p, content).unwrap();
        p
    }

    fn write_temp_log(prefix: &str, content: &str) -> PathBuf { write_temp_bytes(prefix, content.as_bytes()) }

    fn opts(files: Vec<PathBuf>) -> SummarizeOptions { SummarizeOptions { files, ..Default::default() } }

    fn cleanup(paths: &[PathBuf]) { for p in paths { let _ = std::fs::remove_file(p); } }

    #[test]
    fn builds_top_frequencies() {
        let p = write_temp_log("sheriff_sample_a", "INFO request id=100 took 12ms\nINFO request id=101 took 45ms\nERROR failed request id=200\nDEBUG cache miss key=abc\n");
        let r = summarize(&SummarizeOptions { top_n: 2, ..opts(vec![p.clone()]) }).unwrap();
        assert_eq!(r.files_processed, 1);
        assert_eq!(r.total_lines, 4);
        assert_eq!(r.matched_lines, 4);
        assert_eq!(r.matched_by_level.get(Severity::Info), 2);
        assert_eq!(r.top_lines.len(), 2);
        assert_eq!(r.top_lines[0], TopLine { line: "INFO request id=<num> took <num>ms".into(), count: 2 });
        assert_eq!(r.top_lines[1], TopLine { line: "DEBUG cache miss key=abc".into(), count: 1 });
        cleanup(&[p]);
    }

    #[test]
    fn contains_and_level_filters() {
        let p = write_temp_log("sheriff_sample_b", "[INFO] connected user=100\n[WARN] connected user=101\n[ERROR] disconnected user=101\n[WARN] connected user=999\n");
        let o = SummarizeOptions { contains: Some("connected".into()), level: Some(Severity::Warn), top_n: 5, ..opts(vec![p.clone()]) };
        let r = summarize(&o).unwrap();
        assert_eq!(r.total_lines, 4);
        assert_eq!(r.matched_lines, 2);
        assert_eq!(r.matched_by_level.get(Severity::Warn), 2);
        assert_eq!(r.top_lines, vec![TopLine { line: "[WARN] connected user=<num>".into(), count: 2 }]);
        cleanup(&[p]);
    }

    #[test]
    fn multiple_files_in_order() {
        let a = write_temp_log("sheriff_sample_c1", "INFO one\nERROR two\n");
        let b = write_temp_log("sheriff_sample_c2", "INFO three\nINFO four\n");
        let r = Summarizer.summarize(&opts(vec![a.clone(), b.clone()])).unwrap();
        assert_eq!(r.files_processed, 2);
        assert_eq!(r.total_lines, 4);
        assert_eq!(r.matched_lines, 4);
        assert_eq!(r.matched_by_level.get(Severity::Info), 3);
        assert_eq!(r.matched_by_level.get(Severity::Error), 1);
        cleanup(&[a, b]);
    }

    #[test]
    fn time_range_inclusive_and_drops_untimestamped() {
        let p = write_temp_log("sheriff_sample_time_a", "2026-02-09T18:01:02Z INFO before range\n2026-02-09T18:01:03Z INFO at since\nINFO line without timestamp\n2026-02-09T18:01:04Z WARN in range\n2026-02-09T18:01:05Z ERROR at until\n2026-02-09T18:01:06Z INFO after range\n");
        let o = SummarizeOptions { since: Some("2026-02-09T18:01:03Z".into()), until: Some("2026-02-09T18:01:05Z".into()), ..opts(vec![p.clone()]) };
        let r = summarize(&o).unwrap();
        assert_eq!(r.total_lines, 6);
        assert_eq!(r.matched_lines, 3);
        assert_eq!(r.matched_by_level.get(Severity::Info), 1);
        assert_eq!(r.matched_by_level.get(Severity::Warn), 1);
        assert_eq!(r.matched_by_level.get(Severity::Error), 1);
        cleanup(&[p]);
    }

    #[test]
    fn untimestamped_lines_kept_without_time_filter() {
        let p = write_temp_log("sheriff_sample_time_b", "2026-02-09T18:01:02Z INFO with timestamp\nINFO line without timestamp\n2026-02-09T18:01:03Z WARN with timestamp\n");
        let r = summarize(&opts(vec![p.clone()])).unwrap();
        assert_eq!(r.total_lines, 3);
        assert_eq!(r.matched_lines, 3);
        cleanup(&[p]);
    }

    #[test]
    fn local_timestamp_format() {
        let p = write_temp_log("sheriff_sample_time_c", "2026-02-09 18:01:00 INFO one\n2026-02-09 18:01:01 INFO two\n2026-02-09 18:01:02 INFO three\n");
        let o = SummarizeOptions { since: Some("2026-02-09 18:01:01".into()), until: Some("2026-02-09 18:01:02".into()), ..opts(vec![p.clone()]) };
        let r = summarize(&o).unwrap();
        assert_eq!(r.total_lines, 3);
        assert_eq!(r.matched_lines, 2);
        assert_eq!(r.matched_by_level.get(Severity::Info), 2);
        cleanup(&[p]);
    }

    #[test]
    fn top_zero_reports_no_lines() {
        let p = write_temp_log("sheriff_sample_top0", "INFO a\nINFO b\n");
        let r = summarize(&SummarizeOptions { top_n: 0, ..opts(vec![p.clone()]) }).unwrap();
        assert_eq!(r.matched_lines, 2);
        assert!(r.top_lines.is_empty());
        cleanup(&[p]);
    }

    #[test]
    fn last_line_without_newline_and_blank_lines() {
        let p = write_temp_log("sheriff_sample_tail", "\n  \nwarn tail 7");
        let r = summarize(&opts(vec![p.clone()])).unwrap();
        assert_eq!(r.total_lines, 3);
        assert_eq!(r.matched_lines, 3);
        assert_eq!(r.matched_by_level.total(), 1);
        assert_eq!(r.top_lines[0], TopLine { line: "<empty>".into(), count: 2 });
        assert_eq!(r.top_lines[1], TopLine { line: "warn tail <num>".into(), count: 1 });
        cleanup(&[p]);
    }

    #[test]
    fn level_counts_follow_detection_not_filter() {
        let p = write_temp_log("sheriff_sample_detect", "warn then error\nINFO ok\nplain\n");
        let r = summarize(&SummarizeOptions { level: Some(Severity::Warn), ..opts(vec![p.clone()]) }).unwrap();
        assert_eq!(r.matched_lines, 1);
        assert_eq!(r.matched_by_level.get(Severity::Error), 1);
        assert_eq!(r.matched_by_level.get(Severity::Warn), 0);
        cleanup(&[p]);
    }

    #[test]
    fn counters_respect_invariants() {
        let p = write_temp_log("sheriff_sample_inv", "ERROR a\nplain 1\nplain 2\nDEBUG b\nnothing\n");
        let r = summarize(&SummarizeOptions { contains: Some("a".into()), ..opts(vec![p.clone()]) }).unwrap();
        assert!(r.matched_lines <= r.total_lines);
        assert!(r.matched_by_level.total() <= r.matched_lines);
        let distinct = r.top_lines.len();
        assert!(distinct as u64 <= r.matched_lines);
        cleanup(&[p]);
    }

    #[test]
    fn rejects_empty_file_list() {
        let err = summarize(&SummarizeOptions::default()).unwrap_err();
        assert!(matches!(err, SummarizeError::InvalidArgument(_)));
    }

    #[test]
    fn rejects_malformed_bounds_before_io() {
        let missing = std::env::temp_dir().join("sheriff_definitely_missing.log");
        let o = SummarizeOptions { since: Some("2026-02-09".into()), ..opts(vec![missing.clone()]) };
        let err = summarize(&o).unwrap_err();
        assert!(matches!(err, SummarizeError::InvalidArgument(ref m) if m.contains("--since")));
        let o = SummarizeOptions { until: Some("2026-02-09T18:01:03Z trailing".into()), ..opts(vec![missing]) };
        assert!(matches!(summarize(&o).unwrap_err(), SummarizeError::InvalidArgument(ref m) if m.contains("--until")));
    }

    #[test]
    fn rejects_since_after_until() {
        let p = write_temp_log("sheriff_sample_order", "x\n");
        let o = SummarizeOptions { since: Some("2026-02-09T18:01:05Z".into()), until: Some("2026-02-09T18:01:03Z".into()), ..opts(vec![p.clone()]) };
        assert!(matches!(summarize(&o).unwrap_err(), SummarizeError::InvalidArgument(_)));
        let o = SummarizeOptions { since: Some("2026-02-09T18:01:03Z".into()), until: Some("2026-02-09T18:01:03Z".into()), ..opts(vec![p.clone()]) };
        assert!(summarize(&o).is_ok());
        cleanup(&[p]);
    }

    #[test]
    fn missing_file_fails_fast() {
        let ok = write_temp_log("sheriff_sample_ok", "INFO x\n");
        let missing = std::env::temp_dir().join("sheriff_missing_input.log");
        let _ = std::fs::remove_file(&missing);
        let err = summarize(&opts(vec![ok.clone(), missing.clone()])).unwrap_err();
        match err {
            SummarizeError::FileOpen { path, .. } => assert_eq!(path, missing),
            other => panic!("unexpected error: {other}"),
        }
        cleanup(&[ok]);
    }

    #[test]
    fn invalid_utf8_lines_count_separately() {
        let p = write_temp_bytes("sheriff_sample_bytes", b"\xff x\n\xfe x\n");
        let r = summarize(&opts(vec![p.clone()])).unwrap();
        assert_eq!(r.total_lines, 2);
        assert_eq!(r.matched_lines, 2);
        assert_eq!(r.top_lines.len(), 2);
        assert!(r.top_lines.iter().all(|t| t.count == 1));
        cleanup(&[p]);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn unreadable_input_reports_read_error() {
        // a directory opens fine on linux but fails on the first read
        let dir = temp_path("sheriff_sample_dir");
        std::fs::create_dir_all(&dir).unwrap();
        let err = summarize(&opts(vec![dir.clone()])).unwrap_err();
        assert!(matches!(err, SummarizeError::FileRead { ref path, .. } if *path == dir), "unexpected error: {err}");
        let _ = std::fs::remove_dir(&dir);
    }

    #[test]
    fn json_shape() {
        let p = write_temp_log("sheriff_sample_json", "ERROR x=1\n");
        let r = summarize(&opts(vec![p.clone()])).unwrap();
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["matched_by_level"]["error"], 1);
        assert_eq!(v["matched_by_level"]["debug"], 0);
        assert_eq!(v["top_lines"][0]["line"], "ERROR x=<num>");
        assert_eq!(v["top_lines"][0]["count"], 1);
        cleanup(&[p]);
    }
}
