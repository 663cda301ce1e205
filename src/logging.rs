use anyhow::Context;
use log::LevelFilter;
use std::io::Write;

use crate::{LogFormat, LogLevel};

/// Logging flags gathered from the command line.
#[derive(Clone, Debug, Default)]
pub struct LogSettings {
    pub quiet: bool,
    pub verbose: u8,
    pub level: Option<LogLevel>,
    pub format: Option<LogFormat>,
    pub path: Option<String>,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

impl LogSettings {
    /// `--quiet` wins over `--log-level`, which wins over `-v` counts.
    /// `None` leaves the filter to `RUST_LOG`.
    pub fn filter(&self) -> Option<LevelFilter> {
        if self.quiet { return Some(LevelFilter::Error); }
        if let Some(level) = self.level { return Some(level.into()); }
        match self.verbose {
            0 => None,
            1 => Some(LevelFilter::Info),
            2 => Some(LevelFilter::Debug),
            _ => Some(LevelFilter::Trace),
        }
    }
}

fn json_line(ts: &str, level: log::Level, target: &str, msg: &str) -> serde_json::Value {
    serde_json::json!({ "ts": ts, "level": level.as_str(), "target": target, "msg": msg })
}

/// Installs the global logger. Records go to stderr unless a log path is set.
pub fn init(settings: &LogSettings) -> anyhow::Result<()> {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
    if let Some(filter) = settings.filter() { builder.filter_level(filter); }
    match settings.format {
        Some(LogFormat::Json) => {
            builder.format(|buf, record| {
                let ts = chrono::Local::now().to_rfc3339();
                writeln!(buf, "{}", json_line(&ts, record.level(), record.target(), &record.args().to_string()))
            });
        }
        Some(LogFormat::Text) => {
            builder.format(|buf, record| {
                writeln!(buf, "[{:<5} {}] {}", record.level(), chrono::Local::now().format("%H:%M:%S"), record.args())
            });
        }
        None => {}
    }
    if let Some(path) = settings.path.as_deref() {
        let f = std::fs::File::create(path).with_context(|| format!("cannot open log file {}", path))?;
        builder.target(env_logger::Target::Pipe(Box::new(f)));
    }
    builder.try_init().context("logger already initialised")?;
    Ok(())
}
