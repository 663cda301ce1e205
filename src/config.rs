use log_sheriff::Severity;
use serde::Deserialize;
use crate::{OutputFmt, SummarizeArgs, TextFormat};

pub const DEFAULT_CONFIG: &str = "log-sheriff.toml";

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    pub contains: Option<String>,
    pub level: Option<String>,
    pub since: Option<String>,
    pub until: Option<String>,
    pub top: Option<usize>,
    pub output: Option<OutputFmt>,
    pub text_format: Option<TextFormat>,
    pub json_path: Option<String>,
    pub csv_path: Option<String>,
    pub no_color: Option<bool>,
}

/// Reads the explicit config path, or the default file in the working
/// directory. Missing or malformed files are logged and skipped.
pub fn load_config(path: Option<&str>) -> Option<AppConfig> {
    let p = path.unwrap_or(DEFAULT_CONFIG);
    let data = match std::fs::read_to_string(p) {
        Ok(d) => d,
        Err(e) => {
            if path.is_some() { log::warn!("Failed to read config file {}: {}", p, e); }
            return None;
        }
    };
    match toml::from_str::<AppConfig>(&data) {
        Ok(cfg) => Some(cfg),
        Err(e) => { log::warn!("Failed to parse config file {}: {}", p, e); None }
    }
}

/// Fills options left unset on the command line.
pub fn apply_config(args: &mut SummarizeArgs, cfg: &AppConfig) -> anyhow::Result<()> {
    if args.contains.is_none() && let Some(v) = cfg.contains.as_ref() { args.contains = Some(v.clone()); }
    if args.level.is_none() && let Some(v) = cfg.level.as_ref() {
        args.level = Some(v.parse::<Severity>().map_err(|e| anyhow::anyhow!("config: {}", e))?);
    }
    if args.since.is_none() && let Some(v) = cfg.since.as_ref() { args.since = Some(v.clone()); }
    if args.until.is_none() && let Some(v) = cfg.until.as_ref() { args.until = Some(v.clone()); }
    if args.top.is_none() && let Some(v) = cfg.top {
        if v == 0 { anyhow::bail!("config: top must be a positive integer"); }
        args.top = Some(v);
    }
    if args.output.is_none() && let Some(v) = cfg.output { args.output = Some(v); }
    if args.text_format.is_none() && let Some(v) = cfg.text_format { args.text_format = Some(v); }
    if args.json_path.is_none() && let Some(v) = cfg.json_path.as_ref() { args.json_path = Some(v.clone()); }
    if args.csv_path.is_none() && let Some(v) = cfg.csv_path.as_ref() { args.csv_path = Some(v.clone()); }
    Ok(())
}
