use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::OnceLock;
use anyhow::Context;
use clap::{ArgAction, ColorChoice, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use is_terminal::IsTerminal;
use log_sheriff::{Severity, SummarizeOptions, summarize::DEFAULT_TOP_N};
use serde::{Deserialize, Serialize};
mod config;
mod logging;
mod report;

static ENABLE_COLOR: OnceLock<bool> = OnceLock::new();

#[derive(Clone, Copy, Debug, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum OutputFmt { Text, Json }

#[derive(Clone, Copy, Debug, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum TextFormat { Lines, Table }

#[derive(Clone, Copy, Debug, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum LogFormat { Text, Json }

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel { Error, Warn, Info, Debug, Trace }

#[derive(Parser, Debug)]
#[command(
    name = "log-sheriff",
    about = "Stream log files and summarize matching lines",
    long_about = "Streams one or more log files, filters lines by substring, severity keyword and timestamp range, and reports the most frequent normalized lines.",
    after_long_help = "Examples:\n  log-sheriff summarize app.log\n  log-sheriff summarize a.log b.log --level warn --top 5\n  log-sheriff summarize app.log --contains timeout --json\n  log-sheriff summarize app.log --since 2026-02-09T18:00:00Z --until \"2026-02-09 19:00:00\"",
    color = ColorChoice::Auto
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
    /// Path to TOML config (default ./log-sheriff.toml)
    #[arg(long, global = true)]
    config: Option<String>,
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[arg(short = 'q', long, default_value_t = false, global = true)]
    quiet: bool,
    #[arg(long, value_enum, global = true)]
    log_level: Option<LogLevel>,
    #[arg(long, value_enum, global = true)]
    log_format: Option<LogFormat>,
    #[arg(long, global = true)]
    log_path: Option<String>,
    #[arg(long, short = 'C', default_value_t = false, global = true)]
    no_color: bool,
    #[arg(long, default_value_t = false, global = true)]
    force_color: bool,
    #[arg(long, value_enum)]
    completions: Option<Shell>,
    #[arg(long)]
    completions_out: Option<String>,
}

impl Cli {
    fn log_settings(&self) -> logging::LogSettings {
        logging::LogSettings {
            quiet: self.quiet,
            verbose: self.verbose,
            level: self.log_level,
            format: self.log_format,
            path: self.log_path.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize one or more log files.
    Summarize(SummarizeArgs),
}

#[derive(clap::Args, Debug, Default)]
struct SummarizeArgs {
    /// Input log files.
    #[arg(required = true, value_parser = existing_file)]
    files: Vec<PathBuf>,
    /// Filter lines containing this substring (case-sensitive).
    #[arg(long)]
    contains: Option<String>,
    /// Filter by level: error|warn|info|debug.
    #[arg(long, value_parser = parse_level)]
    level: Option<Severity>,
    /// Inclusive lower bound: YYYY-MM-DDTHH:MM:SSZ or YYYY-MM-DD HH:MM:SS.
    #[arg(long)]
    since: Option<String>,
    /// Inclusive upper bound, same formats as --since.
    #[arg(long)]
    until: Option<String>,
    /// Show top N normalized lines (default 10).
    #[arg(long, short = 'n', value_parser = parse_positive)]
    top: Option<usize>,
    /// Print JSON output (same as --output json).
    #[arg(long, default_value_t = false)]
    json: bool,
    #[arg(long, short = 'o', value_enum)]
    output: Option<OutputFmt>,
    #[arg(long, value_enum)]
    text_format: Option<TextFormat>,
    #[arg(long, short = 'j')]
    json_path: Option<String>,
    #[arg(long)]
    csv_path: Option<String>,
    #[arg(long, default_value_t = false)]
    no_header: bool,
}

impl SummarizeArgs {
    fn to_options(&self) -> SummarizeOptions {
        SummarizeOptions {
            files: self.files.clone(),
            contains: self.contains.clone(),
            level: self.level,
            since: self.since.clone(),
            until: self.until.clone(),
            top_n: self.top.unwrap_or(DEFAULT_TOP_N),
        }
    }

    fn output(&self) -> OutputFmt {
        if self.json { OutputFmt::Json } else { self.output.unwrap_or(OutputFmt::Text) }
    }
}

fn existing_file(s: &str) -> Result<PathBuf, String> {
    let p = PathBuf::from(s);
    if p.is_file() { Ok(p) } else { Err(format!("file does not exist: {}", s)) }
}

fn parse_level(s: &str) -> Result<Severity, String> {
    s.parse::<Severity>().map_err(|e| e.to_string())
}

fn parse_positive(s: &str) -> Result<usize, String> {
    match s.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("'{}' is not a positive integer", s)),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Some(sh) = cli.completions {
        let mut cmd = Cli::command();
        if let Some(path) = cli.completions_out.as_ref() && let Ok(mut f) = std::fs::File::create(path) {
            clap_complete::generate(sh, &mut cmd, "log-sheriff", &mut f);
        } else {
            clap_complete::generate(sh, &mut cmd, "log-sheriff", &mut std::io::stdout());
        }
        return ExitCode::SUCCESS;
    }
    if let Err(e) = logging::init(&cli.log_settings()) {
        eprintln!("error: {:#}", e);
        return ExitCode::FAILURE;
    }
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::debug!("{:?}", e);
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let Some(Command::Summarize(mut args)) = cli.command else {
        Cli::command().error(clap::error::ErrorKind::MissingSubcommand, "a subcommand is required").exit();
    };
    let cfg = config::load_config(cli.config.as_deref());
    if let Some(cfg) = cfg.as_ref() { config::apply_config(&mut args, cfg)?; }
    let no_color = cli.no_color || cfg.as_ref().and_then(|c| c.no_color).unwrap_or(false);

    let term = std::env::var("TERM").unwrap_or_default();
    let no_color_env = std::env::var_os("NO_COLOR").is_some();
    let color_default = std::io::stdout().is_terminal() && !no_color_env && term != "dumb";
    let enable_color = if cli.force_color { true } else { color_default && !no_color };
    let _ = ENABLE_COLOR.set(enable_color);

    let options = args.to_options();
    log::debug!("summarizing {} file(s), top {}", options.files.len(), options.top_n);
    let summary = log_sheriff::summarize(&options)?;
    log::info!("{} of {} lines matched across {} file(s)", summary.matched_lines, summary.total_lines, summary.files_processed);

    match args.output() {
        OutputFmt::Text => {
            let out = match args.text_format.unwrap_or(TextFormat::Lines) {
                TextFormat::Lines => report::render_lines(&summary, args.no_header),
                TextFormat::Table => report::render_table(&summary, args.no_header),
            };
            print!("{}", out);
        }
        OutputFmt::Json => {
            let json = report::render_json(&summary)?;
            if let Some(p) = args.json_path.as_ref() {
                std::fs::write(p, json).with_context(|| format!("JSON write failed for {}", p))?;
                if !cli.quiet { println!("{}", paint(&format!("JSON written: {}", p), "1;36")); }
            } else {
                println!("{}", json);
            }
        }
    }
    if let Some(p) = args.csv_path.as_ref() {
        report::write_csv(p, &summary).with_context(|| format!("CSV write failed for {}", p))?;
        if !cli.quiet && !matches!(args.output(), OutputFmt::Json) { println!("{}", paint(&format!("CSV written: {}", p), "1;36")); }
    }
    Ok(())
}

fn paint(s: &str, code: &str) -> String {
    if *ENABLE_COLOR.get().unwrap_or(&true) { format!("\x1b[{}m{}\x1b[0m", code, s) } else { s.to_string() }
}
