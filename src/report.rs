use comfy_table::{ContentArrangement, Table};
use log_sheriff::{Severity, SummaryResult};
use crate::paint;

fn counters(rep: &SummaryResult, no_header: bool) -> String {
    let mut s = String::new();
    if !no_header { s.push_str(&format!("{}\n", paint("Summary", "1;36"))); }
    s.push_str(&format!("Files processed: {}\n", rep.files_processed));
    s.push_str(&format!("Total lines:     {}\n", rep.total_lines));
    s.push_str(&format!("Matched lines:   {}\n", rep.matched_lines));
    let by_level: Vec<String> = Severity::ALL.iter().map(|l| format!("{}={}", l, rep.matched_by_level.get(*l))).collect();
    s.push_str(&format!("Matched by level: {}\n", by_level.join(" ")));
    s
}

pub fn render_lines(rep: &SummaryResult, no_header: bool) -> String {
    let mut s = counters(rep, no_header);
    s.push_str(&format!("\n{}\n", paint("Top lines:", "1")));
    if rep.top_lines.is_empty() {
        s.push_str("(no matching lines)\n");
        return s;
    }
    let cw = rep.top_lines.iter().map(|t| t.count.to_string().len()).max().unwrap_or(1).max(5);
    s.push_str(&format!("{:<4}  {:<cw$}  Normalized line\n", "Rank", "Count", cw = cw));
    for (i, t) in rep.top_lines.iter().enumerate() {
        s.push_str(&format!("{:<4}  {:<cw$}  {}\n", i + 1, t.count, t.line, cw = cw));
    }
    s
}

pub fn render_table(rep: &SummaryResult, no_header: bool) -> String {
    let mut s = counters(rep, no_header);
    s.push('\n');
    if rep.top_lines.is_empty() {
        s.push_str("(no matching lines)\n");
        return s;
    }
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![paint("Rank", "1"), paint("Count", "1"), paint("Normalized line", "1")]);
    for (i, t) in rep.top_lines.iter().enumerate() {
        table.add_row(vec![(i + 1).to_string(), t.count.to_string(), t.line.clone()]);
    }
    s.push_str(&format!("{}\n", table));
    s
}

pub fn render_json(rep: &SummaryResult) -> serde_json::Result<String> {
    serde_json::to_string_pretty(rep)
}

pub fn write_csv(path: &str, rep: &SummaryResult) -> Result<(), std::io::Error> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["rank", "count", "line"])?;
    for (i, t) in rep.top_lines.iter().enumerate() {
        wtr.write_record([(i + 1).to_string(), t.count.to_string(), t.line.clone()])?;
    }
    wtr.flush()?;
    Ok(())
}
