//! Gaps command: idle intervals in a single log file.

use std::fmt::Write;
use std::path::Path;

use anyhow::{Context, Result};
use wl_core::analysis::{log_file_name, read_log_lines};
use wl_core::counters::NOT_AVAILABLE;
use wl_core::timestamp::{format_clock, format_hms};
use wl_core::{TimeGap, find_time_gaps};

/// Formats the human-readable gap listing.
pub fn format_gaps(source: &str, threshold_secs: i64, gaps: &[TimeGap]) -> String {
    let mut output = String::new();

    writeln!(output, "TIME GAPS: {source}").unwrap();
    writeln!(output, "Threshold: {}", format_hms(threshold_secs)).unwrap();
    writeln!(output).unwrap();

    if gaps.is_empty() {
        writeln!(output, "No gaps found.").unwrap();
        return output;
    }

    for gap in gaps {
        writeln!(
            output,
            "{}-{}  {}  {}",
            format_clock(gap.start_time),
            format_clock(gap.end_time),
            gap.duration,
            gap.user.as_deref().unwrap_or(NOT_AVAILABLE)
        )
        .unwrap();
        writeln!(output, "  from: {}", gap.start_line).unwrap();
        writeln!(output, "  to:   {}", gap.end_line).unwrap();
    }

    let idle: i64 = gaps
        .iter()
        .map(|g| (g.end_time - g.start_time).num_seconds())
        .sum();
    writeln!(output).unwrap();
    writeln!(
        output,
        "Total idle: {} across {} gaps",
        format_hms(idle),
        gaps.len()
    )
    .unwrap();

    output
}

/// Runs the gaps command.
pub fn run(path: &Path, threshold_secs: i64, json: bool) -> Result<()> {
    let lines = read_log_lines(path)
        .with_context(|| format!("failed to read log file {}", path.display()))?;
    let log_file = log_file_name(path);
    let gaps = find_time_gaps(&lines, &log_file, threshold_secs);

    if json {
        println!("{}", serde_json::to_string_pretty(&gaps)?);
    } else {
        print!("{}", format_gaps(&log_file, threshold_secs, &gaps));
    }

    Ok(())
}
