//! `launchctl list` output.

use serde::Serialize;

/// One row of `launchctl list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListEntry {
    /// Process id, or -1 when the job is not running.
    pub pid: i64,
    /// Last exit status; 0 when launchd reports none.
    pub status: i64,
    pub label: String,
}

/// Parse `PID\tStatus\tLabel` rows. The first line is a header.
///
/// Rows that are not tab-separated are split on whitespace instead; rows with
/// fewer than three fields are dropped.
pub fn parse_list(output: &str) -> Vec<ListEntry> {
    output
        .lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .filter_map(parse_row)
        .collect()
}

fn parse_row(line: &str) -> Option<ListEntry> {
    let tabbed: Vec<&str> = line.splitn(3, '\t').collect();
    let fields = if tabbed.len() == 3 {
        tabbed
    } else {
        let spaced: Vec<&str> = line.split_whitespace().collect();
        if spaced.len() < 3 {
            return None;
        }
        spaced
    };

    let label = fields[fields.len() - 1].trim();
    if label.is_empty() {
        return None;
    }

    Some(ListEntry {
        pid: number_or(fields[0], -1),
        status: number_or(fields[1], 0),
        label: label.to_string(),
    })
}

fn number_or(raw: &str, fallback: i64) -> i64 {
    match raw.trim() {
        "" | "-" => fallback,
        value => value.parse().unwrap_or(fallback),
    }
}
