//! `launchctl print-disabled <domain-target>` output.

use std::collections::HashMap;

/// Map of label to disabled flag.
///
/// Accepts both the modern `"label" => disabled|enabled` form and the older
/// `"label" => true|false` form.
pub fn parse_print_disabled(output: &str) -> HashMap<String, bool> {
    output
        .lines()
        .map(str::trim)
        .filter_map(|line| line.split_once("=>"))
        .filter_map(|(label, value)| {
            let label = label.trim().trim_matches('"');
            if label.is_empty() {
                return None;
            }
            let disabled = matches!(value.trim(), "disabled" | "true");
            Some((label.to_string(), disabled))
        })
        .collect()
}
