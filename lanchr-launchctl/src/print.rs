//! `launchctl print <service-target>` output.
//!
//! The dump is nested and undocumented; only flat `key = value` lines are
//! read and everything else is ignored.

use serde::Serialize;

/// The subset of `launchctl print` that lanchr surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceInfo {
    pub state: Option<String>,
    /// -1 when not running.
    pub pid: i64,
    pub path: Option<String>,
    pub bundle_id: Option<String>,
    pub program: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub runs: u64,
    pub last_exit_code: Option<String>,
    pub exit_timeout: Option<u64>,
    pub domain: Option<String>,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            state: None,
            pid: -1,
            path: None,
            bundle_id: None,
            program: None,
            kind: None,
            runs: 0,
            last_exit_code: None,
            exit_timeout: None,
            domain: None,
        }
    }
}

pub fn parse_print_service(output: &str) -> ServiceInfo {
    let mut info = ServiceInfo::default();

    for line in output.lines().map(str::trim) {
        let Some((key, value)) = line.split_once(" = ") else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "state" => info.state = Some(value.to_string()),
            "pid" => {
                if let Ok(pid) = value.parse() {
                    info.pid = pid;
                }
            }
            "path" => info.path = Some(value.to_string()),
            "bundle identifier" => info.bundle_id = Some(value.to_string()),
            "program" => info.program = Some(value.to_string()),
            "type" => info.kind = Some(value.to_string()),
            "runs" => {
                if let Ok(runs) = value.parse() {
                    info.runs = runs;
                }
            }
            "last exit code" => info.last_exit_code = Some(value.to_string()),
            // "5" or "5 seconds"
            "exit timeout" => {
                info.exit_timeout = value
                    .split_whitespace()
                    .next()
                    .and_then(|n| n.parse().ok());
            }
            "domain" => info.domain = Some(value.to_string()),
            _ => {}
        }
    }

    info
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_flat_keys() {
        let output = "gui/501/com.example.agent = {\n\
            \tactive count = 1\n\
            \tpath = /Users/me/Library/LaunchAgents/com.example.agent.plist\n\
            \ttype = LaunchAgent\n\
            \tstate = running\n\
            \tprogram = /usr/local/bin/agent\n\
            \truns = 3\n\
            \tpid = 4242\n\
            \tlast exit code = (never exited)\n\
            \texit timeout = 5 seconds\n\
            \tdomain = gui/501 [100005]\n\
            }\n";
        let info = parse_print_service(output);
        assert_eq!(info.state.as_deref(), Some("running"));
        assert_eq!(info.pid, 4242);
        assert_eq!(info.runs, 3);
        assert_eq!(info.kind.as_deref(), Some("LaunchAgent"));
        assert_eq!(info.last_exit_code.as_deref(), Some("(never exited)"));
        assert_eq!(info.exit_timeout, Some(5));
        assert_eq!(info.domain.as_deref(), Some("gui/501 [100005]"));
    }

    #[test]
    fn missing_pid_stays_negative() {
        let info = parse_print_service("state = not running\npid = ?\n");
        assert_eq!(info.pid, -1);
        assert_eq!(info.state.as_deref(), Some("not running"));
    }
}
