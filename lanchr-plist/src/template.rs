//! Built-in descriptor templates for `lanchr create`.
//!
//! | Template    | Preset keys                                 |
//! |-------------|---------------------------------------------|
//! | `simple`    | `RunAtLoad`                                 |
//! | `interval`  | `StartInterval = 300`                       |
//! | `calendar`  | `StartCalendarInterval = {Hour 0, Minute 0}`|
//! | `keepalive` | `RunAtLoad`, `KeepAlive = {Crashed true}`   |
//! | `watcher`   | `WatchPaths = [/tmp/watched]`               |

use std::fmt;
use std::str::FromStr;

use lanchr_core::{CalendarInterval, KeepAlive, KeepAliveConditions};

use crate::descriptor::{CalendarSchedule, Descriptor};
use crate::error::PlistError;

/// A named starting point for a new descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    Simple,
    Interval,
    Calendar,
    KeepAlive,
    Watcher,
}

impl Template {
    /// All templates in a stable order.
    pub fn all() -> &'static [Template] {
        &[
            Template::Simple,
            Template::Interval,
            Template::Calendar,
            Template::KeepAlive,
            Template::Watcher,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Template::Simple => "simple",
            Template::Interval => "interval",
            Template::Calendar => "calendar",
            Template::KeepAlive => "keepalive",
            Template::Watcher => "watcher",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Template::Simple => "Run once at login",
            Template::Interval => "Run every N seconds",
            Template::Calendar => "Run on a cron-like schedule",
            Template::KeepAlive => "Always running, restart on crash",
            Template::Watcher => "Run when watched paths change",
        }
    }

    /// The preset descriptor. Label and program are left for the caller.
    pub fn descriptor(&self) -> Descriptor {
        match self {
            Template::Simple => Descriptor {
                run_at_load: true,
                ..Default::default()
            },
            Template::Interval => Descriptor {
                start_interval: Some(300),
                ..Default::default()
            },
            Template::Calendar => Descriptor {
                start_calendar_interval: Some(CalendarSchedule::Single(CalendarInterval {
                    hour: Some(0),
                    minute: Some(0),
                    ..Default::default()
                })),
                ..Default::default()
            },
            Template::KeepAlive => Descriptor {
                run_at_load: true,
                keep_alive: Some(KeepAlive::Conditional(KeepAliveConditions {
                    crashed: Some(true),
                    ..Default::default()
                })),
                ..Default::default()
            },
            Template::Watcher => Descriptor {
                watch_paths: vec!["/tmp/watched".to_string()],
                ..Default::default()
            },
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Template {
    type Err = PlistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Template::all()
            .iter()
            .copied()
            .find(|t| t.name() == s)
            .ok_or_else(|| PlistError::UnknownTemplate {
                name: s.to_string(),
                available: Template::all()
                    .iter()
                    .map(Template::name)
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

/// Fill `/tmp/<label>.stdout.log` and `/tmp/<label>.stderr.log` when unset.
pub fn apply_defaults(descriptor: &mut Descriptor) {
    let label = descriptor.label().unwrap_or("unnamed").to_string();
    if descriptor.standard_out_path.is_none() {
        descriptor.standard_out_path = Some(format!("/tmp/{label}.stdout.log"));
    }
    if descriptor.standard_error_path.is_none() {
        descriptor.standard_error_path = Some(format!("/tmp/{label}.stderr.log"));
    }
}

/// Parse `"minute hour day month weekday"`. Trailing fields may be omitted;
/// `*` leaves a field as a wildcard.
pub fn parse_calendar_spec(spec: &str) -> Result<CalendarInterval, PlistError> {
    let parts: Vec<&str> = spec.split_whitespace().collect();
    if parts.len() > 5 {
        return Err(PlistError::CalendarSpec(format!(
            "expected at most 5 fields, got {}",
            parts.len()
        )));
    }

    let field = |index: usize, name: &str| -> Result<Option<i64>, PlistError> {
        match parts.get(index) {
            None | Some(&"*") => Ok(None),
            Some(raw) => raw
                .parse::<i64>()
                .map(Some)
                .map_err(|_| PlistError::CalendarSpec(format!("invalid {name}: {raw}"))),
        }
    };

    Ok(CalendarInterval {
        minute: field(0, "minute")?,
        hour: field(1, "hour")?,
        day: field(2, "day")?,
        month: field(3, "month")?,
        weekday: field(4, "weekday")?,
    })
}
