//! The typed launchd descriptor record.
//!
//! Keys follow launchd.plist(5). Unknown keys are ignored on decode; unset
//! optional keys are omitted on encode.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use lanchr_core::{CalendarInterval, KeepAlive};

/// A parsed launch agent or daemon descriptor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Descriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub program_arguments: Vec<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub enable_globbing: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment_variables: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard_out_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard_error_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard_in_path: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub run_at_load: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_alive: Option<KeepAlive>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_interval: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_calendar_interval: Option<CalendarSchedule>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub start_on_mount: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub watch_paths: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub queue_directories: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_directory: Option<String>,
    #[serde(rename = "ExitTimeOut", default, skip_serializing_if = "Option::is_none")]
    pub exit_timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throttle_interval: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_groups: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nice: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_type: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub abandon_process_group: bool,
    #[serde(rename = "LowPriorityIO", default, skip_serializing_if = "is_false")]
    pub low_priority_io: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub launch_only_once: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub mach_services: BTreeMap<String, plist::Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sockets: BTreeMap<String, plist::Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub launch_events: BTreeMap<String, plist::Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub hard_resource_limits: BTreeMap<String, i64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub soft_resource_limits: BTreeMap<String, i64>,
}

/// `StartCalendarInterval` is a single dictionary or an array of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CalendarSchedule {
    Single(CalendarInterval),
    Many(Vec<CalendarInterval>),
}

impl CalendarSchedule {
    pub fn intervals(&self) -> Vec<CalendarInterval> {
        match self {
            CalendarSchedule::Single(interval) => vec![interval.clone()],
            CalendarSchedule::Many(intervals) => intervals.clone(),
        }
    }
}

impl Descriptor {
    /// The `Label` key, treating an empty string as absent.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref().filter(|label| !label.is_empty())
    }

    /// `Program`, falling back to the first `ProgramArguments` entry.
    pub fn program_path(&self) -> Option<&str> {
        match self.program.as_deref() {
            Some(program) if !program.is_empty() => Some(program),
            _ => self
                .program_arguments
                .first()
                .map(String::as_str)
                .filter(|arg| !arg.is_empty()),
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}
