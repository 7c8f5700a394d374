//! Client for the launchd service manager.
//!
//! Everything goes through the [`Executor`] trait so the scanner and manager
//! can be driven by a fake in tests. [`LaunchctlExecutor`] is the real
//! implementation; it shells out to `launchctl` and refuses with
//! [`LaunchctlError::Unsupported`] on other platforms.

mod disabled;
mod error;
mod executor;
mod list;
mod print;

pub use disabled::parse_print_disabled;
pub use error::{LaunchctlError, PRIVILEGE_EXIT_CODE, PRIVILEGE_MARKERS};
pub use executor::{CommandRunner, Executor, LaunchctlExecutor, SystemRunner};
pub use list::{parse_list, ListEntry};
pub use print::{parse_print_service, ServiceInfo};
