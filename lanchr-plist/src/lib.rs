//! # lanchr-plist
//!
//! Descriptor codec: reads and writes launchd property lists as a typed
//! [`Descriptor`], validates them, and packages them into portable
//! [`ExportBundle`]s.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use lanchr_plist::{parse, write, Validation};
//!
//! fn relabel(path: &Path) -> Result<(), lanchr_plist::PlistError> {
//!     let mut descriptor = parse(path)?;
//!     descriptor.label = Some("com.example.renamed".to_string());
//!     write(&descriptor, path, Validation::Full)
//! }
//! ```

pub mod bundle;
pub mod codec;
pub mod descriptor;
pub mod error;
pub mod template;

pub use bundle::ExportBundle;
pub use codec::{parse, validate, write, Validation};
pub use descriptor::{CalendarSchedule, Descriptor};
pub use error::{PlistError, ValidationError};
pub use template::{apply_defaults, parse_calendar_spec, Template};
