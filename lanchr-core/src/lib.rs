//! lanchr core library: the shared service model and platform table.
//!
//! - [`types`]: [`Service`] and its enums
//! - [`platform`]: [`Platform`], the descriptor directory and target table
//! - [`error`]: [`CoreError`]

pub mod error;
pub mod platform;
pub mod types;

pub use error::CoreError;
pub use platform::{Platform, PlistDir, PROTECTED_ROOT};
pub use types::{
    resolve_status, CalendarInterval, Domain, KeepAlive, KeepAliveConditions, Service,
    ServiceKind, ShadowedDescriptor, Status,
};
