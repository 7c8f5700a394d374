//! # lanchr-agent
//!
//! The service engine: [`Scanner`] builds the inventory, [`Manager`] runs
//! lifecycle operations against it, and [`Doctor`] diagnoses it.
//!
//! All three are generic over [`lanchr_launchctl::Executor`], so they run
//! against a fake service manager in tests.

pub mod doctor;
pub mod error;
pub mod manager;
pub mod scanner;

pub use doctor::{count_by_severity, diagnose, Doctor, Finding, Severity, SeverityCounts};
pub use error::{Action, AgentError};
pub use manager::Manager;
pub use scanner::{ParseFailure, ScanReport, Scanner};
