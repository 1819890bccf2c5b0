//! Observer implementations for rendering snapshots and reports.
//!
//! - [`table`] - Pretty-print counters as tables using the `tabled` crate
//! - [`json`] - Serialize snapshots and reports to JSON
//!
//! # Unified Error Handling
//!
//! All observers use a unified [`ObserverError`] type.
//!
//! # Feature Flags
//!
//! - `table` - Enables the [`table`] module (on by default)
//! - `json` - Enables the [`json`] module
//! - `full` - Enables all observer modules

mod error;

pub use error::{ObserverError, Result};

#[cfg(feature = "table")]
pub mod table;

#[cfg(feature = "json")]
pub mod json;
