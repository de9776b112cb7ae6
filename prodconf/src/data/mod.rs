//! Catalog definitions and the selection wire format.
//!
//! Both halves are plain serde types, so they can be read from any format the
//! caller likes. [`crate::files`] provides JSON and TOML loading by file
//! extension.
//!
//! - [`catalog`] - Feature and option definitions plus catalog validation
//! - [`selection`] - The nested `SelectedOption` wire format

/// Feature and option definitions plus catalog validation.
pub mod catalog;

/// The nested `SelectedOption` wire format.
pub mod selection;
