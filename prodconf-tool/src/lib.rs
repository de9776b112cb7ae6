//! # prodconf-tool
//!
//! Library side of the `pconf` command line tool.
//!
//! - [`ctx`] - Catalog, selection paths and the change observable registry
//! - [`commands`] - One handler per subcommand
//! - [`render`] - Colored tree output

#[macro_use]
extern crate log;

pub mod commands;
pub mod ctx;
pub mod render;
