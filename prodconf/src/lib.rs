//! # prodconf
//!
//! Product configuration trees built from a read-only catalog.
//!
//! A catalog lists features (decision points such as "color") and their
//! options. Options may reference further features, so picking an option
//! reveals a sub-tree of new decisions. [`ProductConfiguration`] instantiates
//! that graph as a live tree, enforces the per-feature selection rules and
//! converts the current state to and from the nested selection wire format.
//!
//! ## Features
//!
//! - Catalog validation with explicit selection kinds (group, select-one, select-many)
//! - Arena-backed tree with stable node keys and parent back-references
//! - Tolerant application of stored selections (unknown codes are skipped)
//! - Merge or replace semantics when restoring a selection
//! - Change notifications through [`Observable`], with linkable channels
//! - JSON and TOML catalog/selection files
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use prodconf::{ProductConfiguration, files};
//!
//! let catalog = files::load_catalog("shirt.json").unwrap();
//! let selection = files::load_selection("shirt-selection.json").unwrap();
//! let mut config = ProductConfiguration::new(&catalog, &selection).unwrap();
//!
//! let red = config.find_option("color/red").unwrap();
//! config.set_selected(red, true).unwrap();
//!
//! let wire = config.get_api_selection();
//! println!("{}", serde_json::to_string(&wire).unwrap());
//! ```
//!
//! ## Modules
//!
//! - [`data`] - Catalog definitions and the selection wire format
//! - [`tree`] - Live tree nodes and their identifiers
//! - [`configuration`] - Tree construction, mutation and serialization
//! - [`observable`] - Publish/subscribe primitive used for change notification
//! - [`render`] - Selection-kind dispatch for views over the tree
//! - [`files`] - Loading and saving catalogs and selections

#[macro_use]
extern crate log;

/// Catalog definitions and the selection wire format.
pub mod data;

/// Tree construction, mutation and serialization.
pub mod configuration;

/// Error types for catalog validation and tree mutation.
pub mod error;

/// Loading and saving catalogs and selections.
pub mod files;

/// Publish/subscribe primitive used for change notification.
pub mod observable;

/// Selection-kind dispatch for views over the tree.
pub mod render;

/// Live tree nodes and their identifiers.
pub mod tree;

pub use configuration::{ChangeCause, ConfigurationEvent, ProductConfiguration};
pub use data::catalog::{Catalog, FeatureDef, OptionDef, SelectionKind};
pub use data::selection::{NextMap, ROOT_CODE, SelectedOption};
pub use error::{CatalogError, ConfigError};
pub use observable::{ListenerId, Observable, ObservableRegistry, OriginToken};
pub use tree::{FeatureId, FeatureNode, NodeKey, OptionId, OptionNode};
