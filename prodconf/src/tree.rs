//! Live tree nodes.
//!
//! Nodes live in two arenas owned by
//! [`ProductConfiguration`](crate::ProductConfiguration); links between them,
//! including the parent back-references, are typed indices. An id is only
//! meaningful for the configuration that produced it.

use std::{borrow::Borrow, fmt, rc::Rc};

use crate::data::catalog::{FeatureDef, KEY_SEPARATOR, OptionDef, SelectionKind};

/// Index of a feature node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureId(pub(crate) usize);

/// Index of an option node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OptionId(pub(crate) usize);

impl FeatureId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl OptionId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "feature#{}", self.0)
    }
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "option#{}", self.0)
    }
}

/// Tree-wide unique identity of a node: the path of codes from the root.
///
/// The same feature definition reached through two options gets two keys,
/// e.g. `size/large/trim` and `size/small/trim`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(String);

impl NodeKey {
    pub(crate) fn root(code: &str) -> Self {
        NodeKey(code.to_string())
    }

    pub(crate) fn child(&self, code: &str) -> Self {
        NodeKey(format!("{}{}{}", self.0, KEY_SEPARATOR, code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Codes along the path, outermost first.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(KEY_SEPARATOR)
    }

    /// Nesting depth; top-level features are at depth 0.
    pub fn depth(&self) -> usize {
        self.segments().count().saturating_sub(1) / 2
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NodeKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for NodeKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A feature instantiated at one position in the tree.
#[derive(Debug, Clone)]
pub struct FeatureNode {
    pub(crate) def: Rc<FeatureDef>,
    pub(crate) kind: SelectionKind,
    pub(crate) key: NodeKey,
    pub(crate) parent: Option<OptionId>,
    pub(crate) options: Vec<OptionId>,
}

impl FeatureNode {
    pub fn def(&self) -> &FeatureDef {
        &self.def
    }

    pub fn code(&self) -> &str {
        &self.def.code
    }

    pub fn description(&self) -> &str {
        &self.def.description
    }

    pub fn kind(&self) -> SelectionKind {
        self.kind
    }

    pub fn is_optional(&self) -> bool {
        self.def.optional
    }

    pub fn key(&self) -> &NodeKey {
        &self.key
    }

    /// Option this feature was reached through, `None` at the top level.
    pub fn parent(&self) -> Option<OptionId> {
        self.parent
    }

    pub fn options(&self) -> &[OptionId] {
        &self.options
    }
}

/// An option instantiated under one feature node.
#[derive(Debug, Clone)]
pub struct OptionNode {
    pub(crate) feature_def: Rc<FeatureDef>,
    pub(crate) index: usize,
    pub(crate) key: NodeKey,
    pub(crate) feature: FeatureId,
    pub(crate) selected: bool,
    pub(crate) features: Vec<FeatureId>,
}

impl OptionNode {
    pub fn def(&self) -> &OptionDef {
        &self.feature_def.options[self.index]
    }

    pub fn code(&self) -> &str {
        &self.def().code
    }

    pub fn description(&self) -> &str {
        &self.def().description
    }

    pub fn thumbnail(&self) -> Option<&str> {
        self.def().thumbnail.as_deref()
    }

    pub fn key(&self) -> &NodeKey {
        &self.key
    }

    /// Feature owning this option.
    pub fn feature(&self) -> FeatureId {
        self.feature
    }

    /// Always `false` for options of a group feature.
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Features revealed by this option.
    pub fn features(&self) -> &[FeatureId] {
        &self.features
    }
}
