//! The configuration tree and its mutation root.
//!
//! [`ProductConfiguration`] owns every node of one live tree. It is built
//! from a [`Catalog`](crate::Catalog) plus an optional stored selection, is
//! mutated in place through [`set_selected`](ProductConfiguration::set_selected)
//! and friends, and converts to and from the wire format with
//! [`get_api_selection`](ProductConfiguration::get_api_selection) /
//! [`set_api_selection`](ProductConfiguration::set_api_selection).
//!
//! ## Architecture
//!
//! - [`build`] - Validation and eager instantiation of the catalog graph
//! - [`mutate`] - Selection rules per selection kind
//! - [`wire`] - Wire-format walk in both directions
//!
//! Every successful mutation bumps [`revision`](ProductConfiguration::revision)
//! and raises exactly one [`ConfigurationEvent`] on
//! [`changes`](ProductConfiguration::changes). Listeners get a snapshot of the
//! resulting selection; they cannot reach back into the configuration while it
//! is being mutated.

use std::collections::HashMap;

use crate::{
    data::{catalog::SelectionKind, selection::SelectedOption},
    observable::Observable,
    tree::{FeatureId, FeatureNode, NodeKey, OptionId, OptionNode},
};

/// Validation and eager instantiation of the catalog graph.
pub mod build;

/// Selection rules per selection kind.
pub mod mutate;

/// Wire-format walk in both directions.
pub mod wire;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeRef {
    Feature(FeatureId),
    Option(OptionId),
}

/// What triggered a [`ConfigurationEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeCause {
    /// A single option was written through `set_selected`, `select_exclusive` or `toggle`.
    Option { option: OptionId, selected: bool },
    /// A wire selection was applied with `set_api_selection`.
    ApiSelection { reset_others: bool },
}

/// Change notification raised once per successful mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationEvent {
    /// Configuration revision after the mutation.
    pub revision: u64,
    pub cause: ChangeCause,
    /// Wire selection after the mutation.
    pub selection: Vec<SelectedOption>,
}

/// A live product configuration tree.
#[derive(Debug)]
pub struct ProductConfiguration {
    features: Vec<FeatureNode>,
    options: Vec<OptionNode>,
    top: Vec<FeatureId>,
    keys: HashMap<NodeKey, NodeRef>,
    revision: u64,
    changes: Observable<ConfigurationEvent>,
}

impl ProductConfiguration {
    /// Top-level features, in catalog `featureRefs` order.
    pub fn top_features(&self) -> &[FeatureId] {
        &self.top
    }

    /// Every feature node with its id, in construction (depth-first) order.
    pub fn features(&self) -> impl Iterator<Item = (FeatureId, &FeatureNode)> {
        self.features
            .iter()
            .enumerate()
            .map(|(i, f)| (FeatureId(i), f))
    }

    /// Every option node with its id, in construction (depth-first) order.
    pub fn options(&self) -> impl Iterator<Item = (OptionId, &OptionNode)> {
        self.options.iter().enumerate().map(|(i, o)| (OptionId(i), o))
    }

    pub fn feature(&self, id: FeatureId) -> Option<&FeatureNode> {
        self.features.get(id.0)
    }

    pub fn option(&self, id: OptionId) -> Option<&OptionNode> {
        self.options.get(id.0)
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    /// Look up a feature by its node key, e.g. `size/large/trim`.
    pub fn find_feature(&self, key: &str) -> Option<FeatureId> {
        match self.keys.get(key) {
            Some(NodeRef::Feature(id)) => Some(*id),
            _ => None,
        }
    }

    /// Look up an option by its node key, e.g. `size/large`.
    pub fn find_option(&self, key: &str) -> Option<OptionId> {
        match self.keys.get(key) {
            Some(NodeRef::Option(id)) => Some(*id),
            _ => None,
        }
    }

    /// Currently selected options of a feature, in definition order.
    pub fn selected_options(&self, feature: FeatureId) -> Vec<OptionId> {
        self.feature(feature)
            .map(|f| {
                f.options
                    .iter()
                    .copied()
                    .filter(|o| self.options[o.0].selected)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether an option's sub-features are in play: it is selected, or it
    /// belongs to a group feature.
    pub fn is_option_active(&self, option: OptionId) -> bool {
        let Some(node) = self.option(option) else {
            return false;
        };
        node.selected || self.features[node.feature.0].kind == SelectionKind::Group
    }

    /// Whether a feature is reachable from the root through active options.
    pub fn is_visible(&self, feature: FeatureId) -> bool {
        let mut current = feature;
        loop {
            let Some(node) = self.feature(current) else {
                return false;
            };
            match node.parent {
                None => return true,
                Some(parent) => {
                    if !self.is_option_active(parent) {
                        return false;
                    }
                    current = self.options[parent.0].feature;
                }
            }
        }
    }

    /// Visible, non-optional select-one features without a selection.
    ///
    /// The tree never enforces "at least one"; this only reports where a
    /// selection is still expected.
    pub fn unsatisfied_features(&self) -> Vec<FeatureId> {
        self.features()
            .filter(|(id, f)| {
                f.kind == SelectionKind::SelectOne
                    && !f.is_optional()
                    && self.is_visible(*id)
                    && f.options.iter().all(|o| !self.options[o.0].selected)
            })
            .map(|(id, _)| id)
            .collect()
    }

    /// Number of successful mutations since construction.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Change notification channel.
    pub fn changes(&self) -> &Observable<ConfigurationEvent> {
        &self.changes
    }

    fn emit(&mut self, cause: ChangeCause) {
        self.revision += 1;
        if !self.changes.has_listeners() {
            return;
        }
        let event = ConfigurationEvent {
            revision: self.revision,
            cause,
            selection: self.get_api_selection(),
        };
        self.changes.notify_all(&event, None);
    }
}
