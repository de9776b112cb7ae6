use std::{collections::HashMap, rc::Rc};

use crate::{
    data::{
        catalog::{Catalog, CatalogIndex, FeatureDef},
        selection::SelectedOption,
    },
    error::{CatalogError, ConfigError},
    observable::Observable,
    tree::{FeatureId, FeatureNode, NodeKey, OptionId, OptionNode},
};

use super::{ConfigurationEvent, NodeRef, ProductConfiguration};

struct Builder<'a> {
    index: &'a CatalogIndex<'a>,
    shared: HashMap<&'a str, Rc<FeatureDef>>,
    features: Vec<FeatureNode>,
    options: Vec<OptionNode>,
    keys: HashMap<NodeKey, NodeRef>,
}

impl<'a> Builder<'a> {
    fn feature(
        &mut self,
        code: &str,
        parent: Option<(OptionId, &NodeKey)>,
    ) -> Result<FeatureId, CatalogError> {
        let (def, kind) = self
            .index
            .get(code)
            .ok_or_else(|| CatalogError::UnknownFeatureRef {
                from: parent.map_or_else(|| "featureRefs".to_string(), |(_, k)| k.to_string()),
                code: code.to_string(),
            })?;

        let shared = Rc::clone(
            self.shared
                .entry(def.code.as_str())
                .or_insert_with(|| Rc::new(def.clone())),
        );
        let key = match parent {
            Some((_, parent_key)) => parent_key.child(code),
            None => NodeKey::root(code),
        };

        let id = FeatureId(self.features.len());
        self.features.push(FeatureNode {
            def: Rc::clone(&shared),
            kind,
            key: key.clone(),
            parent: parent.map(|(option, _)| option),
            options: Vec::with_capacity(def.options.len()),
        });
        self.keys.insert(key.clone(), NodeRef::Feature(id));

        for (index, option_def) in def.options.iter().enumerate() {
            let option_key = key.child(&option_def.code);
            let option = OptionId(self.options.len());
            self.options.push(OptionNode {
                feature_def: Rc::clone(&shared),
                index,
                key: option_key.clone(),
                feature: id,
                selected: false,
                features: Vec::new(),
            });
            self.keys.insert(option_key.clone(), NodeRef::Option(option));

            let mut children = Vec::with_capacity(option_def.feature_refs.len());
            for child in &option_def.feature_refs {
                children.push(self.feature(child, Some((option, &option_key)))?);
            }
            self.options[option.0].features = children;
            self.features[id.0].options.push(option);
        }

        Ok(id)
    }
}

impl ProductConfiguration {
    /// Build a configuration tree and apply an initial selection.
    ///
    /// The initial selection is applied additively and raises no change
    /// event. Codes it mentions that the catalog does not know are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Catalog`] when the catalog does not validate.
    pub fn new(catalog: &Catalog, initial: &[SelectedOption]) -> Result<Self, ConfigError> {
        Self::with_observable(catalog, initial, Observable::new())
    }

    /// Like [`new`](Self::new), but raising change events on a caller
    /// provided observable, e.g. one created by an
    /// [`ObservableRegistry`](crate::ObservableRegistry).
    pub fn with_observable(
        catalog: &Catalog,
        initial: &[SelectedOption],
        changes: Observable<ConfigurationEvent>,
    ) -> Result<Self, ConfigError> {
        let index = catalog.validate()?;

        let mut builder = Builder {
            index: &index,
            shared: HashMap::new(),
            features: Vec::new(),
            options: Vec::new(),
            keys: HashMap::new(),
        };

        let mut top = Vec::with_capacity(catalog.feature_refs.len());
        for code in &catalog.feature_refs {
            top.push(builder.feature(code, None)?);
        }

        let Builder {
            features,
            options,
            keys,
            ..
        } = builder;

        let mut config = ProductConfiguration {
            features,
            options,
            top,
            keys,
            revision: 0,
            changes,
        };
        config.apply_selection(initial, false);

        debug!(
            "configuration built: {} features, {} options, {} top-level",
            config.features.len(),
            config.options.len(),
            config.top.len()
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{configuration::fixtures, data::catalog::SelectionKind};

    #[test]
    fn test_every_option_is_instantiated() {
        let c = ProductConfiguration::new(&fixtures::catalog(), &[]).unwrap();
        let fa = c.feature(c.top_features()[0]).unwrap();
        assert_eq!(fa.options().len(), 2);
        assert_eq!(fa.kind(), SelectionKind::SelectOne);
        assert!(c.options().all(|(_, o)| !o.is_selected()));

        let aa = c.option(fa.options()[0]).unwrap();
        assert_eq!(aa.features().len(), 1);
        let nested = c.feature(aa.features()[0]).unwrap();
        assert_eq!(nested.parent(), Some(fa.options()[0]));
        assert_eq!(nested.key().as_str(), "feature-a/option-aa/feature-c");
    }

    #[test]
    fn test_reused_definition_gets_distinct_nodes() {
        let c = ProductConfiguration::new(&fixtures::catalog(), &[]).unwrap();
        let first = c.find_feature("feature-a/option-aa/feature-c").unwrap();
        let second = c.find_feature("bundle/base/feature-c").unwrap();
        assert_ne!(first, second);
        assert_eq!(
            c.feature(first).unwrap().def(),
            c.feature(second).unwrap().def()
        );
    }

    #[test]
    fn test_invalid_catalog_rejected() {
        let catalog: Catalog = serde_json::from_value(json!({
            "featureRefs": ["a"],
            "featureDefs": [{"code": "a", "options": [{"code": "x"}]}]
        }))
        .unwrap();
        assert_eq!(
            ProductConfiguration::new(&catalog, &[]).unwrap_err(),
            ConfigError::Catalog(CatalogError::AmbiguousSelectionKind("a".into()))
        );
    }

    #[test]
    fn test_initial_selection_raises_no_event() {
        let changes = Observable::new();
        let hits = Rc::new(std::cell::Cell::new(0));
        let h = Rc::clone(&hits);
        changes.listen(move |_: &ConfigurationEvent| h.set(h.get() + 1));

        let selection = vec![SelectedOption::root().with(SelectedOption::new("option-ab"))];
        let c = ProductConfiguration::with_observable(&fixtures::catalog(), &selection, changes)
            .unwrap();
        assert_eq!(hits.get(), 0);
        assert_eq!(c.revision(), 0);
        let ab = c.find_option("feature-a/option-ab").unwrap();
        assert!(c.option(ab).unwrap().is_selected());
    }
}
