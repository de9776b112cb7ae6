use crate::{
    data::catalog::SelectionKind,
    error::ConfigError,
    tree::OptionId,
};

use super::{ChangeCause, ProductConfiguration};

impl ProductConfiguration {
    /// Select or deselect an option.
    ///
    /// In a select-one feature, selecting deselects every sibling first. In a
    /// select-many feature only the target changes. Raises one change event
    /// once the whole mutation is applied.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidSelectionKind`] for options of a group feature.
    /// - [`ConfigError::UnknownOption`] for an id this configuration did not produce.
    ///
    /// On error the tree is left unchanged and no event is raised.
    pub fn set_selected(&mut self, option: OptionId, value: bool) -> Result<(), ConfigError> {
        self.expect_kind(option, "set_selected", |k| k.is_selectable())?;
        self.write_selection(option, value);
        self.emit(ChangeCause::Option {
            option,
            selected: value,
        });
        Ok(())
    }

    /// Make `option` the single selection of its feature.
    ///
    /// This is the single-selection path and only accepts options of
    /// select-one features.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidSelectionKind`] for group and select-many
    /// options, [`ConfigError::UnknownOption`] for foreign ids.
    pub fn select_exclusive(&mut self, option: OptionId) -> Result<(), ConfigError> {
        self.expect_kind(option, "select_exclusive", |k| k == SelectionKind::SelectOne)?;
        self.write_selection(option, true);
        self.emit(ChangeCause::Option {
            option,
            selected: true,
        });
        Ok(())
    }

    /// Flip the selection of an option. Returns the new state.
    ///
    /// # Errors
    ///
    /// Same as [`set_selected`](Self::set_selected).
    pub fn toggle(&mut self, option: OptionId) -> Result<bool, ConfigError> {
        self.expect_kind(option, "toggle", |k| k.is_selectable())?;
        let value = !self.options[option.0].selected;
        self.write_selection(option, value);
        self.emit(ChangeCause::Option {
            option,
            selected: value,
        });
        Ok(value)
    }

    fn expect_kind(
        &self,
        option: OptionId,
        operation: &'static str,
        allowed: impl Fn(SelectionKind) -> bool,
    ) -> Result<(), ConfigError> {
        let node = self
            .options
            .get(option.0)
            .ok_or(ConfigError::UnknownOption(option))?;
        let kind = self.features[node.feature.0].kind;
        if allowed(kind) {
            Ok(())
        } else {
            Err(ConfigError::InvalidSelectionKind {
                key: node.key.to_string(),
                kind,
                operation,
            })
        }
    }

    /// Apply the selection rule of the owning feature without notifying.
    pub(crate) fn write_selection(&mut self, option: OptionId, value: bool) {
        let feature = self.options[option.0].feature;
        let node = &self.features[feature.0];
        match node.kind {
            SelectionKind::SelectOne if value => {
                for sibling in &node.options {
                    self.options[sibling.0].selected = *sibling == option;
                }
            }
            SelectionKind::SelectOne | SelectionKind::SelectMany => {
                self.options[option.0].selected = value;
            }
            SelectionKind::Group => {}
        }
        trace!("{} -> {}", self.options[option.0].key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::fixtures;

    fn config() -> ProductConfiguration {
        ProductConfiguration::new(&fixtures::catalog(), &[]).unwrap()
    }

    fn selected(c: &ProductConfiguration, key: &str) -> bool {
        c.option(c.find_option(key).unwrap()).unwrap().is_selected()
    }

    #[test]
    fn test_select_one_replaces_sibling() {
        let mut c = config();
        let aa = c.find_option("feature-a/option-aa").unwrap();
        let ab = c.find_option("feature-a/option-ab").unwrap();

        c.set_selected(aa, true).unwrap();
        c.set_selected(ab, true).unwrap();
        assert!(!selected(&c, "feature-a/option-aa"));
        assert!(selected(&c, "feature-a/option-ab"));

        c.set_selected(ab, false).unwrap();
        assert!(!selected(&c, "feature-a/option-ab"));
        assert!(!selected(&c, "feature-a/option-aa"));
    }

    #[test]
    fn test_select_many_is_independent() {
        let mut c = config();
        let bag = c.find_option("extras/bag").unwrap();
        let strap = c.find_option("extras/strap").unwrap();

        c.set_selected(bag, true).unwrap();
        c.set_selected(strap, true).unwrap();
        c.set_selected(bag, false).unwrap();
        assert!(!selected(&c, "extras/bag"));
        assert!(selected(&c, "extras/strap"));
        assert!(c.toggle(bag).unwrap());
        assert!(selected(&c, "extras/strap"));
    }

    #[test]
    fn test_group_options_rejected() {
        let mut c = config();
        let base = c.find_option("bundle/base").unwrap();

        for result in [
            c.set_selected(base, true),
            c.select_exclusive(base),
            c.toggle(base).map(|_| ()),
        ] {
            assert!(matches!(
                result,
                Err(ConfigError::InvalidSelectionKind {
                    kind: SelectionKind::Group,
                    ..
                })
            ));
        }
        assert!(!selected(&c, "bundle/base"));
        assert_eq!(c.revision(), 0);
    }

    #[test]
    fn test_exclusive_path_rejects_select_many() {
        let mut c = config();
        let bag = c.find_option("extras/bag").unwrap();
        let err = c.select_exclusive(bag).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidSelectionKind {
                key: "extras/bag".into(),
                kind: SelectionKind::SelectMany,
                operation: "select_exclusive",
            }
        );
        assert!(!selected(&c, "extras/bag"));

        let ca = c.find_option("bundle/base/feature-c/option-ca").unwrap();
        c.select_exclusive(ca).unwrap();
        assert!(selected(&c, "bundle/base/feature-c/option-ca"));
    }

    #[test]
    fn test_unknown_option() {
        let mut c = config();
        let foreign = OptionId(10_000);
        assert_eq!(
            c.set_selected(foreign, true),
            Err(ConfigError::UnknownOption(foreign))
        );
    }

    #[test]
    fn test_one_event_per_call() {
        let mut c = config();
        let hits = std::rc::Rc::new(std::cell::Cell::new(0));
        let h = std::rc::Rc::clone(&hits);
        c.changes().listen(move |_| h.set(h.get() + 1));

        let aa = c.find_option("feature-a/option-aa").unwrap();
        let ab = c.find_option("feature-a/option-ab").unwrap();
        c.set_selected(aa, true).unwrap();
        c.set_selected(ab, true).unwrap();
        assert_eq!(hits.get(), 2);

        let base = c.find_option("bundle/base").unwrap();
        let _ = c.set_selected(base, true);
        assert_eq!(hits.get(), 2);
        assert_eq!(c.revision(), 2);
    }
}
