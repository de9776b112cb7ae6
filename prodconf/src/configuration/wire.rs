use crate::{
    data::{
        catalog::SelectionKind,
        selection::{NextMap, ROOT_CODE, SelectedOption},
    },
    tree::{FeatureId, OptionId},
};

use super::{ChangeCause, ProductConfiguration};

impl ProductConfiguration {
    /// Serialize the current selection state.
    ///
    /// One entry per top-level feature, each with code [`ROOT_CODE`]. Every
    /// selected option contributes `next[code]`, recursing into its own
    /// features. Group features add no level of their own: the selections
    /// below their options are merged into the enclosing `next`. Entries
    /// follow tree definition order.
    pub fn get_api_selection(&self) -> Vec<SelectedOption> {
        self.top
            .iter()
            .map(|feature| {
                let mut root = SelectedOption::new(ROOT_CODE);
                self.collect_level(&[*feature], &mut root.next);
                root
            })
            .collect()
    }

    fn collect_level(&self, features: &[FeatureId], out: &mut NextMap) {
        for feature in features {
            let node = &self.features[feature.0];
            for option in &node.options {
                let option_node = &self.options[option.0];
                match node.kind {
                    SelectionKind::Group => self.collect_level(&option_node.features, out),
                    SelectionKind::SelectOne | SelectionKind::SelectMany => {
                        if option_node.selected {
                            let mut entry = SelectedOption::new(option_node.code());
                            self.collect_level(&option_node.features, &mut entry.next);
                            out.insert(entry.code.clone(), entry);
                        }
                    }
                }
            }
        }
    }

    /// Apply a wire selection onto the existing tree.
    ///
    /// Entry `i` walks top-level feature `i`; surplus entries are ignored and
    /// missing ones count as empty. With `reset_others`, every option at a
    /// visited position that the selection does not mention is deselected;
    /// without it, unmentioned options keep their state. Only mentioned
    /// options are descended into. Unknown codes are skipped.
    ///
    /// Raises exactly one change event.
    pub fn set_api_selection(&mut self, selection: &[SelectedOption], reset_others: bool) {
        self.apply_selection(selection, reset_others);
        self.emit(ChangeCause::ApiSelection { reset_others });
    }

    pub(crate) fn apply_selection(&mut self, selection: &[SelectedOption], reset_others: bool) {
        if selection.len() > self.top.len() {
            debug!(
                "ignoring {} selection entries beyond the {} top-level features",
                selection.len() - self.top.len(),
                self.top.len()
            );
        }

        let empty = NextMap::new();
        for i in 0..self.top.len() {
            let feature = self.top[i];
            let next = match selection.get(i) {
                Some(entry) => {
                    if !entry.is_root() {
                        debug!("top-level entry {i} has code {:?}, expected {ROOT_CODE:?}", entry.code);
                    }
                    &entry.next
                }
                None => &empty,
            };
            self.apply_level(&[feature], next, reset_others);
        }
    }

    fn apply_level(&mut self, features: &[FeatureId], next: &NextMap, reset_others: bool) {
        if log_enabled!(log::Level::Debug) {
            let mut known = Vec::new();
            self.level_codes(features, &mut known);
            for code in next.keys() {
                if !known.contains(&code) {
                    debug!("skipping unknown option `{code}` below {}", self.position(features));
                }
            }
        }
        self.apply_features(features, next, reset_others);
    }

    fn apply_features(&mut self, features: &[FeatureId], next: &NextMap, reset_others: bool) {
        for feature in features {
            let kind = self.features[feature.0].kind;
            let options = self.features[feature.0].options.clone();
            match kind {
                SelectionKind::Group => {
                    for option in options {
                        let children = self.options[option.0].features.clone();
                        self.apply_features(&children, next, reset_others);
                    }
                }
                SelectionKind::SelectOne => {
                    let mut chosen: Option<(OptionId, &SelectedOption)> = None;
                    for option in &options {
                        let Some(entry) = next.get(self.options[option.0].code()) else {
                            continue;
                        };
                        match chosen {
                            None => chosen = Some((*option, entry)),
                            Some(_) => warn!(
                                "`{}` already has a selection, ignoring `{}`",
                                self.features[feature.0].key,
                                self.options[option.0].code()
                            ),
                        }
                    }
                    match chosen {
                        Some((option, entry)) => {
                            self.write_selection(option, true);
                            self.descend(option, entry, reset_others);
                        }
                        None if reset_others => {
                            for option in &options {
                                self.options[option.0].selected = false;
                            }
                        }
                        None => {}
                    }
                }
                SelectionKind::SelectMany => {
                    for option in options {
                        match next.get(self.options[option.0].code()) {
                            Some(entry) => {
                                self.options[option.0].selected = true;
                                self.descend(option, entry, reset_others);
                            }
                            None if reset_others => self.options[option.0].selected = false,
                            None => {}
                        }
                    }
                }
            }
        }
    }

    fn descend(&mut self, option: OptionId, entry: &SelectedOption, reset_others: bool) {
        let children = self.options[option.0].features.clone();
        if !children.is_empty() {
            self.apply_level(&children, &entry.next, reset_others);
        }
    }

    fn level_codes<'s>(&'s self, features: &[FeatureId], out: &mut Vec<&'s str>) {
        for feature in features {
            let node = &self.features[feature.0];
            for option in &node.options {
                let option_node = &self.options[option.0];
                match node.kind {
                    SelectionKind::Group => self.level_codes(&option_node.features, out),
                    _ => out.push(option_node.code()),
                }
            }
        }
    }

    fn position(&self, features: &[FeatureId]) -> String {
        features
            .iter()
            .map(|f| self.features[f.0].key.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
