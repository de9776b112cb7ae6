//! Views over a configuration tree.
//!
//! The set of selection kinds is closed, so a view is a [`TreeRenderer`]
//! with one method per kind and [`render`] dispatches with an exhaustive
//! match. Only visible features are walked.

use crate::{
    configuration::ProductConfiguration,
    data::catalog::SelectionKind,
    tree::{FeatureId, FeatureNode, OptionNode},
};

/// Per-kind callbacks driven by [`render`].
///
/// `depth` is the nesting level of the feature (0 for top-level features);
/// options are reported at the depth of their feature.
pub trait TreeRenderer {
    /// A group feature. Its options follow as pass-through containers.
    fn group(&mut self, feature: &FeatureNode, depth: usize);

    /// A select-one feature.
    fn select_one(&mut self, feature: &FeatureNode, depth: usize);

    /// A select-many feature.
    fn select_many(&mut self, feature: &FeatureNode, depth: usize);

    /// One option of the feature most recently reported.
    fn option(&mut self, feature: &FeatureNode, option: &OptionNode, depth: usize);
}

/// Walk the visible tree depth-first in definition order.
pub fn render<R: TreeRenderer + ?Sized>(config: &ProductConfiguration, renderer: &mut R) {
    for feature in config.top_features() {
        render_feature(config, *feature, renderer);
    }
}

fn render_feature<R: TreeRenderer + ?Sized>(
    config: &ProductConfiguration,
    id: FeatureId,
    renderer: &mut R,
) {
    let Some(feature) = config.feature(id) else {
        return;
    };
    let depth = feature.key().depth();

    match feature.kind() {
        SelectionKind::Group => renderer.group(feature, depth),
        SelectionKind::SelectOne => renderer.select_one(feature, depth),
        SelectionKind::SelectMany => renderer.select_many(feature, depth),
    }

    for option_id in feature.options() {
        let Some(option) = config.option(*option_id) else {
            continue;
        };
        renderer.option(feature, option, depth);
        if config.is_option_active(*option_id) {
            for child in option.features() {
                render_feature(config, *child, renderer);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::fixtures;

    #[derive(Default)]
    struct Outline(Vec<String>);

    impl TreeRenderer for Outline {
        fn group(&mut self, feature: &FeatureNode, depth: usize) {
            self.0.push(format!("{}[group {}]", "  ".repeat(depth), feature.code()));
        }

        fn select_one(&mut self, feature: &FeatureNode, depth: usize) {
            self.0.push(format!("{}[one {}]", "  ".repeat(depth), feature.code()));
        }

        fn select_many(&mut self, feature: &FeatureNode, depth: usize) {
            self.0.push(format!("{}[many {}]", "  ".repeat(depth), feature.code()));
        }

        fn option(&mut self, _: &FeatureNode, option: &OptionNode, depth: usize) {
            let mark = if option.is_selected() { "x" } else { " " };
            self.0.push(format!("{}- ({mark}) {}", "  ".repeat(depth), option.code()));
        }
    }

    #[test]
    fn test_outline_hides_inactive_branches() {
        let mut c = ProductConfiguration::new(&fixtures::catalog(), &[]).unwrap();
        let mut out = Outline::default();
        render(&c, &mut out);
        assert_eq!(
            out.0,
            vec![
                "[one feature-a]",
                "- ( ) option-aa",
                "- ( ) option-ab",
                "[many extras]",
                "- ( ) bag",
                "- ( ) strap",
                "[group bundle]",
                "- ( ) base",
                "  [one feature-c]",
                "  - ( ) option-ca",
                "  - ( ) option-cb",
                "- ( ) addon",
                "  [many extras]",
                "  - ( ) bag",
                "  - ( ) strap",
            ]
        );

        let aa = c.find_option("feature-a/option-aa").unwrap();
        c.set_selected(aa, true).unwrap();
        let mut out = Outline::default();
        render(&c, &mut out);
        assert_eq!(&out.0[..5], &[
            "[one feature-a]",
            "- (x) option-aa",
            "  [one feature-c]",
            "  - ( ) option-ca",
            "  - ( ) option-cb",
        ]);
    }

    #[test]
    fn test_depth_follows_key_nesting() {
        let catalog: crate::Catalog = serde_json::from_value(serde_json::json!({
            "featureRefs": ["kit"],
            "featureDefs": [
                {"code": "kit", "kind": "group", "options": [{"code": "all", "featureRefs": ["size"]}]},
                {"code": "size", "kind": "selectOne", "options": [{"code": "l", "featureRefs": ["trim"]}]},
                {"code": "trim", "kind": "selectMany", "options": [{"code": "gold"}]}
            ]
        }))
        .unwrap();
        let mut c = ProductConfiguration::new(&catalog, &[]).unwrap();
        let l = c.find_option("kit/all/size/l").unwrap();
        c.set_selected(l, true).unwrap();

        let mut out = Outline::default();
        render(&c, &mut out);
        assert_eq!(
            out.0,
            vec![
                "[group kit]",
                "- ( ) all",
                "  [one size]",
                "  - (x) l",
                "    [many trim]",
                "    - ( ) gold",
            ]
        );
    }
}
