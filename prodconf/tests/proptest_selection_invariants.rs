//! Property tests for the selection rules of a configuration tree.

use std::collections::BTreeSet;

use prodconf::{Catalog, CatalogError, ConfigError, OptionId, ProductConfiguration, SelectionKind};
use proptest::prelude::*;
use serde_json::json;

// ── Helpers ──────────────────────────────────────────────────────────

fn catalog() -> Catalog {
    serde_json::from_value(json!({
        "featureRefs": ["frame", "wheels", "kit"],
        "featureDefs": [
            {"code": "frame", "kind": "selectOne", "options": [
                {"code": "alu", "featureRefs": ["paint"]},
                {"code": "carbon", "featureRefs": ["paint", "decals"]},
                {"code": "steel"}
            ]},
            {"code": "paint", "kind": "selectOne", "optional": true, "options": [
                {"code": "matte"}, {"code": "gloss"}, {"code": "raw"}
            ]},
            {"code": "decals", "kind": "selectMany", "optional": true, "options": [
                {"code": "logo"}, {"code": "stripes"}
            ]},
            {"code": "wheels", "kind": "selectMany", "options": [
                {"code": "front"}, {"code": "rear"}, {"code": "spare", "featureRefs": ["paint"]}
            ]},
            {"code": "kit", "kind": "group", "options": [
                {"code": "tools", "featureRefs": ["decals"]},
                {"code": "lights", "featureRefs": ["wheels"]}
            ]}
        ]
    }))
    .unwrap()
}

/// `front` and `back` share one `next` level, either as children of one
/// option or flattened by a group.
fn panel_catalog(front: &BTreeSet<String>, back: &BTreeSet<String>, grouped: bool) -> Catalog {
    let options = |codes: &BTreeSet<String>| {
        codes
            .iter()
            .map(|c| json!({"code": c}))
            .collect::<Vec<_>>()
    };
    let top = if grouped {
        json!({"code": "panel", "kind": "group", "options": [
            {"code": "l", "featureRefs": ["front"]},
            {"code": "r", "featureRefs": ["back"]}
        ]})
    } else {
        json!({"code": "panel", "kind": "selectOne", "options": [
            {"code": "custom", "featureRefs": ["front", "back"]}
        ]})
    };
    serde_json::from_value(json!({
        "featureRefs": ["panel"],
        "featureDefs": [
            top,
            {"code": "front", "kind": "selectOne", "options": options(front)},
            {"code": "back", "kind": "selectMany", "options": options(back)}
        ]
    }))
    .unwrap()
}

fn arb_codes() -> impl Strategy<Value = BTreeSet<String>> {
    proptest::collection::btree_set("[a-d]", 1..=3)
}

fn arb_ops() -> impl Strategy<Value = Vec<(usize, bool)>> {
    proptest::collection::vec((0usize..64, any::<bool>()), 0..=40)
}

fn option_at(c: &ProductConfiguration, i: usize) -> OptionId {
    let all: Vec<OptionId> = c.options().map(|(id, _)| id).collect();
    all[i % all.len()]
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Select-one features never hold more than one selection
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn select_one_exclusive(ops in arb_ops()) {
        let mut c = ProductConfiguration::new(&catalog(), &[]).unwrap();
        for (i, value) in ops {
            let option = option_at(&c, i);
            let _ = c.set_selected(option, value);

            for (id, feature) in c.features() {
                if feature.kind() == SelectionKind::SelectOne {
                    prop_assert!(c.selected_options(id).len() <= 1);
                }
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Select-many siblings are independent
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn select_many_independent(ops in arb_ops(), target in 0usize..64, value in any::<bool>()) {
        let mut c = ProductConfiguration::new(&catalog(), &[]).unwrap();
        for (i, v) in ops {
            let option = option_at(&c, i);
            let _ = c.set_selected(option, v);
        }

        let option = option_at(&c, target);
        let feature = c.option(option).unwrap().feature();
        prop_assume!(c.feature(feature).unwrap().kind() == SelectionKind::SelectMany);

        let siblings: Vec<(OptionId, bool)> = c
            .feature(feature)
            .unwrap()
            .options()
            .iter()
            .filter(|o| **o != option)
            .map(|o| (*o, c.option(*o).unwrap().is_selected()))
            .collect();

        c.set_selected(option, value).unwrap();
        for (sibling, before) in siblings {
            prop_assert_eq!(c.option(sibling).unwrap().is_selected(), before);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Group options reject every mutation
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn group_mutation_rejected(i in 0usize..64, value in any::<bool>()) {
        let mut c = ProductConfiguration::new(&catalog(), &[]).unwrap();
        let option = option_at(&c, i);
        let kind = c.feature(c.option(option).unwrap().feature()).unwrap().kind();
        prop_assume!(kind == SelectionKind::Group);

        let before = c.get_api_selection();
        prop_assert!(c.set_selected(option, value).is_err());
        prop_assert!(c.select_exclusive(option).is_err());
        prop_assert_eq!(c.get_api_selection(), before);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Serialized state rebuilds to the same serialized state
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn rebuild_round_trip(ops in arb_ops()) {
        let mut c = ProductConfiguration::new(&catalog(), &[]).unwrap();
        for (i, value) in ops {
            let option = option_at(&c, i);
            let _ = c.set_selected(option, value);
        }

        let selection = c.get_api_selection();
        let rebuilt = ProductConfiguration::new(&catalog(), &selection).unwrap();
        prop_assert_eq!(rebuilt.get_api_selection(), selection);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Features sharing a level either collide at validation or round-trip
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn shared_level_codes(front in arb_codes(), back in arb_codes(), grouped in any::<bool>()) {
        let catalog = panel_catalog(&front, &back, grouped);
        let overlap = front.intersection(&back).next().is_some();

        match ProductConfiguration::new(&catalog, &[]) {
            Err(err) => {
                prop_assert!(overlap);
                let is_ambiguous = matches!(
                    err,
                    ConfigError::Catalog(CatalogError::AmbiguousOptionCode { .. })
                );
                prop_assert!(is_ambiguous);
            }
            Ok(mut c) => {
                prop_assert!(!overlap);
                let (parent, front_key, back_key) = if grouped {
                    (None, "panel/l/front", "panel/r/back")
                } else {
                    (Some("panel/custom"), "panel/custom/front", "panel/custom/back")
                };
                if let Some(key) = parent {
                    let option = c.find_option(key).unwrap();
                    c.set_selected(option, true).unwrap();
                }
                for (feature, code) in [(front_key, front.iter().last()), (back_key, back.iter().next())] {
                    let code = code.unwrap();
                    let option = c.find_option(&format!("{feature}/{code}")).unwrap();
                    c.set_selected(option, true).unwrap();
                }

                let selection = c.get_api_selection();
                let rebuilt = ProductConfiguration::new(&catalog, &selection).unwrap();
                prop_assert_eq!(rebuilt.get_api_selection(), selection);
            }
        }
    }
}
