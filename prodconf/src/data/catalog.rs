use std::{collections::HashMap, fmt};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Separator used to build node keys from codes.
pub const KEY_SEPARATOR: char = '/';

/// Cardinality rule of a feature's options.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum SelectionKind {
    /// Pass-through container: every option is active, none is selectable.
    Group,
    /// At most one option selected at a time.
    SelectOne,
    /// Any number of independently selected options.
    SelectMany,
}

impl SelectionKind {
    /// Whether options of this kind carry a user-controlled `selected` flag.
    pub fn is_selectable(self) -> bool {
        !matches!(self, SelectionKind::Group)
    }
}

impl fmt::Display for SelectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SelectionKind::Group => "group",
            SelectionKind::SelectOne => "selectOne",
            SelectionKind::SelectMany => "selectMany",
        };
        f.write_str(s)
    }
}

/// Read-only catalog a configuration tree is built from.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    /// Top-level feature codes, in display order.
    pub feature_refs: Vec<String>,
    /// Every feature definition, top-level or referenced from an option.
    #[serde(default)]
    pub feature_defs: Vec<FeatureDef>,
}

/// A named decision point, e.g. "color".
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeatureDef {
    /// Unique feature code.
    pub code: String,
    /// Human readable label.
    #[serde(default)]
    pub description: String,
    /// Explicit selection kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<SelectionKind>,
    /// Legacy multi-select flag, accepted when `kind` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple: Option<bool>,
    /// Whether the feature may be left without a selection.
    #[serde(default, skip_serializing_if = "is_false")]
    pub optional: bool,
    /// Options in display order.
    #[serde(default)]
    pub options: Vec<OptionDef>,
}

/// One concrete choice under a feature, e.g. "red".
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OptionDef {
    /// Option code, unique within its feature.
    pub code: String,
    /// Human readable label.
    #[serde(default)]
    pub description: String,
    /// Optional thumbnail image reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// Features revealed by this option, in display order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub feature_refs: Vec<String>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl FeatureDef {
    /// Resolve the selection kind of this feature.
    ///
    /// An explicit `kind` wins; the legacy `multiple` flag alone only decides
    /// `selectMany`. A feature with neither cannot be classified.
    pub fn selection_kind(&self) -> Result<SelectionKind, CatalogError> {
        match (self.kind, self.multiple) {
            (Some(kind), None) => Ok(kind),
            (Some(SelectionKind::SelectMany), Some(true)) => Ok(SelectionKind::SelectMany),
            (Some(kind), Some(true)) if kind != SelectionKind::SelectMany => {
                Err(CatalogError::ConflictingSelectionKind {
                    feature: self.code.clone(),
                    kind,
                })
            }
            (Some(SelectionKind::SelectMany), Some(false)) => {
                Err(CatalogError::ConflictingSelectionKind {
                    feature: self.code.clone(),
                    kind: SelectionKind::SelectMany,
                })
            }
            (Some(kind), Some(_)) => Ok(kind),
            (None, Some(true)) => Ok(SelectionKind::SelectMany),
            (None, _) => Err(CatalogError::AmbiguousSelectionKind(self.code.clone())),
        }
    }

    /// Find an option definition by code.
    pub fn option(&self, code: &str) -> Option<&OptionDef> {
        self.options.iter().find(|o| o.code == code)
    }
}

/// Validated lookup table over a catalog's feature definitions.
#[derive(Debug, Clone)]
pub struct CatalogIndex<'a> {
    features: HashMap<&'a str, (&'a FeatureDef, SelectionKind)>,
}

impl<'a> CatalogIndex<'a> {
    /// Definition and resolved kind of a feature.
    pub fn get(&self, code: &str) -> Option<(&'a FeatureDef, SelectionKind)> {
        self.features.get(code).copied()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[derive(Clone, Copy)]
enum Mark {
    Visiting,
    Done,
}

impl Catalog {
    /// Find a feature definition by code.
    pub fn feature(&self, code: &str) -> Option<&FeatureDef> {
        self.feature_defs.iter().find(|f| f.code == code)
    }

    /// Validate the catalog and build a lookup index over it.
    ///
    /// # Errors
    ///
    /// Returns the first [`CatalogError`] found: bad or duplicate codes,
    /// unresolved or repeated references, unclassifiable kinds, a
    /// reference cycle, or option codes that would collide in one `next`
    /// level of the wire format.
    pub fn validate(&self) -> Result<CatalogIndex<'_>, CatalogError> {
        let mut features = HashMap::with_capacity(self.feature_defs.len());

        for def in &self.feature_defs {
            check_code(&def.code)?;
            let kind = def.selection_kind()?;
            if features.insert(def.code.as_str(), (def, kind)).is_some() {
                return Err(CatalogError::DuplicateFeature(def.code.clone()));
            }

            let mut seen = Vec::with_capacity(def.options.len());
            for option in &def.options {
                check_code(&option.code)?;
                if seen.contains(&option.code.as_str()) {
                    return Err(CatalogError::DuplicateOption {
                        feature: def.code.clone(),
                        option: option.code.clone(),
                    });
                }
                seen.push(option.code.as_str());
            }
        }

        let index = CatalogIndex { features };

        check_refs(&index, "featureRefs", &self.feature_refs)?;
        for def in &self.feature_defs {
            for option in &def.options {
                let from = format!("{}{}{}", def.code, KEY_SEPARATOR, option.code);
                check_refs(&index, &from, &option.feature_refs)?;
            }
        }

        let mut marks = HashMap::new();
        let mut path = Vec::new();
        for def in &self.feature_defs {
            visit(&index, def.code.as_str(), &mut marks, &mut path)?;
        }

        for code in &self.feature_refs {
            check_level(&index, code, std::slice::from_ref(code))?;
        }
        for def in &self.feature_defs {
            for option in &def.options {
                let position = format!("{}{}{}", def.code, KEY_SEPARATOR, option.code);
                check_level(&index, &position, &option.feature_refs)?;
            }
        }

        debug!("catalog validated: {} feature definitions", index.len());
        Ok(index)
    }
}

fn check_code(code: &str) -> Result<(), CatalogError> {
    if code.is_empty() {
        return Err(CatalogError::InvalidCode {
            code: code.to_string(),
            reason: "codes must not be empty",
        });
    }
    if code.contains(KEY_SEPARATOR) {
        return Err(CatalogError::InvalidCode {
            code: code.to_string(),
            reason: "codes must not contain `/`",
        });
    }
    Ok(())
}

fn check_refs(index: &CatalogIndex<'_>, from: &str, refs: &[String]) -> Result<(), CatalogError> {
    for (i, code) in refs.iter().enumerate() {
        if index.get(code).is_none() {
            return Err(CatalogError::UnknownFeatureRef {
                from: from.to_string(),
                code: code.clone(),
            });
        }
        if refs[..i].contains(code) {
            return Err(CatalogError::DuplicateFeatureRef {
                from: from.to_string(),
                code: code.clone(),
            });
        }
    }
    Ok(())
}

/// Reject option codes that collide once group features are flattened.
///
/// `features` are the features serialized into one `next` map: a top-level
/// feature on its own, or the children of one option. Must run after the
/// cycle check.
fn check_level(
    index: &CatalogIndex<'_>,
    position: &str,
    features: &[String],
) -> Result<(), CatalogError> {
    let mut codes = Vec::new();
    level_codes(index, features, &mut codes);
    for (i, code) in codes.iter().enumerate() {
        if codes[..i].contains(code) {
            return Err(CatalogError::AmbiguousOptionCode {
                position: position.to_string(),
                code: code.to_string(),
            });
        }
    }
    Ok(())
}

fn level_codes<'a>(index: &CatalogIndex<'a>, features: &[String], out: &mut Vec<&'a str>) {
    for code in features {
        let Some((def, kind)) = index.get(code) else {
            continue;
        };
        for option in &def.options {
            match kind {
                SelectionKind::Group => level_codes(index, &option.feature_refs, out),
                SelectionKind::SelectOne | SelectionKind::SelectMany => {
                    out.push(option.code.as_str())
                }
            }
        }
    }
}

fn visit<'a>(
    index: &CatalogIndex<'a>,
    code: &'a str,
    marks: &mut HashMap<&'a str, Mark>,
    path: &mut Vec<&'a str>,
) -> Result<(), CatalogError> {
    match marks.get(code) {
        Some(Mark::Done) => return Ok(()),
        Some(Mark::Visiting) => {
            let start = path.iter().position(|c| *c == code).unwrap_or(0);
            let mut cycle: Vec<String> = path[start..].iter().map(|c| c.to_string()).collect();
            cycle.push(code.to_string());
            return Err(CatalogError::CyclicReference { path: cycle });
        }
        None => {}
    }

    marks.insert(code, Mark::Visiting);
    path.push(code);

    if let Some((def, _)) = index.get(code) {
        for option in &def.options {
            for child in &option.feature_refs {
                visit(index, child.as_str(), marks, path)?;
            }
        }
    }

    path.pop();
    marks.insert(code, Mark::Done);
    Ok(())
}
