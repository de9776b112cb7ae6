//! Wire-format selection.
//!
//! ```text
//! SelectedOption = { code: string, next?: { [optionCode: string]: SelectedOption } }
//! ```
//!
//! A full selection is a `Vec<SelectedOption>` aligned by position with the
//! catalog's top-level `featureRefs`. Top-level entries carry [`ROOT_CODE`]
//! as their code since they have no enclosing option.

use std::{borrow::Cow, fmt};

use schemars::{JsonSchema, Schema, SchemaGenerator, json_schema};
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{MapAccess, Visitor},
    ser::SerializeMap,
};

/// Code carried by top-level selection entries.
pub const ROOT_CODE: &str = "!~!";

/// One selected option and the selections beneath it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SelectedOption {
    /// Option code, or [`ROOT_CODE`] at the top level.
    pub code: String,
    /// Selected sub-options keyed by option code.
    #[serde(default, skip_serializing_if = "NextMap::is_empty")]
    pub next: NextMap,
}

impl SelectedOption {
    /// A selected option without sub-selections.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            next: NextMap::new(),
        }
    }

    /// An empty top-level entry.
    pub fn root() -> Self {
        Self::new(ROOT_CODE)
    }

    /// Add a sub-selection keyed by its own code.
    pub fn with(mut self, child: SelectedOption) -> Self {
        self.next.insert(child.code.clone(), child);
        self
    }

    pub fn is_root(&self) -> bool {
        self.code == ROOT_CODE
    }
}

/// Insertion-ordered map of option code to sub-selection.
///
/// Order is kept through deserialization and serialization so that output
/// follows tree definition order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NextMap {
    entries: Vec<(String, SelectedOption)>,
}

impl NextMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, code: &str) -> Option<&SelectedOption> {
        self.entries.iter().find(|(k, _)| k == code).map(|(_, v)| v)
    }

    pub fn contains_key(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    /// Insert or replace an entry. A replaced entry keeps its position.
    pub fn insert(&mut self, code: String, value: SelectedOption) -> Option<SelectedOption> {
        if let Some((_, slot)) = self.entries.iter_mut().find(|(k, _)| *k == code) {
            return Some(std::mem::replace(slot, value));
        }
        self.entries.push((code, value));
        None
    }

    pub fn remove(&mut self, code: &str) -> Option<SelectedOption> {
        let pos = self.entries.iter().position(|(k, _)| k == code)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SelectedOption)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, SelectedOption)> for NextMap {
    fn from_iter<I: IntoIterator<Item = (String, SelectedOption)>>(iter: I) -> Self {
        let mut map = NextMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl Serialize for NextMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct NextMapVisitor;

impl<'de> Visitor<'de> for NextMapVisitor {
    type Value = NextMap;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of option code to selected option")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<NextMap, A::Error> {
        let mut map = NextMap::new();
        while let Some((k, v)) = access.next_entry::<String, SelectedOption>()? {
            map.insert(k, v);
        }
        Ok(map)
    }
}

impl<'de> Deserialize<'de> for NextMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(NextMapVisitor)
    }
}

impl JsonSchema for NextMap {
    fn schema_name() -> Cow<'static, str> {
        "NextMap".into()
    }

    fn inline_schema() -> bool {
        true
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        json_schema!({
            "type": "object",
            "additionalProperties": generator.subschema_for::<SelectedOption>(),
        })
    }
}

/// Table wrapper used where a format cannot hold a bare array at the root.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SelectionDocument {
    pub selection: Vec<SelectedOption>,
}
