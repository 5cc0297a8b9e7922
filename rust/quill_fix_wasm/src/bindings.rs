// Keyboard binding table of the editor, and removal of the bindings that
// would consume Tab so the page keeps its native focus navigation.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// A key as the editor identifies it: by name and by legacy key code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyTarget {
    pub name: &'static str,
    pub code: i64,
}

pub const TAB: KeyTarget = KeyTarget {
    name: "Tab",
    code: 9,
};

/// One entry of the binding table.
///
/// The editor accepts a bare key name, a bare key code, or an object whose
/// `key` field holds the key. Any other shape is kept as-is and never matches.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyBinding {
    Named(String),
    Coded(i64),
    Descriptor(Descriptor),
    Unrecognized(Value),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Descriptor {
    /// `None` only when the field is absent; an explicit `null` is kept.
    #[serde(
        default,
        deserialize_with = "present_key",
        skip_serializing_if = "Option::is_none"
    )]
    pub key: Option<DescriptorKey>,
    /// Modifiers, formats and everything else the editor attaches.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DescriptorKey {
    Named(String),
    Coded(i64),
    /// Any of the listed keys triggers the binding.
    Sequence(Vec<SequenceKey>),
    Unrecognized(Value),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SequenceKey {
    Named(String),
    Coded(i64),
    Unrecognized(Value),
}

fn present_key<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DescriptorKey>, D::Error> {
    DescriptorKey::deserialize(deserializer).map(Some)
}

impl KeyBinding {
    pub fn matches(&self, target: &KeyTarget) -> bool {
        match self {
            KeyBinding::Named(name) => name == target.name,
            KeyBinding::Coded(code) => *code == target.code,
            KeyBinding::Descriptor(descriptor) => descriptor
                .key
                .as_ref()
                .is_some_and(|key| key.matches(target)),
            KeyBinding::Unrecognized(_) => false,
        }
    }
}

impl DescriptorKey {
    pub fn matches(&self, target: &KeyTarget) -> bool {
        match self {
            DescriptorKey::Named(name) => name == target.name,
            DescriptorKey::Coded(code) => *code == target.code,
            DescriptorKey::Sequence(keys) => keys.iter().any(|key| key.matches(target)),
            DescriptorKey::Unrecognized(_) => false,
        }
    }
}

impl SequenceKey {
    /// Sequences list key names; a code inside one does not select the key.
    pub fn matches(&self, target: &KeyTarget) -> bool {
        match self {
            SequenceKey::Named(name) => name == target.name,
            SequenceKey::Coded(_) | SequenceKey::Unrecognized(_) => false,
        }
    }
}

/// Binding name -> binding, in the order the editor declared them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BindingTable {
    entries: Vec<(String, KeyBinding)>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a binding, replacing the value in place when the name exists.
    pub fn insert(&mut self, name: impl Into<String>, binding: KeyBinding) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = binding,
            None => self.entries.push((name, binding)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&KeyBinding> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, binding)| binding)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &KeyBinding)> {
        self.entries.iter().map(|(n, b)| (n.as_str(), b))
    }

    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("invalid binding table: {}", e))
    }

    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string(self).map_err(|e| format!("unserializable binding table: {}", e))
    }

    fn remove_matching(&mut self, target: &KeyTarget) -> Vec<String> {
        let mut removed = Vec::new();
        self.entries.retain(|(name, binding)| {
            if binding.matches(target) {
                removed.push(name.clone());
                false
            } else {
                true
            }
        });
        removed
    }
}

impl FromIterator<(String, KeyBinding)> for BindingTable {
    fn from_iter<I: IntoIterator<Item = (String, KeyBinding)>>(iter: I) -> Self {
        let mut table = BindingTable::new();
        for (name, binding) in iter {
            table.insert(name, binding);
        }
        table
    }
}

impl Serialize for BindingTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, binding) in &self.entries {
            map.serialize_entry(name, binding)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for BindingTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = BindingTable;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object of keyboard bindings")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<BindingTable, A::Error> {
                let mut table = BindingTable::new();
                while let Some((name, binding)) = access.next_entry::<String, KeyBinding>()? {
                    table.insert(name, binding);
                }
                Ok(table)
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

/// Names of the bindings that match `target`, in table order.
pub fn matching_names(table: &BindingTable, target: &KeyTarget) -> Vec<String> {
    table
        .iter()
        .filter(|(_, binding)| binding.matches(target))
        .map(|(name, _)| name.to_string())
        .collect()
}

/// Removes every binding that would consume Tab and returns the removed names.
/// Running it again removes nothing.
pub fn sanitize(table: &mut BindingTable) -> Vec<String> {
    sanitize_key(table, &TAB)
}

pub fn sanitize_key(table: &mut BindingTable, target: &KeyTarget) -> Vec<String> {
    table.remove_matching(target)
}
