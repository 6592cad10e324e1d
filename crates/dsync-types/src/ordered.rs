//! Insertion-ordered string map used for both levels of the token tree.
//!
//! Document order matters for reproducible output, and duplicate keys must
//! survive loading so validation can report them. `BTreeMap` gives neither,
//! so both levels of the tree are backed by this small vector map.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A string-keyed map that preserves insertion order.
///
/// [`insert`](Self::insert) replaces an existing key in place, keeping its
/// original position. [`push`](Self::push) appends unconditionally and is
/// what deserialization uses, so a document with a repeated key keeps both
/// entries.
#[derive(Clone, Debug)]
pub struct OrderedMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> OrderedMap<V> {
    /// Create an empty map.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The first entry stored under `key`.
    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert or replace. A replaced entry keeps its position and the old
    /// value is returned.
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        match self.get_mut(&key) {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Append without checking for an existing key.
    pub fn push(&mut self, key: impl Into<String>, value: V) {
        self.entries.push((key.into(), value));
    }

    /// Remove every entry stored under `key`, returning the first.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let mut removed = None;
        let mut kept = Vec::with_capacity(self.entries.len());
        for (k, v) in self.entries.drain(..) {
            if k == key {
                if removed.is_none() {
                    removed = Some(v);
                }
            } else {
                kept.push((k, v));
            }
        }
        self.entries = kept;
        removed
    }

    /// Get the value under `key`, appending `default()` first if absent.
    pub fn get_or_insert_with(&mut self, key: &str, default: impl FnOnce() -> V) -> &mut V {
        let index = match self.entries.iter().position(|(k, _)| k == key) {
            Some(index) => index,
            None => {
                self.entries.push((key.to_string(), default()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[index].1
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut V)> {
        self.entries.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Keys that occur more than once, each reported once, in order of
    /// their second occurrence.
    pub fn duplicate_keys(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        let mut duplicates: Vec<&str> = Vec::new();
        for (key, _) in &self.entries {
            if seen.contains(&key.as_str()) {
                if !duplicates.contains(&key.as_str()) {
                    duplicates.push(key);
                }
            } else {
                seen.push(key);
            }
        }
        duplicates
    }
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Equality ignores entry order: two maps are equal when they hold the same
/// keys with equal values.
impl<V: PartialEq> PartialEq for OrderedMap<V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|o| o == v))
    }
}

impl<V> FromIterator<(String, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<V> IntoIterator for OrderedMap<V> {
    type Item = (String, V);
    type IntoIter = std::vec::IntoIter<(String, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct OrderedMapVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
    type Value = OrderedMap<V>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = OrderedMap::new();
        while let Some((k, v)) = access.next_entry::<String, V>()? {
            map.push(k, v);
        }
        Ok(map)
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_in_place() {
        let mut map = OrderedMap::new();
        map.insert("a", 1);
        map.insert("b", 2);
        assert_eq!(map.insert("a", 3), Some(1));
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(map.get("a"), Some(&3));
    }

    #[test]
    fn deserialize_keeps_document_order_and_duplicates() {
        let map: OrderedMap<u32> = serde_json::from_str(r#"{"z":1,"a":2,"z":3}"#).unwrap();
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["z", "a", "z"]);
        assert_eq!(map.duplicate_keys(), vec!["z"]);
        assert_eq!(map.get("z"), Some(&1));
    }

    #[test]
    fn serialize_in_insertion_order() {
        let mut map = OrderedMap::new();
        map.insert("zeta", 1);
        map.insert("alpha", 2);
        assert_eq!(serde_json::to_string(&map).unwrap(), r#"{"zeta":1,"alpha":2}"#);
    }

    #[test]
    fn equality_ignores_order() {
        let a: OrderedMap<u32> = [("x".to_string(), 1), ("y".to_string(), 2)].into_iter().collect();
        let b: OrderedMap<u32> = [("y".to_string(), 2), ("x".to_string(), 1)].into_iter().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn remove_drops_every_duplicate() {
        let mut map: OrderedMap<u32> = serde_json::from_str(r#"{"k":1,"j":2,"k":3}"#).unwrap();
        assert_eq!(map.remove("k"), Some(1));
        assert_eq!(map.len(), 1);
        assert!(map.remove("missing").is_none());
    }

    #[test]
    fn get_or_insert_with_appends_once() {
        let mut map: OrderedMap<Vec<u32>> = OrderedMap::new();
        map.get_or_insert_with("a", Vec::new).push(1);
        map.get_or_insert_with("a", Vec::new).push(2);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("a"), Some(&vec![1, 2]));
    }
}
