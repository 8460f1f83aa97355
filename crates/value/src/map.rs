//! Immutable map values, their keys, and the map builder.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use crate::cow::CowBox;
use crate::error::RuntimeError;
use crate::kind::Kind;
use crate::value::Value;

static EMPTY_MAP: LazyLock<CowBox<BTreeMap<Key, Value>>> =
    LazyLock::new(|| CowBox::new(BTreeMap::new()));

// ──────────────────────────────────────────────
// Keys
// ──────────────────────────────────────────────

/// A map key. Only bool, int, uint and string values can be keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    Bool(bool),
    Int(i64),
    Uint(u64),
    String(String),
}

impl Key {
    pub fn from_value(value: &Value) -> Result<Key, RuntimeError> {
        match value {
            Value::Bool(b) => Ok(Key::Bool(*b)),
            Value::Int(i) => Ok(Key::Int(*i)),
            Value::Uint(u) => Ok(Key::Uint(*u)),
            Value::String(s) => Ok(Key::String(s.as_str().to_string())),
            other => Err(RuntimeError::InvalidMapKeyType {
                expected: "bool, int, uint or string".to_string(),
                got: other.kind().name().to_string(),
            }),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Key::Bool(b) => Value::Bool(*b),
            Key::Int(i) => Value::Int(*i),
            Key::Uint(u) => Value::Uint(*u),
            Key::String(s) => Value::from(s.as_str()),
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Key::Bool(_) => Kind::Bool,
            Key::Int(_) => Kind::Int,
            Key::Uint(_) => Kind::Uint,
            Key::String(_) => Kind::String,
        }
    }

    /// The same numeric key expressed in the other integer kind, when it
    /// fits.
    fn numeric_alias(&self) -> Option<Key> {
        match self {
            Key::Int(i) => u64::try_from(*i).ok().map(Key::Uint),
            Key::Uint(u) => i64::try_from(*u).ok().map(Key::Int),
            _ => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Bool(b) => write!(f, "{}", b),
            Key::Int(i) => write!(f, "{}", i),
            Key::Uint(u) => write!(f, "{}u", u),
            Key::String(s) => write!(f, "{:?}", s),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::String(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::String(s)
    }
}

impl From<i64> for Key {
    fn from(i: i64) -> Self {
        Key::Int(i)
    }
}

impl From<u64> for Key {
    fn from(u: u64) -> Self {
        Key::Uint(u)
    }
}

impl From<bool> for Key {
    fn from(b: bool) -> Self {
        Key::Bool(b)
    }
}

// ──────────────────────────────────────────────
// Map value
// ──────────────────────────────────────────────

#[derive(Clone)]
pub struct MapValue {
    entries: CowBox<BTreeMap<Key, Value>>,
}

impl MapValue {
    /// The shared empty map.
    pub fn empty() -> Self {
        MapValue {
            entries: EMPTY_MAP.clone(),
        }
    }

    /// Wrap a set of entries. When an int key and an equal uint key are
    /// both present, the later one in key order wins.
    pub fn new(entries: BTreeMap<Key, Value>) -> Self {
        let entries = if entries.keys().any(|k| k.numeric_alias().is_some_and(|a| entries.contains_key(&a))) {
            entries.into_iter().fold(BTreeMap::new(), |mut acc, (k, v)| {
                insert_entry(&mut acc, k, v);
                acc
            })
        } else {
            entries
        };
        if entries.is_empty() {
            return MapValue::empty();
        }
        MapValue {
            entries: CowBox::new(entries),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a key. An int key also finds an equal uint key and vice
    /// versa.
    pub fn get(&self, key: &Key) -> Option<&Value> {
        let entries = self.entries.get();
        entries
            .get(key)
            .or_else(|| key.numeric_alias().and_then(|alias| entries.get(&alias)))
    }

    /// Look up by a key value. Doubles with an exact integer value are
    /// accepted as numeric keys; any other double finds nothing.
    pub fn find(&self, key: &Value) -> Result<Option<&Value>, RuntimeError> {
        let key = match key {
            Value::Double(d) => {
                if !d.is_finite() || d.fract() != 0.0 {
                    return Ok(None);
                }
                if *d >= 0.0 && *d < 18446744073709551616.0 {
                    Key::Uint(*d as u64)
                } else if *d >= -9223372036854775808.0 && *d < 0.0 {
                    Key::Int(*d as i64)
                } else {
                    return Ok(None);
                }
            }
            other => Key::from_value(other)?,
        };
        Ok(self.get(&key))
    }

    pub fn contains_key(&self, key: &Key) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> std::collections::btree_map::Iter<'_, Key, Value> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.keys()
    }

    pub fn ptr_eq(&self, other: &MapValue) -> bool {
        CowBox::ptr_eq(&self.entries, &other.entries)
    }
}

impl Default for MapValue {
    fn default() -> Self {
        MapValue::empty()
    }
}

impl fmt::Debug for MapValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl FromIterator<(Key, Value)> for MapValue {
    fn from_iter<I: IntoIterator<Item = (Key, Value)>>(iter: I) -> Self {
        MapValue::new(iter.into_iter().collect())
    }
}

// ──────────────────────────────────────────────
// Builder
// ──────────────────────────────────────────────

/// Exclusive, mutable staging area for a map. Not `Clone`.
#[derive(Debug, Default)]
pub struct MapBuilder {
    entries: BTreeMap<Key, Value>,
}

impl MapBuilder {
    pub fn new() -> Self {
        MapBuilder {
            entries: BTreeMap::new(),
        }
    }

    /// Insert or replace. An int key replaces an equal uint key and vice
    /// versa, so a map never holds both.
    pub fn insert(&mut self, key: impl Into<Key>, value: impl Into<Value>) -> Option<Value> {
        insert_entry(&mut self.entries, key.into(), value.into())
    }

    /// Insert with a runtime key, rejecting kinds that cannot be keys.
    pub fn insert_value(&mut self, key: &Value, value: Value) -> Result<Option<Value>, RuntimeError> {
        let key = Key::from_value(key)?;
        Ok(insert_entry(&mut self.entries, key, value))
    }

    pub fn remove(&mut self, key: &Key) -> Option<Value> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Freeze into an immutable map. An empty builder yields the shared
    /// empty map.
    pub fn build(self) -> MapValue {
        MapValue::new(self.entries)
    }
}

fn insert_entry(entries: &mut BTreeMap<Key, Value>, key: Key, value: Value) -> Option<Value> {
    if let Some(alias) = key.numeric_alias() {
        if let Some(old) = entries.remove(&alias) {
            entries.insert(key, value);
            return Some(old);
        }
    }
    entries.insert(key, value)
}

impl From<MapValue> for MapBuilder {
    fn from(map: MapValue) -> Self {
        MapBuilder {
            entries: map.entries.into_inner(),
        }
    }
}
