//! Immutable list values and their builder.
//!
//! A [`ListValue`] can only be read. To produce a changed list, move it
//! into a [`ListBuilder`] (which takes an exclusive copy of the elements),
//! mutate the builder, then [`ListBuilder::build`] a new list.

use std::fmt;
use std::sync::LazyLock;

use crate::cow::CowBox;
use crate::value::Value;

static EMPTY_LIST: LazyLock<CowBox<Vec<Value>>> = LazyLock::new(|| CowBox::new(Vec::new()));

#[derive(Clone)]
pub struct ListValue {
    items: CowBox<Vec<Value>>,
}

impl ListValue {
    /// The shared empty list.
    pub fn empty() -> Self {
        ListValue {
            items: EMPTY_LIST.clone(),
        }
    }

    pub fn new(items: Vec<Value>) -> Self {
        if items.is_empty() {
            return ListValue::empty();
        }
        ListValue {
            items: CowBox::new(items),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get().get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Value] {
        self.items.get()
    }

    /// Whether both lists alias the same storage.
    pub fn ptr_eq(&self, other: &ListValue) -> bool {
        CowBox::ptr_eq(&self.items, &other.items)
    }
}

impl Default for ListValue {
    fn default() -> Self {
        ListValue::empty()
    }
}

impl fmt::Debug for ListValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl FromIterator<Value> for ListValue {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        ListValue::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ListValue {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ──────────────────────────────────────────────
// Builder
// ──────────────────────────────────────────────

/// Exclusive, mutable staging area for a list. Not `Clone`.
#[derive(Debug, Default)]
pub struct ListBuilder {
    items: Vec<Value>,
}

impl ListBuilder {
    pub fn new() -> Self {
        ListBuilder { items: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        ListBuilder {
            items: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, value: impl Into<Value>) -> &mut Self {
        self.items.push(value.into());
        self
    }

    /// Replace the element at `index`, returning the old one.
    pub fn set(&mut self, index: usize, value: Value) -> Option<Value> {
        self.items
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, value))
    }

    pub fn pop(&mut self) -> Option<Value> {
        self.items.pop()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Freeze into an immutable list. An empty builder yields the shared
    /// empty list.
    pub fn build(self) -> ListValue {
        ListValue::new(self.items)
    }
}

impl From<ListValue> for ListBuilder {
    fn from(list: ListValue) -> Self {
        ListBuilder {
            items: list.items.into_inner(),
        }
    }
}

impl Extend<Value> for ListBuilder {
    fn extend<I: IntoIterator<Item = Value>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_lists_share_one_instance() {
        let a = ListBuilder::new().build();
        let b = ListBuilder::new().build();
        assert!(a.ptr_eq(&b));
        assert!(a.ptr_eq(&ListValue::empty()));
        assert!(ListValue::new(Vec::new()).ptr_eq(&a));
    }

    #[test]
    fn builder_does_not_touch_source() {
        let original = ListValue::new(vec![Value::Int(1), Value::Int(2)]);
        let alias = original.clone();
        let mut builder = ListBuilder::from(alias);
        builder.push(3i64);
        builder.set(0, Value::Int(10));
        let changed = builder.build();
        assert_eq!(original.len(), 2);
        assert_eq!(original.get(0), Some(&Value::Int(1)));
        assert_eq!(changed.len(), 3);
        assert_eq!(changed.get(0), Some(&Value::Int(10)));
    }

    #[test]
    fn builder_round_trip() {
        let list: ListValue = vec![Value::from("a"), Value::Bool(true)].into_iter().collect();
        let rebuilt = ListBuilder::from(list.clone()).build();
        assert_eq!(Value::List(rebuilt), Value::List(list));
    }

    #[test]
    fn emptied_builder_returns_canonical_empty() {
        let mut builder = ListBuilder::from(ListValue::new(vec![Value::Null]));
        builder.pop();
        assert!(builder.build().ptr_eq(&ListValue::empty()));
    }
}
