//! Sets of unknown attributes carried by `Value::Unknown`.

use crate::attribute::Attribute;
use crate::cow::CowBox;

/// The attributes a partially evaluated result depends on.
#[derive(Debug, Clone, Default)]
pub struct UnknownSet {
    attributes: CowBox<Vec<Attribute>>,
}

impl UnknownSet {
    pub fn new(attributes: Vec<Attribute>) -> Self {
        let mut set = UnknownSet::default();
        for attr in attributes {
            set.insert(attr);
        }
        set
    }

    pub fn from_attribute(attribute: Attribute) -> Self {
        UnknownSet {
            attributes: CowBox::new(vec![attribute]),
        }
    }

    pub fn attributes(&self) -> &[Attribute] {
        self.attributes.get()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn contains(&self, attribute: &Attribute) -> bool {
        self.attributes.contains(attribute)
    }

    pub fn insert(&mut self, attribute: Attribute) -> bool {
        if self.contains(&attribute) {
            return false;
        }
        self.attributes.mutable_get().push(attribute);
        true
    }

    /// Union with `other`, copying this set's storage if it is shared.
    pub fn merge(&mut self, other: &UnknownSet) {
        if CowBox::ptr_eq(&self.attributes, &other.attributes) {
            return;
        }
        for attr in other.attributes() {
            self.insert(attr.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_dedups_and_copies_on_write() {
        let a = Attribute::variable("a");
        let b = Attribute::variable("b");
        let left = UnknownSet::new(vec![a.clone(), a.clone()]);
        assert_eq!(left.len(), 1);

        let mut merged = left.clone();
        merged.merge(&UnknownSet::new(vec![a.clone(), b.clone()]));
        assert_eq!(merged.len(), 2);
        assert!(merged.contains(&b));
        assert_eq!(left.len(), 1);
        assert!(!left.contains(&b));
    }
}
