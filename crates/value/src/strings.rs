//! String and bytes bodies, shared through [`CowBox`].

use std::fmt;

use crate::cow::CowBox;

#[derive(Clone, PartialEq, Eq)]
pub struct StringValue {
    body: CowBox<String>,
}

impl StringValue {
    pub fn new(s: impl Into<String>) -> Self {
        StringValue {
            body: CowBox::new(s.into()),
        }
    }

    pub fn as_str(&self) -> &str {
        self.body.get()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn ptr_eq(&self, other: &StringValue) -> bool {
        CowBox::ptr_eq(&self.body, &other.body)
    }

    pub fn into_string(self) -> String {
        self.body.into_inner()
    }
}

impl fmt::Debug for StringValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for StringValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for StringValue {
    fn from(s: &str) -> Self {
        StringValue::new(s)
    }
}

impl From<String> for StringValue {
    fn from(s: String) -> Self {
        StringValue::new(s)
    }
}

impl PartialOrd for StringValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for StringValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_str().cmp(other.as_str())
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct BytesValue {
    body: CowBox<Vec<u8>>,
}

impl BytesValue {
    pub fn new(b: impl Into<Vec<u8>>) -> Self {
        BytesValue {
            body: CowBox::new(b.into()),
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        self.body.get()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.body.into_inner()
    }
}

impl fmt::Debug for BytesValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b\"")?;
        for b in self.as_slice() {
            for c in std::ascii::escape_default(*b) {
                write!(f, "{}", c as char)?;
            }
        }
        write!(f, "\"")
    }
}

impl From<&[u8]> for BytesValue {
    fn from(b: &[u8]) -> Self {
        BytesValue::new(b.to_vec())
    }
}

impl From<Vec<u8>> for BytesValue {
    fn from(b: Vec<u8>) -> Self {
        BytesValue::new(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_body() {
        let a = StringValue::new("hello");
        let b = a.clone();
        assert!(a.ptr_eq(&b));
        assert_eq!(b.into_string(), "hello");
        assert_eq!(a.as_str(), "hello");
    }

    #[test]
    fn bytes_debug_escapes() {
        let b = BytesValue::new(vec![b'a', 0, b'"']);
        assert_eq!(format!("{:?}", b), "b\"a\\x00\\\"\"");
    }
}
