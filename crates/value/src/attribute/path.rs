use std::fmt;
use std::sync::Arc;

use super::qualifier::AttributeQualifier;
use crate::error::RuntimeError;

/// A concrete select chain rooted at a variable, e.g. `req.headers["k"]`.
///
/// Immutable; [`Attribute::step`] returns an extended copy.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Attribute {
    variable_name: Arc<str>,
    qualifier_path: Arc<[AttributeQualifier]>,
}

impl Attribute {
    pub fn new(variable_name: &str, qualifier_path: Vec<AttributeQualifier>) -> Self {
        Attribute {
            variable_name: variable_name.into(),
            qualifier_path: qualifier_path.into(),
        }
    }

    /// An attribute with an empty qualifier path.
    pub fn variable(variable_name: &str) -> Self {
        Attribute::new(variable_name, Vec::new())
    }

    pub fn variable_name(&self) -> &str {
        &self.variable_name
    }

    pub fn qualifier_path(&self) -> &[AttributeQualifier] {
        &self.qualifier_path
    }

    /// A new attribute with `qualifier` appended.
    pub fn step(&self, qualifier: impl Into<AttributeQualifier>) -> Attribute {
        let mut path = Vec::with_capacity(self.qualifier_path.len() + 1);
        path.extend_from_slice(&self.qualifier_path);
        path.push(qualifier.into());
        Attribute {
            variable_name: Arc::clone(&self.variable_name),
            qualifier_path: path.into(),
        }
    }

    /// Render as `var.field[1][2u][true]`. String qualifiers that are valid
    /// identifiers use dot syntax; others are quoted in brackets.
    pub fn as_string(&self) -> Result<String, RuntimeError> {
        let mut out = self.variable_name.to_string();
        for qualifier in self.qualifier_path.iter() {
            match qualifier {
                AttributeQualifier::String(s) if is_identifier(s) => {
                    out.push('.');
                    out.push_str(s);
                }
                AttributeQualifier::String(s) => out.push_str(&format!("[{:?}]", s)),
                AttributeQualifier::Int(i) => out.push_str(&format!("[{}]", i)),
                AttributeQualifier::Uint(u) => out.push_str(&format!("[{}u]", u)),
                AttributeQualifier::Bool(b) => out.push_str(&format!("[{}]", b)),
                AttributeQualifier::TypeKind(kind) => {
                    return Err(RuntimeError::InvalidArgument(format!(
                        "unsupported attribute qualifier kind {} in {}",
                        kind, self.variable_name
                    )))
                }
            }
        }
        Ok(out)
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_string() {
            Ok(text) => f.write_str(&text),
            Err(_) => {
                write!(f, "{}", self.variable_name)?;
                for q in self.qualifier_path.iter() {
                    write!(f, "[{}]", q)?;
                }
                Ok(())
            }
        }
    }
}
