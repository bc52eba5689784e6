use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// The runtime value stored in or produced by a cell.
///
/// Only three shapes exist: nothing, a finite number, or text. There is no
/// boolean, no error code, and no array — a failed computation collapses to
/// [`Value::Empty`] rather than surfacing a typed error (see the evaluator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Empty,
    Number(f64),
    Text(String),
}

impl Value {
    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Render this value the way `+` concatenation and the serializer do:
    /// numbers via the host's default `f64` formatting, text verbatim, empty
    /// as an empty string.
    pub fn display_string(&self) -> String {
        match self {
            Value::Empty => String::new(),
            Value::Number(n) => crate::utils::formatting::format_number(*n),
            Value::Text(s) => s.clone(),
        }
    }
}

impl PartialOrd for Value {
    /// Cross-variant comparisons (and any comparison touching `Empty`) are
    /// undefined per the data model and always return `None`.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
            (Value::Text(a), Value::Text(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_componentwise() {
        assert_eq!(Value::Number(1.0), Value::Number(1.0));
        assert_ne!(Value::Number(1.0), Value::Text("1".to_string()));
        assert_eq!(Value::Empty, Value::Empty);
    }

    #[test]
    fn ordering_only_within_variant() {
        assert!(Value::Number(1.0) < Value::Number(2.0));
        assert!(Value::Text("a".to_string()) < Value::Text("b".to_string()));
        assert_eq!(
            Value::Number(1.0).partial_cmp(&Value::Text("1".to_string())),
            None
        );
        assert_eq!(Value::Empty.partial_cmp(&Value::Number(1.0)), None);
    }

    #[test]
    fn display_string_variants() {
        assert_eq!(Value::Empty.display_string(), "");
        assert_eq!(Value::Text("hi".to_string()).display_string(), "hi");
    }
}
