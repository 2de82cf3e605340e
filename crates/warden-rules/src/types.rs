//! # Declared Types
//!
//! The type names a schema may declare for a path, and the numeric
//! coercions applied before a type check.
//!
//! | Declared | Scalar | Coerced from |
//! |----------|--------|--------------|
//! | `string` | `String` | any scalar |
//! | `int`, `integer` | `Int` | integer-looking strings, optional leading `+`; `""` becomes null |
//! | `float`, `double` | `Float` | float-looking strings, ints; `""` becomes null |
//! | `bool`, `boolean` | `Bool` | ints, truthy/falsy strings; `""` becomes false |
//! | `date` | `Date` | nothing |

use std::fmt;
use std::str::FromStr;

use warden_core::{parse_integer_key, Node, RuleError, Scalar};

const TRUTHY: [&str; 4] = ["1", "true", "on", "yes"];
const FALSY: [&str; 4] = ["0", "false", "off", "no"];

/// A declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeName {
    String,
    Int,
    Bool,
    Float,
    Date,
}

impl TypeName {
    /// Parse a type name, case-insensitively, accepting the long aliases.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "string" => Some(Self::String),
            "int" | "integer" => Some(Self::Int),
            "bool" | "boolean" => Some(Self::Bool),
            "float" | "double" => Some(Self::Float),
            "date" => Some(Self::Date),
            _ => None,
        }
    }

    /// Canonical spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Bool => "bool",
            Self::Float => "float",
            Self::Date => "date",
        }
    }

    /// True if `value` is a scalar of this type.
    pub fn matches(self, value: &Node) -> bool {
        matches!(
            (self, value),
            (Self::String, Node::Scalar(Scalar::String(_)))
                | (Self::Int, Node::Scalar(Scalar::Int(_)))
                | (Self::Bool, Node::Scalar(Scalar::Bool(_)))
                | (Self::Float, Node::Scalar(Scalar::Float(_)))
                | (Self::Date, Node::Scalar(Scalar::Date(_)))
        )
    }

    /// The value `value` coerces to under this type, or `None` when it is
    /// left as is.
    pub fn coerce(self, value: &Node) -> Option<Node> {
        let Node::Scalar(scalar) = value else {
            return None;
        };
        match (self, scalar) {
            (Self::Int, Scalar::String(s)) if s.is_empty() => Some(Node::Null),
            (Self::Int, Scalar::String(s)) => parse_int(s).map(Node::from),

            (Self::Float, Scalar::String(s)) if s.is_empty() => Some(Node::Null),
            (Self::Float, Scalar::String(s)) => parse_float(s).map(Node::from),
            (Self::Float, Scalar::Int(i)) => Some(Node::from(*i as f64)),

            (Self::Bool, Scalar::Int(i)) => Some(Node::from(*i != 0)),
            (Self::Bool, Scalar::String(s)) => parse_bool(s).map(Node::from),

            (Self::String, Scalar::String(_)) => None,
            (Self::String, other) => Some(Node::from(other.render())),

            _ => None,
        }
    }
}

/// Parse a truthy or falsy string. Blank strings are false.
pub fn parse_bool(s: &str) -> Option<bool> {
    let s = s.trim().to_ascii_lowercase();
    if s.is_empty() || FALSY.contains(&s.as_str()) {
        Some(false)
    } else if TRUTHY.contains(&s.as_str()) {
        Some(true)
    } else {
        None
    }
}

/// Canonical integers with an optional leading `+`.
fn parse_int(s: &str) -> Option<i64> {
    let s = s.trim();
    match s.strip_prefix('+') {
        Some(rest) if rest.starts_with('-') => None,
        Some(rest) => parse_integer_key(rest),
        None => parse_integer_key(s),
    }
}

fn parse_float(s: &str) -> Option<f64> {
    let s = s.trim();
    // f64::from_str also accepts "inf" and "NaN"
    if !s.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<f64>().ok().filter(|f| f.is_finite())
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeName {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| RuleError::InvalidOptions {
            rule: "type".to_string(),
            reason: format!("unrecognized type name \"{s}\""),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn parses_aliases_case_insensitively() {
        assert_eq!(TypeName::parse("INTEGER"), Some(TypeName::Int));
        assert_eq!(TypeName::parse("Double"), Some(TypeName::Float));
        assert_eq!(TypeName::parse("boolean"), Some(TypeName::Bool));
        assert_eq!(TypeName::parse("date"), Some(TypeName::Date));
        assert_eq!(TypeName::parse("number"), None);
        assert!("list".parse::<TypeName>().is_err());
    }

    #[test]
    fn matches_exact_scalar_kinds() {
        assert!(TypeName::Int.matches(&Node::from(3)));
        assert!(!TypeName::Float.matches(&Node::from(3)));
        assert!(!TypeName::String.matches(&Node::Null));
        assert!(TypeName::Date.matches(&Node::from(
            Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
        )));
    }

    #[test]
    fn int_coercion() {
        assert_eq!(TypeName::Int.coerce(&Node::from(" 42 ")), Some(Node::from(42)));
        assert_eq!(TypeName::Int.coerce(&Node::from("")), Some(Node::Null));
        assert_eq!(TypeName::Int.coerce(&Node::from("4.2")), None);
        assert_eq!(TypeName::Int.coerce(&Node::from(1.0)), None);
    }

    #[test]
    fn int_coercion_accepts_explicit_plus_sign() {
        assert_eq!(TypeName::Int.coerce(&Node::from("+5")), Some(Node::from(5)));
        assert_eq!(TypeName::Int.coerce(&Node::from(" +0 ")), Some(Node::from(0)));
        assert_eq!(TypeName::Int.coerce(&Node::from("-5")), Some(Node::from(-5)));
        assert_eq!(TypeName::Int.coerce(&Node::from("+-5")), None);
        assert_eq!(TypeName::Int.coerce(&Node::from("+")), None);
        assert_eq!(TypeName::Int.coerce(&Node::from("+05")), None);
    }

    #[test]
    fn float_coercion_promotes_ints() {
        assert_eq!(TypeName::Float.coerce(&Node::from(3)), Some(Node::from(3.0)));
        assert_eq!(TypeName::Float.coerce(&Node::from("2.5")), Some(Node::from(2.5)));
        assert_eq!(TypeName::Float.coerce(&Node::from("inf")), None);
        assert_eq!(TypeName::Float.coerce(&Node::from("")), Some(Node::Null));
    }

    #[test]
    fn bool_coercion() {
        assert_eq!(TypeName::Bool.coerce(&Node::from(0)), Some(Node::from(false)));
        assert_eq!(TypeName::Bool.coerce(&Node::from(7)), Some(Node::from(true)));
        assert_eq!(TypeName::Bool.coerce(&Node::from(" Yes ")), Some(Node::from(true)));
        assert_eq!(TypeName::Bool.coerce(&Node::from("OFF")), Some(Node::from(false)));
        assert_eq!(TypeName::Bool.coerce(&Node::from("")), Some(Node::from(false)));
        assert_eq!(TypeName::Bool.coerce(&Node::from("maybe")), None);
    }

    #[test]
    fn string_coercion_renders_scalars() {
        assert_eq!(TypeName::String.coerce(&Node::from(true)), Some(Node::from("true")));
        assert_eq!(TypeName::String.coerce(&Node::from(12)), Some(Node::from("12")));
        assert_eq!(TypeName::String.coerce(&Node::from("x")), None);
        assert_eq!(TypeName::String.coerce(&Node::map()), None);
    }

    #[test]
    fn date_never_coerces() {
        assert_eq!(TypeName::Date.coerce(&Node::from("2020-01-01")), None);
    }
}
