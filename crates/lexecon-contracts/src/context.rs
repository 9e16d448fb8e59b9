//! Tagged context values carried by a decision request.
//!
//! Callers hand in heterogeneous data (strings, numbers, flags, nested
//! objects). Internally every value is one `ContextValue` variant so rule
//! conditions can match exhaustively and the canonical encoding used for
//! ledger hashing stays well defined.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The context mapping of a request. Key-ordered so that iteration and
/// serialization are deterministic.
pub type Context = BTreeMap<String, ContextValue>;

/// A single context value.
///
/// Serialized untagged, so `{"purpose": "support", "priority": 2}` maps to
/// `String` and `Integer` without any wrapper objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContextValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<ContextValue>),
    Map(BTreeMap<String, ContextValue>),
}

impl ContextValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ContextValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric ordering between two values.
    ///
    /// Integers compare as `i64` and floats as `f64`. A mixed pair is compared
    /// exactly, without rounding the integer to `f64`. Returns `None` if
    /// either side is not a number or a float is NaN.
    pub fn numeric_cmp(&self, other: &ContextValue) -> Option<Ordering> {
        match (self, other) {
            (ContextValue::Integer(a), ContextValue::Integer(b)) => Some(a.cmp(b)),
            (ContextValue::Float(a), ContextValue::Float(b)) => a.partial_cmp(b),
            (ContextValue::Integer(a), ContextValue::Float(b)) => cmp_int_float(*a, *b),
            (ContextValue::Float(a), ContextValue::Integer(b)) => {
                cmp_int_float(*b, *a).map(Ordering::reverse)
            }
            _ => None,
        }
    }

    /// Returns false if this value, or anything nested in it, is a NaN or
    /// infinite float.
    pub fn is_finite(&self) -> bool {
        match self {
            ContextValue::Float(f) => f.is_finite(),
            ContextValue::List(items) => items.iter().all(ContextValue::is_finite),
            ContextValue::Map(map) => map.values().all(ContextValue::is_finite),
            _ => true,
        }
    }

    /// Equality that treats `Integer(2)` and `Float(2.0)` as the same number.
    pub fn loosely_equals(&self, other: &ContextValue) -> bool {
        match (self, other) {
            (ContextValue::Integer(_), ContextValue::Float(_))
            | (ContextValue::Float(_), ContextValue::Integer(_)) => {
                self.numeric_cmp(other) == Some(Ordering::Equal)
            }
            _ => self == other,
        }
    }
}

/// Exact ordering of an `i64` against an `f64`.
///
/// `2^63` and `-2^63` are exactly representable as `f64`, so any float in
/// `[-2^63, 2^63)` truncates to an `i64` without loss; the fractional part
/// then settles ties.
fn cmp_int_float(int: i64, float: f64) -> Option<Ordering> {
    const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;

    if float.is_nan() {
        return None;
    }
    if float >= TWO_POW_63 {
        return Some(Ordering::Less);
    }
    if float < -TWO_POW_63 {
        return Some(Ordering::Greater);
    }

    let whole = float.trunc();
    match int.cmp(&(whole as i64)) {
        Ordering::Equal => 0.0_f64.partial_cmp(&(float - whole)),
        unequal => Some(unequal),
    }
}

/// Resolve a dotted path (`"ticket.priority"`) against a context mapping.
///
/// Each segment descends into a nested `Map`. Returns `None` as soon as a
/// segment is missing or the current value is not a map.
pub fn lookup<'a>(context: &'a Context, path: &str) -> Option<&'a ContextValue> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = context.get(first)?;
    for segment in segments {
        match current {
            ContextValue::Map(map) => current = map.get(segment)?,
            _ => return None,
        }
    }
    Some(current)
}

impl fmt::Display for ContextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextValue::Null => write!(f, "null"),
            ContextValue::Bool(b) => write!(f, "{b}"),
            ContextValue::Integer(i) => write!(f, "{i}"),
            ContextValue::Float(x) => write!(f, "{x}"),
            ContextValue::String(s) => write!(f, "{s}"),
            ContextValue::List(items) => {
                write!(f, "[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            ContextValue::Map(map) => {
                write!(f, "{{")?;
                for (idx, (key, value)) in map.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<&str> for ContextValue {
    fn from(value: &str) -> Self {
        ContextValue::String(value.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(value: String) -> Self {
        ContextValue::String(value)
    }
}

impl From<bool> for ContextValue {
    fn from(value: bool) -> Self {
        ContextValue::Bool(value)
    }
}

impl From<i64> for ContextValue {
    fn from(value: i64) -> Self {
        ContextValue::Integer(value)
    }
}

impl From<i32> for ContextValue {
    fn from(value: i32) -> Self {
        ContextValue::Integer(i64::from(value))
    }
}

impl From<f64> for ContextValue {
    fn from(value: f64) -> Self {
        ContextValue::Float(value)
    }
}

impl<T: Into<ContextValue>> From<Vec<T>> for ContextValue {
    fn from(values: Vec<T>) -> Self {
        ContextValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, ContextValue>> for ContextValue {
    fn from(map: BTreeMap<String, ContextValue>) -> Self {
        ContextValue::Map(map)
    }
}
