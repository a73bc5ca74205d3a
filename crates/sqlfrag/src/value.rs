//! Loosely typed input values for the value escapers.
//!
//! Escaper helpers accept "whatever the caller has": scalars, strings, lists or
//! opaque objects. [`Value`] models that input and implements the coercion
//! table used by [`QueryEscaper::intvalue`](crate::QueryEscaper::intvalue) and
//! [`QueryEscaper::floatvalue`](crate::QueryEscaper::floatvalue):
//!
//! | input            | int                       | float                     |
//! |------------------|---------------------------|---------------------------|
//! | null             | 0                         | 0.0                       |
//! | bool             | 0 / 1                     | 0.0 / 1.0                 |
//! | float            | truncated toward zero     | itself                    |
//! | string           | leading integer prefix    | leading decimal prefix    |
//! | list             | 0 if empty, else 1        | 0.0 if empty, else 1.0    |
//! | object           | conversion error          | conversion error          |

use crate::error::{FragError, FragResult};

/// A dynamically typed escaper input.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    /// An opaque object; carries its type name for diagnostics.
    Object(String),
}

impl Value {
    /// Create an opaque object value.
    pub fn object(type_name: impl Into<String>) -> Self {
        Value::Object(type_name.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short type name used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Coerce to an integer, failing only for objects.
    pub fn to_int(&self) -> FragResult<i64> {
        match self {
            Value::Null => Ok(0),
            Value::Bool(b) => Ok(i64::from(*b)),
            Value::Int(i) => Ok(*i),
            Value::Float(f) => Ok(float_to_int(*f)),
            Value::Str(s) => Ok(parse_int_prefix(s)),
            Value::List(items) => Ok(i64::from(!items.is_empty())),
            Value::Object(_) => Err(FragError::conversion("object", "int")),
        }
    }

    /// Coerce to a float, failing only for objects.
    pub fn to_float(&self) -> FragResult<f64> {
        match self {
            Value::Null => Ok(0.0),
            Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Value::Int(i) => Ok(*i as f64),
            Value::Float(f) => Ok(*f),
            Value::Str(s) => Ok(parse_float_prefix(s)),
            Value::List(items) => Ok(if items.is_empty() { 0.0 } else { 1.0 }),
            Value::Object(_) => Err(FragError::conversion("object", "float")),
        }
    }

    /// Render a scalar the way a string cast would (`true` → `1`,
    /// `false`/null → empty). Lists and objects have no scalar text.
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            Value::Null => Some(String::new()),
            Value::Bool(true) => Some("1".to_string()),
            Value::Bool(false) => Some(String::new()),
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::Str(s) => Some(s.clone()),
            Value::List(_) | Value::Object(_) => None,
        }
    }
}

fn float_to_int(f: f64) -> i64 {
    if f.is_finite() {
        // `as` truncates toward zero and saturates at the i64 bounds.
        f as i64
    } else {
        0
    }
}

fn is_leading_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c')
}

/// Parse the leading `[ws][+-]digits` prefix; anything else is 0.
fn parse_int_prefix(s: &str) -> i64 {
    let s = s.trim_start_matches(is_leading_space);
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut acc: i64 = 0;
    for b in digits.bytes() {
        if !b.is_ascii_digit() {
            break;
        }
        let d = i64::from(b - b'0');
        acc = if negative {
            acc.saturating_mul(10).saturating_sub(d)
        } else {
            acc.saturating_mul(10).saturating_add(d)
        };
    }
    acc
}

/// Parse the leading `[ws][+-]digits[.digits][e[+-]digits]` prefix.
fn parse_float_prefix(s: &str) -> f64 {
    let s = s.trim_start_matches(is_leading_space);
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut mantissa_digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        mantissa_digits += frac_end - frac_start;
        if mantissa_digits > 0 {
            end = frac_end;
        }
    }
    if mantissa_digits == 0 {
        return 0.0;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().unwrap_or(0.0)
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}
