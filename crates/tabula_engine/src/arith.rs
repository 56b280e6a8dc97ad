//! Built-in semantics for primitive operands.
//!
//! The dispatcher tries these before consulting any metatable. Each helper
//! returns `None` when the operands have no primitive form for the
//! operation, which is the signal to resolve a handler instead.

// Mixed int/float arithmetic follows float semantics
#![allow(clippy::cast_precision_loss)]

use std::cmp::Ordering;

use tabula_foundation::{Error, ErrorKind, MetaMethod, Result, Value, float_to_int, format_float};

/// A numeric view of a value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    /// An integer.
    Int(i64),
    /// A float.
    Float(f64),
}

impl Number {
    fn to_f64(self) -> f64 {
        match self {
            Self::Int(i) => i as f64,
            Self::Float(f) => f,
        }
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        match n {
            Number::Int(i) => Value::Int(i),
            Number::Float(f) => Value::Float(f),
        }
    }
}

/// Returns the numeric form of a value, coercing numeric strings.
#[must_use]
pub fn to_number(value: &Value) -> Option<Number> {
    match value {
        Value::Int(i) => Some(Number::Int(*i)),
        Value::Float(f) => Some(Number::Float(*f)),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

fn parse_number(s: &str) -> Option<Number> {
    let s = s.trim();
    if let Ok(i) = s.parse::<i64>() {
        return Some(Number::Int(i));
    }
    // Rust accepts "inf" and "nan" spellings; numeric strings do not
    let lower = s.to_ascii_lowercase();
    if lower.contains("inf") || lower.contains("nan") {
        return None;
    }
    s.parse::<f64>().ok().map(Number::Float)
}

/// Applies an arithmetic slot to two primitive operands.
///
/// Returns `Ok(None)` when either operand has no numeric form.
///
/// # Errors
/// Returns `DivisionByZero` for integer modulo by zero.
pub fn arith(slot: MetaMethod, a: &Value, b: &Value) -> Result<Option<Value>> {
    let (Some(x), Some(y)) = (to_number(a), to_number(b)) else {
        return Ok(None);
    };

    let result = match (slot, x, y) {
        (MetaMethod::Add, Number::Int(x), Number::Int(y)) => Number::Int(x.wrapping_add(y)),
        (MetaMethod::Sub, Number::Int(x), Number::Int(y)) => Number::Int(x.wrapping_sub(y)),
        (MetaMethod::Mul, Number::Int(x), Number::Int(y)) => Number::Int(x.wrapping_mul(y)),
        (MetaMethod::Mod, Number::Int(_), Number::Int(0)) => {
            return Err(Error::new(ErrorKind::DivisionByZero));
        }
        (MetaMethod::Mod, Number::Int(x), Number::Int(y)) => Number::Int(int_mod(x, y)),
        (MetaMethod::Add, x, y) => Number::Float(x.to_f64() + y.to_f64()),
        (MetaMethod::Sub, x, y) => Number::Float(x.to_f64() - y.to_f64()),
        (MetaMethod::Mul, x, y) => Number::Float(x.to_f64() * y.to_f64()),
        (MetaMethod::Div, x, y) => Number::Float(x.to_f64() / y.to_f64()),
        (MetaMethod::Mod, x, y) => Number::Float(float_mod(x.to_f64(), y.to_f64())),
        (MetaMethod::Pow, x, y) => Number::Float(x.to_f64().powf(y.to_f64())),
        _ => return Ok(None),
    };
    Ok(Some(result.into()))
}

/// Floored integer modulo: the result takes the sign of the divisor.
fn int_mod(x: i64, y: i64) -> i64 {
    let r = x.wrapping_rem(y);
    if r != 0 && (r ^ y) < 0 { r + y } else { r }
}

fn float_mod(x: f64, y: f64) -> f64 {
    let r = x % y;
    if r != 0.0 && (r < 0.0) != (y < 0.0) {
        r + y
    } else {
        r
    }
}

/// Negates a primitive operand.
#[must_use]
pub fn negate(value: &Value) -> Option<Value> {
    match to_number(value)? {
        Number::Int(i) => Some(Value::Int(i.wrapping_neg())),
        Number::Float(f) => Some(Value::Float(-f)),
    }
}

/// Returns the byte length of a string operand.
#[must_use]
pub fn string_len(value: &Value) -> Option<Value> {
    let s = value.as_str()?;
    i64::try_from(s.len()).ok().map(Value::Int)
}

/// Returns the text a string or number contributes to a concatenation.
#[must_use]
pub fn concat_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.to_string()),
        Value::Int(i) => Some(i.to_string()),
        Value::Float(f) => Some(format_float(*f)),
        _ => None,
    }
}

/// Concatenates two strings or numbers.
#[must_use]
pub fn concat(a: &Value, b: &Value) -> Option<Value> {
    let mut text = concat_text(a)?;
    text.push_str(&concat_text(b)?);
    Some(Value::from(text))
}

/// Primitive equality.
///
/// Numbers compare numerically across `Int` and `Float` (so NaN is unequal
/// to itself); tables and handlers compare by identity.
#[must_use]
pub fn raw_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Float(x), Value::Float(y)) => x == y,
        (Value::Int(i), Value::Float(f)) | (Value::Float(f), Value::Int(i)) => {
            float_to_int(*f) == Some(*i)
        }
        _ => a == b,
    }
}

fn compare(a: &Value, b: &Value) -> Option<Option<Ordering>> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Some(Some(x.cmp(y))),
        (Value::String(x), Value::String(y)) => Some(Some(x.as_bytes().cmp(y.as_bytes()))),
        (Value::Float(x), Value::Float(y)) => Some(x.partial_cmp(y)),
        (Value::Int(i), Value::Float(f)) => Some(int_float_cmp(*i, *f)),
        (Value::Float(f), Value::Int(i)) => Some(int_float_cmp(*i, *f).map(Ordering::reverse)),
        _ => None,
    }
}

/// Orders an integer against a float without rounding the integer.
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn int_float_cmp(i: i64, f: f64) -> Option<Ordering> {
    // -2^63 is exact; 2^63 is the first value past i64::MAX.
    const LOWER: f64 = -9_223_372_036_854_775_808.0;
    const UPPER: f64 = 9_223_372_036_854_775_808.0;
    if f.is_nan() {
        return None;
    }
    if f >= UPPER {
        return Some(Ordering::Less);
    }
    if f < LOWER {
        return Some(Ordering::Greater);
    }
    let floor = f.floor();
    // In range, so the cast is exact.
    let whole = floor as i64;
    Some(match i.cmp(&whole) {
        Ordering::Equal if f == floor => Ordering::Equal,
        Ordering::Equal => Ordering::Less,
        ord => ord,
    })
}

/// `a < b` for two numbers or two strings.
///
/// Returns `None` for any other pairing. Comparisons involving NaN are
/// false.
#[must_use]
pub fn less_than(a: &Value, b: &Value) -> Option<bool> {
    compare(a, b).map(|ord| ord == Some(Ordering::Less))
}

/// `a <= b` for two numbers or two strings.
#[must_use]
pub fn less_equal(a: &Value, b: &Value) -> Option<bool> {
    compare(a, b).map(|ord| matches!(ord, Some(Ordering::Less | Ordering::Equal)))
}
