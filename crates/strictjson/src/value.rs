use std::{
    collections::BTreeMap,
    mem,
    ops::{Index, IndexMut},
    str::FromStr,
};

use crate::parse::Status;

/// An ordered mapping from key to value. Keys are unique and iterate in
/// byte-wise ascending order.
pub type Object = BTreeMap<String, Value>;

/// A JSON document node.
///
/// `Long`, `Float` and `Double` are distinct variants but all satisfy
/// [`Value::is_number`]. The parser only ever produces `Long` and `Double`;
/// `Float` exists for programmatic construction and serializes through the
/// shortest-single-precision algorithm.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Array(Vec<Value>),
    Object(Object),
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    pub fn is_long(&self) -> bool {
        matches!(self, Value::Long(_))
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Value::Float(_))
    }

    pub fn is_double(&self) -> bool {
        matches!(self, Value::Double(_))
    }

    /// `true` for any numeric variant.
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Long(_) | Value::Float(_) | Value::Double(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Double(v) => Some(*v as f32),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(f64::from(*v)),
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Any numeric variant widened to `f64`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Long(v) => Some(*v as f64),
            Value::Float(v) => Some(f64::from(*v)),
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut Object> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Object member lookup. `None` for missing keys and non-objects.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Array element lookup. `None` when out of bounds or not an array.
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.as_array().and_then(|items| items.get(index))
    }

    /// `true` iff `self` is an object containing `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.as_object().is_some_and(|map| map.contains_key(key))
    }

    /// Replace `self` with an empty array, discarding the previous value.
    pub fn set_array(&mut self) -> &mut Vec<Value> {
        *self = Value::Array(Vec::new());
        match self {
            Value::Array(items) => items,
            _ => unreachable!(),
        }
    }

    /// Replace `self` with an empty object, discarding the previous value.
    pub fn set_object(&mut self) -> &mut Object {
        *self = Value::Object(Object::new());
        match self {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    /// Take the value, leaving `Null` behind.
    pub fn take(&mut self) -> Value {
        mem::replace(self, Value::Null)
    }
}

const NULL: Value = Value::Null;

impl Index<usize> for Value {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        self.get_index(index).unwrap_or(&NULL)
    }
}

impl Index<&str> for Value {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        self.get(key).unwrap_or(&NULL)
    }
}

impl IndexMut<usize> for Value {
    /// Converts non-arrays into arrays and grows with null fill up to
    /// `index + 1`.
    fn index_mut(&mut self, index: usize) -> &mut Value {
        if !self.is_array() {
            self.set_array();
        }
        let items = self.as_array_mut().expect("just converted to an array");
        if index >= items.len() {
            items.resize(index + 1, Value::Null);
        }
        &mut items[index]
    }
}

impl IndexMut<&str> for Value {
    /// Converts non-objects into objects and inserts `Null` for missing keys.
    fn index_mut(&mut self, key: &str) -> &mut Value {
        if !self.is_object() {
            self.set_object();
        }
        let map = self.as_object_mut().expect("just converted to an object");
        map.entry(key.to_owned()).or_insert(Value::Null)
    }
}

impl FromStr for Value {
    type Err = Status;

    fn from_str(s: &str) -> Result<Self, Status> {
        Value::parse(s.as_bytes())
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Value::Null
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<Object> for Value {
    fn from(value: Object) -> Self {
        Value::Object(value)
    }
}

macro_rules! from_signed {
    ($($ty:ty)*) => {$(
        impl From<$ty> for Value {
            fn from(value: $ty) -> Self {
                Value::Long(i64::from(value))
            }
        }
    )*};
}

from_signed!(i8 i16 i32 i64 u8 u16 u32);

impl From<u64> for Value {
    /// Values above `i64::MAX` are promoted to `Double`.
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(v) => Value::Long(v),
            Err(_) => Value::Double(value as f64),
        }
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::from(value as u64)
    }
}

impl<T> From<Option<T>> for Value
where
    Value: From<T>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(inner) => Value::from(inner),
            None => Value::Null,
        }
    }
}
