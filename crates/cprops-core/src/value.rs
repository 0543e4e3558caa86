#![forbid(unsafe_code)]

//! Dynamic field values and the [`Props`] mapping threaded through transforms.
//!
//! # Equality
//!
//! Two notions of equality exist:
//!
//! - `PartialEq` is structural: lists and maps compare element by element.
//!   Hosts and tests use it to assert on results.
//! - [`Value::shallow_eq`] is the change-detection primitive. Scalars compare
//!   by value; lists and maps compare by identity (`Rc::ptr_eq`). It never
//!   recurses. A freshly built map with the same contents as the previous one
//!   counts as a change.
//!
//! Numbers follow a single numeric domain: `Int(1)` equals `Float(1.0)` under
//! both notions, but only when the float converts back to exactly that
//! integer, so precision lost above 2^53 never hides a change. `NaN` is never
//! equal to itself.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::rc::Rc;

use crate::error::{CpropsError, Result};

/// Read-only context handed to every transform. Opaque to the combinators.
pub type State = Props;

/// A single prop value.
///
/// Cloning is cheap: compound values are reference-counted, so a clone shares
/// identity with the original.
#[derive(Clone, Debug, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    List(Rc<Vec<Value>>),
    Map(Rc<Props>),
}

impl Value {
    /// Build a list value from anything convertible into values.
    #[must_use]
    pub fn list<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Self::List(Rc::new(items.into_iter().map(Into::into).collect()))
    }

    #[must_use]
    pub fn map(props: Props) -> Self {
        Self::Map(Rc::new(props))
    }

    /// Name of the value's kind, as used in diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_))
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view of the value; integers widen to `f64`.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_map(&self) -> Option<&Props> {
        match self {
            Self::Map(props) => Some(props.as_ref()),
            _ => None,
        }
    }

    /// One-level comparison used for change detection.
    ///
    /// Scalars compare by value, lists and maps by reference identity.
    #[must_use]
    pub fn shallow_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::List(a), Self::List(b)) => Rc::ptr_eq(a, b),
            (Self::Map(a), Self::Map(b)) => Rc::ptr_eq(a, b),
            _ => self.scalar_eq(other),
        }
    }

    fn scalar_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Int(a), Self::Float(b)) | (Self::Float(b), Self::Int(a)) => {
                int_eq_float(*a, *b)
            }
            (Self::Str(a), Self::Str(b)) => a == b,
            _ => false,
        }
    }
}

/// An integer equals a float only when the float is integral, in range and
/// converts back to exactly that integer.
fn int_eq_float(int: i64, float: f64) -> bool {
    float.fract() == 0.0
        && float >= i64::MIN as f64
        && float < i64::MAX as f64
        && float as i64 == int
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            _ => self.scalar_eq(other),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(Rc::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(Rc::from(value))
    }
}

impl From<Props> for Value {
    fn from(value: Props) -> Self {
        Self::map(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::List(Rc::new(value))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl TryFrom<&Value> for bool {
    type Error = CpropsError;

    fn try_from(value: &Value) -> Result<Self> {
        value
            .as_bool()
            .ok_or_else(|| CpropsError::mismatch("bool", value.kind()))
    }
}

impl TryFrom<&Value> for i64 {
    type Error = CpropsError;

    fn try_from(value: &Value) -> Result<Self> {
        value
            .as_i64()
            .ok_or_else(|| CpropsError::mismatch("int", value.kind()))
    }
}

impl TryFrom<&Value> for f64 {
    type Error = CpropsError;

    fn try_from(value: &Value) -> Result<Self> {
        value
            .as_f64()
            .ok_or_else(|| CpropsError::mismatch("number", value.kind()))
    }
}

impl TryFrom<&Value> for String {
    type Error = CpropsError;

    fn try_from(value: &Value) -> Result<Self> {
        value
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| CpropsError::mismatch("string", value.kind()))
    }
}

impl TryFrom<&Value> for Vec<Value> {
    type Error = CpropsError;

    fn try_from(value: &Value) -> Result<Self> {
        value
            .as_list()
            .map(<[Value]>::to_vec)
            .ok_or_else(|| CpropsError::mismatch("list", value.kind()))
    }
}

impl TryFrom<&Value> for Props {
    type Error = CpropsError;

    fn try_from(value: &Value) -> Result<Self> {
        value
            .as_map()
            .cloned()
            .ok_or_else(|| CpropsError::mismatch("map", value.kind()))
    }
}

// ---------------------------------------------------------------------------
// Props
// ---------------------------------------------------------------------------

/// A mapping from string keys to [`Value`]s.
///
/// Transforms treat props as immutable per call: every combinator consumes
/// its input and returns a new mapping, so a caller never observes its own
/// props being changed behind its back.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Props {
    fields: BTreeMap<String, Value>,
}

impl Props {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Read a field and convert it to `T`.
    ///
    /// ```
    /// use cprops_core::{Props, CpropsError};
    ///
    /// let props = Props::new().with("count", 3);
    /// assert_eq!(props.get_as::<i64>("count"), Ok(3));
    /// assert!(matches!(
    ///     props.get_as::<String>("count"),
    ///     Err(CpropsError::Field { .. })
    /// ));
    /// ```
    pub fn get_as<'a, T>(&'a self, key: &str) -> Result<T>
    where
        T: TryFrom<&'a Value, Error = CpropsError>,
    {
        let value = self.get(key).ok_or_else(|| CpropsError::MissingField {
            key: key.to_owned(),
        })?;
        T::try_from(value).map_err(|err| err.in_field(key))
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.fields.iter()
    }

    /// Return `self` with every field of `top` laid over it; `top` wins on
    /// key collisions.
    #[must_use]
    pub fn overlay(mut self, top: Props) -> Props {
        self.fields.extend(top.fields);
        self
    }

    /// The subset of fields named by `keys`. Keys that are absent stay absent.
    #[must_use]
    pub fn pick<K: AsRef<str>>(&self, keys: &[K]) -> Props {
        keys.iter()
            .filter_map(|key| {
                let key = key.as_ref();
                self.fields
                    .get(key)
                    .map(|value| (key.to_owned(), value.clone()))
            })
            .collect()
    }

    /// `self` without the fields named by `keys`.
    #[must_use]
    pub fn omit<K: AsRef<str>>(mut self, keys: &[K]) -> Props {
        for key in keys {
            self.fields.remove(key.as_ref());
        }
        self
    }

    /// Same key set, and every field equal under [`Value::shallow_eq`].
    #[must_use]
    pub fn shallow_eq(&self, other: &Props) -> bool {
        self.fields.len() == other.fields.len()
            && self.fields.iter().all(|(key, value)| {
                other
                    .fields
                    .get(key)
                    .is_some_and(|theirs| value.shallow_eq(theirs))
            })
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Props {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for Props {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.fields.extend(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into())),
        );
    }
}

impl IntoIterator for Props {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<'a> IntoIterator for &'a Props {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

/// Build [`Props`] from `key => value` pairs.
///
/// ```
/// use cprops_core::props;
///
/// let props = props! { "a" => 1, "b" => props! { "c" => 2 } };
/// assert_eq!(props.len(), 2);
/// ```
#[macro_export]
macro_rules! props {
    () => {
        $crate::Props::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        $crate::Props::new()$(.with($key, $value))+
    };
}

// ---------------------------------------------------------------------------
// JSON interop
// ---------------------------------------------------------------------------

#[cfg(feature = "serde")]
impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match json {
            Json::Null => Self::Null,
            Json::Bool(b) => Self::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => n.as_f64().map_or(Self::Null, Self::Float),
            },
            Json::String(s) => Self::from(s),
            Json::Array(items) => Self::list(items),
            Json::Object(map) => Self::map(map.into_iter().collect()),
        }
    }
}

#[cfg(feature = "serde")]
impl TryFrom<serde_json::Value> for Props {
    type Error = CpropsError;

    fn try_from(json: serde_json::Value) -> Result<Self> {
        match Value::from(json) {
            Value::Map(props) => Ok(Rc::unwrap_or_clone(props)),
            other => Err(CpropsError::mismatch("map", other.kind())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_top_wins() {
        let base = props! { "a" => 1, "b" => 2 };
        let out = base.overlay(props! { "b" => 3, "c" => 4 });
        assert_eq!(out, props! { "a" => 1, "b" => 3, "c" => 4 });
    }

    #[test]
    fn pick_skips_absent_keys() {
        let props = props! { "a" => 1, "b" => 2 };
        assert_eq!(props.pick(&["b", "z"]), props! { "b" => 2 });
        assert!(props.pick::<&str>(&[]).is_empty());
    }

    #[test]
    fn omit_removes_named_keys() {
        let props = props! { "a" => 1, "b" => 2, "c" => 3 };
        assert_eq!(props.omit(&["a", "c", "missing"]), props! { "b" => 2 });
    }

    #[test]
    fn shallow_eq_scalars_by_value() {
        assert!(Value::from("x").shallow_eq(&Value::from(String::from("x"))));
        assert!(Value::Int(1).shallow_eq(&Value::Float(1.0)));
        assert!(!Value::Int(1).shallow_eq(&Value::Int(2)));
        assert!(!Value::Null.shallow_eq(&Value::Bool(false)));
        assert!(!Value::Float(f64::NAN).shallow_eq(&Value::Float(f64::NAN)));
    }

    #[test]
    fn int_float_equality_is_exact_beyond_f64_precision() {
        let float = Value::Float(9_007_199_254_740_992.0);
        assert!(Value::Int(9_007_199_254_740_992).shallow_eq(&float));
        assert!(!Value::Int(9_007_199_254_740_993).shallow_eq(&float));
        assert!(!float.shallow_eq(&Value::Int(9_007_199_254_740_993)));
        assert_ne!(Value::Int(9_007_199_254_740_993), float);
        assert!(!Value::Int(1).shallow_eq(&Value::Float(1.5)));
        assert!(!Value::Int(i64::MAX).shallow_eq(&Value::Float(i64::MAX as f64)));
        assert!(Value::Int(i64::MIN).shallow_eq(&Value::Float(i64::MIN as f64)));
    }

    #[test]
    fn shallow_eq_compounds_by_identity() {
        let inner = Value::from(props! { "c" => 2 });
        let same_ref = inner.clone();
        let same_contents = Value::from(props! { "c" => 2 });

        assert!(inner.shallow_eq(&same_ref));
        assert!(!inner.shallow_eq(&same_contents));
        // Structural equality still sees them as equal.
        assert_eq!(inner, same_contents);
    }

    #[test]
    fn props_shallow_eq_requires_same_key_set() {
        let a = props! { "x" => 1 };
        let b = props! { "x" => 1, "y" => Value::Null };
        assert!(!a.shallow_eq(&b));
        assert!(!b.shallow_eq(&a));
        assert!(Props::new().shallow_eq(&Props::new()));
    }

    #[test]
    fn get_as_reports_missing_and_mismatch() {
        let props = props! { "n" => 4, "s" => "four" };
        assert_eq!(props.get_as::<i64>("n"), Ok(4));
        assert_eq!(props.get_as::<f64>("n"), Ok(4.0));
        assert_eq!(props.get_as::<String>("s"), Ok("four".to_owned()));
        assert_eq!(
            props.get_as::<i64>("nope"),
            Err(CpropsError::MissingField {
                key: "nope".to_owned()
            })
        );
        assert_eq!(
            props.get_as::<bool>("s"),
            Err(CpropsError::mismatch("bool", "string").in_field("s"))
        );
    }

    #[test]
    fn option_converts_to_null() {
        assert!(Value::from(None::<i64>).is_null());
        assert_eq!(Value::from(Some(3)), Value::Int(3));
    }

    #[test]
    fn list_builder_and_accessors() {
        let list = Value::list([1, 2, 3]);
        assert_eq!(list.kind(), "list");
        assert_eq!(list.as_list().map(<[Value]>::len), Some(3));
        assert_eq!(Vec::<Value>::try_from(&list).map(|v| v.len()), Ok(3));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_object_converts_to_props() {
        let json = serde_json::json!({ "a": 1, "b": { "c": [1, 2.5, "x"] }, "d": null });
        let props = Props::try_from(json).expect("object converts");
        assert_eq!(props.get("a"), Some(&Value::Int(1)));
        assert!(props.get("d").is_some_and(Value::is_null));
        let nested = props.get("b").and_then(Value::as_map).expect("nested map");
        assert_eq!(nested.get("c").and_then(Value::as_list).map(<[Value]>::len), Some(3));

        assert!(Props::try_from(serde_json::json!([1, 2])).is_err());
    }
}
