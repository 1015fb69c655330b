//! Style specification model: [`Style`] and [`StyleValue`].
//!
//! A [`Style`] is an ordered mapping from keys to values. Keys are property
//! names, sub-selectors, at-rules or control keys (see
//! [`crate::css::tokenizer::classify`]); values are primitives or nested styles.
//! Entry order is preserved because it determines declaration and rule order.

use indexmap::IndexMap;

/// A single value in a [`Style`].
#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue {
    /// Explicit null. Only meaningful as the body of an at-rule (bare statement).
    Null,
    /// A string, rendered verbatim.
    Str(String),
    /// An integer, rendered in decimal.
    Int(i64),
    /// A float, rendered with the shortest round-trip formatting.
    Float(f64),
    /// A nested style (sub-selector body, at-rule body, keyframe step).
    Nested(Style),
}

impl StyleValue {
    /// Returns `true` for [`StyleValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, StyleValue::Null)
    }

    /// Borrow the nested style, if this value is one.
    pub fn as_style(&self) -> Option<&Style> {
        match self {
            StyleValue::Nested(style) => Some(style),
            _ => None,
        }
    }

    /// Render a primitive value to CSS text.
    ///
    /// Returns `None` for null, nested styles and non-finite floats.
    pub fn to_css(&self) -> Option<String> {
        match self {
            StyleValue::Str(s) => Some(s.clone()),
            StyleValue::Int(n) => Some(n.to_string()),
            StyleValue::Float(f) if f.is_finite() => Some(f.to_string()),
            _ => None,
        }
    }

    /// Short human-readable name of the value's shape, for error messages.
    pub fn shape_name(&self) -> &'static str {
        match self {
            StyleValue::Null => "null",
            StyleValue::Str(_) => "string",
            StyleValue::Int(_) | StyleValue::Float(_) => "number",
            StyleValue::Nested(_) => "nested style",
        }
    }
}

impl From<&str> for StyleValue {
    fn from(value: &str) -> Self {
        StyleValue::Str(value.to_string())
    }
}

impl From<String> for StyleValue {
    fn from(value: String) -> Self {
        StyleValue::Str(value)
    }
}

impl From<&String> for StyleValue {
    fn from(value: &String) -> Self {
        StyleValue::Str(value.clone())
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for StyleValue {
                fn from(value: $ty) -> Self {
                    StyleValue::Int(i64::from(value))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for StyleValue {
    fn from(value: f32) -> Self {
        StyleValue::Float(f64::from(value))
    }
}

impl From<f64> for StyleValue {
    fn from(value: f64) -> Self {
        StyleValue::Float(value)
    }
}

impl From<Style> for StyleValue {
    fn from(value: Style) -> Self {
        StyleValue::Nested(value)
    }
}

impl<T: Into<StyleValue>> From<Option<T>> for StyleValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(StyleValue::Null, Into::into)
    }
}

/// An ordered, recursive style specification.
///
/// Keys are unique. To render the same property twice (a fallback followed by
/// an override), give the second one an underscore suffix: `color_2`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Style {
    entries: IndexMap<String, StyleValue>,
}

impl Style {
    /// Create an empty style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry (builder).
    ///
    /// Re-using an existing key replaces its value in place.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<StyleValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert an entry, returning the previous value for that key.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<StyleValue>,
    ) -> Option<StyleValue> {
        self.entries.insert(key.into(), value.into())
    }

    /// Look up a value by key.
    pub fn get(&self, key: &str) -> Option<&StyleValue> {
        self.entries.get(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the style has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StyleValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K, V> FromIterator<(K, V)> for Style
where
    K: Into<String>,
    V: Into<StyleValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut style = Style::new();
        for (key, value) in iter {
            style.insert(key, value);
        }
        style
    }
}
