// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed, named fields attached to a [`super::Message`].
//!
//! A [`Field`] is single-typed: it stores a `representation` hint alongside a
//! homogeneous sequence of values. A message may carry several fields with
//! the same name, each a distinct occurrence addressed by a field index
//! (see [`super::Message::field_at`]).

use thiserror::Error;

/// Runtime type tag for a field's value sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    String,
    Bytes,
    Integer,
    Double,
    Bool,
}

/// A single scalar value, tagged by [`ValueType`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Bytes(Vec<u8>),
    Integer(i64),
    Double(f64),
    Bool(bool),
}

impl FieldValue {
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self {
            FieldValue::String(_) => ValueType::String,
            FieldValue::Bytes(_) => ValueType::Bytes,
            FieldValue::Integer(_) => ValueType::Integer,
            FieldValue::Double(_) => ValueType::Double,
            FieldValue::Bool(_) => ValueType::Bool,
        }
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::String(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::String(v.to_string())
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(v: Vec<u8>) -> Self {
        FieldValue::Bytes(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Integer(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Double(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

/// Errors raised while mutating a [`Field`]'s value sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("cannot add a {got:?} value to a field declared as {declared:?}")]
    TypeMismatch { declared: ValueType, got: ValueType },
}

/// Homogeneous, single- or multi-valued value sequence, one variant per
/// [`ValueType`]. Only the variant matching a field's declared type is ever
/// constructed, so "only the matching array is non-empty" holds by
/// construction rather than by runtime check.
#[derive(Debug, Clone, PartialEq)]
enum Values {
    String(Vec<String>),
    Bytes(Vec<Vec<u8>>),
    Integer(Vec<i64>),
    Double(Vec<f64>),
    Bool(Vec<bool>),
}

impl Values {
    fn value_type(&self) -> ValueType {
        match self {
            Values::String(_) => ValueType::String,
            Values::Bytes(_) => ValueType::Bytes,
            Values::Integer(_) => ValueType::Integer,
            Values::Double(_) => ValueType::Double,
            Values::Bool(_) => ValueType::Bool,
        }
    }

    fn len(&self) -> usize {
        match self {
            Values::String(v) => v.len(),
            Values::Bytes(v) => v.len(),
            Values::Integer(v) => v.len(),
            Values::Double(v) => v.len(),
            Values::Bool(v) => v.len(),
        }
    }

    fn get(&self, index: usize) -> Option<FieldValue> {
        match self {
            Values::String(v) => v.get(index).cloned().map(FieldValue::String),
            Values::Bytes(v) => v.get(index).cloned().map(FieldValue::Bytes),
            Values::Integer(v) => v.get(index).copied().map(FieldValue::Integer),
            Values::Double(v) => v.get(index).copied().map(FieldValue::Double),
            Values::Bool(v) => v.get(index).copied().map(FieldValue::Bool),
        }
    }

    fn push(&mut self, value: FieldValue) -> Result<(), FieldError> {
        match (self, value) {
            (Values::String(v), FieldValue::String(s)) => v.push(s),
            (Values::Bytes(v), FieldValue::Bytes(b)) => v.push(b),
            (Values::Integer(v), FieldValue::Integer(n)) => v.push(n),
            (Values::Double(v), FieldValue::Double(d)) => v.push(d),
            (Values::Bool(v), FieldValue::Bool(b)) => v.push(b),
            (values, got) => {
                return Err(FieldError::TypeMismatch {
                    declared: values.value_type(),
                    got: got.value_type(),
                })
            }
        }
        Ok(())
    }

    fn from_first(value: FieldValue) -> Self {
        match value {
            FieldValue::String(s) => Values::String(vec![s]),
            FieldValue::Bytes(b) => Values::Bytes(vec![b]),
            FieldValue::Integer(n) => Values::Integer(vec![n]),
            FieldValue::Double(d) => Values::Double(vec![d]),
            FieldValue::Bool(b) => Values::Bool(vec![b]),
        }
    }

    fn iter(&self) -> Box<dyn Iterator<Item = FieldValue> + '_> {
        match self {
            Values::String(v) => Box::new(v.iter().cloned().map(FieldValue::String)),
            Values::Bytes(v) => Box::new(v.iter().cloned().map(FieldValue::Bytes)),
            Values::Integer(v) => Box::new(v.iter().copied().map(FieldValue::Integer)),
            Values::Double(v) => Box::new(v.iter().copied().map(FieldValue::Double)),
            Values::Bool(v) => Box::new(v.iter().copied().map(FieldValue::Bool)),
        }
    }
}

/// A named, typed field on a [`super::Message`].
///
/// Single-valued fields hold a one-element sequence; multi-valued fields
/// hold an ordered sequence. The `(field-index, array-index)` pair
/// addresses a scalar: field-index picks the occurrence among same-named
/// fields on the message, array-index picks the scalar within this field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: String,
    representation: String,
    values: Values,
}

impl Field {
    /// Construct a new field, inferring its [`ValueType`] from `value`.
    pub fn new(name: impl Into<String>, value: impl Into<FieldValue>, representation: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            representation: representation.into(),
            values: Values::from_first(value.into()),
        }
    }

    /// Construct a multi-valued field directly from a non-empty sequence.
    ///
    /// Returns `None` if `values` is empty or mixes [`ValueType`]s.
    #[must_use]
    pub fn new_multi(
        name: impl Into<String>,
        values: Vec<FieldValue>,
        representation: impl Into<String>,
    ) -> Option<Self> {
        let mut iter = values.into_iter();
        let first = iter.next()?;
        let mut field = Self::new(name, first, representation);
        for v in iter {
            field.add_value(v).ok()?;
        }
        Some(field)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    #[must_use]
    pub fn representation(&self) -> &str {
        &self.representation
    }

    pub fn set_representation(&mut self, representation: impl Into<String>) {
        self.representation = representation.into();
    }

    #[must_use]
    pub fn value_type(&self) -> ValueType {
        self.values.value_type()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.len() == 0
    }

    /// Append a value. Fails with [`FieldError::TypeMismatch`] if `value`'s
    /// inferred type does not match this field's declared type.
    pub fn add_value(&mut self, value: FieldValue) -> Result<(), FieldError> {
        self.values.push(value)
    }

    /// The scalar at `array_index`, or `None` if out of range.
    #[must_use]
    pub fn value_at(&self, array_index: usize) -> Option<FieldValue> {
        self.values.get(array_index)
    }

    /// The first value in this field's sequence.
    #[must_use]
    pub fn first_value(&self) -> Option<FieldValue> {
        self.values.get(0)
    }

    pub fn values(&self) -> impl Iterator<Item = FieldValue> + '_ {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_value_type_from_value() {
        let f = Field::new("foo", "bar", "s");
        assert_eq!(f.value_type(), ValueType::String);
        assert_eq!(f.first_value(), Some(FieldValue::String("bar".into())));
    }

    #[test]
    fn rejects_mismatched_value_type() {
        let mut f = Field::new("count", 1_i64, "");
        let err = f.add_value(FieldValue::String("nope".into())).unwrap_err();
        assert_eq!(
            err,
            FieldError::TypeMismatch {
                declared: ValueType::Integer,
                got: ValueType::String
            }
        );
    }

    #[test]
    fn multi_valued_field_preserves_order() {
        let f = Field::new_multi(
            "int",
            vec![FieldValue::Integer(999), FieldValue::Integer(1024)],
            "",
        )
        .unwrap();
        assert_eq!(f.value_at(0), Some(FieldValue::Integer(999)));
        assert_eq!(f.value_at(1), Some(FieldValue::Integer(1024)));
        assert_eq!(f.value_at(2), None);
    }

    #[test]
    fn bytes_fields_compare_byte_equal() {
        let a = Field::new("b", vec![0x61u8, 0x62], "");
        let b = Field::new("b", vec![0x61u8, 0x62], "");
        assert_eq!(a, b);
        let c = Field::new("b", vec![0x61u8, 0x63], "");
        assert_ne!(a, c);
    }

    #[test]
    fn equality_is_sensitive_to_representation_and_name() {
        let a = Field::new("x", 1_i64, "rep");
        let mut b = a.clone();
        assert_eq!(a, b);
        b.set_representation("other");
        assert_ne!(a, b);
        let mut c = a.clone();
        c.set_name("y");
        assert_ne!(a, c);
    }
}
