// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The canonical message record.
//!
//! A [`Message`] is the unit of data moved through the pipeline: a handful
//! of well-known base fields plus an ordered, possibly-repeating sequence
//! of typed [`Field`]s. Grounded on `hdds`'s runtime type descriptors
//! (`crates/hdds/src/core/types/descriptor.rs`) for the field/value-type
//! split, and on `GUID` (`crates/hdds/src/core/discovery/guid.rs`) for the
//! identifier newtype pattern.

mod field;
mod uuid;

pub use field::{Field, FieldError, FieldValue, ValueType};
pub use uuid::{InvalidUuidLength, MessageUuid};

/// A canonical message: fixed base fields plus an ordered sequence of
/// named, typed [`Field`]s.
///
/// # Invariants
/// - [`Message::uuid`] is empty or exactly 16 bytes (enforced by
///   [`MessageUuid`]).
/// - Field names are not unique; multiple fields may share a name and are
///   addressed by `(name, field-index)` via [`Message::field_at`].
/// - Equality ([`PartialEq`]) is structural over every base field and the
///   full, ordered `fields` sequence.
/// - [`Clone`] produces a structurally equal, aliasing-free copy.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub uuid: MessageUuid,
    pub timestamp: i64,
    pub message_type: Option<String>,
    pub logger: Option<String>,
    pub hostname: Option<String>,
    pub payload: Option<String>,
    pub env_version: Option<String>,
    pub severity: Option<i32>,
    pub pid: Option<i32>,
    fields: Vec<Field>,
}

impl Default for Message {
    fn default() -> Self {
        Self::new()
    }
}

impl Message {
    /// A fresh message with an empty uuid and zeroed/absent base fields.
    #[must_use]
    pub fn new() -> Self {
        Self {
            uuid: MessageUuid::empty(),
            timestamp: 0,
            message_type: None,
            logger: None,
            hostname: None,
            payload: None,
            env_version: None,
            severity: None,
            pid: None,
            fields: Vec::new(),
        }
    }

    /// Construct with a specific 16-byte uuid.
    pub fn with_uuid(uuid_bytes: impl Into<Vec<u8>>) -> Result<Self, InvalidUuidLength> {
        Ok(Self {
            uuid: MessageUuid::new(uuid_bytes)?,
            ..Self::new()
        })
    }

    /// The uuid formatted as `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx`, or the
    /// empty string if the uuid is not exactly 16 bytes.
    #[must_use]
    pub fn uuid_string(&self) -> String {
        self.uuid.to_canonical_string()
    }

    /// Append a field. Does not check for name collisions; repeated names
    /// simply add another occurrence, addressed by field-index.
    pub fn add_field(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// Remove and return the `field_index`-th field named `name`, or `None`
    /// if no such occurrence exists.
    pub fn delete_field(&mut self, name: &str, field_index: usize) -> Option<Field> {
        let position = self
            .fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.name() == name)
            .nth(field_index)
            .map(|(i, _)| i)?;
        Some(self.fields.remove(position))
    }

    /// The full ordered field sequence.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Number of fields named `name` (used to bound a matcher's field-index).
    #[must_use]
    pub fn field_count(&self, name: &str) -> usize {
        self.fields.iter().filter(|f| f.name() == name).count()
    }

    /// The `field_index`-th occurrence of a field named `name`.
    #[must_use]
    pub fn field_at(&self, name: &str, field_index: usize) -> Option<&Field> {
        self.fields.iter().filter(|f| f.name() == name).nth(field_index)
    }

    /// The first field named `name`, if any.
    #[must_use]
    pub fn find_first_field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Every field named `name`, in message order.
    #[must_use]
    pub fn find_all_fields(&self, name: &str) -> Vec<&Field> {
        self.fields.iter().filter(|f| f.name() == name).collect()
    }

    /// The first value of the first field named `name`.
    #[must_use]
    pub fn get_field_value(&self, name: &str) -> Option<FieldValue> {
        self.find_first_field(name).and_then(Field::first_value)
    }
}
