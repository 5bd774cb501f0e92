//! # Schema Descriptors
//!
//! Compile-time descriptions of each message: field tags, names, kinds and
//! cardinality. Descriptors are plain `static` items handed around by reference;
//! there is no registry.
//!
//! ## Invariants
//! - **Stable Tags**: a published tag keeps its meaning forever.
//! - **No Reuse**: retired tags move to `reserved` and can never be declared again.

use std::fmt;

use callpack::MAX_TAG;
use callpack::MIN_TAG;
use callpack::WireType;

/// The value type of a field.
#[derive(Clone, Copy)]
pub enum FieldKind {
    /// Length-delimited opaque bytes.
    Bytes,
    /// Varint-encoded unsigned integer.
    Uint64,
    /// Length-delimited nested message.
    Message(&'static MessageDescriptor),
}

impl FieldKind {
    /// The only wire type this kind may arrive with.
    pub const fn wire_type(&self) -> WireType {
        match self {
            FieldKind::Bytes | FieldKind::Message(_) => WireType::LengthDelimited,
            FieldKind::Uint64 => WireType::Varint,
        }
    }
}

// Manual impl so a message kind prints its name rather than the whole nested descriptor.
impl fmt::Debug for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Bytes => f.write_str("Bytes"),
            FieldKind::Uint64 => f.write_str("Uint64"),
            FieldKind::Message(m) => write!(f, "Message({})", m.name),
        }
    }
}

/// How many values a field holds and whether presence is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// Single value; the zero value is omitted on the wire and indistinguishable from absent.
    Implicit,
    /// Single value with tracked presence; an empty value is still emitted.
    Optional,
    /// Ordered sequence; every element is emitted, in order.
    Repeated,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    pub tag: u32,
    pub name: &'static str,
    pub kind: FieldKind,
    pub cardinality: Cardinality,
}

impl FieldDescriptor {
    pub const fn new(
        tag: u32,
        name: &'static str,
        kind: FieldKind,
        cardinality: Cardinality,
    ) -> Self {
        Self { tag, name, kind, cardinality }
    }
}

#[derive(Debug)]
pub struct MessageDescriptor {
    pub name: &'static str,
    /// Sorted by ascending tag.
    pub fields: &'static [FieldDescriptor],
    /// Tags of removed fields.
    pub reserved: &'static [u32],
}

/// A descriptor that breaks one of the schema invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("{message}.{field}: tag {tag} is outside 1..=2^29-1")]
    TagOutOfRange { message: &'static str, field: &'static str, tag: u32 },
    #[error("{message}.{field}: tag {tag} does not ascend")]
    NotAscending { message: &'static str, field: &'static str, tag: u32 },
    #[error("{message}.{field}: tag {tag} is reserved")]
    ReservedTag { message: &'static str, field: &'static str, tag: u32 },
}

impl MessageDescriptor {
    /// Looks up a field by tag.
    ///
    /// Relies on `fields` ascending by tag, which `validate` checks. Descriptors
    /// should be validated once, in a test, before they are used to decode.
    pub fn field(&self, tag: u32) -> Option<&'static FieldDescriptor> {
        let fields: &'static [FieldDescriptor] = self.fields;
        debug_assert!(
            fields.is_sorted_by_key(|f| f.tag),
            "{}: fields must ascend by tag",
            self.name
        );
        fields
            .binary_search_by_key(&tag, |f| f.tag)
            .ok()
            .map(|idx| &fields[idx])
    }

    pub fn field_by_name(&self, name: &str) -> Option<&'static FieldDescriptor> {
        let fields: &'static [FieldDescriptor] = self.fields;
        fields.iter().find(|f| f.name == name)
    }

    pub fn is_reserved(&self, tag: u32) -> bool {
        self.reserved.contains(&tag)
    }

    /// Checks this descriptor and every message it references.
    ///
    /// Each descriptor is checked once, so messages that reference each other
    /// (directly or through a cycle) terminate.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut seen = Vec::new();
        self.validate_into(&mut seen)
    }

    fn validate_into(&self, seen: &mut Vec<*const MessageDescriptor>) -> Result<(), SchemaError> {
        if seen.contains(&(self as *const MessageDescriptor)) {
            return Ok(());
        }
        seen.push(self);

        let mut prev = 0;
        for field in self.fields {
            let (message, name, tag) = (self.name, field.name, field.tag);
            if !(MIN_TAG..=MAX_TAG).contains(&tag) {
                return Err(SchemaError::TagOutOfRange { message, field: name, tag });
            }
            if tag <= prev {
                return Err(SchemaError::NotAscending { message, field: name, tag });
            }
            if self.is_reserved(tag) {
                return Err(SchemaError::ReservedTag { message, field: name, tag });
            }
            prev = tag;
        }
        for field in self.fields {
            if let FieldKind::Message(nested) = field.kind {
                nested.validate_into(seen)?;
            }
        }
        Ok(())
    }
}
