//! Records the schema does not know, kept verbatim so newer producers' fields survive
//! a pass through an older consumer.

use callpack::Encoder;
use callpack::Record;
use callpack::WireType;

/// One preserved record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownField {
    pub tag: u32,
    pub wire_type: WireType,
    /// The complete record (key included) exactly as read.
    pub raw: Vec<u8>,
}

/// Unknown records of a single message, in the order they were read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnknownFields {
    fields: Vec<UnknownField>,
}

impl UnknownFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UnknownField> {
        self.fields.iter()
    }

    /// Tags in arrival order; repeats appear once per record.
    pub fn tags(&self) -> impl Iterator<Item = u32> + '_ {
        self.fields.iter().map(|f| f.tag)
    }

    pub(crate) fn push(&mut self, record: &Record<'_>) {
        self.fields.push(UnknownField {
            tag: record.tag,
            wire_type: record.wire_type,
            raw: record.raw.to_vec(),
        });
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }

    /// Re-emits every record untouched.
    pub(crate) fn encode(&self, enc: &mut Encoder) {
        for field in &self.fields {
            enc.raw(&field.raw);
        }
    }
}

impl<'a> IntoIterator for &'a UnknownFields {
    type Item = &'a UnknownField;
    type IntoIter = std::slice::Iter<'a, UnknownField>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
