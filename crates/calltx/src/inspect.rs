//! Schema-driven dump of raw bytes, for tooling and debugging.
//!
//! Unlike `Message::decode`, inspection never rejects a known tag with the wrong
//! wire type; it shows what is on the wire and names what the descriptor knows.

use std::fmt;

use callpack::Decoder;
use callpack::Value;
use callpack::WireType;

use crate::config::Limits;
use crate::error::Error;
use crate::error::Result;
use crate::schema::FieldKind;
use crate::schema::MessageDescriptor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InspectedValue<'a> {
    Varint(u64),
    Fixed64(u64),
    Fixed32(u32),
    Bytes(&'a [u8]),
    /// A known message-typed field, walked with its own descriptor.
    Message(&'static str, Vec<InspectedField<'a>>),
    /// An unknown group, walked without a descriptor.
    Group(Vec<InspectedField<'a>>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectedField<'a> {
    pub tag: u32,
    /// `None` for tags the descriptor does not declare.
    pub name: Option<&'static str>,
    pub wire_type: WireType,
    pub value: InspectedValue<'a>,
}

/// The record tree of one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inspection<'a> {
    pub message: &'static str,
    pub fields: Vec<InspectedField<'a>>,
}

/// Walks `buf` as a `descriptor` message.
pub fn inspect<'a>(
    buf: &'a [u8],
    descriptor: &'static MessageDescriptor,
    limits: &Limits,
) -> Result<Inspection<'a>> {
    if buf.len() > limits.max_message_len {
        return Err(Error::MessageTooLarge { len: buf.len() as u64, limit: limits.max_message_len });
    }
    Ok(Inspection {
        message: descriptor.name,
        fields: walk(buf, Some(descriptor), limits.max_depth)?,
    })
}

fn walk<'a>(
    buf: &'a [u8],
    descriptor: Option<&'static MessageDescriptor>,
    depth: usize,
) -> Result<Vec<InspectedField<'a>>> {
    let mut out = Vec::new();
    for record in Decoder::with_depth_limit(buf, depth).records() {
        let record = record?;
        let field = descriptor.and_then(|d| d.field(record.tag));
        let value = match record.value {
            Value::Varint(v) => InspectedValue::Varint(v),
            Value::Fixed64(v) => InspectedValue::Fixed64(v),
            Value::Fixed32(v) => InspectedValue::Fixed32(v),
            Value::Bytes(b) => match field.map(|f| f.kind) {
                Some(FieldKind::Message(nested)) => {
                    if depth == 0 {
                        return Err(callpack::Error::RecursionLimitExceeded.into());
                    }
                    InspectedValue::Message(nested.name, walk(b, Some(nested), depth - 1)?)
                }
                _ => InspectedValue::Bytes(b),
            },
            Value::Group(b) => InspectedValue::Group(walk(b, None, depth.saturating_sub(1))?),
        };
        out.push(InspectedField {
            tag: record.tag,
            name: field.map(|f| f.name),
            wire_type: record.wire_type,
            value,
        });
    }
    Ok(out)
}

impl fmt::Display for Inspection<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.message)?;
        write_fields(f, &self.fields, 1)
    }
}

fn write_fields(
    f: &mut fmt::Formatter<'_>,
    fields: &[InspectedField<'_>],
    indent: usize,
) -> fmt::Result {
    for field in fields {
        let pad = "  ".repeat(indent);
        let name = field.name.unwrap_or("<unknown>");
        write!(f, "{pad}{} {name} ({}) ", field.tag, field.wire_type)?;
        match &field.value {
            InspectedValue::Varint(v) | InspectedValue::Fixed64(v) => writeln!(f, "{v}")?,
            InspectedValue::Fixed32(v) => writeln!(f, "{v}")?,
            InspectedValue::Bytes(b) => {
                write!(f, "{} bytes ", b.len())?;
                for byte in b.iter() {
                    write!(f, "{byte:02x}")?;
                }
                writeln!(f)?;
            }
            InspectedValue::Message(message, inner) => {
                writeln!(f, "{message}")?;
                write_fields(f, inner, indent + 1)?;
            }
            InspectedValue::Group(inner) => {
                writeln!(f, "group")?;
                write_fields(f, inner, indent + 1)?;
            }
        }
    }
    Ok(())
}
