//! # Calltx
//!
//! The wire contract for contract-call transactions exchanged between a ledger
//! node and a remote execution host.
//!
//! ## Architecture
//!
//! - **Schema Model** (`schema`, `transaction`): plain value types plus compile-time
//!   descriptors naming every field's tag, kind and cardinality.
//! - **Codec** (`message`, `envelope`): a deterministic, stateless mapping between
//!   those values and protobuf-compatible bytes, built on `callpack`.
//!
//! The codec is pure: no I/O, no logging, no shared state. Every type is `Send + Sync`
//! and any number of threads may encode or decode independent values at once.
//!
//! ```
//! use calltx::{ContractCall, Message, Transaction};
//!
//! let tx = Transaction::new(ContractCall::with_payload(vec![0x01, 0x02, 0x03]));
//! let bytes = tx.encode()?;
//! let decoded = Transaction::decode(&bytes)?;
//! assert_eq!(decoded, tx);
//! # Ok::<(), calltx::Error>(())
//! ```

pub mod config;
pub mod envelope;
pub mod error;
pub mod inspect;
pub mod message;
pub mod schema;
pub mod transaction;
pub mod unknown;

pub use config::Limits;
pub use envelope::decode_envelope;
pub use envelope::encode_envelope;
pub use envelope::peek_envelope_len;
pub use envelope::split_envelope;
pub use error::Error;
pub use error::ErrorKind;
pub use error::Result;
pub use inspect::inspect;
pub use inspect::Inspection;
pub use message::FieldValue;
pub use message::Message;
pub use schema::Cardinality;
pub use schema::FieldDescriptor;
pub use schema::FieldKind;
pub use schema::MessageDescriptor;
pub use schema::SchemaError;
pub use transaction::ContractCall;
pub use transaction::Fee;
pub use transaction::Transaction;
pub use unknown::UnknownField;
pub use unknown::UnknownFields;

pub use callpack::WireType;

#[cfg(test)]
mod tests;
