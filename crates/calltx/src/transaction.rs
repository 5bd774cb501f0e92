//! # Transaction Schema
//!
//! The contract-call transaction and the messages it owns.
//!
//! ```text
//! Transaction   1: call        ContractCall  optional
//!               2: fee         Fee           optional
//!               3: nonce       uint64
//!               4: nullifiers  bytes         repeated
//!               5: signature   bytes         optional
//! ContractCall  1: payload            bytes
//!               2: contract_id        bytes
//!               3: function_selector  bytes
//! Fee           1: gas_limit   uint64
//!               2: gas_price   uint64
//! ```

use callpack::Encoder;

use crate::error::Result;
use crate::message::FieldValue;
use crate::message::Message;
use crate::message::merge_message;
use crate::message::put_bytes;
use crate::message::put_message;
use crate::message::put_uint64;
use crate::message::unhandled;
use crate::schema::Cardinality;
use crate::schema::FieldDescriptor;
use crate::schema::FieldKind;
use crate::schema::MessageDescriptor;
use crate::unknown::UnknownFields;

pub static TRANSACTION: MessageDescriptor = MessageDescriptor {
    name: "Transaction",
    fields: &[
        FieldDescriptor::new(1, "call", FieldKind::Message(&CONTRACT_CALL), Cardinality::Optional),
        FieldDescriptor::new(2, "fee", FieldKind::Message(&FEE), Cardinality::Optional),
        FieldDescriptor::new(3, "nonce", FieldKind::Uint64, Cardinality::Implicit),
        FieldDescriptor::new(4, "nullifiers", FieldKind::Bytes, Cardinality::Repeated),
        FieldDescriptor::new(5, "signature", FieldKind::Bytes, Cardinality::Optional),
    ],
    reserved: &[],
};

pub static CONTRACT_CALL: MessageDescriptor = MessageDescriptor {
    name: "ContractCall",
    fields: &[
        FieldDescriptor::new(1, "payload", FieldKind::Bytes, Cardinality::Implicit),
        FieldDescriptor::new(2, "contract_id", FieldKind::Bytes, Cardinality::Implicit),
        FieldDescriptor::new(3, "function_selector", FieldKind::Bytes, Cardinality::Implicit),
    ],
    reserved: &[],
};

pub static FEE: MessageDescriptor = MessageDescriptor {
    name: "Fee",
    fields: &[
        FieldDescriptor::new(1, "gas_limit", FieldKind::Uint64, Cardinality::Implicit),
        FieldDescriptor::new(2, "gas_price", FieldKind::Uint64, Cardinality::Implicit),
    ],
    reserved: &[],
};

/// A contract call submitted to the ledger.
///
/// The zero value (nothing set) is a valid transaction and encodes to zero bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    pub call: Option<ContractCall>,
    pub fee: Option<Fee>,
    pub nonce: u64,
    /// Spent-note identifiers, in order.
    pub nullifiers: Vec<Vec<u8>>,
    /// Opaque signature over the transaction; `Some(vec![])` is distinct from `None`.
    pub signature: Option<Vec<u8>>,
    pub unknown_fields: UnknownFields,
}

impl Transaction {
    pub fn new(call: ContractCall) -> Self {
        Self { call: Some(call), ..Self::default() }
    }

    pub fn with_fee(mut self, fee: Fee) -> Self {
        self.fee = Some(fee);
        self
    }

    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    pub fn with_nullifier(mut self, nullifier: impl Into<Vec<u8>>) -> Self {
        self.nullifiers.push(nullifier.into());
        self
    }

    pub fn with_signature(mut self, signature: impl Into<Vec<u8>>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    /// True when every field holds its zero value and no unknown records were kept.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Message for Transaction {
    fn descriptor() -> &'static MessageDescriptor {
        &TRANSACTION
    }

    fn encode_fields(&self, enc: &mut Encoder) -> Result<()> {
        if let Some(call) = &self.call {
            put_message(enc, 1, call)?;
        }
        if let Some(fee) = &self.fee {
            put_message(enc, 2, fee)?;
        }
        put_uint64(enc, 3, self.nonce)?;
        for nullifier in &self.nullifiers {
            enc.bytes(4, nullifier)?;
        }
        if let Some(signature) = &self.signature {
            enc.bytes(5, signature)?;
        }
        Ok(())
    }

    fn merge_field(&mut self, tag: u32, value: FieldValue<'_>, depth: usize) -> Result<()> {
        match (tag, value) {
            (1, FieldValue::Bytes(body)) => {
                merge_message(self.call.get_or_insert_with(ContractCall::default), body, depth)
            }
            (2, FieldValue::Bytes(body)) => {
                merge_message(self.fee.get_or_insert_with(Fee::default), body, depth)
            }
            (3, FieldValue::Uint64(v)) => {
                self.nonce = v;
                Ok(())
            }
            (4, FieldValue::Bytes(b)) => {
                self.nullifiers.push(b.to_vec());
                Ok(())
            }
            (5, FieldValue::Bytes(b)) => {
                self.signature = Some(b.to_vec());
                Ok(())
            }
            _ => Err(unhandled::<Self>(tag)),
        }
    }

    fn unknown_fields(&self) -> &UnknownFields {
        &self.unknown_fields
    }

    fn unknown_fields_mut(&mut self) -> &mut UnknownFields {
        &mut self.unknown_fields
    }
}

/// Which contract to invoke, which entry point, and with what arguments.
///
/// All three are opaque to the codec; the payload is handed to the execution
/// host exactly as the producer placed it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractCall {
    pub payload: Vec<u8>,
    pub contract_id: Vec<u8>,
    pub function_selector: Vec<u8>,
    pub unknown_fields: UnknownFields,
}

impl ContractCall {
    pub fn new(
        contract_id: impl Into<Vec<u8>>,
        function_selector: impl Into<Vec<u8>>,
        payload: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            payload: payload.into(),
            contract_id: contract_id.into(),
            function_selector: function_selector.into(),
            unknown_fields: UnknownFields::default(),
        }
    }

    /// A call carrying only arguments.
    pub fn with_payload(payload: impl Into<Vec<u8>>) -> Self {
        Self { payload: payload.into(), ..Self::default() }
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Releases the arguments for the execution host.
    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }
}

impl Message for ContractCall {
    fn descriptor() -> &'static MessageDescriptor {
        &CONTRACT_CALL
    }

    fn encode_fields(&self, enc: &mut Encoder) -> Result<()> {
        put_bytes(enc, 1, &self.payload)?;
        put_bytes(enc, 2, &self.contract_id)?;
        put_bytes(enc, 3, &self.function_selector)?;
        Ok(())
    }

    fn merge_field(&mut self, tag: u32, value: FieldValue<'_>, _depth: usize) -> Result<()> {
        let FieldValue::Bytes(b) = value else {
            return Err(unhandled::<Self>(tag));
        };
        match tag {
            1 => self.payload = b.to_vec(),
            2 => self.contract_id = b.to_vec(),
            3 => self.function_selector = b.to_vec(),
            _ => return Err(unhandled::<Self>(tag)),
        }
        Ok(())
    }

    fn unknown_fields(&self) -> &UnknownFields {
        &self.unknown_fields
    }

    fn unknown_fields_mut(&mut self) -> &mut UnknownFields {
        &mut self.unknown_fields
    }
}

/// Gas budget attached to a transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fee {
    pub gas_limit: u64,
    pub gas_price: u64,
    pub unknown_fields: UnknownFields,
}

impl Fee {
    pub fn new(gas_limit: u64, gas_price: u64) -> Self {
        Self { gas_limit, gas_price, unknown_fields: UnknownFields::default() }
    }
}

impl Message for Fee {
    fn descriptor() -> &'static MessageDescriptor {
        &FEE
    }

    fn encode_fields(&self, enc: &mut Encoder) -> Result<()> {
        put_uint64(enc, 1, self.gas_limit)?;
        put_uint64(enc, 2, self.gas_price)?;
        Ok(())
    }

    fn merge_field(&mut self, tag: u32, value: FieldValue<'_>, _depth: usize) -> Result<()> {
        match (tag, value) {
            (1, FieldValue::Uint64(v)) => self.gas_limit = v,
            (2, FieldValue::Uint64(v)) => self.gas_price = v,
            _ => return Err(unhandled::<Self>(tag)),
        }
        Ok(())
    }

    fn unknown_fields(&self) -> &UnknownFields {
        &self.unknown_fields
    }

    fn unknown_fields_mut(&mut self) -> &mut UnknownFields {
        &mut self.unknown_fields
    }
}
