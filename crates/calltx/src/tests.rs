use crate::*;
use crate::schema::Cardinality;
use crate::transaction::CONTRACT_CALL;
use crate::transaction::FEE;
use crate::transaction::TRANSACTION;

fn sample() -> Transaction {
    let call = ContractCall::new(
        vec![0xAA, 0xBB],
        vec![0x01, 0x02, 0x03, 0x04],
        vec![0x01, 0x02, 0x03],
    );
    Transaction::new(call)
        .with_fee(Fee::new(300, 1))
        .with_nonce(7)
        .with_nullifier(vec![0x11])
        .with_nullifier(vec![])
        .with_signature(vec![])
}

const SAMPLE_BYTES: &[u8] = &[
    0x0A, 0x0F,
        0x0A, 0x03, 0x01, 0x02, 0x03,
        0x12, 0x02, 0xAA, 0xBB,
        0x1A, 0x04, 0x01, 0x02, 0x03, 0x04,
    0x12, 0x05,
        0x08, 0xAC, 0x02,
        0x10, 0x01,
    0x18, 0x07,
    0x22, 0x01, 0x11,
    0x22, 0x00,
    0x2A, 0x00,
];

// ============================================================================
//  ROUND TRIPS
// ============================================================================

#[test]
fn test_payload_roundtrip() -> Result<()> {
    let tx = Transaction::new(ContractCall::with_payload(vec![0x01, 0x02, 0x03]));
    let bytes = tx.encode()?;
    assert_eq!(bytes, vec![0x0A, 0x05, 0x0A, 0x03, 0x01, 0x02, 0x03]);

    let decoded = Transaction::decode(&bytes)?;
    let call = decoded.call.clone().unwrap();
    assert_eq!(call.payload(), &[0x01, 0x02, 0x03]);
    assert_eq!(call.into_payload(), vec![0x01, 0x02, 0x03]);
    assert_eq!(decoded, tx);
    Ok(())
}

#[test]
fn test_zero_value_roundtrip() -> Result<()> {
    let tx = Transaction::default();
    assert!(tx.is_empty());

    let bytes = tx.encode()?;
    assert!(bytes.is_empty());
    assert_eq!(Transaction::decode(&bytes)?, tx);

    let framed = encode_envelope(&tx)?;
    assert_eq!(framed, vec![0x00]);
    assert_eq!(decode_envelope::<Transaction>(&framed, &Limits::default())?, tx);
    Ok(())
}

#[test]
fn test_empty_call_is_present() -> Result<()> {
    let tx = Transaction::new(ContractCall::default());
    let bytes = tx.encode()?;
    assert_eq!(bytes, vec![0x0A, 0x00]);

    let decoded = Transaction::decode(&bytes)?;
    assert_eq!(decoded.call, Some(ContractCall::default()));
    assert!(!decoded.is_empty());
    Ok(())
}

#[test]
fn test_optional_empty_signature_differs_from_absent() -> Result<()> {
    let absent = Transaction::default();
    let empty = Transaction::default().with_signature(vec![]);

    assert_eq!(absent.encode()?, Vec::<u8>::new());
    assert_eq!(empty.encode()?, vec![0x2A, 0x00]);
    assert_eq!(Transaction::decode(&[0x2A, 0x00])?.signature, Some(vec![]));
    Ok(())
}

#[test]
fn test_implicit_zero_fields_are_omitted() -> Result<()> {
    let tx = Transaction::new(ContractCall::new(vec![], vec![], vec![]))
        .with_fee(Fee::new(0, 0))
        .with_nonce(0);
    assert_eq!(tx.encode()?, vec![0x0A, 0x00, 0x12, 0x00]);
    Ok(())
}

#[test]
fn test_explicit_zero_on_wire_decodes_to_default() -> Result<()> {
    // A producer that writes nonce = 0 and an empty payload explicitly.
    let bytes = [0x18, 0x00, 0x0A, 0x02, 0x0A, 0x00];
    let tx = Transaction::decode(&bytes)?;
    assert_eq!(tx, Transaction::new(ContractCall::default()));
    Ok(())
}

#[test]
fn test_full_transaction_golden_bytes() -> Result<()> {
    let tx = sample();
    assert_eq!(tx.encode()?, SAMPLE_BYTES);
    assert_eq!(Transaction::decode(SAMPLE_BYTES)?, tx);
    Ok(())
}

#[test]
fn test_encoding_is_deterministic() -> Result<()> {
    let a = sample().encode()?;
    let b = sample().encode()?;
    let c = sample().clone().encode()?;
    assert_eq!(a, b);
    assert_eq!(a, c);
    Ok(())
}

#[test]
fn test_repeated_field_order_preserved() -> Result<()> {
    let tx = Transaction::default()
        .with_nullifier(vec![3])
        .with_nullifier(vec![1])
        .with_nullifier(vec![2]);
    let decoded = Transaction::decode(&tx.encode()?)?;
    assert_eq!(decoded.nullifiers, vec![vec![3], vec![1], vec![2]]);
    Ok(())
}

// ============================================================================
//  MERGE SEMANTICS
// ============================================================================

#[test]
fn test_repeated_message_field_merges() -> Result<()> {
    let bytes = [
        0x0A, 0x03, 0x0A, 0x01, 0xAA,
        0x0A, 0x03, 0x12, 0x01, 0xBB,
    ];
    let call = Transaction::decode(&bytes)?.call.unwrap();
    assert_eq!(call.payload, vec![0xAA]);
    assert_eq!(call.contract_id, vec![0xBB]);
    Ok(())
}

#[test]
fn test_repeated_scalar_last_wins() -> Result<()> {
    let bytes = [0x18, 0x01, 0x18, 0x02, 0x2A, 0x01, 0x01, 0x2A, 0x01, 0x02];
    let tx = Transaction::decode(&bytes)?;
    assert_eq!(tx.nonce, 2);
    assert_eq!(tx.signature, Some(vec![0x02]));
    Ok(())
}

// ============================================================================
//  FORWARD COMPATIBILITY
// ============================================================================

#[test]
fn test_unknown_fields_preserved_and_reemitted() -> Result<()> {
    let bytes = [
        0x0A, 0x09,
            0x0A, 0x03, 0x01, 0x02, 0x03,
            0x4A, 0x02, 0xDE, 0xAD, // ContractCall tag 9, unknown
        0x78, 0x2A,                 // Transaction tag 15, unknown varint
    ];
    let tx = Transaction::decode(&bytes)?;

    let call = tx.call.as_ref().unwrap();
    assert_eq!(call.payload, vec![0x01, 0x02, 0x03]);
    assert_eq!(call.unknown_fields.tags().collect::<Vec<_>>(), vec![9]);
    assert_eq!(tx.unknown_fields.tags().collect::<Vec<_>>(), vec![15]);

    let unknown = tx.unknown_fields.iter().next().unwrap();
    assert_eq!(unknown.wire_type, WireType::Varint);
    assert_eq!(unknown.raw, vec![0x78, 0x2A]);

    assert_eq!(tx.encode()?, bytes);
    Ok(())
}

#[test]
fn test_unknown_fields_follow_known_fields_on_encode() -> Result<()> {
    // Unknown record first on the wire, then a known one.
    let bytes = [0x78, 0x2A, 0x18, 0x05];
    let tx = Transaction::decode(&bytes)?;
    assert_eq!(tx.nonce, 5);
    assert_eq!(tx.encode()?, vec![0x18, 0x05, 0x78, 0x2A]);
    Ok(())
}

#[test]
fn test_unknown_fields_participate_in_equality() -> Result<()> {
    let plain = Transaction::decode(&[0x18, 0x05])?;
    let extended = Transaction::decode(&[0x18, 0x05, 0x78, 0x2A])?;
    assert_ne!(plain, extended);
    assert!(!Transaction::decode(&[0x78, 0x2A])?.is_empty());

    let mut stripped = extended.clone();
    stripped.unknown_fields.clear();
    assert_eq!(plain, stripped);
    Ok(())
}

// ============================================================================
//  ERRORS
// ============================================================================

#[test]
fn test_type_mismatch_top_level() {
    let err = Transaction::decode(&[0x08, 0x01]).unwrap_err();
    assert_eq!(
        err,
        Error::TypeMismatch {
            message: "Transaction",
            field: "call",
            tag: 1,
            expected: WireType::LengthDelimited,
            found: WireType::Varint,
        }
    );
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);

    let err = Transaction::decode(&[0x1A, 0x00]).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { field: "nonce", .. }));

    let err = Transaction::decode(&[0x2D, 0x00, 0x00, 0x00, 0x00]).unwrap_err();
    assert!(matches!(
        err,
        Error::TypeMismatch { field: "signature", found: WireType::Fixed32, .. }
    ));
}

#[test]
fn test_type_mismatch_nested() {
    let err = Transaction::decode(&[0x0A, 0x02, 0x08, 0x01]).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { message: "ContractCall", field: "payload", .. }));

    let err = Transaction::decode(&[0x12, 0x02, 0x0A, 0x00]).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { message: "Fee", field: "gas_limit", .. }));
}

#[test]
fn test_malformed_varint() {
    let mut bytes = vec![0x18];
    bytes.extend_from_slice(&[0xFF; 10]);
    let err = Transaction::decode(&bytes).unwrap_err();
    assert_eq!(err, Error::Wire(callpack::Error::MalformedVarint));
    assert_eq!(err.kind(), ErrorKind::MalformedVarint);
}

#[test]
fn test_truncated_length() {
    let err = Transaction::decode(&[0x0A, 0x05, 0x0A]).unwrap_err();
    assert!(err.is_truncated());
}

#[test]
fn test_nested_message_bounded_by_its_length() {
    // The call body is two bytes long but claims a three-byte payload; the bytes
    // after the body must not satisfy it.
    let err = Transaction::decode(&[0x0A, 0x02, 0x0A, 0x03, 0x01, 0x02, 0x03]).unwrap_err();
    assert_eq!(err, Error::Wire(callpack::Error::TruncatedInput { needed: 3, available: 0 }));
}

#[test]
fn test_malformed_keys() {
    let err = Transaction::decode(&[0x0E]).unwrap_err();
    assert_eq!(err, Error::Wire(callpack::Error::InvalidWireType(6)));
    assert_eq!(err.kind(), ErrorKind::Malformed);

    let err = Transaction::decode(&[0x00, 0x00]).unwrap_err();
    assert_eq!(err, Error::Wire(callpack::Error::InvalidTag(0)));

    let err = Transaction::decode(&[0x7C]).unwrap_err();
    assert_eq!(err, Error::Wire(callpack::Error::UnmatchedGroup(15)));
}

#[test]
fn test_internal_errors_classified() -> Result<()> {
    let mut enc = callpack::Encoder::new();
    enc.message_begin(1)?;
    let err = Error::from(enc.group_end().unwrap_err());
    assert!(matches!(err, Error::Wire(callpack::Error::ScopeMismatch { .. })));
    assert_eq!(err.kind(), ErrorKind::Internal);

    let err = Error::from(enc.into_bytes().unwrap_err());
    assert_eq!(err, Error::Wire(callpack::Error::ScopeStillOpen));
    assert_eq!(err.kind(), ErrorKind::Internal);

    let err = Error::UnhandledField { message: "Fee", tag: 1 };
    assert_eq!(err.kind(), ErrorKind::Internal);
    Ok(())
}

#[test]
fn test_depth_limit() -> Result<()> {
    let bytes = Transaction::new(ContractCall::default()).encode()?;
    let flat = Limits::default().with_max_depth(0);

    let err = Transaction::decode_with(&bytes, &flat).unwrap_err();
    assert_eq!(err, Error::Wire(callpack::Error::RecursionLimitExceeded));
    assert_eq!(err.kind(), ErrorKind::LimitExceeded);

    // Scalars at the top level need no depth at all.
    assert_eq!(Transaction::decode_with(&[0x18, 0x01], &flat)?.nonce, 1);
    Ok(())
}

#[test]
fn test_message_size_limit() {
    let tight = Limits::default().with_max_message_len(1);
    let err = Transaction::decode_with(&[0x18, 0x01], &tight).unwrap_err();
    assert_eq!(err, Error::MessageTooLarge { len: 2, limit: 1 });
    assert_eq!(err.kind(), ErrorKind::LimitExceeded);
}

#[test]
fn test_failed_decode_yields_no_value() {
    // Valid nonce followed by a truncated signature: nothing partial comes back.
    let result = Transaction::decode(&[0x18, 0x07, 0x2A, 0x04, 0x01]);
    assert!(matches!(result, Err(ref e) if e.is_truncated()));
}

// ============================================================================
//  ENVELOPE
// ============================================================================

#[test]
fn test_envelope_roundtrip() -> Result<()> {
    let tx = sample();
    let framed = encode_envelope(&tx)?;
    assert_eq!(framed[0] as usize, SAMPLE_BYTES.len());
    assert_eq!(&framed[1..], SAMPLE_BYTES);

    let limits = Limits::default();
    assert_eq!(peek_envelope_len(&framed, &limits)?, (1, SAMPLE_BYTES.len()));
    assert_eq!(decode_envelope::<Transaction>(&framed, &limits)?, tx);
    Ok(())
}

#[test]
fn test_envelope_every_prefix_is_truncated() -> Result<()> {
    let framed = encode_envelope(&sample())?;
    for cut in 0..framed.len() {
        let err = decode_envelope::<Transaction>(&framed[..cut], &Limits::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TruncatedInput, "cut at {cut}");
    }
    Ok(())
}

#[test]
fn test_envelope_trailing_bytes() -> Result<()> {
    let mut framed = encode_envelope(&sample())?;
    framed.extend_from_slice(&[0x00, 0x00]);
    let err = decode_envelope::<Transaction>(&framed, &Limits::default()).unwrap_err();
    assert_eq!(err, Error::TrailingBytes(2));
    Ok(())
}

#[test]
fn test_envelope_too_large_rejected_from_header() {
    // Header declares 1 MiB; nothing follows.
    let header = [0x80, 0x80, 0x40];
    let limits = Limits::default().with_max_message_len(1024);
    let err = decode_envelope::<Transaction>(&header, &limits).unwrap_err();
    assert_eq!(err, Error::MessageTooLarge { len: 1 << 20, limit: 1024 });
}

#[test]
fn test_split_envelope_stream() -> Result<()> {
    let a = Transaction::default().with_nonce(1);
    let b = Transaction::default().with_nonce(2);
    let mut stream = encode_envelope(&a)?;
    stream.extend(encode_envelope(&b)?);

    let limits = Limits::default();
    let (body, rest) = split_envelope(&stream, &limits)?;
    assert_eq!(Transaction::decode(body)?, a);
    assert_eq!(decode_envelope::<Transaction>(rest, &limits)?, b);
    Ok(())
}

// ============================================================================
//  SCHEMA
// ============================================================================

static BAD_ORDER: MessageDescriptor = MessageDescriptor {
    name: "BadOrder",
    fields: &[
        FieldDescriptor::new(2, "b", FieldKind::Bytes, Cardinality::Implicit),
        FieldDescriptor::new(1, "a", FieldKind::Bytes, Cardinality::Implicit),
    ],
    reserved: &[],
};

static REUSED: MessageDescriptor = MessageDescriptor {
    name: "Reused",
    fields: &[
        FieldDescriptor::new(4, "revived", FieldKind::Uint64, Cardinality::Implicit),
    ],
    reserved: &[4],
};

static ZERO_TAG: MessageDescriptor = MessageDescriptor {
    name: "ZeroTag",
    fields: &[
        FieldDescriptor::new(0, "zero", FieldKind::Uint64, Cardinality::Implicit),
    ],
    reserved: &[],
};

static WRAPS_BAD: MessageDescriptor = MessageDescriptor {
    name: "WrapsBad",
    fields: &[
        FieldDescriptor::new(1, "inner", FieldKind::Message(&REUSED), Cardinality::Optional),
    ],
    reserved: &[],
};

static PING: MessageDescriptor = MessageDescriptor {
    name: "Ping",
    fields: &[
        FieldDescriptor::new(1, "pong", FieldKind::Message(&PONG), Cardinality::Optional),
    ],
    reserved: &[],
};

static PONG: MessageDescriptor = MessageDescriptor {
    name: "Pong",
    fields: &[
        FieldDescriptor::new(1, "ping", FieldKind::Message(&PING), Cardinality::Optional),
        FieldDescriptor::new(2, "bad", FieldKind::Message(&BAD_PONG), Cardinality::Optional),
    ],
    reserved: &[],
};

// Cycles back into `PING` and also carries a reserved tag.
static BAD_PONG: MessageDescriptor = MessageDescriptor {
    name: "BadPong",
    fields: &[
        FieldDescriptor::new(3, "ping", FieldKind::Message(&PING), Cardinality::Optional),
    ],
    reserved: &[3],
};

static LOOP_A: MessageDescriptor = MessageDescriptor {
    name: "LoopA",
    fields: &[
        FieldDescriptor::new(1, "b", FieldKind::Message(&LOOP_B), Cardinality::Optional),
    ],
    reserved: &[],
};

static LOOP_B: MessageDescriptor = MessageDescriptor {
    name: "LoopB",
    fields: &[
        FieldDescriptor::new(1, "a", FieldKind::Message(&LOOP_A), Cardinality::Optional),
        FieldDescriptor::new(2, "b", FieldKind::Message(&LOOP_B), Cardinality::Repeated),
    ],
    reserved: &[],
};

#[test]
fn test_mutually_recursive_descriptors_validate() {
    // A small stack turns unbounded recursion into an immediate failure.
    let handle = std::thread::Builder::new()
        .stack_size(256 * 1024)
        .spawn(|| (LOOP_A.validate(), LOOP_B.validate(), PONG.validate()))
        .unwrap();
    let (a, b, pong) = handle.join().unwrap();
    assert_eq!(a, Ok(()));
    assert_eq!(b, Ok(()));
    assert_eq!(
        pong,
        Err(SchemaError::ReservedTag { message: "BadPong", field: "ping", tag: 3 })
    );
}

#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "fields must ascend by tag")]
fn test_unsorted_descriptor_lookup_asserts() {
    let _ = BAD_ORDER.field(1);
}

#[test]
fn test_descriptors_are_valid() {
    assert_eq!(TRANSACTION.validate(), Ok(()));
    assert_eq!(CONTRACT_CALL.validate(), Ok(()));
    assert_eq!(FEE.validate(), Ok(()));
}

#[test]
fn test_descriptor_validation_errors() {
    assert_eq!(
        BAD_ORDER.validate(),
        Err(SchemaError::NotAscending { message: "BadOrder", field: "a", tag: 1 })
    );
    assert_eq!(
        REUSED.validate(),
        Err(SchemaError::ReservedTag { message: "Reused", field: "revived", tag: 4 })
    );
    assert_eq!(
        ZERO_TAG.validate(),
        Err(SchemaError::TagOutOfRange { message: "ZeroTag", field: "zero", tag: 0 })
    );
    assert!(matches!(
        WRAPS_BAD.validate(),
        Err(SchemaError::ReservedTag { message: "Reused", .. })
    ));
}

#[test]
fn test_descriptor_lookup() {
    let call = TRANSACTION.field(1).unwrap();
    assert_eq!(call.name, "call");
    assert_eq!(call.kind.wire_type(), WireType::LengthDelimited);
    assert!(matches!(call.kind, FieldKind::Message(d) if d.name == "ContractCall"));

    assert_eq!(TRANSACTION.field(4).unwrap().cardinality, Cardinality::Repeated);
    assert!(TRANSACTION.field(6).is_none());
    assert_eq!(TRANSACTION.field_by_name("nonce").unwrap().tag, 3);
    assert_eq!(<Fee as Message>::descriptor().name, "Fee");
    assert_eq!(format!("{:?}", call.kind), "Message(ContractCall)");
}

// ============================================================================
//  INSPECTION
// ============================================================================

#[test]
fn test_inspect_names_known_fields() -> Result<()> {
    let mut bytes = sample().encode()?;
    bytes.extend_from_slice(&[0x78, 0x2A]);

    let inspection = inspect(&bytes, &TRANSACTION, &Limits::default())?;
    assert_eq!(inspection.message, "Transaction");
    let names: Vec<_> = inspection.fields.iter().map(|f| f.name).collect();
    assert_eq!(
        names,
        vec![
            Some("call"),
            Some("fee"),
            Some("nonce"),
            Some("nullifiers"),
            Some("nullifiers"),
            Some("signature"),
            None,
        ]
    );

    let text = inspection.to_string();
    assert!(text.starts_with("Transaction\n"));
    assert!(text.contains("  1 call (length-delimited) ContractCall\n"));
    assert!(text.contains("    1 payload (length-delimited) 3 bytes 010203\n"));
    assert!(text.contains("  3 nonce (varint) 7\n"));
    assert!(text.contains("  15 <unknown> (varint) 42\n"));
    Ok(())
}

#[test]
fn test_inspect_tolerates_type_mismatch() -> Result<()> {
    let inspection = inspect(&[0x08, 0x01], &TRANSACTION, &Limits::default())?;
    assert_eq!(inspection.fields[0].name, Some("call"));
    assert_eq!(inspection.fields[0].value, inspect::InspectedValue::Varint(1));
    Ok(())
}

// ============================================================================
//  CONCURRENCY
// ============================================================================

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn test_types_are_send_sync() {
    assert_send_sync::<Transaction>();
    assert_send_sync::<Error>();
    assert_send_sync::<&'static MessageDescriptor>();
}

#[test]
fn test_parallel_encode_decode() {
    let tx = sample();
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let tx = &tx;
                s.spawn(move || {
                    let local = tx.clone().with_nonce(i);
                    let bytes = local.encode().unwrap();
                    assert_eq!(Transaction::decode(&bytes).unwrap(), local);
                    tx.encode().unwrap()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), SAMPLE_BYTES);
        }
    });
}
