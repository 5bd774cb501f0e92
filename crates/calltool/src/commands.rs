//! Subcommand bodies. Each returns its output as a string so it can be tested
//! without capturing stdout.

use std::fmt;
use std::io::Read;

use anyhow::Context;
use anyhow::Result;
use calltx::ContractCall;
use calltx::Fee;
use calltx::Limits;
use calltx::Message;
use calltx::Transaction;
use calltx::UnknownFields;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::cli::TxArgs;

fn parse_hex(flag: &str, value: &str) -> Result<Vec<u8>> {
    hex::decode(value.trim()).with_context(|| format!("--{flag} is not valid hex"))
}

fn parse_opt_hex(flag: &str, value: Option<&str>) -> Result<Option<Vec<u8>>> {
    value.map(|v| parse_hex(flag, v)).transpose()
}

/// Reads hex from the argument, or from stdin when the argument is `-`.
pub fn read_input(arg: &str) -> Result<Vec<u8>> {
    let text = if arg == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        buf
    } else {
        arg.to_owned()
    };
    let compact: String = text.split_whitespace().collect();
    let bytes = hex::decode(&compact).context("input is not valid hex")?;
    debug!(len = bytes.len(), "read input");
    Ok(bytes)
}

pub fn build_transaction(args: &TxArgs) -> Result<Transaction> {
    let payload = parse_opt_hex("payload", args.payload.as_deref())?;
    let contract_id = parse_opt_hex("contract-id", args.contract_id.as_deref())?;
    let selector = parse_opt_hex("selector", args.selector.as_deref())?;

    let mut tx = Transaction::default().with_nonce(args.nonce);
    if payload.is_some() || contract_id.is_some() || selector.is_some() {
        tx.call = Some(ContractCall::new(
            contract_id.unwrap_or_default(),
            selector.unwrap_or_default(),
            payload.unwrap_or_default(),
        ));
    }
    if args.gas_limit.is_some() || args.gas_price.is_some() {
        tx.fee = Some(Fee::new(
            args.gas_limit.unwrap_or_default(),
            args.gas_price.unwrap_or_default(),
        ));
    }
    for nullifier in &args.nullifiers {
        tx.nullifiers.push(parse_hex("nullifier", nullifier)?);
    }
    tx.signature = parse_opt_hex("signature", args.signature.as_deref())?;
    Ok(tx)
}

pub fn encode(args: &TxArgs, framed: bool) -> Result<String> {
    let tx = build_transaction(args)?;
    let bytes = if framed {
        calltx::encode_envelope(&tx)
    } else {
        tx.encode()
    }
    .context("failed to encode transaction")?;
    info!(len = bytes.len(), framed, "encoded transaction");
    Ok(hex::encode(bytes))
}

/// Strips the envelope header when `framed`, returning the message body.
fn strip_envelope<'a>(bytes: &'a [u8], framed: bool, limits: &Limits) -> Result<&'a [u8]> {
    if !framed {
        return Ok(bytes);
    }
    let (body, rest) = calltx::split_envelope(bytes, limits).context("invalid envelope")?;
    if !rest.is_empty() {
        return Err(calltx::Error::TrailingBytes(rest.len())).context("invalid envelope");
    }
    Ok(body)
}

pub fn decode(bytes: &[u8], framed: bool, limits: &Limits) -> Result<String> {
    let body = strip_envelope(bytes, framed, limits)?;
    let tx = Transaction::decode_with(body, limits)
        .inspect_err(|e| warn!(kind = ?e.kind(), "decode rejected"))
        .context("failed to decode transaction")?;
    info!(len = body.len(), unknown = tx.unknown_fields.len(), "decoded transaction");
    Ok(render(&tx))
}

pub fn inspect(bytes: &[u8], framed: bool, limits: &Limits) -> Result<String> {
    let body = strip_envelope(bytes, framed, limits)?;
    let inspection = calltx::inspect(body, Transaction::descriptor(), limits)
        .context("failed to inspect bytes")?;
    Ok(inspection.to_string().trim_end().to_owned())
}

/// One `name: value` line per present field, byte fields in hex.
pub fn render(tx: &Transaction) -> String {
    Rendered(tx).to_string().trim_end().to_owned()
}

struct Rendered<'a>(&'a Transaction);

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tx = self.0;
        if let Some(call) = &tx.call {
            writeln!(f, "call:")?;
            writeln!(f, "  payload: {}", hex::encode(&call.payload))?;
            writeln!(f, "  contract_id: {}", hex::encode(&call.contract_id))?;
            writeln!(f, "  function_selector: {}", hex::encode(&call.function_selector))?;
            write_unknown(f, "  ", &call.unknown_fields)?;
        }
        if let Some(fee) = &tx.fee {
            writeln!(f, "fee:")?;
            writeln!(f, "  gas_limit: {}", fee.gas_limit)?;
            writeln!(f, "  gas_price: {}", fee.gas_price)?;
            write_unknown(f, "  ", &fee.unknown_fields)?;
        }
        writeln!(f, "nonce: {}", tx.nonce)?;
        for nullifier in &tx.nullifiers {
            writeln!(f, "nullifier: {}", hex::encode(nullifier))?;
        }
        if let Some(signature) = &tx.signature {
            writeln!(f, "signature: {}", hex::encode(signature))?;
        }
        write_unknown(f, "", &tx.unknown_fields)
    }
}

fn write_unknown(f: &mut fmt::Formatter<'_>, pad: &str, fields: &UnknownFields) -> fmt::Result {
    for field in fields {
        let raw = hex::encode(&field.raw);
        writeln!(f, "{pad}unknown {} ({}): {raw}", field.tag, field.wire_type)?;
    }
    Ok(())
}
