use std::io::{ErrorKind, Read};
use lazy_static::lazy_static;
use num_bigint::BigUint;
use regex::Regex;
use tracing::debug;
use crate::rsa::error::{Result, RsaError};
use crate::rsa::keys::Key;

lazy_static! {
    static ref ARMOR: Regex = Regex::new(r"(?s)-----BEGIN(.*?)-----(.*?)-----END.*?-----")
        .expect("armor pattern is valid");
}

/// Reads an armored key from any byte source.
pub struct KeyReader<R: Read> {
    reader: R,
    pub header: String,
}

impl<R: Read> KeyReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, header: "".to_string() }
    }

    pub fn read_key(&mut self) -> Result<Key> {
        let mut text = String::new();
        self.reader.read_to_string(&mut text).map_err(|e| match e.kind() {
            ErrorKind::InvalidData => format_error("key file is not UTF-8 text"),
            _ => RsaError::Io(e),
        })?;
        let (label, key) = decode_armored(&text)?;
        self.header = label;
        Ok(key)
    }
}

fn format_error(msg: &str) -> RsaError {
    RsaError::InvalidKeyFormat(msg.to_string())
}

fn parse_decimal(field: &str) -> Result<BigUint> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format_error("key fields must be decimal integers"));
    }
    field.parse::<BigUint>().map_err(|_| format_error("key fields must be decimal integers"))
}

/// Decodes the first `BEGIN`/`END` block in `text`, returning its label and key.
pub fn decode_armored(text: &str) -> Result<(String, Key)> {
    let caps = ARMOR.captures(text).ok_or_else(|| format_error("missing BEGIN/END markers"))?;
    let label = caps.get(1).map(|m| m.as_str().trim().to_string()).unwrap_or_default();
    let body = caps.get(2).map(|m| m.as_str()).unwrap_or_default()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>();
    let raw = base64::decode(&body).map_err(|e| RsaError::InvalidKeyFormat(format!("bad base64 payload: {}", e)))?;
    let payload = String::from_utf8(raw).map_err(|_| format_error("payload is not UTF-8"))?;
    let parts = payload.split(',').collect::<Vec<_>>();
    if parts.len() != 2 {
        return Err(RsaError::InvalidKeyFormat(format!("expected 2 fields, got {}", parts.len())));
    }
    let key = Key::new(parse_decimal(parts[0])?, parse_decimal(parts[1])?);
    debug!("decoded {:?} with label {:?}", key, label);
    Ok((label, key))
}

/// Decodes an armored key into `(exponent, modulus)`.
pub fn decode_key(text: &str) -> Result<Key> {
    decode_armored(text).map(|(_, key)| key)
}
