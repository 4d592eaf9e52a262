pub mod key_writer;
pub mod key_reader;
pub mod key_data;
pub mod key_pair;

pub use key_pair::*;
pub use key_reader::*;
pub use key_writer::*;
pub use key_data::*;

use std::fmt::{Debug, Formatter};
use num_bigint::BigUint;

/// One half of a key pair: `(e, n)` or `(d, n)`.
#[derive(Clone, PartialEq, Eq)]
pub struct Key {
    pub exponent: BigUint,
    pub modulus: BigUint,
}

impl Key {
    pub fn new(exponent: BigUint, modulus: BigUint) -> Self {
        Self { exponent, modulus }
    }

    pub fn bits(&self) -> u64 {
        self.modulus.bits()
    }

    /// Payload carried inside the armored text: `"<exponent>,<modulus>"`.
    pub fn payload(&self) -> String {
        format!("{},{}", self.exponent, self.modulus)
    }
}

impl Debug for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // private exponents stay out of logs
        f.debug_struct("Key")
            .field("bits", &self.bits())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct KeySet {
    pub public: Key,
    pub private: Key,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Public,
    Private,
}

impl KeyKind {
    pub fn label(&self) -> &'static str {
        match self {
            KeyKind::Public => "RSA PUBLIC KEY",
            KeyKind::Private => "RSA PRIVATE KEY",
        }
    }

    pub fn file_suffix(&self) -> &'static str {
        match self {
            KeyKind::Public => "_public.pem",
            KeyKind::Private => "_private.pem",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "RSA PUBLIC KEY" => Some(KeyKind::Public),
            "RSA PRIVATE KEY" => Some(KeyKind::Private),
            _ => None,
        }
    }
}

/// Base64 characters per armored line.
pub const BASE64_SPLIT: usize = 76;

#[cfg(test)]
mod tests {
    use num_bigint::BigUint;
    use super::*;

    #[test]
    fn test_payload() {
        let key = Key::new(BigUint::from(65537u32), BigUint::from(3233u32));
        assert_eq!(key.payload(), "65537,3233");
        assert_eq!(key.bits(), 12);
        assert!(!format!("{:?}", key).contains("65537"));
    }

    #[test]
    fn test_kind_labels() {
        for kind in [KeyKind::Public, KeyKind::Private] {
            assert_eq!(KeyKind::from_label(kind.label()), Some(kind));
        }
        assert_eq!(KeyKind::from_label("RSA-RS PUBLIC_ KEY"), None);
    }
}
