use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use num_traits::Zero;
use tracing::{info, warn};
use crate::rsa::error::{Result, RsaError};
use crate::rsa::keys::{Key, KeyKind, KeyReader, KeyWriter};

/// A key together with the armor label it is stored under.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyData {
    pub label: String,
    pub key: Key,
}

impl KeyData {
    pub fn new(kind: KeyKind, key: Key) -> Self {
        Self { label: kind.label().to_string(), key }
    }

    pub fn new_public(key: Key) -> Self {
        Self::new(KeyKind::Public, key)
    }

    pub fn new_private(key: Key) -> Self {
        Self::new(KeyKind::Private, key)
    }

    pub fn kind(&self) -> Option<KeyKind> {
        KeyKind::from_label(&self.label)
    }

    /// Loads an armored key file. A zero modulus is rejected as malformed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = KeyReader::new(File::open(path)?);
        let key = reader.read_key()?;
        if key.modulus.is_zero() {
            return Err(RsaError::InvalidKeyFormat("modulus must be positive".to_string()));
        }
        if key.exponent.is_zero() || key.exponent >= key.modulus {
            warn!("{}: exponent is outside (0, n)", path.display());
        }
        let data = KeyData { label: reader.header, key };
        data.info(path);
        Ok(data)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = KeyWriter::with_label(BufWriter::new(File::create(path)?), &self.label);
        writer.write_key(&self.key)
    }

    pub fn info(&self, path: &Path) {
        info!("{}: {} key, {}-bit modulus", path.display(), self.label, self.key.bits());
    }
}
