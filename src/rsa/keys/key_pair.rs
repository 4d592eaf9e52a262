use std::fs;
use std::path::{Path, PathBuf};
use num_bigint::RandBigInt;
use rand::Rng;
use tracing::{debug, info};
use crate::rsa::error::{Result, RsaError};
use crate::rsa::keys::key_data::*;
use crate::rsa::keys::{KeyKind, KeySet};
use crate::rsa::math::fast_modular_exponent;

#[derive(Debug, Clone)]
pub struct KeyPair {
    pub public: KeyData,
    pub private: KeyData,
}

impl From<KeySet> for KeyPair {
    fn from(keys: KeySet) -> Self {
        Self { public: KeyData::new_public(keys.public), private: KeyData::new_private(keys.private) }
    }
}

/// `(<dir>/<name>_private.pem, <dir>/<name>_public.pem)`
pub fn key_paths<P: AsRef<Path>>(dir: P, name: &str) -> (PathBuf, PathBuf) {
    let dir = dir.as_ref();
    (
        dir.join(format!("{}{}", name, KeyKind::Private.file_suffix())),
        dir.join(format!("{}{}", name, KeyKind::Public.file_suffix())),
    )
}

impl KeyPair {
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(private: P, public: Q) -> Result<Self> {
        Ok(Self { public: KeyData::load(public)?, private: KeyData::load(private)? })
    }

    /// Writes both key files into `dir`. Existing files are left untouched unless `force` is set.
    pub fn save<P: AsRef<Path>>(&self, dir: P, name: &str, force: bool) -> Result<(PathBuf, PathBuf)> {
        let dir = dir.as_ref();
        let (private, public) = key_paths(dir, name);
        if !force && (private.exists() || public.exists()) {
            return Err(RsaError::KeyFilesExist { private, public });
        }
        fs::create_dir_all(dir)?;
        self.private.save(&private)?;
        self.public.save(&public)?;
        info!("Generated key files: {}, {}", private.display(), public.display());
        Ok((private, public))
    }

    /// Checks that both halves share a modulus and invert each other on `samples` random messages.
    pub fn self_test<R: Rng + ?Sized>(&self, samples: usize, rng: &mut R) -> Result<()> {
        let (public, private) = (&self.public.key, &self.private.key);
        if public.modulus != private.modulus {
            return Err(RsaError::InvalidKeyFormat("public and private moduli differ".to_string()));
        }
        for i in 0..samples {
            let m = rng.gen_biguint_below(&public.modulus);
            let c = fast_modular_exponent(&m, &public.exponent, &public.modulus);
            let m2 = fast_modular_exponent(&c, &private.exponent, &private.modulus);
            if m != m2 {
                return Err(RsaError::InvalidKeyFormat(format!("sample {} did not survive encrypt/decrypt", i)));
            }
        }
        debug!("{} samples passed", samples);
        Ok(())
    }
}
