use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RsaError {
    #[error("key files already exist: {}, {} (use --force to overwrite)", private.display(), public.display())]
    KeyFilesExist { private: PathBuf, public: PathBuf },
    #[error("invalid key format: {0}")]
    InvalidKeyFormat(String),
    #[error("no modular inverse exists")]
    NoModularInverse,
    #[error("block {block} is not smaller than the {modulus_bits}-bit modulus, use a larger key")]
    BlockTooLarge { block: usize, modulus_bits: u64 },
    #[error("Miller-Rabin needs at least one round, got {0}")]
    InvalidRounds(u32),
    #[error("unsupported key size: {0} bits")]
    InvalidKeySize(u64),
    #[error("prime generation timeout after {0} ms")]
    Timeout(i64),
    #[error("prime generation cancelled")]
    Cancelled,
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T, E = RsaError> = std::result::Result<T, E>;
