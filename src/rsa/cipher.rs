use std::io::{Read, Write};
use num_bigint::BigUint;
use tracing::{debug, warn};
use crate::rsa::error::{Result, RsaError};
use crate::rsa::keys::Key;
use crate::rsa::math::{fast_modular_exponent, to_fixed_bytes, to_minimal_bytes};

/// Plaintext and ciphertext block widths derived from a modulus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSizes {
    /// `floor(bits / 8) - 1`
    pub plain: usize,
    /// `ceil(bits / 8)`
    pub cipher: usize,
}

impl BlockSizes {
    pub fn for_modulus(n: &BigUint) -> Result<Self> {
        let bits = n.bits();
        let plain = (bits / 8) as usize;
        if plain < 2 { return Err(RsaError::InvalidKeySize(bits)); }
        Ok(Self { plain: plain - 1, cipher: ((bits + 7) / 8) as usize })
    }

    /// Ciphertext length produced for `len` plaintext bytes.
    pub fn encrypted_len(&self, len: u64) -> u64 {
        (len + self.plain as u64 - 1) / self.plain as u64 * self.cipher as u64
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StreamStats {
    pub blocks: usize,
    pub bytes_in: u64,
    pub bytes_out: u64,
}

/// Reads up to `bytes` bytes, stopping early only at end of input.
pub fn read_source<R: Read + ?Sized>(reader: &mut R, bytes: usize) -> Result<Vec<u8>> {
    let mut res = Vec::with_capacity(bytes);
    reader.take(bytes as u64).read_to_end(&mut res)?;
    Ok(res)
}

/// Encrypts one plaintext block into a fixed-width ciphertext block.
pub fn encrypt_block(index: usize, source: &[u8], key: &Key, sizes: BlockSizes) -> Result<Vec<u8>> {
    let m = BigUint::from_bytes_be(source);
    if m >= key.modulus {
        return Err(RsaError::BlockTooLarge { block: index, modulus_bits: key.bits() });
    }
    let c = fast_modular_exponent(&m, &key.exponent, &key.modulus);
    Ok(to_fixed_bytes(&c, sizes.cipher))
}

pub fn decrypt_block(source: &[u8], key: &Key) -> BigUint {
    let c = BigUint::from_bytes_be(source);
    fast_modular_exponent(&c, &key.exponent, &key.modulus)
}

pub fn encrypt_stream<R: Read, W: Write>(reader: &mut R, writer: &mut W, key: &Key) -> Result<StreamStats> {
    let sizes = BlockSizes::for_modulus(&key.modulus)?;
    debug!("encrypting with block sizes {:?}", sizes);
    let mut stats = StreamStats::default();
    loop {
        let source = read_source(reader, sizes.plain)?;
        if source.is_empty() { break; }
        let res = encrypt_block(stats.blocks, &source, key, sizes)?;
        writer.write_all(&res)?;
        stats.blocks += 1;
        stats.bytes_in += source.len() as u64;
        stats.bytes_out += res.len() as u64;
    }
    writer.flush()?;
    Ok(stats)
}

/// Inverse of [`encrypt_stream`].
///
/// Every block but the last is left-padded back to the plaintext block width. The last
/// block's length is not stored anywhere, so it is written in its minimal big-endian
/// form and loses any leading zero bytes.
pub fn decrypt_stream<R: Read, W: Write>(reader: &mut R, writer: &mut W, key: &Key) -> Result<StreamStats> {
    let sizes = BlockSizes::for_modulus(&key.modulus)?;
    debug!("decrypting with block sizes {:?}", sizes);
    let mut stats = StreamStats::default();
    let mut pending: Option<BigUint> = None;
    loop {
        let source = read_source(reader, sizes.cipher)?;
        if source.is_empty() { break; }
        if source.len() < sizes.cipher {
            warn!("trailing ciphertext block is {} of {} bytes", source.len(), sizes.cipher);
        }
        stats.blocks += 1;
        stats.bytes_in += source.len() as u64;
        if let Some(m) = pending.replace(decrypt_block(&source, key)) {
            let res = to_fixed_bytes(&m, sizes.plain);
            writer.write_all(&res)?;
            stats.bytes_out += res.len() as u64;
        }
    }
    if let Some(m) = pending {
        let res = to_minimal_bytes(&m);
        writer.write_all(&res)?;
        stats.bytes_out += res.len() as u64;
    }
    writer.flush()?;
    Ok(stats)
}
