use num::Integer;
use num_bigint::BigUint;
use num_traits::One;
use rand::Rng;
use tracing::{debug, info};
use crate::rsa::config::{KeyGenConfig, MIN_KEY_BITS};
use crate::rsa::error::{Result, RsaError};
use crate::rsa::keys::{Key, KeySet};
use crate::rsa::math::{euler, mod_reverse};
use crate::rsa::prime_gen::generate_distinct_primes;

pub const DEFAULT_PUBLIC_EXPONENT: u32 = 65537;

/// 65537 when coprime with `phi`, otherwise the smallest odd `e >= 3` that is.
pub fn choose_public_exponent(phi: &BigUint) -> BigUint {
    let mut e = BigUint::from(DEFAULT_PUBLIC_EXPONENT);
    if phi.gcd(&e).is_one() { return e; }
    debug!("65537 shares a factor with phi, scanning odd exponents");
    e = BigUint::from(3u32);
    while !phi.gcd(&e).is_one() {
        e += 2u32;
    }
    e
}

pub fn check_key_set(d: &BigUint, e: &BigUint, f: &BigUint) -> Result<()> {
    if ((d * e) % f).is_one() { Ok(()) } else { Err(RsaError::NoModularInverse) }
}

impl KeyGenConfig {
    /// Builds a key pair whose modulus is the product of two distinct `bits / 2`-bit primes.
    pub fn generate_key<R: Rng + ?Sized>(&self, bits: u64, rng: &mut R) -> Result<KeySet> {
        if bits < MIN_KEY_BITS || bits % 2 != 0 { return Err(RsaError::InvalidKeySize(bits)); }
        let (p, q) = generate_distinct_primes(self, bits / 2, rng)?;
        let n = &p * &q;
        let f = euler(&p, &q);
        let e = choose_public_exponent(&f);
        let d = mod_reverse(&e, &f)?;
        check_key_set(&d, &e, &f)?;
        info!("generated {}-bit modulus, public exponent {}", n.bits(), e);
        Ok(KeySet {
            public: Key::new(e, n.clone()),
            private: Key::new(d, n),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;
    use num::Integer;
    use num_bigint::{BigUint, RandBigInt};
    use num_traits::One;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use crate::rsa::config::KeyGenConfig;
    use crate::rsa::error::RsaError;
    use crate::rsa::math::fast_modular_exponent;
    use super::*;

    #[test]
    fn test_choose_public_exponent() {
        assert_eq!(choose_public_exponent(&BigUint::from(160u32)), BigUint::from(65537u32));
        // 65537 * 6 is even and divisible by 3 and 65537
        let phi = BigUint::from(65537u32 * 2 * 3 * 5);
        assert_eq!(choose_public_exponent(&phi), BigUint::from(7u32));
    }

    #[test]
    fn test_generate_key() -> Result<(), Box<dyn Error>> {
        let mut rng = StdRng::seed_from_u64(2022);
        let keys = KeyGenConfig::default().generate_key(512, &mut rng)?;
        let (public, private) = (&keys.public, &keys.private);
        assert_eq!(public.modulus, private.modulus);
        assert!(public.modulus.bits() >= 511 && public.modulus.bits() <= 512);
        assert_eq!(public.exponent, BigUint::from(65537u32));
        assert!(private.exponent < private.modulus);
        for _ in 0..8 {
            let m = rng.gen_biguint_below(&public.modulus);
            let c = fast_modular_exponent(&m, &public.exponent, &public.modulus);
            let m2 = fast_modular_exponent(&c, &private.exponent, &private.modulus);
            assert_eq!(m, m2);
        }
        Ok(())
    }

    #[test]
    fn test_small_key_round_trip() -> Result<(), Box<dyn Error>> {
        let mut rng = StdRng::seed_from_u64(1);
        let keys = KeyGenConfig::default().generate_key(64, &mut rng)?;
        assert!(keys.public.exponent.gcd(&keys.public.modulus).is_one());
        let m = BigUint::from(0x1234_5678u32);
        let c = fast_modular_exponent(&m, &keys.public.exponent, &keys.public.modulus);
        assert_eq!(fast_modular_exponent(&c, &keys.private.exponent, &keys.private.modulus), m);
        Ok(())
    }

    #[test]
    fn test_invalid_sizes() {
        let config = KeyGenConfig::default();
        let mut rng = StdRng::seed_from_u64(0);
        for bits in [0u64, 8, 30, 65] {
            assert!(matches!(config.generate_key(bits, &mut rng), Err(RsaError::InvalidKeySize(b)) if b == bits));
        }
    }

    #[test]
    fn test_zero_rounds() {
        let config = KeyGenConfig::new(0, 1, 0, true);
        let res = config.generate_key(64, &mut StdRng::seed_from_u64(0));
        assert!(matches!(res, Err(RsaError::InvalidRounds(0))));
    }

    #[test]
    fn test_check_key_set() {
        let (d, e, f) = (BigUint::from(23u32), BigUint::from(7u32), BigUint::from(160u32));
        assert!(check_key_set(&d, &e, &f).is_ok());
        assert!(check_key_set(&BigUint::from(22u32), &e, &f).is_err());
    }
}
