use num_bigint::{BigInt, BigUint};
use num_traits::{One, Zero};
use crate::rsa::error::{Result, RsaError};

/// Square-and-multiply `base^exponent mod modulus`.
pub fn fast_modular_exponent(base: &BigUint, exponent: &BigUint, modulus: &BigUint) -> BigUint {
    if modulus.is_one() { return BigUint::zero(); }
    let mut a = base % modulus;
    let mut q = exponent.clone();
    let mut r = BigUint::one();
    while !q.is_zero() {
        if q.bit(0) { r = (r * &a) % modulus; }
        q >>= 1;
        a = (&a * &a) % modulus;
    }
    r
}

pub fn euler(p: &BigUint, q: &BigUint) -> BigUint { (p - 1u32) * (q - 1u32) }

/// Returns `(g, x, y)` with `a * x + b * y == g == gcd(a, b)`.
///
/// Iterative form of the recursive `egcd(b % a, a)` descent, producing the same coefficients.
pub fn extended_euclid(a: &BigInt, b: &BigInt) -> (BigInt, BigInt, BigInt) {
    let (mut old_r, mut r) = (b.clone(), a.clone());
    let (mut old_x, mut x) = (BigInt::zero(), BigInt::one());
    let (mut old_y, mut y) = (BigInt::one(), BigInt::zero());
    while !r.is_zero() {
        let quotient = &old_r / &r;
        let next_r = &old_r - &quotient * &r;
        old_r = std::mem::replace(&mut r, next_r);
        let next_x = &old_x - &quotient * &x;
        old_x = std::mem::replace(&mut x, next_x);
        let next_y = &old_y - &quotient * &y;
        old_y = std::mem::replace(&mut y, next_y);
    }
    (old_r, old_x, old_y)
}

/// `a^-1 mod m`, normalized into `[0, m)`.
pub fn mod_reverse(a: &BigUint, m: &BigUint) -> Result<BigUint> {
    let (a, m) = (BigInt::from(a.clone()), BigInt::from(m.clone()));
    let (g, x, _) = extended_euclid(&a, &m);
    if !g.is_one() { return Err(RsaError::NoModularInverse); }
    let x = ((x % &m) + &m) % &m;
    match x.to_biguint() {
        Some(x) => Ok(x),
        None => Err(RsaError::NoModularInverse),
    }
}

/// Minimal big-endian bytes; zero has no bytes.
pub fn to_minimal_bytes(n: &BigUint) -> Vec<u8> {
    if n.is_zero() { Vec::new() } else { n.to_bytes_be() }
}

/// Big-endian bytes left-padded with zeros to `width`. Values wider than `width` are returned whole.
pub fn to_fixed_bytes(n: &BigUint, width: usize) -> Vec<u8> {
    let bytes = to_minimal_bytes(n);
    if bytes.len() >= width { return bytes; }
    let mut res = vec![0u8; width - bytes.len()];
    res.extend_from_slice(&bytes);
    res
}

#[cfg(test)]
mod tests {
    use num::Integer;
    use num_bigint::{BigInt, BigUint};
    use num_traits::One;
    use super::*;

    #[test]
    fn test_fast_modular_exponent() {
        let r = fast_modular_exponent(&BigUint::from(4u32), &BigUint::from(13u32), &BigUint::from(497u32));
        assert_eq!(r, BigUint::from(445u32));
        let r = fast_modular_exponent(&BigUint::from(7u32), &BigUint::from(0u32), &BigUint::from(13u32));
        assert!(r.is_one());
        let r = fast_modular_exponent(&BigUint::from(7u32), &BigUint::from(5u32), &BigUint::from(1u32));
        assert_eq!(r, BigUint::from(0u32));
    }

    #[test]
    fn test_fast_modular_exponent_matches_modpow() {
        let base = BigUint::parse_bytes(b"123456789012345678901234567890123456789", 10).unwrap();
        let exp = BigUint::parse_bytes(b"98765432109876543210987654321", 10).unwrap();
        let m = (BigUint::one() << 2048u32) - 159u32;
        assert_eq!(fast_modular_exponent(&base, &exp, &m), base.modpow(&exp, &m));
    }

    #[test]
    fn test_extended_euclid_coefficients() {
        let (a, b) = (BigInt::from(240), BigInt::from(46));
        let (g, x, y) = extended_euclid(&a, &b);
        assert_eq!(g, BigInt::from(2));
        assert_eq!(&a * &x + &b * &y, g);
        // egcd(a, b) descends through egcd(b % a, a)
        assert_eq!((x, y), (BigInt::from(-9), BigInt::from(47)));
        let (g, x, y) = extended_euclid(&BigInt::from(0), &BigInt::from(7));
        assert_eq!((g, x, y), (BigInt::from(7), BigInt::from(0), BigInt::from(1)));
    }

    #[test]
    fn test_mod_reverse() {
        let (p, q) = (BigUint::from(17u32), BigUint::from(11u32));
        let f = euler(&p, &q);
        let e = BigUint::from(7u32);
        let d = mod_reverse(&e, &f).unwrap();
        assert_eq!(d, BigUint::from(23u32));
        assert!(((&d * &e) % &f).is_one());
        assert!(f.gcd(&e).is_one());
    }

    #[test]
    fn test_mod_reverse_not_coprime() {
        let r = mod_reverse(&BigUint::from(6u32), &BigUint::from(9u32));
        assert!(matches!(r, Err(RsaError::NoModularInverse)));
    }

    #[test]
    fn test_bytes() {
        assert!(to_minimal_bytes(&BigUint::from(0u32)).is_empty());
        assert_eq!(to_minimal_bytes(&BigUint::from(0x0102u32)), vec![1, 2]);
        assert_eq!(to_fixed_bytes(&BigUint::from(0x0102u32), 4), vec![0, 0, 1, 2]);
        assert_eq!(to_fixed_bytes(&BigUint::from(0u32), 3), vec![0, 0, 0]);
    }
}
