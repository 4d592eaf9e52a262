use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use chrono::Local;
use crossbeam_channel::bounded;
use num_bigint::{BigUint, RandBigInt};
use num_traits::One;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};
use crate::rsa::config::KeyGenConfig;
use crate::rsa::error::{Result, RsaError};
use crate::rsa::math::fast_modular_exponent;

/// Miller-Rabin test with `rounds` random witnesses drawn from `rng`.
pub fn miller_rabin<R: Rng + ?Sized>(n: &BigUint, rounds: u32, rng: &mut R) -> bool {
    let two = BigUint::from(2u32);
    if *n <= BigUint::one() { return false; }
    if *n <= BigUint::from(3u32) { return true; }
    if !n.bit(0) { return false; }
    let n_minus_one: BigUint = n - 1u32;
    let mut d = n_minus_one.clone();
    let mut s = 0u64;
    while !d.bit(0) {
        d >>= 1;
        s += 1;
    }
    'witness: for _ in 0..rounds {
        let a = rng.gen_biguint_range(&two, &n_minus_one);
        let mut x = fast_modular_exponent(&a, &d, n);
        if x.is_one() || x == n_minus_one { continue; }
        for _ in 1..s {
            x = fast_modular_exponent(&x, &two, n);
            if x == n_minus_one { continue 'witness; }
        }
        return false;
    }
    true
}

/// Random odd integer of exactly `bits` bits. Widths below 2 are raised to 2.
fn random_candidate<R: Rng + ?Sized>(bits: u64, rng: &mut R) -> BigUint {
    let bits = bits.max(2);
    let candidate = rng.gen_biguint(bits);
    candidate | (BigUint::one() << (bits - 1)) | BigUint::one()
}

impl KeyGenConfig {
    /// Draws candidates of `bits` bits until one passes Miller-Rabin.
    ///
    /// With more than one worker the search races on independent RNGs seeded from `rng`,
    /// so only the single worker case is reproducible from a seed.
    pub fn generate_prime<R: Rng + ?Sized>(&self, bits: u64, rng: &mut R) -> Result<BigUint> {
        if bits < 2 { return Err(RsaError::InvalidKeySize(bits)); }
        // zero rounds would accept every odd candidate
        if self.rounds == 0 { return Err(RsaError::InvalidRounds(self.rounds)); }
        loop {
            let res = match self.workers() {
                1 => self.generate_one_prime(bits, &AtomicBool::new(false), rng),
                workers => self.generate_prime_parallel(bits, workers, rng),
            };
            match res {
                Err(RsaError::Timeout(time)) if self.retry => {
                    warn!("no {}-bit prime after {} ms, retrying", bits, time);
                }
                res => return res,
            }
        }
    }

    fn generate_prime_parallel<R: Rng + ?Sized>(&self, bits: u64, workers: usize, rng: &mut R) -> Result<BigUint> {
        let seeds = (0..workers).map(|_| rng.gen::<u64>()).collect::<Vec<_>>();
        let stop = AtomicBool::new(false);
        let (tx, rx) = bounded(workers);
        debug!("searching {}-bit prime in {} threads", bits, workers);
        thread::scope(|scope| {
            for seed in seeds {
                let tx = tx.clone();
                let stop = &stop;
                scope.spawn(move || {
                    let mut rng = StdRng::seed_from_u64(seed);
                    // the receiver may already be gone once a prime was found
                    let _ = tx.send(self.generate_one_prime(bits, stop, &mut rng));
                });
            }
            drop(tx);
            let mut res = Err(RsaError::Cancelled);
            for r in rx.iter() {
                match r {
                    Ok(prime) => {
                        res = Ok(prime);
                        break;
                    }
                    Err(RsaError::Cancelled) => {}
                    Err(e) => res = Err(e),
                }
            }
            stop.store(true, Ordering::Relaxed);
            if self.is_cancelled() && res.is_err() { return Err(RsaError::Cancelled); }
            res
        })
    }

    /// Single-threaded search. `stop` is raised by sibling workers that already succeeded.
    pub fn generate_one_prime<R: Rng + ?Sized>(&self, bits: u64, stop: &AtomicBool, rng: &mut R) -> Result<BigUint> {
        let start = Local::now().timestamp_millis();
        let mut try_times = 0usize;
        loop {
            if self.is_cancelled() || stop.load(Ordering::Relaxed) { return Err(RsaError::Cancelled); }
            try_times += 1;
            let test = random_candidate(bits, rng);
            let passed = miller_rabin(&test, self.rounds, rng);
            let time = Local::now().timestamp_millis() - start;
            if passed {
                info!("Done {}-bit prime generation in {} tries after {} ms", bits, try_times, time);
                return Ok(test);
            }
            if self.time_max > 0 && time > self.time_max {
                debug!("Failed generation in {} tries after {} ms", try_times, time);
                return Err(RsaError::Timeout(time));
            }
        }
    }
}

/// Two distinct primes of `bits` bits each.
pub fn generate_distinct_primes<R: Rng + ?Sized>(config: &KeyGenConfig, bits: u64, rng: &mut R) -> Result<(BigUint, BigUint)> {
    let p = config.generate_prime(bits, rng)?;
    let mut q = config.generate_prime(bits, rng)?;
    while p == q {
        debug!("drew the same prime twice, redrawing");
        q = config.generate_prime(bits, rng)?;
    }
    Ok((p, q))
}
