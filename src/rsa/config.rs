use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use lazy_static::lazy_static;

pub struct Defaults {
    pub key_dir: String,
    pub bits: u64,
    pub name: String,
    pub rounds: u32,
    pub threads: usize,
    pub time_max: i64,
    pub retry: bool,
    pub samples: usize,
    pub encrypted_dir: String,
    pub decrypted_dir: String,
}

lazy_static! {
    pub static ref CONFIG_DEF: Defaults = Defaults {
        key_dir: String::from("keys"),
        bits: 2048,
        name: String::from("id_rsa"),
        rounds: 40,
        threads: 1,
        // 0 disables the per-prime time budget
        time_max: 0,
        retry: true,
        samples: 16,
        encrypted_dir: String::from("encrypted"),
        decrypted_dir: String::from("decrypted"),
    };
}

/// Smallest accepted modulus size for generation.
pub const MIN_KEY_BITS: u64 = 32;

/// Tuning knobs for the prime search behind key generation.
#[derive(Debug, Clone)]
pub struct KeyGenConfig {
    /// Miller-Rabin rounds per candidate.
    pub rounds: u32,
    /// Search workers; 0 means one per CPU.
    pub threads: usize,
    /// Time budget in ms for one prime, 0 for unlimited.
    pub time_max: i64,
    /// Restart the search instead of failing when `time_max` runs out.
    pub retry: bool,
    cancel: Arc<AtomicBool>,
}

impl Default for KeyGenConfig {
    fn default() -> Self {
        Self {
            rounds: CONFIG_DEF.rounds,
            threads: CONFIG_DEF.threads,
            time_max: CONFIG_DEF.time_max,
            retry: CONFIG_DEF.retry,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl KeyGenConfig {
    pub fn new(rounds: u32, threads: usize, time_max: i64, retry: bool) -> Self {
        Self { rounds, threads, time_max, retry, ..Default::default() }
    }

    /// Handle that aborts a running search once set to `true`.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    pub fn workers(&self) -> usize {
        match self.threads {
            0 => num_cpus::get(),
            t => t,
        }
    }
}
