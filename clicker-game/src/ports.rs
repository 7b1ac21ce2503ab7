//! Clock and randomness sources injected into the engine.
use hmac::{Hmac, Mac};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::Sha256;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::record::Timestamp;

/// Source of the current time in whole unix seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall clock backed by [`SystemTime`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_secs())
    }
}

/// Manually driven clock for tests and replays.
#[derive(Debug, Default)]
pub struct FixedClock {
    now: AtomicU64,
}

impl FixedClock {
    #[must_use]
    pub const fn new(now: Timestamp) -> Self {
        Self {
            now: AtomicU64::new(now),
        }
    }

    pub fn set(&self, now: Timestamp) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Uniform draws in `[0, 1)` used for crit rolls.
pub trait RandomSource: Send {
    fn roll(&mut self) -> f64;
}

/// Deterministic ChaCha stream derived from a user-visible seed.
#[derive(Debug, Clone)]
pub struct SeededRoll {
    rng: ChaCha20Rng,
    draws: u64,
}

impl SeededRoll {
    /// Construct the stream from a user seed, domain-separated for crit rolls.
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(derive_stream_seed(seed, b"crit")),
            draws: 0,
        }
    }

    /// Number of rolls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl RandomSource for SeededRoll {
    fn roll(&mut self) -> f64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.r#gen::<f64>()
    }
}

/// Always returns the same value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedRoll(f64);

impl FixedRoll {
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    /// A roll that never crits under any valid crit chance below 1.
    #[must_use]
    pub const fn never_crit() -> Self {
        Self(0.999_999)
    }

    /// A roll that crits under any positive crit chance.
    #[must_use]
    pub const fn always_crit() -> Self {
        Self(0.0)
    }
}

impl RandomSource for FixedRoll {
    fn roll(&mut self) -> f64 {
        self.0
    }
}

/// Replays queued values, then falls back to a constant.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedRoll {
    queue: VecDeque<f64>,
    fallback: f64,
}

impl ScriptedRoll {
    #[must_use]
    pub fn new(values: impl IntoIterator<Item = f64>, fallback: f64) -> Self {
        Self {
            queue: values.into_iter().collect(),
            fallback,
        }
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl RandomSource for ScriptedRoll {
    fn roll(&mut self) -> f64 {
        self.queue.pop_front().unwrap_or(self.fallback)
    }
}

fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    // HMAC accepts keys of any length, so an 8-byte key cannot fail.
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()) else {
        return user_seed;
    };
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}
