//! Monotonic clock capability.

use std::time::Instant;

/// High-resolution monotonic clock measured from its creation.
#[derive(Clone, Copy, Debug)]
pub struct Clock {
    origin: Instant,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Elapsed time as a `(seconds, nanoseconds)` pair.
    pub fn hrtime(&self) -> (u64, u32) {
        let elapsed = self.origin.elapsed();
        (elapsed.as_secs(), elapsed.subsec_nanos())
    }

    /// Elapsed milliseconds, keeping sub-millisecond precision in the fraction.
    pub fn now_ms(&self) -> f64 {
        let (secs, nanos) = self.hrtime();
        hrtime_ms(secs, nanos)
    }

    pub fn now_nanos(&self) -> u64 {
        let (secs, nanos) = self.hrtime();
        secs.saturating_mul(1_000_000_000).saturating_add(nanos as u64)
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

/// `seconds * 1000 + nanoseconds / 1e6`
pub fn hrtime_ms(secs: u64, nanos: u32) -> f64 {
    secs as f64 * 1000.0 + nanos as f64 / 1_000_000.0
}

impl wasmtime_wasi::HostMonotonicClock for Clock {
    fn resolution(&self) -> u64 {
        1
    }

    fn now(&self) -> u64 {
        self.now_nanos()
    }
}
