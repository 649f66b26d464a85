//! Secure random capability backed by the operating system RNG.

use rand::RngCore;
use rand::rngs::OsRng;

/// Fills buffers in place from the host's cryptographically secure RNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct SecureRandom;

impl SecureRandom {
    /// Fills `buf` with random bytes. Panics if the system RNG is unavailable.
    pub fn fill(&self, buf: &mut [u8]) {
        OsRng.fill_bytes(buf);
    }
}

// Lets the WASI context draw `random_get` bytes from the same source.
impl RngCore for SecureRandom {
    fn next_u32(&mut self) -> u32 {
        OsRng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        OsRng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.fill(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
        OsRng.try_fill_bytes(dest)
    }
}
