//! Seeded random streams. Not cryptographic.
//!
//! Every consumer draws from its own stream so that adding draws in one place
//! never shifts the numbers another place sees. A stream is picked by
//! [`derive_seed`]`(global_seed, agent, stream_tag)`; the game layer uses one
//! per concern: a world stream (harvest durations, respawn delays), a spawner
//! stream (spawn positions and enemy spawn points) and a per-agent, per-tick
//! patrol stream obtained through [`TickContext`](crate::TickContext).

/// Source of uniform draws.
pub trait DeterministicRng {
    fn next_u64(&mut self) -> u64;

    /// Uniform in `[0, 1)`: 24 bits of the low word, one per mantissa bit.
    fn next_f32_unit(&mut self) -> f32 {
        const SCALE: f32 = 1.0 / (1u32 << 24) as f32;
        ((self.next_u64() as u32) >> 8) as f32 * SCALE
    }

    /// Uniform in `[min, max)`; the bounds may be given in either order.
    fn next_range_f32(&mut self, min: f32, max: f32) -> f32 {
        let (lo, hi) = if max < min { (max, min) } else { (min, max) };
        lo + (hi - lo) * self.next_f32_unit()
    }

    /// Uniform index in `[0, len)`; `len` must be non-zero.
    fn next_index(&mut self, len: usize) -> usize {
        (self.next_u64() % (len.max(1) as u64)) as usize
    }
}

const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// SplitMix64 generator. Small, `Copy`, and fine for gameplay randomness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }
}

impl DeterministicRng for SplitMix64 {
    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(GOLDEN_GAMMA);
        mix64(self.state)
    }
}

/// SplitMix64 finalizer: a bijective scramble of `x`.
pub fn mix64(x: u64) -> u64 {
    let x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    let x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

/// Seed for one `(agent, stream)` pair under a global seed.
pub fn derive_seed(global_seed: u64, agent_id: u64, stream: u64) -> u64 {
    let agent = mix64(agent_id.wrapping_add(GOLDEN_GAMMA));
    mix64(global_seed ^ agent ^ mix64(stream))
}
