#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{rng, AgentId, SplitMix64};

/// Per-frame data handed to every node on the active path.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TickContext {
    pub tick: u64,
    pub dt_seconds: f32,
    pub seed: u64,
}

impl TickContext {
    pub fn rng_for_agent<A: AgentId>(&self, agent: A, stream: u64) -> SplitMix64 {
        let seed = rng::derive_seed(self.seed, agent.stable_id(), stream);
        SplitMix64::new(seed)
    }

    /// Like [`rng_for_agent`](Self::rng_for_agent), but a fresh stream every tick.
    pub fn frame_rng_for_agent<A: AgentId>(&self, agent: A, stream: u64) -> SplitMix64 {
        self.rng_for_agent(agent, stream ^ rng::mix64(self.tick))
    }
}

/// External frame clock: turns per-frame deltas into [`TickContext`]s.
///
/// Negative deltas are clamped to zero so timers never run backwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameClock {
    tick: u64,
    seed: u64,
    elapsed_seconds: f64,
}

impl FrameClock {
    pub fn new(seed: u64) -> Self {
        Self {
            tick: 0,
            seed,
            elapsed_seconds: 0.0,
        }
    }

    /// Produce the context for the next frame and move the clock forward.
    pub fn advance(&mut self, dt_seconds: f32) -> TickContext {
        let dt_seconds = if dt_seconds.is_finite() {
            dt_seconds.max(0.0)
        } else {
            0.0
        };
        let ctx = TickContext {
            tick: self.tick,
            dt_seconds,
            seed: self.seed,
        };
        self.tick = self.tick.wrapping_add(1);
        self.elapsed_seconds += dt_seconds as f64;
        ctx
    }

    /// Number of frames produced so far.
    pub fn frames(&self) -> u64 {
        self.tick
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_seconds
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}
