use core::fmt::Debug;

/// Identity of the agent a tree runs for.
///
/// Runners are ticked in `Ord` order, and `stable_id` feeds per-agent RNG
/// streams and log fields, so both must not change over the agent's life.
pub trait AgentId: Copy + Ord + Eq + Debug {
    fn stable_id(self) -> u64;
}

impl AgentId for u64 {
    fn stable_id(self) -> u64 {
        self
    }
}
