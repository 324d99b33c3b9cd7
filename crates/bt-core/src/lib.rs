//! Deterministic, engine-agnostic primitives shared by the behaviour-tree engine.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod agent;
pub mod blackboard;
pub mod rng;
pub mod status;
pub mod tick;
pub mod world;

pub use agent::AgentId;
pub use blackboard::{BbKey, Blackboard};
pub use rng::{DeterministicRng, SplitMix64};
pub use status::Status;
pub use tick::{FrameClock, TickContext};
pub use world::{WorldMut, WorldView};
