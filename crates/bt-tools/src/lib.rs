//! Tooling primitives for the behaviour-tree engine.
//!
//! Engine-agnostic: events are recorded on the tree's blackboard and rendered
//! later by whatever host is driving the simulation.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod trace;

pub use trace::{emit, enabled, TraceEvent, TraceLog, TraceSink, TRACE_LOG, TRACE_SINK};
