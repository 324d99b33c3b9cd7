//! Behaviour-tree runtime built on `bt-core`.
//!
//! Composites keep a cursor between ticks: a `Running` child is resumed on the
//! next tick without re-evaluating the siblings before it. Every node runs
//! through the same lifecycle (`on_start` → `on_update` → `on_stop`), see
//! [`Node::tick`].

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod builder;
pub mod composite;
pub mod leaf;
pub mod node;
pub mod runner;

pub use bt_core::Status;
pub use builder::{action, condition, empty_action, selector, sequence, wait_seconds};
pub use composite::{Selector, Sequence};
pub use leaf::{Action, ActionFn, Condition, WaitSeconds};
pub use node::{BtNode, Node};
pub use runner::{tick_runners, TreeFactory, TreeRunner};
