//! Tree factories for every agent kind.
//!
//! Each factory is generic over the world so brains can be exercised against
//! a small test world; per-agent state lives on the runner's blackboard under
//! the keys exported here.

pub mod command;
pub mod enemy;
pub mod tower;
pub mod villager;

use bt::Node;

use crate::adapters::Locomotion;
use crate::config::{BrainKind, VillagerConfig};

pub use command::command_follow_tree;
pub use enemy::enemy_tree;
pub use tower::tower_tree;
pub use villager::auto_harvest_tree;

/// The villager tree selected by `config.brain`.
pub fn villager_tree<W>(config: &VillagerConfig) -> Node<W>
where
    W: Locomotion + 'static,
{
    match config.brain {
        BrainKind::Auto => auto_harvest_tree(config),
        BrainKind::Command => command_follow_tree(),
    }
}
