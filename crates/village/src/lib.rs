//! Village/tower-defense game layer on top of the behaviour-tree engine.
//!
//! - [`adapters`]: world queries and commands that brain leaves call.
//! - [`brain`]: tree factories for villagers, enemies and towers.
//! - [`world`]: [`VillageWorld`], a headless implementation of the adapters.
//! - [`sim`]: [`Simulation`], the frame driver owning the world and one
//!   [`bt::TreeRunner`] per agent.

#![forbid(unsafe_code)]

pub mod adapters;
pub mod base;
pub mod brain;
pub mod command;
pub mod config;
pub mod entity;
pub mod error;
pub mod formation;
pub mod geom;
pub mod inventory;
pub mod resource;
pub mod sim;
pub mod spawner;
pub mod world;

pub use adapters::{BaseSighting, Combat, Locomotion, Perception, ResourceSighting, TargetSighting};
pub use base::BaseHealth;
pub use command::CommandBus;
pub use config::{BrainKind, Order, ScheduledOrder, VillageConfig};
pub use entity::{AgentKind, EntityId, ResourceId, ResourceKind};
pub use error::{Result, VillageError};
pub use geom::Vec2;
pub use inventory::Inventory;
pub use resource::{ResourceNode, ResourceState};
pub use sim::{SimReport, Simulation, TowerPurchase};
pub use world::VillageWorld;
