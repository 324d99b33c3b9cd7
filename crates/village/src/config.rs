//! Simulation tunables, loaded from YAML.
//!
//! Every field has a default, so a config file only needs the values it
//! changes. [`VillageConfig::load`] validates after parsing.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::entity::{ResourceId, ResourceKind};
use crate::error::{Result, VillageError};
use crate::geom::Vec2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VillageConfig {
    /// Global seed for the frame clock and world randomness
    #[serde(default = "default_seed")]
    pub seed: u64,

    pub world: WorldConfig,
    pub villager: VillagerConfig,
    pub resource: ResourceConfig,
    pub enemy: EnemyConfig,
    pub tower: TowerConfig,
    pub base: BaseConfig,
    pub spawner: SpawnerConfig,

    /// Scripted player input, applied in `at` order
    pub orders: Vec<ScheduledOrder>,
}

fn default_seed() -> u64 {
    0x5EED
}

impl Default for VillageConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            world: WorldConfig::default(),
            villager: VillagerConfig::default(),
            resource: ResourceConfig::default(),
            enemy: EnemyConfig::default(),
            tower: TowerConfig::default(),
            base: BaseConfig::default(),
            spawner: SpawnerConfig::default(),
            orders: Vec::new(),
        }
    }
}

/// Map layout: where things start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Center of the villager spawn area
    pub home: Vec2,
    pub initial_villagers: u32,
    pub resources: Vec<ResourcePlacement>,
    /// Towers standing from the start
    pub towers: Vec<Vec2>,
    /// Empty tower sites, bought in list order
    pub tower_slots: Vec<Vec2>,
    pub enemy_spawn_points: Vec<Vec2>,
    pub enemy_path: PathConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            home: Vec2::ZERO,
            initial_villagers: 3,
            resources: vec![
                ResourcePlacement::new(ResourceKind::Wood, Vec2::new(-4.0, 2.0)),
                ResourcePlacement::new(ResourceKind::Wood, Vec2::new(-3.0, -3.0)),
                ResourcePlacement::new(ResourceKind::Stone, Vec2::new(4.0, 3.5)),
                ResourcePlacement::new(ResourceKind::Stone, Vec2::new(2.5, -4.0)),
            ],
            towers: vec![Vec2::new(3.0, 0.0)],
            tower_slots: vec![Vec2::new(3.0, 2.5), Vec2::new(3.0, -2.5)],
            enemy_spawn_points: vec![Vec2::new(16.0, 0.0), Vec2::new(16.0, 4.0)],
            enemy_path: PathConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourcePlacement {
    pub kind: ResourceKind,
    pub position: Vec2,
}

impl ResourcePlacement {
    pub fn new(kind: ResourceKind, position: Vec2) -> Self {
        Self { kind, position }
    }
}

/// Waypoints enemies walk before heading for the base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    pub waypoints: Vec<Vec2>,
    pub arrive_radius: f32,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            waypoints: vec![Vec2::new(11.0, 2.0), Vec2::new(6.0, 0.0)],
            arrive_radius: 0.15,
        }
    }
}

/// Which tree a villager runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrainKind {
    /// Harvest nearby resources, wander when there is nothing to do
    #[default]
    Auto,
    /// Walk to the last point issued on the command bus
    Command,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VillagerConfig {
    pub brain: BrainKind,
    pub move_speed: f32,
    pub stopping_distance: f32,
    pub max_speed: f32,
    pub use_separation: bool,
    pub separation_radius: f32,
    pub separation_strength: f32,
    /// Resources added to the inventory per finished harvest
    pub amount_per_cycle: u32,
    pub scan_radius: f32,
    pub idle_time: f32,
    pub wander_radius: f32,
    pub min_move_dist: f32,
    pub patrol_arrive_radius: f32,
    /// Distance between slots when the group is sent somewhere
    pub formation_spacing: f32,
    pub formation_centered: bool,
}

impl Default for VillagerConfig {
    fn default() -> Self {
        Self {
            brain: BrainKind::Auto,
            move_speed: 3.5,
            stopping_distance: 0.1,
            max_speed: 5.0,
            use_separation: true,
            separation_radius: 0.8,
            separation_strength: 2.5,
            amount_per_cycle: 1,
            scan_radius: 6.0,
            idle_time: 1.0,
            wander_radius: 3.0,
            min_move_dist: 0.5,
            patrol_arrive_radius: 0.25,
            formation_spacing: 1.2,
            formation_centered: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    pub min_harvest_duration: f32,
    pub max_harvest_duration: f32,
    pub interaction_radius: f32,
    pub respawn: bool,
    pub respawn_min: f32,
    pub respawn_max: f32,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            min_harvest_duration: 2.0,
            max_harvest_duration: 3.0,
            interaction_radius: 0.6,
            respawn: true,
            respawn_min: 5.0,
            respawn_max: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub move_speed: f32,
    pub max_health: i32,
    /// Damage dealt to the base on contact
    pub collision_damage: i32,
    pub contact_radius: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            move_speed: 2.2,
            max_health: 3,
            collision_damage: 5,
            contact_radius: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TowerConfig {
    pub range: f32,
    /// Shots per second
    pub fire_rate: f32,
    pub damage: i32,
    /// Price of the next tower slot
    pub wood_cost: u32,
    pub stone_cost: u32,
    /// Buy the next slot as soon as the inventory covers it
    pub auto_build: bool,
}

impl Default for TowerConfig {
    fn default() -> Self {
        Self {
            range: 5.0,
            fire_rate: 1.0,
            damage: 1,
            wood_cost: 2,
            stone_cost: 1,
            auto_build: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseConfig {
    pub position: Vec2,
    pub radius: f32,
    pub max_health: i32,
}

impl Default for BaseConfig {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            radius: 0.75,
            max_health: 100,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerConfig {
    pub villagers: VillagerSpawnerConfig,
    pub waves: WaveSpawnerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VillagerSpawnerConfig {
    pub enabled: bool,
    /// Seconds between spawn attempts
    pub interval: f32,
    /// 0 means unlimited
    pub max_alive: u32,
    pub initial_burst: u32,
    pub spawn_radius: f32,
    /// Minimum distance to existing villagers for a spawn point to be accepted
    pub overlap_radius: f32,
    pub max_position_attempts: u32,
}

impl Default for VillagerSpawnerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: 5.0,
            max_alive: 0,
            initial_burst: 0,
            spawn_radius: 0.8,
            overlap_radius: 0.35,
            max_position_attempts: 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveSpawnerConfig {
    pub enabled: bool,
    pub waves: Vec<WaveConfig>,
    pub time_between_waves: f32,
    pub loop_waves: bool,
    /// Pick spawn points at random instead of round-robin
    pub randomize_spawn_points: bool,
}

impl Default for WaveSpawnerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            waves: vec![WaveConfig::default()],
            time_between_waves: 3.0,
            loop_waves: false,
            randomize_spawn_points: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    pub count: u32,
    pub spawn_interval: f32,
    pub start_delay: f32,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            count: 5,
            spawn_interval: 0.75,
            start_delay: 2.0,
        }
    }
}

/// A player order fired once the simulation clock reaches `at` seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduledOrder {
    pub at: f32,
    pub order: Order,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Order {
    /// Post a move point on the command bus
    Move { point: Vec2 },
    /// Send every idle villager to a grid around `point`
    GroupMove { point: Vec2 },
    /// Send every idle villager to harvest `resource`
    GroupHarvest { resource: ResourceId },
    /// Buy the next tower slot if the inventory allows
    BuildTower,
}

impl VillageConfig {
    /// Load and validate a YAML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| VillageError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self =
            serde_yaml::from_str(&content).map_err(|source| VillageError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` when given, otherwise the built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn to_yaml(&self) -> std::result::Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<()> {
        positive("villager.move_speed", self.villager.move_speed)?;
        positive("villager.max_speed", self.villager.max_speed)?;
        non_negative("villager.stopping_distance", self.villager.stopping_distance)?;
        non_negative("villager.separation_radius", self.villager.separation_radius)?;
        non_negative("villager.scan_radius", self.villager.scan_radius)?;
        non_negative("villager.idle_time", self.villager.idle_time)?;
        non_negative("villager.wander_radius", self.villager.wander_radius)?;
        non_negative("villager.min_move_dist", self.villager.min_move_dist)?;
        positive("villager.patrol_arrive_radius", self.villager.patrol_arrive_radius)?;
        // The mover halts at `stopping_distance`; a patrol has to count that as arrived.
        if self.villager.stopping_distance >= self.villager.patrol_arrive_radius {
            return Err(invalid(
                "villager.stopping_distance",
                format!(
                    "must be < patrol_arrive_radius ({}), got {}",
                    self.villager.patrol_arrive_radius, self.villager.stopping_distance
                ),
            ));
        }
        non_negative("villager.formation_spacing", self.villager.formation_spacing)?;

        non_negative("resource.min_harvest_duration", self.resource.min_harvest_duration)?;
        ordered(
            "resource.max_harvest_duration",
            self.resource.min_harvest_duration,
            self.resource.max_harvest_duration,
        )?;
        non_negative("resource.interaction_radius", self.resource.interaction_radius)?;
        non_negative("resource.respawn_min", self.resource.respawn_min)?;
        ordered(
            "resource.respawn_max",
            self.resource.respawn_min,
            self.resource.respawn_max,
        )?;

        positive("enemy.move_speed", self.enemy.move_speed)?;
        if self.enemy.max_health <= 0 {
            return Err(invalid("enemy.max_health", "must be at least 1"));
        }
        non_negative("enemy.contact_radius", self.enemy.contact_radius)?;

        non_negative("tower.range", self.tower.range)?;
        positive("tower.fire_rate", self.tower.fire_rate)?;

        if self.base.max_health <= 0 {
            return Err(invalid("base.max_health", "must be at least 1"));
        }
        non_negative("base.radius", self.base.radius)?;
        non_negative("world.enemy_path.arrive_radius", self.world.enemy_path.arrive_radius)?;

        let villagers = &self.spawner.villagers;
        if villagers.enabled {
            positive("spawner.villagers.interval", villagers.interval)?;
        }
        non_negative("spawner.villagers.spawn_radius", villagers.spawn_radius)?;

        let waves = &self.spawner.waves;
        non_negative("spawner.waves.time_between_waves", waves.time_between_waves)?;
        for wave in &waves.waves {
            non_negative("spawner.waves.spawn_interval", wave.spawn_interval)?;
            non_negative("spawner.waves.start_delay", wave.start_delay)?;
        }
        if waves.enabled && !waves.waves.is_empty() && self.world.enemy_spawn_points.is_empty() {
            return Err(invalid(
                "world.enemy_spawn_points",
                "waves are enabled but no spawn point is configured",
            ));
        }

        for scheduled in &self.orders {
            non_negative("orders.at", scheduled.at)?;
            if let Order::GroupHarvest { resource } = scheduled.order {
                if resource.0 as usize >= self.world.resources.len() {
                    return Err(invalid(
                        "orders.resource",
                        format!("no resource {resource} in world.resources"),
                    ));
                }
            }
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> VillageError {
    VillageError::InvalidConfig {
        field,
        reason: reason.into(),
    }
}

fn positive(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be > 0, got {value}")))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be >= 0, got {value}")))
    }
}

fn ordered(field: &'static str, min: f32, max: f32) -> Result<()> {
    if max >= min {
        Ok(())
    } else {
        Err(invalid(field, format!("must be >= {min}, got {max}")))
    }
}
