//! Headless game world: entity tables plus the per-frame physics step.
//!
//! Trees only *request* movement through [`Locomotion`]; positions change in
//! [`VillageWorld::integrate`], which the simulation calls after all trees of
//! a frame have been ticked.

use std::collections::BTreeMap;

use bt_core::{rng, SplitMix64, WorldMut, WorldView};
use serde::Serialize;

use crate::adapters::{BaseSighting, Combat, Locomotion, Perception, ResourceSighting, TargetSighting};
use crate::base::BaseHealth;
use crate::command::CommandBus;
use crate::config::{EnemyConfig, PathConfig, VillageConfig, VillagerConfig};
use crate::entity::{AgentKind, EntityId, ResourceId};
use crate::error::{Result, VillageError};
use crate::formation::{grid_slots, ring_slots};
use crate::geom::Vec2;
use crate::inventory::Inventory;
use crate::resource::ResourceNode;

const WORLD_RNG_STREAM: u64 = 0x0057_4F52_4C44;
const HARVEST_RING_MIN: f32 = 0.5;
const HARVEST_RING_MARGIN: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HarvestState {
    Idle,
    Harvesting { resource: ResourceId, remaining: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Villager {
    position: Vec2,
    velocity: Vec2,
    target: Option<Vec2>,
    harvest_target: Option<ResourceId>,
    harvest: HarvestState,
}

impl Villager {
    fn new(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            target: None,
            harvest_target: None,
            harvest: HarvestState::Idle,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn target(&self) -> Option<Vec2> {
        self.target
    }

    pub fn harvest_target(&self) -> Option<ResourceId> {
        self.harvest_target
    }

    pub fn harvest(&self) -> HarvestState {
        self.harvest
    }

    pub fn is_harvesting(&self) -> bool {
        matches!(self.harvest, HarvestState::Harvesting { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    position: Vec2,
    target: Option<Vec2>,
    health: i32,
    dead: bool,
}

impl Enemy {
    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tower {
    position: Vec2,
}

impl Tower {
    pub fn position(&self) -> Vec2 {
        self.position
    }
}

/// Running totals for the simulation report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorldStats {
    pub harvests: u64,
    pub enemies_killed: u64,
    pub base_strikes: u64,
}

#[derive(Debug, Clone)]
pub struct VillageWorld {
    villager_config: VillagerConfig,
    enemy_config: EnemyConfig,
    path: PathConfig,
    rng: SplitMix64,
    next_id: u64,
    villagers: BTreeMap<EntityId, Villager>,
    enemies: BTreeMap<EntityId, Enemy>,
    towers: BTreeMap<EntityId, Tower>,
    resources: Vec<ResourceNode>,
    inventory: Inventory,
    commands: CommandBus,
    base: BaseHealth,
    stats: WorldStats,
}

impl WorldView for VillageWorld {
    type Agent = EntityId;
}

impl WorldMut for VillageWorld {}

impl VillageWorld {
    /// Build the static part of the map (resources, base, path). Agents are
    /// added with the `spawn_*` methods.
    pub fn new(config: &VillageConfig) -> Self {
        let resources = config
            .world
            .resources
            .iter()
            .enumerate()
            .map(|(i, placement)| {
                ResourceNode::new(
                    ResourceId(i as u32),
                    placement.kind,
                    placement.position,
                    &config.resource,
                )
            })
            .collect();

        Self {
            villager_config: config.villager.clone(),
            enemy_config: config.enemy.clone(),
            path: config.world.enemy_path.clone(),
            rng: SplitMix64::new(rng::derive_seed(config.seed, 0, WORLD_RNG_STREAM)),
            next_id: 1,
            villagers: BTreeMap::new(),
            enemies: BTreeMap::new(),
            towers: BTreeMap::new(),
            resources,
            inventory: Inventory::new(),
            commands: CommandBus::new(),
            base: BaseHealth::new(config.base.position, config.base.radius, config.base.max_health),
            stats: WorldStats::default(),
        }
    }

    pub fn spawn_villager(&mut self, position: Vec2) -> EntityId {
        let id = self.allocate_id();
        self.villagers.insert(id, Villager::new(position));
        id
    }

    pub fn spawn_enemy(&mut self, position: Vec2) -> EntityId {
        let id = self.allocate_id();
        self.enemies.insert(
            id,
            Enemy {
                position,
                target: None,
                health: self.enemy_config.max_health,
                dead: false,
            },
        );
        id
    }

    pub fn spawn_tower(&mut self, position: Vec2) -> EntityId {
        let id = self.allocate_id();
        self.towers.insert(id, Tower { position });
        id
    }

    /// Remove an agent of any kind, releasing its claim on a resource.
    pub fn despawn(&mut self, id: EntityId) -> Result<AgentKind> {
        if let Some(villager) = self.villagers.remove(&id) {
            if let HarvestState::Harvesting { resource, .. } = villager.harvest {
                if let Some(node) = self.resources.get_mut(resource.0 as usize) {
                    node.unregister_harvester();
                }
            }
            return Ok(AgentKind::Villager);
        }
        if self.enemies.remove(&id).is_some() {
            return Ok(AgentKind::Enemy);
        }
        if self.towers.remove(&id).is_some() {
            return Ok(AgentKind::Tower);
        }
        Err(VillageError::UnknownEntity(id))
    }

    pub fn kind_of(&self, id: EntityId) -> Option<AgentKind> {
        if self.villagers.contains_key(&id) {
            Some(AgentKind::Villager)
        } else if self.enemies.contains_key(&id) {
            Some(AgentKind::Enemy)
        } else if self.towers.contains_key(&id) {
            Some(AgentKind::Tower)
        } else {
            None
        }
    }

    pub fn villager(&self, id: EntityId) -> Option<&Villager> {
        self.villagers.get(&id)
    }

    pub fn villagers(&self) -> impl Iterator<Item = (EntityId, &Villager)> {
        self.villagers.iter().map(|(id, v)| (*id, v))
    }

    pub fn enemy_entity(&self, id: EntityId) -> Option<&Enemy> {
        self.enemies.get(&id)
    }

    pub fn enemies(&self) -> impl Iterator<Item = (EntityId, &Enemy)> {
        self.enemies.iter().map(|(id, e)| (*id, e))
    }

    pub fn towers(&self) -> impl Iterator<Item = (EntityId, &Tower)> {
        self.towers.iter().map(|(id, t)| (*id, t))
    }

    pub fn villager_count(&self) -> usize {
        self.villagers.len()
    }

    /// Enemies still alive (dead ones linger until the simulation reaps them).
    pub fn enemies_alive(&self) -> usize {
        self.enemies.values().filter(|e| !e.dead).count()
    }

    pub fn tower_count(&self) -> usize {
        self.towers.len()
    }

    pub fn dead_enemies(&self) -> Vec<EntityId> {
        self.enemies
            .iter()
            .filter(|(_, e)| e.dead)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn resources(&self) -> &[ResourceNode] {
        &self.resources
    }

    pub fn resource_node(&self, id: ResourceId) -> Option<&ResourceNode> {
        self.resources.get(id.0 as usize)
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }

    pub fn commands(&self) -> &CommandBus {
        &self.commands
    }

    pub fn commands_mut(&mut self) -> &mut CommandBus {
        &mut self.commands
    }

    pub fn base_health(&self) -> &BaseHealth {
        &self.base
    }

    pub fn base_health_mut(&mut self) -> &mut BaseHealth {
        &mut self.base
    }

    pub fn stats(&self) -> WorldStats {
        self.stats
    }

    /// Order every villager that is not harvesting into a grid around `center`.
    ///
    /// Returns how many villagers were given a new target.
    pub fn send_all_to_move(&mut self, center: Vec2) -> usize {
        let slots = grid_slots(
            center,
            self.villagers.len(),
            self.villager_config.formation_spacing,
            self.villager_config.formation_centered,
        );
        let mut ordered = 0;
        for (villager, slot) in self.villagers.values_mut().zip(slots) {
            if villager.is_harvesting() {
                continue;
            }
            villager.target = Some(slot);
            villager.harvest_target = None;
            ordered += 1;
        }
        tracing::info!(x = center.x, y = center.y, ordered, "group move");
        ordered
    }

    /// Spread every villager that is not harvesting on a ring around `resource`
    /// and have them harvest it on arrival.
    pub fn send_group_to_harvest(&mut self, resource: ResourceId) -> Result<usize> {
        let node = self
            .resources
            .get(resource.0 as usize)
            .ok_or(VillageError::UnknownResource(resource))?;
        let ring = node.interaction_radius().max(HARVEST_RING_MIN) + HARVEST_RING_MARGIN;
        let slots = ring_slots(node.position(), self.villagers.len(), ring);

        let mut ordered = 0;
        for (villager, slot) in self.villagers.values_mut().zip(slots) {
            if villager.is_harvesting() {
                continue;
            }
            villager.target = Some(slot);
            villager.harvest_target = Some(resource);
            ordered += 1;
        }
        tracing::info!(resource = %resource, ordered, "group harvest");
        Ok(ordered)
    }

    /// Advance harvest timers, movement and resource respawns by `dt` seconds.
    pub fn integrate(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.advance_harvests(dt);
        self.move_villagers(dt);
        self.move_enemies(dt);
        for node in &mut self.resources {
            if node.update(dt) {
                tracing::debug!(resource = %node.id(), "resource respawned");
            }
        }
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    fn advance_harvests(&mut self, dt: f32) {
        let amount = self.villager_config.amount_per_cycle;
        for (id, villager) in self.villagers.iter_mut() {
            let HarvestState::Harvesting { resource, remaining } = villager.harvest else {
                continue;
            };
            let remaining = remaining - dt;
            if remaining > 0.0 {
                villager.harvest = HarvestState::Harvesting { resource, remaining };
                continue;
            }

            villager.harvest = HarvestState::Idle;
            villager.harvest_target = None;
            let Some(node) = self.resources.get_mut(resource.0 as usize) else {
                continue;
            };
            if node.try_consume() {
                self.inventory.add(node.kind(), amount);
                node.deplete(&mut self.rng);
                self.stats.harvests += 1;
                tracing::info!(
                    villager = %id,
                    resource = %resource,
                    kind = ?node.kind(),
                    amount,
                    "harvest complete"
                );
            }
            node.unregister_harvester();
        }
    }

    fn move_villagers(&mut self, dt: f32) {
        let cfg = &self.villager_config;
        let positions: Vec<(EntityId, Vec2)> = self
            .villagers
            .iter()
            .map(|(id, v)| (*id, v.position))
            .collect();
        let mut arrivals = Vec::new();

        for (id, villager) in self.villagers.iter_mut() {
            let Some(target) = villager.target else {
                villager.velocity = Vec2::ZERO;
                continue;
            };

            let to_target = target - villager.position;
            let dist = to_target.length();
            let stop = match villager
                .harvest_target
                .and_then(|r| self.resources.get(r.0 as usize))
            {
                Some(node) => cfg.stopping_distance.max(node.interaction_radius()),
                None => cfg.stopping_distance,
            };

            if dist <= stop {
                villager.velocity = Vec2::ZERO;
                villager.target = None;
                if let Some(resource) = villager.harvest_target {
                    arrivals.push((*id, resource));
                }
                continue;
            }

            let mut desired = to_target.normalized() * cfg.move_speed;
            if cfg.use_separation {
                desired += separation(*id, villager.position, &positions, cfg);
            }
            let desired = desired.clamp_length(cfg.max_speed);
            villager.velocity = desired;
            villager.position += (desired * dt).clamp_length(dist);
        }

        for (id, resource) in arrivals {
            self.begin_harvest(id, resource);
        }
    }

    fn begin_harvest(&mut self, id: EntityId, resource: ResourceId) {
        let Some(villager) = self.villagers.get_mut(&id) else {
            return;
        };
        if villager.is_harvesting() {
            return;
        }
        let Some(node) = self.resources.get_mut(resource.0 as usize) else {
            return;
        };
        if node.is_depleted() {
            return;
        }
        node.register_harvester();
        let remaining = node.next_harvest_duration(&mut self.rng);
        villager.harvest = HarvestState::Harvesting { resource, remaining };
        tracing::debug!(villager = %id, resource = %resource, remaining, "harvest started");
    }

    fn move_enemies(&mut self, dt: f32) {
        let step = self.enemy_config.move_speed * dt;
        for enemy in self.enemies.values_mut() {
            if enemy.dead {
                continue;
            }
            let Some(target) = enemy.target else {
                continue;
            };
            let to_target = target - enemy.position;
            if to_target.length() <= step {
                enemy.position = target;
            } else {
                enemy.position += to_target.normalized() * step;
            }
        }
    }
}

/// Push away from villagers inside the separation radius, weighted by 1/distance.
fn separation(id: EntityId, position: Vec2, others: &[(EntityId, Vec2)], cfg: &VillagerConfig) -> Vec2 {
    let radius_sq = cfg.separation_radius * cfg.separation_radius;
    let mut force = Vec2::ZERO;
    let mut count = 0;
    for (other_id, other) in others {
        if *other_id == id || position.distance_squared(*other) > radius_sq {
            continue;
        }
        let away = position - *other;
        let d = away.length();
        if d > 0.0001 {
            force += away.normalized() * (1.0 / d.max(0.1));
            count += 1;
        }
    }
    if count > 0 {
        force.normalized() * cfg.separation_strength
    } else {
        Vec2::ZERO
    }
}

fn resource_sighting(node: &ResourceNode) -> ResourceSighting {
    ResourceSighting {
        id: node.id(),
        kind: node.kind(),
        position: node.position(),
        interaction_radius: node.interaction_radius(),
    }
}

impl Perception for VillageWorld {
    fn position(&self, agent: EntityId) -> Option<Vec2> {
        self.villagers
            .get(&agent)
            .map(|v| v.position)
            .or_else(|| self.enemies.get(&agent).map(|e| e.position))
            .or_else(|| self.towers.get(&agent).map(|t| t.position))
    }

    fn move_target(&self, agent: EntityId) -> Option<Vec2> {
        match self.villagers.get(&agent) {
            Some(villager) => villager.target,
            None => self.enemies.get(&agent).and_then(|e| e.target),
        }
    }

    fn nearest_resource(&self, origin: Vec2, radius: f32) -> Option<ResourceSighting> {
        let radius_sq = radius * radius;
        self.resources
            .iter()
            .filter(|n| !n.is_depleted())
            .map(|n| (n.position().distance_squared(origin), n))
            .filter(|(d2, _)| *d2 <= radius_sq)
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, n)| resource_sighting(n))
    }

    fn resource(&self, id: ResourceId) -> Option<ResourceSighting> {
        self.resource_node(id)
            .filter(|n| !n.is_depleted())
            .map(resource_sighting)
    }

    fn nearest_enemy(&self, origin: Vec2, radius: f32) -> Option<TargetSighting> {
        let radius_sq = radius * radius;
        self.enemies
            .iter()
            .filter(|(_, e)| !e.dead)
            .map(|(id, e)| (e.position.distance_squared(origin), *id, e.position))
            .filter(|(d2, _, _)| *d2 <= radius_sq)
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, id, position)| TargetSighting { id, position })
    }

    fn enemy(&self, id: EntityId) -> Option<TargetSighting> {
        self.enemies
            .get(&id)
            .filter(|e| !e.dead)
            .map(|e| TargetSighting {
                id,
                position: e.position,
            })
    }

    fn base(&self) -> BaseSighting {
        BaseSighting {
            position: self.base.position(),
            radius: self.base.radius(),
            destroyed: self.base.is_destroyed(),
        }
    }

    fn waypoint(&self, index: usize) -> Option<Vec2> {
        self.path.waypoints.get(index).copied()
    }

    fn waypoint_arrive_radius(&self) -> f32 {
        self.path.arrive_radius
    }

    fn move_command(&self) -> Option<Vec2> {
        self.commands.last_move_point()
    }

    fn is_harvesting(&self, agent: EntityId) -> bool {
        self.villagers
            .get(&agent)
            .is_some_and(Villager::is_harvesting)
    }
}

impl Locomotion for VillageWorld {
    fn set_target(&mut self, agent: EntityId, point: Vec2) {
        if let Some(villager) = self.villagers.get_mut(&agent) {
            villager.target = Some(point);
            villager.harvest_target = None;
        } else if let Some(enemy) = self.enemies.get_mut(&agent) {
            enemy.target = Some(point);
        }
    }

    fn set_harvest_target(&mut self, agent: EntityId, resource: ResourceId, slot: Vec2) {
        if let Some(villager) = self.villagers.get_mut(&agent) {
            villager.target = Some(slot);
            villager.harvest_target = Some(resource);
        }
    }

    fn halt(&mut self, agent: EntityId) {
        if let Some(villager) = self.villagers.get_mut(&agent) {
            villager.target = None;
            villager.velocity = Vec2::ZERO;
        } else if let Some(enemy) = self.enemies.get_mut(&agent) {
            enemy.target = None;
        }
    }
}

impl Combat for VillageWorld {
    fn strike_base(&mut self, attacker: EntityId, damage: i32) -> bool {
        let Some(enemy) = self.enemies.get_mut(&attacker).filter(|e| !e.dead) else {
            return false;
        };
        enemy.dead = true;
        enemy.target = None;
        self.stats.base_strikes += 1;
        self.base.take_damage(damage);
        true
    }

    fn damage_enemy(&mut self, target: EntityId, amount: i32) -> bool {
        let Some(enemy) = self.enemies.get_mut(&target).filter(|e| !e.dead) else {
            return false;
        };
        enemy.health -= amount.max(0);
        if enemy.health <= 0 {
            enemy.dead = true;
            enemy.target = None;
            self.stats.enemies_killed += 1;
            tracing::info!(enemy = %target, "enemy killed");
        }
        true
    }
}
