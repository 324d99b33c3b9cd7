//! Frame driver: owns the world, one tree runner per agent, and the spawners.
//!
//! Each [`Simulation::step`] runs, in order: scripted orders that came due,
//! spawners, every agent's tree (by ascending entity id), world physics, the
//! automatic tower purchase, then removal of dead agents. Removed agents have
//! their tree aborted first so `on_stop` runs along the active path.

use std::collections::BTreeSet;

use bt::{tick_runners, Node, TreeRunner};
use bt_core::{rng, FrameClock, SplitMix64, TickContext};
use bt_tools::{TraceLog, TRACE_LOG};
use serde::Serialize;

use crate::brain;
use crate::config::{Order, ScheduledOrder, VillageConfig};
use crate::entity::{AgentKind, EntityId};
use crate::error::{Result, VillageError};
use crate::formation::ring_slots;
use crate::geom::{random_in_unit_circle, Vec2};
use crate::spawner::{VillagerSpawner, WaveSpawner};
use crate::world::VillageWorld;

const SPAWN_RNG_STREAM: u64 = 0x5350_4157_4E;
const MIN_INITIAL_RING: f32 = 0.5;

/// End-of-run summary, printed by the CLI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimReport {
    pub frames: u64,
    pub elapsed_seconds: f64,
    pub wood: u32,
    pub stone: u32,
    pub base_health: i32,
    pub base_max_health: i32,
    pub base_destroyed: bool,
    pub villagers: usize,
    pub enemies_alive: usize,
    pub towers: usize,
    pub towers_built: u64,
    pub villagers_spawned: u64,
    pub enemies_spawned: u64,
    pub enemies_killed: u64,
    pub base_strikes: u64,
    pub harvests: u64,
    pub waves_finished: bool,
}

/// Result of [`Simulation::try_activate_next_tower`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TowerPurchase {
    Built(EntityId),
    NotEnoughResources,
    NoSlotsLeft,
}

pub struct Simulation {
    config: VillageConfig,
    clock: FrameClock,
    world: VillageWorld,
    runners: Vec<TreeRunner<VillageWorld>>,
    villager_spawner: VillagerSpawner,
    wave_spawner: WaveSpawner,
    /// Villagers created by the spawner that are still alive.
    spawned_villagers: BTreeSet<EntityId>,
    rng: SplitMix64,
    /// Scripted orders sorted by time; `next_order` is the first not yet applied.
    orders: Vec<ScheduledOrder>,
    next_order: usize,
    next_tower_slot: usize,
    villagers_spawned: u64,
    enemies_spawned: u64,
    towers_built: u64,
}

impl Simulation {
    /// Validate `config`, lay out the map and place the initial towers and villagers.
    pub fn new(config: VillageConfig) -> Result<Self> {
        config.validate()?;

        let world = VillageWorld::new(&config);
        let mut orders = config.orders.clone();
        orders.sort_by(|a, b| a.at.total_cmp(&b.at));
        let mut sim = Self {
            clock: FrameClock::new(config.seed),
            world,
            runners: Vec::new(),
            villager_spawner: VillagerSpawner::new(config.spawner.villagers.clone()),
            wave_spawner: WaveSpawner::new(config.spawner.waves.clone()),
            spawned_villagers: BTreeSet::new(),
            rng: SplitMix64::new(rng::derive_seed(config.seed, 0, SPAWN_RNG_STREAM)),
            orders,
            next_order: 0,
            next_tower_slot: 0,
            villagers_spawned: 0,
            enemies_spawned: 0,
            towers_built: 0,
            config,
        };

        for position in sim.config.world.towers.clone() {
            sim.spawn_tower(position);
        }
        let count = sim.config.world.initial_villagers as usize;
        let radius = sim.config.spawner.villagers.spawn_radius.max(MIN_INITIAL_RING);
        for position in ring_slots(sim.config.world.home, count, radius) {
            sim.spawn_villager(position);
        }

        tracing::info!(
            seed = sim.config.seed,
            villagers = sim.world.villager_count(),
            towers = sim.world.tower_count(),
            resources = sim.world.resources().len(),
            "simulation ready"
        );
        Ok(sim)
    }

    pub fn config(&self) -> &VillageConfig {
        &self.config
    }

    pub fn world(&self) -> &VillageWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut VillageWorld {
        &mut self.world
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn runner(&self, id: EntityId) -> Option<&TreeRunner<VillageWorld>> {
        self.runners.iter().find(|r| r.agent() == id)
    }

    pub fn runner_count(&self) -> usize {
        self.runners.len()
    }

    pub fn spawn_villager(&mut self, position: Vec2) -> EntityId {
        let id = self.world.spawn_villager(position);
        self.attach(id, brain::villager_tree(&self.config.villager));
        id
    }

    pub fn spawn_enemy(&mut self, position: Vec2) -> EntityId {
        let id = self.world.spawn_enemy(position);
        self.attach(id, brain::enemy_tree(&self.config.enemy));
        id
    }

    pub fn spawn_tower(&mut self, position: Vec2) -> EntityId {
        let id = self.world.spawn_tower(position);
        self.attach(id, brain::tower_tree(&self.config.tower));
        id
    }

    /// Tower slots not bought yet.
    pub fn remaining_tower_slots(&self) -> usize {
        self.config.world.tower_slots.len() - self.next_tower_slot
    }

    /// Pay `tower.wood_cost`/`tower.stone_cost` and raise a tower on the next
    /// free slot. Nothing is spent when there is no slot left.
    pub fn try_activate_next_tower(&mut self) -> TowerPurchase {
        let Some(&slot) = self.config.world.tower_slots.get(self.next_tower_slot) else {
            return TowerPurchase::NoSlotsLeft;
        };
        let (wood, stone) = (self.config.tower.wood_cost, self.config.tower.stone_cost);
        if !self.world.inventory_mut().try_spend(wood, stone) {
            tracing::trace!(wood, stone, "not enough resources for a tower");
            return TowerPurchase::NotEnoughResources;
        }

        self.next_tower_slot += 1;
        self.towers_built += 1;
        let id = self.spawn_tower(slot);
        tracing::info!(tower = %id, x = slot.x, y = slot.y, wood, stone, "tower built");
        TowerPurchase::Built(id)
    }

    /// Abort the agent's tree and remove it from the world.
    pub fn despawn(&mut self, id: EntityId) -> Result<AgentKind> {
        let ctx = self.idle_context();
        self.remove_agent(&ctx, id)
    }

    /// Start collecting node trace events for one agent.
    pub fn trace_agent(&mut self, id: EntityId) -> Result<()> {
        let runner = self
            .runners
            .iter_mut()
            .find(|r| r.agent() == id)
            .ok_or(VillageError::UnknownEntity(id))?;
        if !runner.blackboard().contains(TRACE_LOG) {
            runner.blackboard_mut().insert(TRACE_LOG, TraceLog::default());
        }
        Ok(())
    }

    pub fn trace_log(&self, id: EntityId) -> Option<&TraceLog> {
        self.runner(id)?.blackboard().get(TRACE_LOG)
    }

    /// Advance one frame of `dt` seconds.
    pub fn step(&mut self, dt: f32) -> TickContext {
        let ctx = self.clock.advance(dt);

        self.apply_due_orders();
        self.run_spawners(&ctx);
        tick_runners(&ctx, &mut self.world, &mut self.runners);
        self.world.integrate(ctx.dt_seconds);
        if self.config.tower.auto_build {
            self.try_activate_next_tower();
        }

        for id in self.world.dead_enemies() {
            if let Err(err) = self.remove_agent(&ctx, id) {
                tracing::warn!(%err, "failed to reap enemy");
            }
        }
        ctx
    }

    /// Run `frames` fixed steps and summarize.
    pub fn run(&mut self, frames: u64, dt: f32) -> SimReport {
        for _ in 0..frames {
            self.step(dt);
        }
        self.report()
    }

    pub fn report(&self) -> SimReport {
        let base = self.world.base_health();
        let stats = self.world.stats();
        SimReport {
            frames: self.clock.frames(),
            elapsed_seconds: self.clock.elapsed_seconds(),
            wood: self.world.inventory().wood(),
            stone: self.world.inventory().stone(),
            base_health: base.current(),
            base_max_health: base.max_health(),
            base_destroyed: base.is_destroyed(),
            villagers: self.world.villager_count(),
            enemies_alive: self.world.enemies_alive(),
            towers: self.world.tower_count(),
            towers_built: self.towers_built,
            villagers_spawned: self.villagers_spawned,
            enemies_spawned: self.enemies_spawned,
            enemies_killed: stats.enemies_killed,
            base_strikes: stats.base_strikes,
            harvests: stats.harvests,
            waves_finished: self.wave_spawner.is_finished(),
        }
    }

    fn attach(&mut self, id: EntityId, root: Node<VillageWorld>) {
        self.runners.push(TreeRunner::from_root(id, root));
    }

    fn remove_agent(&mut self, ctx: &TickContext, id: EntityId) -> Result<AgentKind> {
        if let Some(index) = self.runners.iter().position(|r| r.agent() == id) {
            let mut runner = self.runners.remove(index);
            runner.abort(ctx, &mut self.world);
        }
        self.spawned_villagers.remove(&id);
        let kind = self.world.despawn(id)?;
        tracing::debug!(agent = %id, ?kind, "agent removed");
        Ok(kind)
    }

    fn apply_due_orders(&mut self) {
        let now = self.clock.elapsed_seconds();
        while let Some(&scheduled) = self.orders.get(self.next_order) {
            if f64::from(scheduled.at) > now {
                break;
            }
            self.next_order += 1;
            self.apply_order(scheduled.order);
        }
    }

    fn apply_order(&mut self, order: Order) {
        tracing::debug!(?order, "applying order");
        match order {
            Order::Move { point } => self.world.commands_mut().issue_move(point),
            Order::GroupMove { point } => {
                self.world.send_all_to_move(point);
            }
            Order::GroupHarvest { resource } => {
                if let Err(err) = self.world.send_group_to_harvest(resource) {
                    tracing::warn!(%err, "group harvest order dropped");
                }
            }
            Order::BuildTower => {
                let outcome = self.try_activate_next_tower();
                if !matches!(outcome, TowerPurchase::Built(_)) {
                    tracing::info!(?outcome, "tower order not fulfilled");
                }
            }
        }
    }

    fn run_spawners(&mut self, ctx: &TickContext) {
        let alive = self.spawned_villagers.len();
        for _ in 0..self.villager_spawner.update(ctx.dt_seconds, alive) {
            let Some(position) = self.find_spawn_position() else {
                tracing::debug!("no free villager spawn position");
                continue;
            };
            let id = self.spawn_villager(position);
            self.spawned_villagers.insert(id);
            self.villagers_spawned += 1;
            tracing::info!(villager = %id, x = position.x, y = position.y, "villager spawned");
        }

        let base_alive = !self.world.base_health().is_destroyed();
        for _ in 0..self.wave_spawner.update(ctx.dt_seconds, base_alive) {
            let points = self.config.world.enemy_spawn_points.len();
            let Some(index) = self.wave_spawner.pick_spawn_point(points, &mut self.rng) else {
                continue;
            };
            let position = self.config.world.enemy_spawn_points[index];
            let id = self.spawn_enemy(position);
            self.enemies_spawned += 1;
            tracing::info!(
                enemy = %id,
                wave = self.wave_spawner.current_wave() + 1,
                "enemy spawned"
            );
        }
    }

    /// A random point around home not too close to any villager, if one turns up.
    fn find_spawn_position(&mut self) -> Option<Vec2> {
        let home = self.config.world.home;
        let cfg = &self.config.spawner.villagers;
        for _ in 0..cfg.max_position_attempts {
            let candidate = home + random_in_unit_circle(&mut self.rng) * cfg.spawn_radius;
            let blocked = self
                .world
                .villagers()
                .any(|(_, v)| v.position().distance(candidate) < cfg.overlap_radius);
            if !blocked {
                return Some(candidate);
            }
        }
        None
    }

    /// Context for work done outside a frame (zero elapsed time).
    fn idle_context(&self) -> TickContext {
        TickContext {
            tick: self.clock.frames(),
            dt_seconds: 0.0,
            seed: self.clock.seed(),
        }
    }
}
