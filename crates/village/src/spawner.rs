//! Spawn timers for villagers and enemy waves.
//!
//! Both spawners only decide *how many* agents appear on a frame; placement
//! and bookkeeping stay with the simulation. Waits resume on the first frame
//! where the accumulated time reaches the wait length, and any overshoot is
//! dropped.

use bt_core::DeterministicRng;

use crate::config::{VillagerSpawnerConfig, WaveConfig, WaveSpawnerConfig};

#[derive(Debug, Clone)]
pub struct VillagerSpawner {
    config: VillagerSpawnerConfig,
    burst_pending: bool,
    /// Seconds until the next spawn attempt.
    cooldown: f32,
}

impl VillagerSpawner {
    pub fn new(config: VillagerSpawnerConfig) -> Self {
        Self {
            config,
            burst_pending: true,
            cooldown: 0.0,
        }
    }

    pub fn config(&self) -> &VillagerSpawnerConfig {
        &self.config
    }

    /// Number of villagers to spawn this frame given how many are alive.
    ///
    /// The first call yields the initial burst plus one regular attempt.
    pub fn update(&mut self, dt: f32, alive: usize) -> u32 {
        if !self.config.enabled {
            return 0;
        }

        let mut spawns = 0;
        if self.burst_pending {
            self.burst_pending = false;
            for _ in 0..self.config.initial_burst {
                if self.has_room(alive, spawns) {
                    spawns += 1;
                }
            }
        } else {
            self.cooldown -= dt;
        }

        if self.cooldown <= 0.0 {
            if self.has_room(alive, spawns) {
                spawns += 1;
            }
            self.cooldown = self.config.interval;
        }
        spawns
    }

    fn has_room(&self, alive: usize, pending: u32) -> bool {
        self.config.max_alive == 0 || alive + (pending as usize) < self.config.max_alive as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WaveStep {
    StartDelay,
    Spawn,
    AfterWave,
}

/// Enemy waves: start delay, `count` spawns `spawn_interval` apart, then
/// `time_between_waves` before the next wave. Optionally loops while the
/// base stands; stops for good once the base is destroyed.
#[derive(Debug, Clone)]
pub struct WaveSpawner {
    config: WaveSpawnerConfig,
    wave: usize,
    spawned_in_wave: u32,
    step: WaveStep,
    wait: Option<f32>,
    finished: bool,
    next_point: usize,
}

impl WaveSpawner {
    pub fn new(config: WaveSpawnerConfig) -> Self {
        let finished = !config.enabled || config.waves.is_empty();
        Self {
            config,
            wave: 0,
            spawned_in_wave: 0,
            step: WaveStep::StartDelay,
            wait: None,
            finished,
            next_point: 0,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Zero-based index of the wave in progress.
    pub fn current_wave(&self) -> usize {
        self.wave
    }

    /// Number of enemies to spawn this frame.
    pub fn update(&mut self, dt: f32, base_alive: bool) -> u32 {
        if self.finished {
            return 0;
        }
        if let Some(remaining) = self.wait {
            let remaining = remaining - dt;
            if remaining > 0.0 {
                self.wait = Some(remaining);
                return 0;
            }
            self.wait = None;
        }

        let mut spawns = 0;
        loop {
            let wave = self.current();
            match self.step {
                WaveStep::StartDelay => {
                    self.step = WaveStep::Spawn;
                    self.spawned_in_wave = 0;
                    if self.begin_wait(wave.start_delay) {
                        break;
                    }
                }
                WaveStep::Spawn => {
                    if self.spawned_in_wave >= wave.count {
                        self.step = WaveStep::AfterWave;
                        continue;
                    }
                    if !base_alive {
                        self.finish();
                        break;
                    }
                    spawns += 1;
                    self.spawned_in_wave += 1;
                    if self.begin_wait(wave.spawn_interval) {
                        break;
                    }
                }
                WaveStep::AfterWave => {
                    let last = self.wave + 1 >= self.config.waves.len();
                    if !last {
                        tracing::info!(wave = self.wave + 1, "wave fully spawned");
                        self.wave += 1;
                        self.step = WaveStep::StartDelay;
                        if self.begin_wait(self.config.time_between_waves) {
                            break;
                        }
                        continue;
                    }
                    if self.config.loop_waves && base_alive {
                        self.wave = 0;
                        self.step = WaveStep::StartDelay;
                    } else {
                        self.finish();
                    }
                    // A looping cycle always restarts on the next frame.
                    break;
                }
            }
        }
        spawns
    }

    /// Index into `len` spawn points for the next enemy.
    pub fn pick_spawn_point(&mut self, len: usize, rng: &mut impl DeterministicRng) -> Option<usize> {
        if len == 0 {
            return None;
        }
        if self.config.randomize_spawn_points {
            return Some(rng.next_index(len));
        }
        let index = self.next_point % len;
        self.next_point = (index + 1) % len;
        Some(index)
    }

    fn current(&self) -> WaveConfig {
        self.config.waves[self.wave]
    }

    fn begin_wait(&mut self, seconds: f32) -> bool {
        if seconds > 0.0 {
            self.wait = Some(seconds);
            true
        } else {
            false
        }
    }

    fn finish(&mut self) {
        if !self.finished {
            tracing::info!("wave spawner finished");
        }
        self.finished = true;
    }
}
