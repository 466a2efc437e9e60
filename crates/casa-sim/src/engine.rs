//! Simulation engine: the headless world the enemies live in.
//!
//! `SimulationEngine` owns the hecs world, the level floorplan and the sound
//! bus, processes queued commands, runs all systems, and produces a
//! `WorldSnapshot` per tick. Same seed and same commands give the same run.

use std::collections::{HashMap, VecDeque};

use glam::Vec3;
use hecs::World;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

use casa_core::commands::SimCommand;
use casa_core::components::Enemy;
use casa_core::config::EnemyConfig;
use casa_core::error::ConfigError;
use casa_core::constants::DT;
use casa_core::enums::EnemyState;
use casa_core::state::{EnemyEventRecord, WorldSnapshot};
use casa_core::types::{Pose, SimTime};
use casa_enemy_ai::{EnemyAgent, SoundBus, SoundEmitter, SoundInbox};

use crate::components::{EnemyBrain, NavBody};
use crate::error::ScenarioError;
use crate::floorplan::Floorplan;
use crate::navigator::KinematicNavigator;
use crate::scenario::{Scenario, ScriptedCommand};
use crate::systems;
use crate::world_setup;

/// Configuration for starting a new simulation.
#[derive(Debug, Clone, Copy)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    /// Seconds per tick.
    pub dt: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self { seed: 42, dt: DT }
    }
}

pub struct SimulationEngine {
    world: World,
    time: SimTime,
    dt: f32,
    rng: ChaCha8Rng,
    floorplan: Floorplan,
    bus: SoundBus,
    /// Per-enemy sound queues, keyed by enemy id.
    inboxes: HashMap<u32, SoundInbox>,
    command_queue: VecDeque<SimCommand>,
    /// Scripted commands not yet released, ordered by tick.
    script: VecDeque<ScriptedCommand>,
    next_enemy_id: u32,
}

impl SimulationEngine {
    pub fn new(config: SimConfig, floorplan: Floorplan) -> Self {
        Self {
            world: World::new(),
            time: SimTime::default(),
            dt: config.dt,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            floorplan,
            bus: SoundBus::new(),
            inboxes: HashMap::new(),
            command_queue: VecDeque::new(),
            script: VecDeque::new(),
            next_enemy_id: 0,
        }
    }

    /// Build a world from a scenario: floorplan, enemies and scripted timeline.
    pub fn from_scenario(scenario: &Scenario, config: SimConfig) -> Result<Self, ScenarioError> {
        scenario.validate()?;
        let mut engine = Self::new(config, scenario.floorplan.clone());
        for spec in &scenario.enemies {
            let waypoints = world_setup::resolve_route(&spec.route, &mut engine.rng);
            let enemy_config = spec.config.clone().unwrap_or_else(|| scenario.config.clone());
            engine.spawn_enemy(Pose::new(spec.position, spec.forward), waypoints, enemy_config)?;
        }
        let mut script = scenario.script.clone();
        script.sort_by_key(|s| s.tick);
        engine.script = script.into();
        debug!(
            scenario = %scenario.name,
            enemies = scenario.enemies.len(),
            "scenario loaded"
        );
        Ok(engine)
    }

    /// Add an enemy to the world and subscribe it to the sound bus.
    /// Returns its id, or the reason `config` was rejected.
    pub fn spawn_enemy(
        &mut self,
        pose: Pose,
        waypoints: Vec<Vec3>,
        config: EnemyConfig,
    ) -> Result<u32, ConfigError> {
        config.validate()?;
        let enemy_id = self.next_enemy_id;
        self.next_enemy_id += 1;
        world_setup::spawn_enemy(
            &mut self.world,
            &mut self.rng,
            enemy_id,
            pose,
            waypoints,
            config,
        );
        let inbox = SoundInbox::new();
        inbox.subscribe(&mut self.bus);
        self.inboxes.insert(enemy_id, inbox);
        Ok(enemy_id)
    }

    /// Queue a command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: SimCommand) {
        self.command_queue.push_back(command);
    }

    /// Advance the simulation by one tick and return the resulting snapshot.
    pub fn tick(&mut self) -> WorldSnapshot {
        self.release_script();
        self.process_commands();

        let mut events = Vec::new();
        self.run_systems(&mut events);
        self.time.advance(self.dt);

        systems::snapshot::build_snapshot(&self.world, &self.time, events)
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn floorplan(&self) -> &Floorplan {
        &self.floorplan
    }

    /// Report a prop collision; it makes noise only above its force threshold.
    pub fn collide(&mut self, emitter: &SoundEmitter, relative_speed: f32) -> bool {
        emitter.on_collision(&mut self.bus, relative_speed)
    }

    pub fn enemy_state(&self, enemy_id: u32) -> Option<EnemyState> {
        self.world
            .query::<(&Enemy, &EnemyBrain)>()
            .iter()
            .find(|(_, (enemy, _))| enemy.enemy_id == enemy_id)
            .map(|(_, (_, brain))| brain.agent.state())
    }

    pub fn enemy_position(&self, enemy_id: u32) -> Option<Vec3> {
        self.world
            .query::<(&Enemy, &NavBody)>()
            .iter()
            .find(|(_, (enemy, _))| enemy.enemy_id == enemy_id)
            .map(|(_, (_, body))| body.position)
    }

    /// Move pending scripted commands for this tick onto the command queue.
    fn release_script(&mut self) {
        while let Some(front) = self.script.front() {
            if front.tick > self.time.tick {
                break;
            }
            if let Some(scripted) = self.script.pop_front() {
                self.command_queue.push_back(scripted.command);
            }
        }
    }

    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    fn handle_command(&mut self, command: SimCommand) {
        match command {
            SimCommand::PlacePlayer { position, forward } => {
                world_setup::place_player(&mut self.world, Pose::new(position, forward));
            }
            SimCommand::RemovePlayer => {
                world_setup::remove_player(&mut self.world);
            }
            SimCommand::EmitSound { position, loud } => {
                let listeners = self.bus.emit(position, loud);
                debug!(?position, loud, listeners, "sound emitted");
            }
            SimCommand::StunEnemy { enemy_id } => {
                self.with_enemy(enemy_id, |agent, nav| agent.stun(nav));
            }
            SimCommand::Investigate {
                enemy_id,
                position,
                urgent,
            } => {
                self.with_enemy(enemy_id, |agent, nav| {
                    agent.investigate(position, urgent, nav);
                });
            }
            SimCommand::SetWaypoints {
                enemy_id,
                waypoints,
            } => {
                self.with_enemy(enemy_id, |agent, nav| agent.set_waypoints(waypoints, nav));
            }
        }
    }

    /// Run `f` against one enemy's agent and navigator.
    fn with_enemy<F>(&mut self, enemy_id: u32, f: F)
    where
        F: FnOnce(&mut EnemyAgent, &mut KinematicNavigator<'_>),
    {
        let found = self
            .world
            .query_mut::<(&Enemy, &mut EnemyBrain, &mut NavBody)>()
            .into_iter()
            .find(|(_, (enemy, _, _))| enemy.enemy_id == enemy_id);
        match found {
            Some((_, (_, brain, body))) => {
                let mut nav = KinematicNavigator::new(body, &self.floorplan);
                f(&mut brain.agent, &mut nav);
            }
            None => warn!(enemy_id, "command for unknown enemy"),
        }
    }

    /// Run all systems in order.
    fn run_systems(&mut self, events: &mut Vec<EnemyEventRecord>) {
        // 1. Hearing: queued sounds reach the agents first
        systems::hearing::run(&mut self.world, &self.floorplan, &self.inboxes);
        // 2. Enemy AI
        systems::enemy_ai::run(
            &mut self.world,
            &self.floorplan,
            self.dt,
            self.time.tick,
            events,
        );
        // 3. Movement integration
        systems::movement::run(&mut self.world, &self.floorplan, self.dt);
    }
}
