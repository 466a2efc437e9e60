//! Enemy behavior state machine.
//!
//! One [`EnemyAgent`] per enemy. The host calls [`EnemyAgent::tick`] once
//! per frame with what the enemy can sense and a navigation port to drive,
//! and forwards heard sounds through [`EnemyAgent::hear`] before ticking.
//!
//! Tick order:
//! 1. Perception and the detection meter (skipped while stunned or
//!    retreating, which freezes the meter).
//! 2. A full meter forces Chase.
//! 3. Due continuations for the current state, then the state's step.
//! 4. The state timer advances.
//!
//! Waits (waypoint dwell, search-point dwell, post-stun wait) are scheduled
//! on a [`DeferredQueue`] stamped with the state epoch, so leaving a state
//! cancels whatever it was waiting for.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

use casa_core::config::EnemyConfig;
use casa_core::constants::DETECTION_EVENT_EPSILON;
use casa_core::enums::{AudioCue, EnemyState};
use casa_core::events::{EnemyEvent, SoundEvent};
use casa_core::types::{PlayerSample, Pose};

use crate::deferred::DeferredQueue;
use crate::detection::{self, DetectionMeter, Perception};
use crate::navigation::{has_arrived, snap_or_keep, NavigationPort, Occluder};
use crate::search;
use crate::waypoints::WaypointRoute;

/// What the enemy senses this tick.
pub struct Senses<'a> {
    pub pose: Pose,
    /// `None` when there is no player in the level.
    pub player: Option<PlayerSample>,
    pub occluder: &'a dyn Occluder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Continuation {
    AdvanceWaypoint,
    NextSweepPoint,
    FinishRetreat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Leg {
    Walking,
    Dwelling,
}

/// Circle of points visited in order during Search and Alert.
#[derive(Debug, Clone)]
struct Sweep {
    points: Vec<Vec3>,
    index: usize,
    leg: Leg,
}

/// Per-state scratch data, replaced on every transition.
#[derive(Debug, Clone)]
enum Activity {
    Idle,
    Patrol { leg: Leg },
    Sweep(Sweep),
    Stalking { next_refresh: f32, target: Option<Vec3> },
    Retreat { leg: Leg },
}

#[derive(Debug, Clone)]
pub struct EnemyAgent {
    config: EnemyConfig,
    state: EnemyState,
    activity: Activity,
    state_timer: f32,
    /// Seconds since the agent was created; the deferred queue's time base.
    clock: f32,
    epoch: u64,
    started: bool,

    meter: DetectionMeter,
    perception: Perception,
    last_reported_detection: f32,

    pose: Pose,
    player: Option<PlayerSample>,
    last_known_player_position: Vec3,
    last_player_sight_time: f32,
    investigate_target: Vec3,
    is_urgent: bool,

    route: WaypointRoute,
    deferred: DeferredQueue<Continuation>,
    rng: ChaCha8Rng,
    events: Vec<EnemyEvent>,
}

impl EnemyAgent {
    /// Create an agent patrolling `waypoints`.
    ///
    /// `config` must pass [`EnemyConfig::validate`]: wait bounds and the
    /// stalk probability feed the RNG directly and panic when out of range.
    pub fn new(config: EnemyConfig, pose: Pose, waypoints: Vec<Vec3>, seed: u64) -> Self {
        let meter = DetectionMeter::new(config.detection.threshold);
        let route = WaypointRoute::new(waypoints, config.patrol.traversal);
        Self {
            config,
            state: EnemyState::Patrol,
            activity: Activity::Patrol { leg: Leg::Walking },
            state_timer: 0.0,
            clock: 0.0,
            epoch: 0,
            started: false,
            meter,
            perception: Perception::NONE,
            last_reported_detection: 0.0,
            pose,
            player: None,
            last_known_player_position: pose.position,
            last_player_sight_time: 0.0,
            investigate_target: pose.position,
            is_urgent: false,
            route,
            deferred: DeferredQueue::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            events: Vec::new(),
        }
    }

    // ---- Accessors ----

    pub fn state(&self) -> EnemyState {
        self.state
    }

    pub fn state_timer(&self) -> f32 {
        self.state_timer
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn config(&self) -> &EnemyConfig {
        &self.config
    }

    pub fn detection(&self) -> &DetectionMeter {
        &self.meter
    }

    pub fn perception(&self) -> Perception {
        self.perception
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn last_known_player_position(&self) -> Vec3 {
        self.last_known_player_position
    }

    pub fn last_player_sight_time(&self) -> f32 {
        self.last_player_sight_time
    }

    pub fn investigate_target(&self) -> Vec3 {
        self.investigate_target
    }

    pub fn is_urgent(&self) -> bool {
        self.is_urgent
    }

    pub fn route(&self) -> &WaypointRoute {
        &self.route
    }

    /// Points of the current Search or Alert sweep; empty in other states.
    pub fn search_points(&self) -> &[Vec3] {
        match &self.activity {
            Activity::Sweep(sweep) => &sweep.points,
            _ => &[],
        }
    }

    pub fn search_index(&self) -> Option<usize> {
        match &self.activity {
            Activity::Sweep(sweep) => Some(sweep.index),
            _ => None,
        }
    }

    /// Where the enemy is heading while stalking.
    pub fn stalking_target(&self) -> Option<Vec3> {
        match self.activity {
            Activity::Stalking { target, .. } => target,
            _ => None,
        }
    }

    /// Events raised since the last drain.
    pub fn events(&self) -> &[EnemyEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<EnemyEvent> {
        std::mem::take(&mut self.events)
    }

    // ---- Inputs ----

    /// Advance the agent by `dt` seconds.
    pub fn tick(&mut self, dt: f32, senses: &Senses<'_>, nav: &mut dyn NavigationPort) {
        let dt = dt.max(0.0);
        self.pose = senses.pose;
        self.player = senses.player;
        if !self.started {
            self.started = true;
            self.start_patrol(nav);
        }

        if self.state.is_incapacitated() {
            self.perception = Perception::NONE;
        } else {
            self.perception = detection::perceive(
                &self.pose,
                self.player.as_ref(),
                &self.config.perception,
                senses.occluder,
            );
            self.meter.update(
                &self.perception,
                &self.config.perception,
                &self.config.detection,
                dt,
            );
            self.report_detection();

            if self.meter.is_full() && self.state != EnemyState::Chase {
                self.transition(EnemyState::Chase, nav);
            }
        }

        self.run_continuations(nav);
        self.step(nav);

        self.state_timer += dt;
        self.clock += dt;
    }

    /// React to a sound. Returns whether the enemy turned to investigate.
    pub fn hear(&mut self, sound: &SoundEvent, nav: &mut dyn NavigationPort) -> bool {
        let distance = self.pose.position.distance(sound.position);
        if distance > self.config.perception.hearing_range {
            trace!(distance, "sound out of hearing range");
            return false;
        }
        self.investigate(sound.position, sound.loud, nav)
    }

    /// Send the enemy to sweep around `target`, as if it had heard a sound
    /// there. Ignored while chasing, stunned or retreating.
    pub fn investigate(&mut self, target: Vec3, urgent: bool, nav: &mut dyn NavigationPort) -> bool {
        if !self.state.reacts_to_sound() {
            trace!(state = ?self.state, "ignoring point of interest");
            return false;
        }
        self.investigate_target = target;
        self.is_urgent = urgent;
        self.transition(EnemyState::Alert, nav);
        true
    }

    /// Knock the enemy out. Accepted in every state.
    pub fn stun(&mut self, nav: &mut dyn NavigationPort) {
        self.transition(EnemyState::Stunned, nav);
    }

    /// Replace the patrol route and restart it from its first point.
    pub fn set_waypoints(&mut self, points: Vec<Vec3>, nav: &mut dyn NavigationPort) {
        self.route.set_points(points);
        if self.state == EnemyState::Patrol {
            self.deferred.clear();
            self.activity = Activity::Patrol { leg: Leg::Walking };
            self.head_for_route(nav);
        }
    }

    /// Jump straight into `state`, for debug tooling. Forcing Chase fills the
    /// meter first.
    pub fn force_state(&mut self, state: EnemyState, nav: &mut dyn NavigationPort) {
        if state == EnemyState::Chase {
            self.meter.fill();
            self.report_detection();
        }
        self.transition(state, nav);
    }

    // ---- Transitions ----

    fn transition(&mut self, to: EnemyState, nav: &mut dyn NavigationPort) {
        let from = self.state;
        self.started = true;
        self.state = to;
        self.state_timer = 0.0;
        self.epoch += 1;
        debug!(from = ?from, to = ?to, epoch = self.epoch, "enemy state change");
        self.events.push(EnemyEvent::StateChanged { from, to });
        self.enter(to, nav);
    }

    fn enter(&mut self, state: EnemyState, nav: &mut dyn NavigationPort) {
        if state != EnemyState::Stunned && nav.is_stopped() {
            nav.resume();
        }
        let movement = &self.config.movement;
        match state {
            EnemyState::Patrol => {
                nav.set_speed(movement.patrol_speed);
                self.cue(AudioCue::PatrolMutter);
                self.activity = Activity::Patrol { leg: Leg::Walking };
                self.head_for_route(nav);
            }
            EnemyState::Investigate => {
                let speed = if self.is_urgent {
                    movement.urgent_alert_speed
                } else {
                    movement.investigate_speed
                };
                nav.set_speed(speed);
                self.cue(self.growl());
                self.activity = Activity::Idle;
                nav.set_destination(self.investigate_target);
            }
            EnemyState::Chase => {
                nav.set_speed(movement.chase_speed);
                self.cue(AudioCue::ChaseScream);
                self.activity = Activity::Idle;
                self.last_player_sight_time = self.clock;
                if let Some(player) = self.player {
                    self.last_known_player_position = player.position;
                }
                nav.set_destination(self.last_known_player_position);
            }
            EnemyState::Stunned => {
                nav.stop();
                self.cue(AudioCue::StunYelp);
                self.activity = Activity::Idle;
            }
            EnemyState::Search => {
                nav.set_speed(movement.search_speed);
                let sweep = &self.config.search;
                let points = search::search_points(
                    self.last_known_player_position,
                    sweep.point_count,
                    sweep.radius,
                    &*nav,
                );
                self.begin_sweep(points, nav);
            }
            EnemyState::Alert => {
                let speed = if self.is_urgent {
                    movement.urgent_alert_speed
                } else {
                    movement.alert_speed
                };
                nav.set_speed(speed);
                self.cue(self.growl());
                let sweep = &self.config.search;
                let mut points = Vec::with_capacity(sweep.point_count + 1);
                points.push(snap_or_keep(&*nav, self.investigate_target, sweep.radius));
                points.extend(search::search_points(
                    self.investigate_target,
                    sweep.point_count,
                    sweep.radius,
                    &*nav,
                ));
                self.begin_sweep(points, nav);
            }
            EnemyState::Stalking => {
                nav.set_speed(movement.stalking_speed);
                self.refresh_stalking(nav);
            }
            EnemyState::PostStunRetreat => {
                nav.set_speed(movement.retreat_speed);
                let penalty = self.config.patrol.retreat_distance_penalty;
                match self.route.resume_from(self.pose.position, self.pose.forward, penalty) {
                    Some(point) => {
                        nav.set_destination(point);
                        self.activity = Activity::Retreat { leg: Leg::Walking };
                    }
                    None => self.begin_retreat_wait(nav),
                }
            }
        }
    }

    fn start_patrol(&mut self, nav: &mut dyn NavigationPort) {
        nav.set_speed(self.config.movement.patrol_speed);
        self.head_for_route(nav);
    }

    /// Walk to the current waypoint, or stand still when there is no route.
    fn head_for_route(&mut self, nav: &mut dyn NavigationPort) {
        match self.route.current() {
            Some(point) => {
                if nav.is_stopped() {
                    nav.resume();
                }
                nav.set_destination(point);
            }
            None => nav.stop(),
        }
    }

    /// Rejoin the patrol route where the enemy is facing.
    fn resume_patrol(&mut self, nav: &mut dyn NavigationPort) {
        let penalty = self.config.patrol.retreat_distance_penalty;
        self.route
            .resume_from(self.pose.position, self.pose.forward, penalty);
        self.transition(EnemyState::Patrol, nav);
    }

    fn begin_sweep(&mut self, points: Vec<Vec3>, nav: &mut dyn NavigationPort) {
        if let Some(first) = points.first() {
            nav.set_destination(*first);
        }
        self.activity = Activity::Sweep(Sweep {
            points,
            index: 0,
            leg: Leg::Walking,
        });
    }

    fn begin_retreat_wait(&mut self, nav: &mut dyn NavigationPort) {
        nav.stop();
        self.schedule(self.config.timing.post_stun_wait_time, Continuation::FinishRetreat);
        self.activity = Activity::Retreat { leg: Leg::Dwelling };
    }

    fn refresh_stalking(&mut self, nav: &mut dyn NavigationPort) {
        let stalking = &self.config.stalking;
        let player = self
            .player
            .unwrap_or_else(|| PlayerSample::at(self.last_known_player_position));
        let anchor = search::stalking_anchor(&player, self.pose.position, stalking.distance);
        let spot = search::jitter(anchor, stalking.jitter, &mut self.rng);
        let target = snap_or_keep(&*nav, spot, stalking.distance);
        nav.set_destination(target);
        self.activity = Activity::Stalking {
            next_refresh: self.clock + stalking.update_interval,
            target: Some(target),
        };
    }

    // ---- Per-state steps ----

    fn step(&mut self, nav: &mut dyn NavigationPort) {
        match self.state {
            EnemyState::Patrol => self.step_patrol(nav),
            EnemyState::Investigate => self.step_investigate(nav),
            EnemyState::Chase => self.step_chase(nav),
            EnemyState::Stunned => self.step_stunned(nav),
            EnemyState::Search => self.step_sweep(self.config.timing.search_duration, nav),
            EnemyState::Alert => self.step_sweep(self.config.timing.alert_duration, nav),
            EnemyState::Stalking => self.step_stalking(nav),
            EnemyState::PostStunRetreat => self.step_retreat(nav),
        }
    }

    fn step_patrol(&mut self, nav: &mut dyn NavigationPort) {
        if self.route.is_empty() {
            return;
        }
        let walking = matches!(self.activity, Activity::Patrol { leg: Leg::Walking });
        if walking && has_arrived(&*nav, self.config.movement.arrival_distance) {
            let patrol = &self.config.patrol;
            let wait = self.rng.gen_range(patrol.min_wait..=patrol.max_wait);
            self.schedule(wait, Continuation::AdvanceWaypoint);
            self.activity = Activity::Patrol { leg: Leg::Dwelling };
        }
    }

    fn step_investigate(&mut self, nav: &mut dyn NavigationPort) {
        if self.state_timer >= self.config.timing.investigate_time {
            self.is_urgent = false;
            self.resume_patrol(nav);
        }
    }

    fn step_chase(&mut self, nav: &mut dyn NavigationPort) {
        if self.perception.perceptible() {
            if let Some(player) = self.player {
                self.last_known_player_position = player.position;
                self.last_player_sight_time = self.clock;
                nav.set_destination(player.position);
            }
            return;
        }
        if self.clock - self.last_player_sight_time >= self.config.timing.lose_player_time {
            let next = if self.rng.gen_bool(self.config.stalking.probability) {
                EnemyState::Stalking
            } else {
                EnemyState::Search
            };
            debug!(next = ?next, "lost the player");
            self.transition(next, nav);
        }
    }

    fn step_stunned(&mut self, nav: &mut dyn NavigationPort) {
        if self.state_timer >= self.config.timing.stun_duration {
            self.transition(EnemyState::PostStunRetreat, nav);
        }
    }

    fn step_sweep(&mut self, duration: f32, nav: &mut dyn NavigationPort) {
        if self.state_timer >= duration {
            if self.state == EnemyState::Alert {
                self.is_urgent = false;
            }
            self.resume_patrol(nav);
            return;
        }
        let walking = matches!(&self.activity, Activity::Sweep(s) if s.leg == Leg::Walking);
        if walking && has_arrived(&*nav, self.config.movement.arrival_distance) {
            self.schedule(self.config.search.time_per_point, Continuation::NextSweepPoint);
            if let Activity::Sweep(sweep) = &mut self.activity {
                sweep.leg = Leg::Dwelling;
            }
        }
    }

    fn step_stalking(&mut self, nav: &mut dyn NavigationPort) {
        if self.perception.can_see {
            // Direct sight ends the stalk; the meter is topped up so Chase
            // is still only entered on a full meter.
            self.meter.fill();
            self.report_detection();
            self.transition(EnemyState::Chase, nav);
            return;
        }
        if self.state_timer >= self.config.timing.stalking_duration {
            self.transition(EnemyState::Search, nav);
            return;
        }
        if let Activity::Stalking { next_refresh, .. } = self.activity {
            if self.clock >= next_refresh {
                self.refresh_stalking(nav);
            }
        }
    }

    fn step_retreat(&mut self, nav: &mut dyn NavigationPort) {
        let walking = matches!(self.activity, Activity::Retreat { leg: Leg::Walking });
        if walking && has_arrived(&*nav, self.config.movement.arrival_distance) {
            self.begin_retreat_wait(nav);
        }
    }

    // ---- Continuations ----

    fn schedule(&mut self, delay: f32, action: Continuation) {
        self.deferred.schedule(self.epoch, self.clock + delay, action);
    }

    fn run_continuations(&mut self, nav: &mut dyn NavigationPort) {
        let epoch = self.epoch;
        for action in self.deferred.poll(self.clock, epoch) {
            if self.epoch != epoch {
                break;
            }
            match action {
                Continuation::AdvanceWaypoint => {
                    if let Some(point) = self.route.advance() {
                        nav.set_destination(point);
                    }
                    self.activity = Activity::Patrol { leg: Leg::Walking };
                }
                Continuation::NextSweepPoint => {
                    if let Activity::Sweep(sweep) = &mut self.activity {
                        if !sweep.points.is_empty() {
                            sweep.index = (sweep.index + 1) % sweep.points.len();
                            nav.set_destination(sweep.points[sweep.index]);
                        }
                        sweep.leg = Leg::Walking;
                    }
                }
                Continuation::FinishRetreat => {
                    self.transition(EnemyState::Patrol, nav);
                }
            }
        }
    }

    // ---- Events ----

    fn cue(&mut self, cue: AudioCue) {
        self.events.push(EnemyEvent::AudioCue { cue });
    }

    fn growl(&self) -> AudioCue {
        if self.is_urgent {
            AudioCue::UrgentGrowl
        } else {
            AudioCue::InvestigateGrowl
        }
    }

    fn report_detection(&mut self) {
        let normalized = self.meter.normalized();
        let delta = (normalized - self.last_reported_detection).abs();
        let hit_bound = (normalized == 0.0 || normalized == 1.0) && delta > 0.0;
        if delta >= DETECTION_EVENT_EPSILON || hit_bound {
            self.last_reported_detection = normalized;
            self.events.push(EnemyEvent::DetectionChanged { normalized });
        }
    }
}
