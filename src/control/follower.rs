//! Tick-driven pursuit control loop
//!
//! `Follower` owns all the mutable agent state and wires the layers
//! together each tick: advance any in-flight graph build, enforce climb
//! limits, pick a steering direction (mesh oracle first, waypoint graph
//! second, straight line last), sense, decide, and drive the actuator.

use glam::{Vec2, Vec3};

use crate::brain::decision::Action;
use crate::brain::stamina::{climb_interrupt, StaminaMachine};
use crate::brain::{Brain, Cooldowns, Decision};
use crate::control::steering::GraphSteering;
use crate::core::config::PursuitConfig;
use crate::core::types::Seconds;
use crate::graph::builder::{Bounds, BuildStep, GraphBuilder};
use crate::graph::waypoint::NavGraph;
use crate::perception::Perception;
use crate::world::{Actuator, PathStatus, SteeringOracle, TerrainQuery};

/// How long after an attach attempt we look for a latched climb before
/// writing the attempt off as failed.
const ATTACH_VERIFY_DELAY: Seconds = 0.3;

/// Strafe input is damped relative to forward so the agent leans into its
/// heading instead of crabbing.
const STRAFE_DAMP: f32 = 0.75;

pub struct Follower {
    cfg: PursuitConfig,
    brain: Brain,
    perception: Perception,
    machine: StaminaMachine,
    cooldowns: Cooldowns,
    steering: GraphSteering,

    graph: NavGraph,
    builder: Option<GraphBuilder>,
    warned_unusable: bool,

    next_path_time: Seconds,
    last_pos: Option<Vec3>,
    stuck_time: Seconds,
    pending_attach: Option<Seconds>,
    last_action: Option<Action>,
}

impl Follower {
    pub fn new(cfg: PursuitConfig) -> Self {
        Self {
            perception: Perception::new(&cfg),
            cooldowns: Cooldowns::new(&cfg),
            brain: Brain::new(cfg.clone()),
            machine: StaminaMachine::new(),
            steering: GraphSteering::new(),
            graph: NavGraph::new(),
            builder: None,
            warned_unusable: false,
            next_path_time: 0.0,
            last_pos: None,
            stuck_time: 0.0,
            pending_attach: None,
            last_action: None,
            cfg,
        }
    }

    pub fn graph(&self) -> &NavGraph {
        &self.graph
    }

    pub fn is_building(&self) -> bool {
        self.builder.is_some()
    }

    /// Drop the current graph and any in-flight build, then start building
    /// over the given region. Partial work is abandoned, never merged.
    pub fn request_rebuild(&mut self, bounds: Bounds) {
        tracing::info!(min = ?bounds.min, max = ?bounds.max, "rebuilding waypoint graph");
        self.graph = NavGraph::new();
        self.builder = Some(GraphBuilder::new(bounds, &self.cfg));
        self.warned_unusable = false;
        self.steering.reset();
    }

    /// Run one control tick. Returns the decision taken, for callers that
    /// want to log or visualize it.
    pub fn tick<W, O, A>(
        &mut self,
        now: Seconds,
        dt: Seconds,
        world: &W,
        oracle: &mut O,
        actuator: &mut A,
        target: Vec3,
    ) -> Decision
    where
        W: TerrainQuery,
        O: SteeringOracle,
        A: Actuator,
    {
        self.advance_build(world);
        self.resolve_pending_attach(now, actuator);
        self.enforce_climb_limits(actuator);

        if now >= self.next_path_time {
            oracle.set_destination(target);
            self.next_path_time = now + self.cfg.path_refresh;
        }

        let pos = actuator.position();
        let move_dir = self.steer(oracle, pos, target);
        actuator.set_look(move_dir);

        let bb = self.perception.build(
            now,
            world,
            oracle,
            actuator,
            target,
            move_dir,
            &self.graph,
            &self.cfg,
        );

        let decision = self
            .brain
            .evaluate(&bb, now, self.machine.wants_sprint(), &self.cooldowns);
        if self.last_action != Some(decision.action) {
            tracing::debug!(action = decision.action.name(), why = %decision.why, "action change");
            self.last_action = Some(decision.action);
        }

        self.machine.update(now, &bb, decision.action, &self.cfg);
        self.apply(now, &decision, &bb, move_dir, actuator);
        self.detect_stuck(now, dt, pos, &bb, actuator);

        decision
    }

    fn advance_build<W: TerrainQuery>(&mut self, world: &W) {
        let Some(builder) = &mut self.builder else {
            return;
        };
        match builder.advance(world) {
            BuildStep::InProgress => {}
            BuildStep::Finished(graph) => {
                tracing::info!(nodes = graph.len(), "waypoint graph ready");
                self.graph = graph;
                self.builder = None;
                self.steering.reset();
            }
            BuildStep::Failed => {
                if !self.warned_unusable {
                    tracing::warn!("waypoint graph unusable, steering falls back to straight lines");
                    self.warned_unusable = true;
                }
                self.builder = None;
            }
            // Unreachable: the builder is dropped on Finished/Failed.
            BuildStep::Spent => {
                self.builder = None;
            }
        }
    }

    /// Check whether a recent attach attempt actually latched, and reset
    /// the failure backoff if it did.
    fn resolve_pending_attach<A: Actuator>(&mut self, now: Seconds, actuator: &A) {
        if let Some(issued) = self.pending_attach {
            if now - issued >= ATTACH_VERIFY_DELAY {
                if actuator.is_climbing() {
                    self.cooldowns.attach_succeeded(&self.cfg);
                }
                self.pending_attach = None;
            }
        }
    }

    /// Hard climb release, independent of the decision: below the stamina
    /// floor or past the stamina-scaled hang cap, the agent lets go.
    fn enforce_climb_limits<A: Actuator>(&mut self, actuator: &mut A) {
        if actuator.is_climbing()
            && climb_interrupt(actuator.stamina_frac(), actuator.since_climb(), &self.cfg)
        {
            tracing::debug!(
                frac = actuator.stamina_frac(),
                held = actuator.since_climb(),
                "releasing climb"
            );
            actuator.release_climb();
        }
    }

    /// Steering priority: mesh oracle corner, then graph walk, then the
    /// straight line to the target. The oracle is only trusted with a
    /// complete path; a partial one dead-ends, so the graph takes over.
    fn steer<O: SteeringOracle>(&mut self, oracle: &O, pos: Vec3, target: Vec3) -> Vec3 {
        let straight = (target - pos).try_normalize().unwrap_or(Vec3::Z);

        if oracle.status() == PathStatus::Complete {
            if let Some(point) = oracle.steering_point() {
                let dir = point - pos;
                if dir.length_squared() > 1e-6 {
                    return dir.normalize();
                }
            }
        }

        self.steering
            .direction(&self.graph, pos, target, self.cfg.node_reach, straight)
    }

    fn apply<A: Actuator>(
        &mut self,
        now: Seconds,
        decision: &Decision,
        bb: &crate::perception::Blackboard,
        move_dir: Vec3,
        actuator: &mut A,
    ) {
        if self.machine.is_resting() {
            actuator.set_sprinting(false);
            actuator.set_movement(Vec2::ZERO);
            // A static grip regenerates; anything else drains, so let go.
            if actuator.is_climbing() && !actuator.on_static_grip() {
                actuator.release_climb();
            }
            return;
        }

        actuator.set_sprinting(self.machine.wants_sprint());

        let mut input = actuator.to_local(move_dir);
        input.x *= STRAFE_DAMP;
        if input.length_squared() > 1.0 {
            input = input.normalize();
        }
        actuator.set_movement(input);

        match decision.action {
            Action::Hop => {
                if actuator.can_jump() {
                    actuator.attempt_jump();
                    self.cooldowns.fired(Action::Hop, now, &self.cfg);
                }
            }
            Action::GapJump => {
                if actuator.can_jump() {
                    actuator.set_look(bb.gap.landing - bb.self_pos);
                    actuator.attempt_jump();
                    self.cooldowns.fired(Action::GapJump, now, &self.cfg);
                }
            }
            Action::WallAttach => {
                if actuator.can_jump() {
                    actuator.attempt_jump();
                }
                actuator.attempt_climb();
                self.cooldowns.fired(Action::WallAttach, now, &self.cfg);
                self.pending_attach = Some(now);
            }
            Action::Rest | Action::Sprint | Action::Follow => {}
        }
    }

    /// Low displacement accumulates stuck time; past the trigger the agent
    /// tries a climb nudge and forgets its graph walk so steering re-latches.
    fn detect_stuck<A: Actuator>(
        &mut self,
        _now: Seconds,
        dt: Seconds,
        pos_before: Vec3,
        bb: &crate::perception::Blackboard,
        actuator: &mut A,
    ) {
        if self.machine.is_resting() || bb.climbing {
            self.stuck_time = 0.0;
            self.last_pos = Some(pos_before);
            return;
        }

        if let Some(last) = self.last_pos {
            if pos_before.distance(last) < self.cfg.stuck_move_epsilon * dt.max(1e-3) {
                self.stuck_time += dt;
            } else {
                self.stuck_time = 0.0;
            }
        }
        self.last_pos = Some(pos_before);

        if self.stuck_time > self.cfg.stuck_trigger_time
            && bb.stamina_frac >= self.cfg.climb_frac
            && !bb.recently_exhausted
        {
            tracing::debug!(stuck_for = self.stuck_time, "stuck, nudging with a climb");
            actuator.attempt_climb();
            self.steering.reset();
            self.stuck_time = 0.0;
        }
    }
}
