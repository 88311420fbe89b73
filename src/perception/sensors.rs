//! Blackboard assembly and detour-ratio memoization
//!
//! `Perception` is the only stateful piece of the sensing layer, and its
//! state is purely a cache: the detour ratio leans on graph A* and is
//! recomputed on a fixed period (or when either endpoint moves) to keep
//! that cost off the per-tick path.

use glam::Vec3;

use crate::core::config::PursuitConfig;
use crate::core::types::Seconds;
use crate::graph::detour::DetourEstimator;
use crate::graph::waypoint::NavGraph;
use crate::perception::blackboard::Blackboard;
use crate::perception::probes::{probe_gap, probe_step, probe_wall};
use crate::world::{Actuator, PathStatus, SteeringOracle, TerrainQuery};

/// Builds the per-tick Blackboard
pub struct Perception {
    estimator: DetourEstimator,
    next_detour_at: Seconds,
    cached_ratio: f32,
    last_from: Vec3,
    last_to: Vec3,
}

impl Perception {
    pub fn new(cfg: &PursuitConfig) -> Self {
        Self {
            estimator: DetourEstimator::new(cfg.max_expansions),
            next_detour_at: 0.0,
            cached_ratio: f32::INFINITY,
            last_from: Vec3::ZERO,
            last_to: Vec3::ZERO,
        }
    }

    /// Assemble a fresh snapshot. Pure reads of the world, oracle, and
    /// actuator; the only mutation is the detour cache.
    #[allow(clippy::too_many_arguments)]
    pub fn build<W, O, A>(
        &mut self,
        now: Seconds,
        world: &W,
        oracle: &O,
        actuator: &A,
        target_pos: Vec3,
        move_dir: Vec3,
        graph: &NavGraph,
        cfg: &PursuitConfig,
    ) -> Blackboard
    where
        W: TerrainQuery,
        O: SteeringOracle,
        A: Actuator,
    {
        let self_pos = actuator.position();
        let body = actuator.body();
        let status = oracle.status();

        Blackboard {
            self_pos,
            target_pos,
            distance: self_pos.distance(target_pos),
            grounded: actuator.is_grounded(),
            climbing: actuator.is_climbing(),
            recently_exhausted: actuator.out_of_stamina_for() > cfg.exhaustion_lockout,
            stamina: actuator.stamina(),
            stamina_frac: actuator.stamina_frac(),
            move_dir,
            has_mesh_path: status != PathStatus::None,
            mesh_path_complete: status == PathStatus::Complete,
            detour_ratio: self.detour_ratio(now, oracle, graph, self_pos, target_pos, cfg),
            step: probe_step(world, &body, self_pos, move_dir, cfg),
            wall: probe_wall(world, &body, self_pos, move_dir, cfg),
            gap: probe_gap(world, self_pos, move_dir, cfg),
        }
    }

    /// Memoized path-length / straight-line ratio. The mesh oracle's corner
    /// polyline is the primary source; the graph estimator fills in when
    /// the oracle has nothing. Unknown stays INFINITY, which callers read
    /// as "no route worth comparing against".
    fn detour_ratio<O: SteeringOracle>(
        &mut self,
        now: Seconds,
        oracle: &O,
        graph: &NavGraph,
        from: Vec3,
        to: Vec3,
        cfg: &PursuitConfig,
    ) -> f32 {
        let straight = from.distance(to);
        if straight < 0.5 {
            return 1.0;
        }

        let eps_sq = cfg.detour_move_epsilon * cfg.detour_move_epsilon;
        if now < self.next_detour_at
            && from.distance_squared(self.last_from) < eps_sq
            && to.distance_squared(self.last_to) < eps_sq
        {
            return self.cached_ratio;
        }

        self.last_from = from;
        self.last_to = to;
        self.next_detour_at = now + cfg.detour_recalc_period;

        let mut path_len = f32::INFINITY;

        let corners = oracle.corners();
        if corners.len() >= 2 {
            path_len = corners
                .windows(2)
                .map(|pair| pair[0].distance(pair[1]))
                .sum();
        }

        if path_len.is_infinite() {
            path_len = self.estimator.estimate(graph, from, to);
        }

        self.cached_ratio = if path_len.is_finite() && straight > 1e-3 {
            (path_len / straight).max(1.0)
        } else {
            f32::INFINITY
        };
        self.cached_ratio
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::BodyDims;
    use crate::world::RayHit;
    use glam::Vec2;

    struct NoWorld;

    impl TerrainQuery for NoWorld {
        fn raycast(&self, _o: Vec3, _d: Vec3, _m: f32) -> Option<RayHit> {
            None
        }
        fn segment_blocked(&self, _a: Vec3, _b: Vec3) -> bool {
            false
        }
        fn project_walkable(&self, _p: Vec3, _m: f32) -> Option<Vec3> {
            None
        }
        fn walkable_vertices(&self) -> Vec<Vec3> {
            Vec::new()
        }
    }

    struct StubOracle {
        status: PathStatus,
        corners: Vec<Vec3>,
    }

    impl SteeringOracle for StubOracle {
        fn set_destination(&mut self, _t: Vec3) {}
        fn status(&self) -> PathStatus {
            self.status
        }
        fn steering_point(&self) -> Option<Vec3> {
            self.corners.get(1).copied()
        }
        fn corners(&self) -> &[Vec3] {
            &self.corners
        }
    }

    struct StubActuator {
        pos: Vec3,
        stamina: f32,
    }

    impl Actuator for StubActuator {
        fn position(&self) -> Vec3 {
            self.pos
        }
        fn body(&self) -> BodyDims {
            BodyDims::default()
        }
        fn is_grounded(&self) -> bool {
            true
        }
        fn is_climbing(&self) -> bool {
            false
        }
        fn since_climb(&self) -> Seconds {
            0.0
        }
        fn on_static_grip(&self) -> bool {
            false
        }
        fn stamina(&self) -> f32 {
            self.stamina
        }
        fn stamina_max(&self) -> f32 {
            1.0
        }
        fn out_of_stamina_for(&self) -> Seconds {
            0.0
        }
        fn is_sprinting(&self) -> bool {
            false
        }
        fn set_sprinting(&mut self, _on: bool) {}
        fn set_movement(&mut self, _input: Vec2) {}
        fn set_look(&mut self, _dir: Vec3) {}
        fn can_jump(&self) -> bool {
            true
        }
        fn attempt_jump(&mut self) {}
        fn attempt_climb(&mut self) {}
        fn release_climb(&mut self) {}
    }

    fn build_at(
        perception: &mut Perception,
        now: Seconds,
        oracle: &StubOracle,
        graph: &NavGraph,
        from: Vec3,
        to: Vec3,
    ) -> Blackboard {
        let actuator = StubActuator {
            pos: from,
            stamina: 1.0,
        };
        perception.build(
            now,
            &NoWorld,
            oracle,
            &actuator,
            to,
            Vec3::X,
            graph,
            &PursuitConfig::default(),
        )
    }

    #[test]
    fn test_ratio_from_oracle_corners() {
        let cfg = PursuitConfig::default();
        let mut p = Perception::new(&cfg);
        let oracle = StubOracle {
            status: PathStatus::Complete,
            corners: vec![
                Vec3::ZERO,
                Vec3::new(0.0, 0.0, 10.0),
                Vec3::new(10.0, 0.0, 10.0),
            ],
        };
        let bb = build_at(
            &mut p,
            0.0,
            &oracle,
            &NavGraph::new(),
            Vec3::ZERO,
            Vec3::new(10.0, 0.0, 10.0),
        );
        // 20 along corners over ~14.14 straight.
        assert!((bb.detour_ratio - 20.0 / 14.142).abs() < 0.01);
        assert!(bb.mesh_path_complete);
    }

    #[test]
    fn test_ratio_falls_back_to_graph() {
        let cfg = PursuitConfig::default();
        let mut p = Perception::new(&cfg);
        let oracle = StubOracle {
            status: PathStatus::None,
            corners: Vec::new(),
        };

        let mut graph = NavGraph::new();
        let a = graph.add_node(Vec3::ZERO);
        let b = graph.add_node(Vec3::new(0.0, 0.0, 10.0));
        let c = graph.add_node(Vec3::new(10.0, 0.0, 10.0));
        graph.connect(a, b);
        graph.connect(b, c);

        let bb = build_at(
            &mut p,
            0.0,
            &oracle,
            &graph,
            Vec3::ZERO,
            Vec3::new(10.0, 0.0, 10.0),
        );
        assert!(bb.detour_ratio.is_finite());
        assert!(bb.detour_ratio > 1.3);
    }

    #[test]
    fn test_ratio_unknown_is_infinite() {
        let cfg = PursuitConfig::default();
        let mut p = Perception::new(&cfg);
        let oracle = StubOracle {
            status: PathStatus::None,
            corners: Vec::new(),
        };
        let bb = build_at(
            &mut p,
            0.0,
            &oracle,
            &NavGraph::new(),
            Vec3::ZERO,
            Vec3::new(10.0, 0.0, 0.0),
        );
        assert!(bb.detour_ratio.is_infinite());
        assert!(!bb.has_mesh_path);
    }

    #[test]
    fn test_ratio_close_targets_are_direct() {
        let cfg = PursuitConfig::default();
        let mut p = Perception::new(&cfg);
        let oracle = StubOracle {
            status: PathStatus::None,
            corners: Vec::new(),
        };
        let bb = build_at(
            &mut p,
            0.0,
            &oracle,
            &NavGraph::new(),
            Vec3::ZERO,
            Vec3::new(0.3, 0.0, 0.0),
        );
        assert_eq!(bb.detour_ratio, 1.0);
    }

    #[test]
    fn test_ratio_memoized_within_period() {
        let cfg = PursuitConfig::default();
        let mut p = Perception::new(&cfg);

        let mut graph = NavGraph::new();
        let a = graph.add_node(Vec3::ZERO);
        let b = graph.add_node(Vec3::new(10.0, 0.0, 0.0));
        graph.connect(a, b);

        let no_path = StubOracle {
            status: PathStatus::None,
            corners: Vec::new(),
        };
        let to = Vec3::new(10.0, 0.0, 0.0);
        let first = build_at(&mut p, 0.0, &no_path, &graph, Vec3::ZERO, to).detour_ratio;

        // Oracle suddenly has a much longer path, but we are inside the
        // recalc period and nothing moved: the cached ratio holds.
        let with_path = StubOracle {
            status: PathStatus::Complete,
            corners: vec![Vec3::ZERO, Vec3::new(0.0, 0.0, 50.0), to],
        };
        let second = build_at(&mut p, 0.1, &with_path, &graph, Vec3::ZERO, to).detour_ratio;
        assert_eq!(first, second);

        // Past the period the new source is picked up.
        let third = build_at(&mut p, 0.5, &with_path, &graph, Vec3::ZERO, to).detour_ratio;
        assert!(third > second + 1.0);
    }

    #[test]
    fn test_ratio_recomputed_on_movement() {
        let cfg = PursuitConfig::default();
        let mut p = Perception::new(&cfg);
        let oracle = StubOracle {
            status: PathStatus::Complete,
            corners: vec![Vec3::ZERO, Vec3::new(20.0, 0.0, 0.0)],
        };
        let to = Vec3::new(20.0, 0.0, 0.0);
        let _ = build_at(&mut p, 0.0, &oracle, &NavGraph::new(), Vec3::ZERO, to);

        // Endpoint hop larger than the epsilon forces a recompute even
        // though the period has not elapsed.
        let moved = Vec3::new(0.0, 0.0, 5.0);
        let bb = build_at(&mut p, 0.05, &oracle, &NavGraph::new(), moved, to);
        let straight = moved.distance(to);
        assert!((bb.detour_ratio - 20.0_f32.max(straight) / straight).abs() < 0.05);
    }
}
