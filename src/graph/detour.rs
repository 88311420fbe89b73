//! Bounded detour estimation over the waypoint graph
//!
//! Answers "roughly how far is it through the graph" with a hard expansion
//! cap so the worst case stays within a tick. A capped or unreachable search
//! reports an infinite distance, which callers read as "do not prefer this
//! route" rather than as a failure.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ahash::AHashMap;
use glam::Vec3;
use ordered_float::OrderedFloat;

use crate::core::types::WaypointId;
use crate::graph::waypoint::NavGraph;

/// A* over the waypoint graph with an expansion cap
#[derive(Debug, Clone)]
pub struct DetourEstimator {
    max_expansions: usize,
}

impl DetourEstimator {
    pub fn new(max_expansions: usize) -> Self {
        Self { max_expansions }
    }

    /// Approximate travel distance from `from` to `to` through the graph:
    /// accumulated edge cost to the goal node plus the straight-line
    /// residual from that node to `to`.
    ///
    /// Returns `f32::INFINITY` when the graph is empty, the goal is
    /// unreachable, or the expansion cap is hit. When both endpoints share
    /// the same nearest node no search runs and only the residual is
    /// returned; this also defines the cap-0 degenerate case (coincident
    /// nearest node: residual; distinct nodes: infinity).
    pub fn estimate(&self, graph: &NavGraph, from: Vec3, to: Vec3) -> f32 {
        if graph.is_empty() {
            return f32::INFINITY;
        }
        let (Some(start), Some(goal)) = (graph.nearest(from), graph.nearest(to)) else {
            return f32::INFINITY;
        };

        let goal_pos = graph.get(goal).map(|n| n.position).unwrap_or(to);
        if start == goal {
            return goal_pos.distance(to);
        }

        // Open set ordered by (f, g) lexicographically, min-first.
        type Key = (OrderedFloat<f32>, OrderedFloat<f32>, WaypointId);
        let mut open: BinaryHeap<Reverse<Key>> = BinaryHeap::new();
        let mut g_cost: AHashMap<WaypointId, f32> = AHashMap::with_capacity(64);

        g_cost.insert(start, 0.0);
        let start_pos = graph.get(start).map(|n| n.position).unwrap_or(from);
        open.push(Reverse((
            OrderedFloat(start_pos.distance(goal_pos)),
            OrderedFloat(0.0),
            start,
        )));

        let mut expansions = 0;
        while expansions < self.max_expansions {
            let Some(Reverse((_, _, id))) = open.pop() else {
                break;
            };
            expansions += 1;

            if id == goal {
                return g_cost[&goal] + goal_pos.distance(to);
            }

            let Some(node) = graph.get(id) else { continue };
            let g_here = g_cost[&id];
            for &next in &node.neighbors {
                let Some(neighbor) = graph.get(next) else {
                    continue;
                };
                let tentative = g_here + node.position.distance(neighbor.position);
                if g_cost.get(&next).is_none_or(|&old| tentative < old) {
                    g_cost.insert(next, tentative);
                    let f = tentative + neighbor.position.distance(goal_pos);
                    open.push(Reverse((OrderedFloat(f), OrderedFloat(tentative), next)));
                }
            }
        }

        f32::INFINITY
    }
}
