//! Waypoint graph over walkable terrain
//!
//! Lightweight fallback navigation structure used when mesh steering is
//! unavailable. Built once per terrain region by the builder, then read-only;
//! region changes rebuild the whole graph and swap it in.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::types::WaypointId;

/// A single navigation point and its undirected connections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Waypoint {
    pub id: WaypointId,
    pub position: Vec3,
    /// Neighbor ids; order carries no meaning. Mirrored: if A lists B,
    /// B lists A.
    pub neighbors: Vec<WaypointId>,
}

/// Undirected waypoint graph
///
/// Disconnected components are permitted; the detour estimator reports an
/// infinite cost for unreachable goals rather than treating them as errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NavGraph {
    nodes: Vec<Waypoint>,
}

impl NavGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: WaypointId) -> Option<&Waypoint> {
        self.nodes.get(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Waypoint> {
        self.nodes.iter()
    }

    /// Append a node with no connections yet.
    pub fn add_node(&mut self, position: Vec3) -> WaypointId {
        let id = WaypointId(self.nodes.len() as u32);
        self.nodes.push(Waypoint {
            id,
            position,
            neighbors: Vec::new(),
        });
        id
    }

    /// Connect two waypoints with a mirrored edge. Self-loops and duplicate
    /// edges are ignored.
    pub fn connect(&mut self, a: WaypointId, b: WaypointId) {
        if a == b || a.index() >= self.nodes.len() || b.index() >= self.nodes.len() {
            return;
        }
        if !self.nodes[a.index()].neighbors.contains(&b) {
            self.nodes[a.index()].neighbors.push(b);
        }
        if !self.nodes[b.index()].neighbors.contains(&a) {
            self.nodes[b.index()].neighbors.push(a);
        }
    }

    /// Nearest waypoint to a world position. Linear scan; node counts are
    /// bounded by the build spacing, so this stays off any hot path concern.
    pub fn nearest(&self, pos: Vec3) -> Option<WaypointId> {
        let mut best = None;
        let mut best_d2 = f32::INFINITY;
        for node in &self.nodes {
            let d2 = node.position.distance_squared(pos);
            if d2 < best_d2 {
                best_d2 = d2;
                best = Some(node.id);
            }
        }
        best
    }

    /// Undirected-consistency check: every edge mirrored, no self-loops.
    /// Test and debug support; production builds rely on `connect` keeping
    /// the invariant by construction.
    pub fn is_symmetric(&self) -> bool {
        self.nodes.iter().all(|node| {
            node.neighbors.iter().all(|&n| {
                n != node.id
                    && self
                        .get(n)
                        .is_some_and(|other| other.neighbors.contains(&node.id))
            })
        })
    }
}
