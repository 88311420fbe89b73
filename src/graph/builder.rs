//! Runtime construction of the waypoint graph from terrain samples
//!
//! The builder is an explicit incremental object: each `advance()` call
//! processes a bounded batch of candidates and returns, so a build spreads
//! across ticks without blocking any single one. A region change simply
//! drops the in-flight builder and starts a new one; partial work is
//! abandoned, never merged.
//!
//! Pipeline: grid-sample the region and project each candidate onto the
//! walkable surface; fall back to the surface triangulation vertices
//! (deduplicated by grid cell) if the grid yields nothing; wire each sample
//! to line-of-sight neighbors within an adaptive radius; mirror all edges.

use ahash::AHashSet;
use glam::Vec3;

use crate::core::config::PursuitConfig;
use crate::graph::waypoint::NavGraph;
use crate::world::TerrainQuery;

/// World-space AABB of the terrain region to cover
#[derive(Debug, Clone, Copy)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }
}

/// Outcome of one `advance()` call
///
/// `Finished` and `Failed` are terminal; drop the builder once either is
/// seen.
#[derive(Debug)]
pub enum BuildStep {
    /// Batch processed, more work remains
    InProgress,
    /// Graph complete; the builder is spent
    Finished(NavGraph),
    /// No samples could be placed anywhere in the region. The graph is
    /// unusable; callers degrade to straight-line steering and treat all
    /// detours as infinite.
    Failed,
    /// Polled again after the graph was already handed out
    Spent,
}

#[derive(Debug)]
enum Phase {
    GridSampling { ix: u32, iz: u32 },
    VertexFallback { vertices: Vec<Vec3>, cursor: usize },
    Connecting { cursor: usize },
    Failed,
    Spent,
}

/// Incremental waypoint-graph builder with a progress cursor
#[derive(Debug)]
pub struct GraphBuilder {
    bounds: Bounds,
    spacing: f32,
    batch: usize,
    connect_factor: f32,
    los_offset: f32,
    search_radius: f32,

    points: Vec<Vec3>,
    /// Per-point neighbor indices gathered during the connect phase;
    /// mirrored when the final graph is assembled.
    adjacency: Vec<Vec<u32>>,
    seen_cells: AHashSet<(i32, i32)>,
    phase: Phase,
}

impl GraphBuilder {
    pub fn new(bounds: Bounds, cfg: &PursuitConfig) -> Self {
        Self {
            bounds,
            spacing: cfg.node_spacing,
            batch: cfg.build_batch.max(1),
            connect_factor: cfg.connect_factor,
            los_offset: cfg.los_offset,
            search_radius: cfg.connection_search_radius(),
            points: Vec::new(),
            adjacency: Vec::new(),
            seen_cells: AHashSet::new(),
            phase: Phase::GridSampling { ix: 0, iz: 0 },
        }
    }

    /// Process one bounded batch of work. Call once per tick until it
    /// reports `Finished` or `Failed`, then drop the builder; a spent
    /// builder answers `Spent` so success is never mistaken for an
    /// unusable graph.
    pub fn advance<W: TerrainQuery>(&mut self, world: &W) -> BuildStep {
        match &mut self.phase {
            Phase::GridSampling { .. } => {
                self.sample_grid_batch(world);
                BuildStep::InProgress
            }
            Phase::VertexFallback { .. } => {
                self.sample_vertex_batch();
                BuildStep::InProgress
            }
            Phase::Connecting { .. } => {
                if self.connect_batch(world) {
                    let graph = self.assemble();
                    self.phase = Phase::Spent;
                    tracing::debug!(nodes = graph.len(), "waypoint graph build complete");
                    BuildStep::Finished(graph)
                } else {
                    BuildStep::InProgress
                }
            }
            Phase::Failed => BuildStep::Failed,
            Phase::Spent => BuildStep::Spent,
        }
    }

    fn grid_counts(&self) -> (u32, u32) {
        let nx = ((self.bounds.max.x - self.bounds.min.x) / self.spacing).floor() as u32 + 1;
        let nz = ((self.bounds.max.z - self.bounds.min.z) / self.spacing).floor() as u32 + 1;
        (nx, nz)
    }

    fn cell_of(&self, p: Vec3) -> (i32, i32) {
        (
            (p.x / self.spacing).floor() as i32,
            (p.z / self.spacing).floor() as i32,
        )
    }

    fn sample_grid_batch<W: TerrainQuery>(&mut self, world: &W) {
        let (nx, nz) = self.grid_counts();
        // Generous headroom above the region so projection can reach any
        // surface inside it.
        let probe_height = self.bounds.max.y + 5.0;
        let probe_depth = (self.bounds.max.y - self.bounds.min.y) + 10.0;

        let Phase::GridSampling { mut ix, mut iz } = self.phase else {
            return;
        };

        for _ in 0..self.batch {
            if ix >= nx {
                // Grid exhausted: either move on to connecting, or fall
                // back to the triangulation when nothing landed.
                if self.points.is_empty() {
                    tracing::warn!("grid sampling found no walkable points, trying triangulation vertices");
                    self.phase = Phase::VertexFallback {
                        vertices: world.walkable_vertices(),
                        cursor: 0,
                    };
                } else {
                    self.phase = Phase::Connecting { cursor: 0 };
                }
                return;
            }

            let x = self.bounds.min.x + ix as f32 * self.spacing;
            let z = self.bounds.min.z + iz as f32 * self.spacing;
            let origin = Vec3::new(x, probe_height, z);
            if let Some(p) = world.project_walkable(origin, probe_depth) {
                let cell = self.cell_of(p);
                self.seen_cells.insert(cell);
                self.points.push(p);
            }

            iz += 1;
            if iz >= nz {
                iz = 0;
                ix += 1;
            }
        }

        self.phase = Phase::GridSampling { ix, iz };
    }

    fn sample_vertex_batch(&mut self) {
        let Phase::VertexFallback { vertices, cursor } = &mut self.phase else {
            return;
        };

        let end = (*cursor + self.batch).min(vertices.len());
        for i in *cursor..end {
            let v = vertices[i];
            let cell = (
                (v.x / self.spacing).floor() as i32,
                (v.z / self.spacing).floor() as i32,
            );
            if self.seen_cells.insert(cell) {
                self.points.push(v);
            }
        }
        *cursor = end;

        if *cursor >= vertices.len() {
            if self.points.is_empty() {
                tracing::warn!("no walkable points from grid or triangulation, graph unusable");
                self.phase = Phase::Failed;
            } else {
                tracing::debug!(points = self.points.len(), "triangulation fallback placed points");
                self.phase = Phase::Connecting { cursor: 0 };
            }
        }
    }

    /// Connect a batch of points. Returns true when every point is wired.
    fn connect_batch<W: TerrainQuery>(&mut self, world: &W) -> bool {
        let Phase::Connecting { cursor } = &mut self.phase else {
            return false;
        };
        let start = *cursor;
        let end = (start + self.batch).min(self.points.len());
        *cursor = end;

        let lift = Vec3::Y * self.los_offset;
        let search_sq = self.search_radius * self.search_radius;

        for i in start..end {
            let here = self.points[i];

            // Pass 1: candidates in range with unobstructed line of sight,
            // checked slightly above ground to dodge thin geometry.
            let mut reachable: Vec<(u32, f32)> = Vec::new();
            for (j, &other) in self.points.iter().enumerate() {
                if j == i {
                    continue;
                }
                let d2 = here.distance_squared(other);
                if d2 > search_sq {
                    continue;
                }
                if !world.segment_blocked(here + lift, other + lift) {
                    reachable.push((j as u32, d2));
                }
            }

            // Pass 2: keep only neighbors within connect_factor of the
            // closest survivor, for locally uniform connectivity.
            if let Some(&(_, best_d2)) = reachable
                .iter()
                .min_by(|a, b| a.1.total_cmp(&b.1))
            {
                let keep_sq = best_d2 * self.connect_factor * self.connect_factor;
                self.adjacency.push(
                    reachable
                        .into_iter()
                        .filter(|&(_, d2)| d2 <= keep_sq)
                        .map(|(j, _)| j)
                        .collect(),
                );
            } else {
                self.adjacency.push(Vec::new());
            }
        }

        end >= self.points.len()
    }

    /// Assemble the final graph; `connect` mirrors every edge.
    fn assemble(&mut self) -> NavGraph {
        let mut graph = NavGraph::new();
        let ids: Vec<_> = self.points.iter().map(|&p| graph.add_node(p)).collect();
        for (i, neighbors) in self.adjacency.iter().enumerate() {
            for &j in neighbors {
                graph.connect(ids[i], ids[j as usize]);
            }
        }
        debug_assert!(graph.is_symmetric());
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::RayHit;

    /// Flat plane at y = 0 with optional opaque wall on the x = `wall_x`
    /// plane blocking line of sight.
    struct FlatWorld {
        wall_x: Option<f32>,
        walkable: bool,
        vertices: Vec<Vec3>,
    }

    impl FlatWorld {
        fn open() -> Self {
            Self {
                wall_x: None,
                walkable: true,
                vertices: Vec::new(),
            }
        }
    }

    impl TerrainQuery for FlatWorld {
        fn raycast(&self, origin: Vec3, dir: Vec3, max_dist: f32) -> Option<RayHit> {
            if dir.y >= 0.0 || origin.y < 0.0 {
                return None;
            }
            let t = -origin.y / dir.y;
            (t <= max_dist).then(|| RayHit {
                point: origin + dir * t,
                normal: Vec3::Y,
                distance: t,
            })
        }

        fn segment_blocked(&self, a: Vec3, b: Vec3) -> bool {
            match self.wall_x {
                Some(x) => (a.x - x).signum() != (b.x - x).signum(),
                None => false,
            }
        }

        fn project_walkable(&self, point: Vec3, _max_distance: f32) -> Option<Vec3> {
            self.walkable.then(|| Vec3::new(point.x, 0.0, point.z))
        }

        fn walkable_vertices(&self) -> Vec<Vec3> {
            self.vertices.clone()
        }
    }

    fn run_to_completion<W: TerrainQuery>(builder: &mut GraphBuilder, world: &W) -> Option<NavGraph> {
        for _ in 0..10_000 {
            match builder.advance(world) {
                BuildStep::InProgress => continue,
                BuildStep::Finished(g) => return Some(g),
                BuildStep::Failed => return None,
                BuildStep::Spent => panic!("polled past completion"),
            }
        }
        panic!("builder did not terminate");
    }

    fn region() -> Bounds {
        Bounds::new(Vec3::new(0.0, -1.0, 0.0), Vec3::new(60.0, 1.0, 60.0))
    }

    #[test]
    fn test_flat_world_builds_symmetric_graph() {
        let cfg = PursuitConfig::default();
        let world = FlatWorld::open();
        let mut builder = GraphBuilder::new(region(), &cfg);
        let graph = run_to_completion(&mut builder, &world).expect("build should succeed");

        assert!(!graph.is_empty());
        assert!(graph.is_symmetric());
        // 5x5 grid at spacing 15 over a 60-unit square.
        assert_eq!(graph.len(), 25);
        assert!(graph.iter().all(|w| w.position.y == 0.0));
    }

    #[test]
    fn test_build_yields_across_calls() {
        let cfg = PursuitConfig {
            build_batch: 5,
            ..Default::default()
        };
        let world = FlatWorld::open();
        let mut builder = GraphBuilder::new(region(), &cfg);

        // First call cannot finish a 25-candidate grid with batch 5.
        assert!(matches!(builder.advance(&world), BuildStep::InProgress));
    }

    #[test]
    fn test_adaptive_radius_bounds_connectivity() {
        let cfg = PursuitConfig::default();
        let world = FlatWorld::open();
        let mut builder = GraphBuilder::new(region(), &cfg);
        let graph = run_to_completion(&mut builder, &world).unwrap();

        // Nearest neighbor is one spacing away (15); factor 1.5 admits the
        // diagonals (~21.2 <= 22.5) but nothing beyond, capping degree at 8.
        for w in graph.iter() {
            assert!(w.neighbors.len() <= 8, "node {:?} too dense", w.id);
            assert!(!w.neighbors.is_empty());
        }
    }

    #[test]
    fn test_wall_blocks_cross_edges() {
        let cfg = PursuitConfig::default();
        let world = FlatWorld {
            wall_x: Some(29.0),
            walkable: true,
            vertices: Vec::new(),
        };
        let mut builder = GraphBuilder::new(region(), &cfg);
        let graph = run_to_completion(&mut builder, &world).unwrap();

        for w in graph.iter() {
            for &n in &w.neighbors {
                let other = graph.get(n).unwrap();
                assert_eq!(
                    (w.position.x - 29.0).signum(),
                    (other.position.x - 29.0).signum(),
                    "edge crosses the wall"
                );
            }
        }
    }

    #[test]
    fn test_no_walkable_surface_fails() {
        let cfg = PursuitConfig::default();
        let world = FlatWorld {
            wall_x: None,
            walkable: false,
            vertices: Vec::new(),
        };
        let mut builder = GraphBuilder::new(region(), &cfg);
        assert!(run_to_completion(&mut builder, &world).is_none());

        // Further polling keeps reporting the unusable graph.
        assert!(matches!(builder.advance(&world), BuildStep::Failed));
    }

    #[test]
    fn test_spent_builder_is_not_a_failure() {
        let cfg = PursuitConfig::default();
        let world = FlatWorld::open();
        let mut builder = GraphBuilder::new(region(), &cfg);
        run_to_completion(&mut builder, &world).expect("build should succeed");

        // Polling past success reports the builder as spent, never as an
        // unusable graph.
        assert!(matches!(builder.advance(&world), BuildStep::Spent));
        assert!(matches!(builder.advance(&world), BuildStep::Spent));
    }

    #[test]
    fn test_vertex_fallback_dedupes_by_cell() {
        let cfg = PursuitConfig::default();
        // Projection finds nothing, but the triangulation offers vertices;
        // two of them share a grid cell.
        let world = FlatWorld {
            wall_x: None,
            walkable: false,
            vertices: vec![
                Vec3::new(1.0, 0.0, 1.0),
                Vec3::new(2.0, 0.0, 2.0), // same 15-unit cell as above
                Vec3::new(20.0, 0.0, 20.0),
            ],
        };
        let mut builder = GraphBuilder::new(region(), &cfg);
        let graph = run_to_completion(&mut builder, &world).expect("fallback should succeed");
        assert_eq!(graph.len(), 2);
        assert!(graph.is_symmetric());
    }
}
