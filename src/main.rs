//! Crag Pursuit - demo entry point
//!
//! Runs the pursuit controller against a synthetic rolling heightfield with
//! a target circling the region. No engine is attached: the terrain, mesh
//! oracle, and actuator are all simple local implementations, which makes
//! this a smoke-test harness and a worked example of the integration traits.

use clap::Parser;
use glam::{Vec2, Vec3};

use crag_pursuit::core::types::{BodyDims, Seconds};
use crag_pursuit::{
    Actuator, Bounds, Follower, PathStatus, PursuitConfig, RayHit, Result, SteeringOracle,
    TerrainQuery,
};

#[derive(Parser, Debug)]
#[command(name = "crag-pursuit", about = "Terrain pursuit agent demo")]
struct Args {
    /// Path to a TOML tuning file; missing file uses built-in defaults
    #[arg(long, default_value = "pursuit.toml")]
    config: std::path::PathBuf,

    /// Number of simulation ticks to run
    #[arg(long, default_value_t = 600)]
    ticks: u32,

    /// Fixed timestep in seconds
    #[arg(long, default_value_t = 0.05)]
    dt: f32,
}

/// Rolling sinusoidal heightfield
struct Heightfield;

impl Heightfield {
    fn height(&self, x: f32, z: f32) -> f32 {
        2.0 * (x * 0.08).sin() * (z * 0.08).cos()
    }
}

impl TerrainQuery for Heightfield {
    fn raycast(&self, origin: Vec3, dir: Vec3, max_dist: f32) -> Option<RayHit> {
        // Fixed-step ray march; plenty for a demo surface this smooth.
        let step = 0.1;
        let mut t = 0.0;
        while t <= max_dist {
            let p = origin + dir * t;
            let ground = self.height(p.x, p.z);
            if p.y <= ground {
                return Some(RayHit {
                    point: Vec3::new(p.x, ground, p.z),
                    normal: Vec3::Y,
                    distance: t,
                });
            }
            t += step;
        }
        None
    }

    fn segment_blocked(&self, a: Vec3, b: Vec3) -> bool {
        let steps = (a.distance(b) / 0.5).ceil().max(1.0) as u32;
        (1..steps).any(|i| {
            let p = a.lerp(b, i as f32 / steps as f32);
            p.y < self.height(p.x, p.z) - 0.05
        })
    }

    fn project_walkable(&self, point: Vec3, max_distance: f32) -> Option<Vec3> {
        let ground = self.height(point.x, point.z);
        (point.y - ground <= max_distance).then(|| Vec3::new(point.x, ground, point.z))
    }

    fn walkable_vertices(&self) -> Vec<Vec3> {
        Vec::new()
    }
}

/// No mesh pathfinding in the demo; the controller exercises its graph and
/// straight-line fallbacks.
#[derive(Default)]
struct NoMesh;

impl SteeringOracle for NoMesh {
    fn set_destination(&mut self, _target: Vec3) {}
    fn status(&self) -> PathStatus {
        PathStatus::None
    }
    fn steering_point(&self) -> Option<Vec3> {
        None
    }
    fn corners(&self) -> &[Vec3] {
        &[]
    }
}

/// Kinematic ground walker with a stamina bar
struct Walker {
    pos: Vec3,
    input: Vec2,
    sprinting: bool,
    stamina: f32,
    empty_for: Seconds,
}

impl Walker {
    const WALK_SPEED: f32 = 4.0;
    const SPRINT_SPEED: f32 = 8.0;
    const SPRINT_DRAIN: f32 = 0.12;
    const REGEN: f32 = 0.15;

    fn new(pos: Vec3) -> Self {
        Self {
            pos,
            input: Vec2::ZERO,
            sprinting: false,
            stamina: 1.0,
            empty_for: 0.0,
        }
    }

    fn step(&mut self, world: &Heightfield, dt: f32) {
        let speed = if self.sprinting && self.input.length_squared() > 0.0 {
            self.stamina = (self.stamina - Self::SPRINT_DRAIN * dt).max(0.0);
            Self::SPRINT_SPEED
        } else {
            self.stamina = (self.stamina + Self::REGEN * dt).min(1.0);
            Self::WALK_SPEED
        };
        if self.stamina <= 0.0 {
            self.empty_for += dt;
        } else {
            self.empty_for = 0.0;
        }

        let world_dir = Vec3::new(self.input.x, 0.0, self.input.y);
        self.pos += world_dir * speed * dt;
        self.pos.y = world.height(self.pos.x, self.pos.z);
    }
}

impl Actuator for Walker {
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
        self.empty_for
    }
    fn is_sprinting(&self) -> bool {
        self.sprinting
    }
    fn set_sprinting(&mut self, on: bool) {
        self.sprinting = on;
    }
    fn set_movement(&mut self, input: Vec2) {
        self.input = input;
    }
    fn set_look(&mut self, _dir: Vec3) {}
    fn can_jump(&self) -> bool {
        true
    }
    fn attempt_jump(&mut self) {}
    fn attempt_climb(&mut self) {}
    fn release_climb(&mut self) {}
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crag_pursuit=info".into()),
        )
        .init();

    let args = Args::parse();
    let cfg = PursuitConfig::load(&args.config)?;

    let world = Heightfield;
    let mut oracle = NoMesh;
    let mut walker = Walker::new(Vec3::new(5.0, 0.0, 5.0));

    let mut follower = Follower::new(cfg);
    follower.request_rebuild(Bounds::new(
        Vec3::new(-60.0, -3.0, -60.0),
        Vec3::new(60.0, 3.0, 60.0),
    ));

    tracing::info!(ticks = args.ticks, dt = args.dt, "pursuit demo starting");

    let mut now: Seconds = 0.0;
    for tick in 0..args.ticks {
        // Target orbits the region center.
        let angle = now * 0.15;
        let target = Vec3::new(
            40.0 * angle.cos(),
            0.0,
            40.0 * angle.sin(),
        );
        let target = Vec3::new(target.x, world.height(target.x, target.z), target.z);

        let decision = follower.tick(now, args.dt, &world, &mut oracle, &mut walker, target);
        walker.step(&world, args.dt);
        now += args.dt;

        if tick % 20 == 0 {
            tracing::info!(
                tick,
                action = decision.action.name(),
                dist = format!("{:.1}", walker.pos.distance(target)),
                stamina = format!("{:.2}", walker.stamina),
                "tick"
            );
        }
    }

    tracing::info!("pursuit demo finished");
    Ok(())
}
