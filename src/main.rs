//! Ballsim demo driver
//!
//! Builds a small walled arena on rolling terrain (or loads a level file),
//! drives a vehicle around it for a few seconds and logs what happens.
//!
//! Usage: `ballsim [settings.json] [level.json]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Ballsim (native) starting...");

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => ballsim::Settings::load_or_default(path),
        None => ballsim::Settings::default(),
    };

    let world = match args.next() {
        Some(path) => demo::load_level(&path, settings),
        None => Some(demo::arena(settings)),
    };
    let Some(mut world) = world else {
        std::process::exit(1);
    };

    demo::run(&mut world, 10.0);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Library-only on the web
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use ballsim::Settings;
    use ballsim::sim::{
        BodyId, HeightGrid, LevelDescription, LineSegment, SimEvent, SteerInput, World, step,
    };
    use glam::Vec3;

    const FRAME_TIME: f32 = 1.0 / 60.0;
    const ARENA_HALF: f32 = 40.0;

    pub fn load_level(path: &str, settings: Settings) -> Option<World> {
        let built = LevelDescription::load(path).and_then(|level| World::from_level(&level, settings));
        match built {
            Ok(world) => Some(world),
            Err(e) => {
                log::error!("Failed to load level {}: {}", path, e);
                None
            }
        }
    }

    /// Square arena with a player car, an AI car doing laps and scattered props
    pub fn arena(settings: Settings) -> World {
        let mut world = World::new(settings);

        let corners = [
            Vec3::new(-ARENA_HALF, 0.0, -ARENA_HALF),
            Vec3::new(ARENA_HALF, 0.0, -ARENA_HALF),
            Vec3::new(ARENA_HALF, 0.0, ARENA_HALF),
            Vec3::new(-ARENA_HALF, 0.0, ARENA_HALF),
        ];
        for i in 0..corners.len() {
            let next = corners[(i + 1) % corners.len()];
            world.add_wall(LineSegment::new(corners[i], next, 0.5));
        }

        world.spawn_vehicle(1.0, 2.0, Vec3::new(-20.0, 0.0, 0.0), 0.0);

        let lap = vec![
            Vec3::new(25.0, 0.0, 25.0),
            Vec3::new(-25.0, 0.0, 25.0),
            Vec3::new(-25.0, 0.0, -25.0),
            Vec3::new(25.0, 0.0, -25.0),
        ];
        world.spawn_path_follower(1.0, 2.0, Vec3::new(25.0, 0.0, -25.0), 0.0, lap, true);

        world.scatter_props(0xba11, 16, ARENA_HALF - 2.0, (0.5, 1.5));
        world
    }

    fn terrain() -> HeightGrid {
        let origin = Vec3::new(-ARENA_HALF, 0.0, -ARENA_HALF);
        let cells = (ARENA_HALF * 2.0) as usize + 1;
        HeightGrid::from_fn(origin, 1.0, cells, cells, |x, z| {
            (x * 0.15).sin() * 0.8 + (z * 0.1).cos() * 0.5
        })
    }

    /// Steer the first vehicle in a slow weave while everything else plays out
    pub fn run(world: &mut World, seconds: f32) {
        let ground = terrain();
        let frames = (seconds / FRAME_TIME) as u64;
        let player: Option<BodyId> = world
            .entities
            .iter()
            .find(|e| matches!(e.motion, ballsim::sim::Motion::Vehicle(_)))
            .map(|e| e.body.id);

        let mut hits = 0usize;
        for frame in 0..frames {
            if let Some(id) = player {
                let t = frame as f32 * FRAME_TIME;
                world.set_input(id, SteerInput::new((t * 0.8).sin(), 1.0));
            }

            step(world, &ground, FRAME_TIME);

            for event in world.drain_events() {
                match event {
                    SimEvent::BodyCollision { a, b, impact_speed } => {
                        hits += 1;
                        log::debug!("{:?} hit {:?} at {:.2}", a, b, impact_speed);
                    }
                    SimEvent::WallCollision { body, wall } => {
                        log::debug!("{:?} bounced off wall {}", body, wall);
                    }
                    SimEvent::FutureCollision { body, other } => {
                        log::trace!("{:?} sees {:?} coming", body, other);
                    }
                }
            }

            if frame % 60 == 0 {
                for e in &world.entities {
                    if e.motion.steering().is_some() {
                        let p = e.body.position();
                        log::info!(
                            "t={:>4.1}s {:?} pos=({:.1}, {:.1}, {:.1}) speed={:.1}",
                            frame as f32 * FRAME_TIME,
                            e.body.id,
                            p.x,
                            p.y,
                            p.z,
                            e.body.speed()
                        );
                    }
                }
            }
        }

        log::info!(
            "Done: {} frames, {} bodies, {} body collisions",
            world.frame,
            world.active_count(),
            hits
        );
    }
}
