//! The simulated world: bodies, walls and the context they were created in
//!
//! Entities are kept sorted by id so every pass visits them in the same order.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::body::{Body, BodyId, SimContext};
use super::motion::Motion;
use super::phantom::PhantomArena;
use super::segment::LineSegment;
use super::steering::SteerInput;
use crate::settings::Settings;

/// A body plus the strategy that moves it and its latest control input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub body: Body,
    pub motion: Motion,
    pub input: SteerInput,
}

/// Things that happened during a step, for gameplay code to react to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// Two bodies exchanged momentum
    BodyCollision { a: BodyId, b: BodyId, impact_speed: f32 },
    /// A body bounced off a wall (index into `World::walls`)
    WallCollision { body: BodyId, wall: usize },
    /// `other` entered `body`'s outer radius
    FutureCollision { body: BodyId, other: BodyId },
}

#[derive(Debug)]
pub struct World {
    pub ctx: SimContext,
    pub settings: Settings,
    /// Sorted by body id
    pub entities: Vec<Entity>,
    pub walls: Vec<LineSegment>,
    pub(crate) events: Vec<SimEvent>,
    pub(crate) phantoms: PhantomArena,
    /// Steps taken
    pub frame: u64,
}

impl World {
    pub fn new(settings: Settings) -> Self {
        Self::with_context(SimContext::default(), settings)
    }

    pub fn with_context(ctx: SimContext, settings: Settings) -> Self {
        Self {
            ctx,
            settings,
            entities: Vec::new(),
            walls: Vec::new(),
            events: Vec::new(),
            phantoms: PhantomArena::new(),
            frame: 0,
        }
    }

    /// Insert a body, keeping id order
    pub fn add_body(&mut self, body: Body, motion: Motion) -> BodyId {
        let id = body.id;
        let idx = self.entities.partition_point(|e| e.body.id < id);
        self.entities.insert(
            idx,
            Entity {
                body,
                motion,
                input: SteerInput::NONE,
            },
        );
        id
    }

    /// Passive prop
    pub fn spawn_prop(&mut self, radius: f32, mass: f32, position: Vec3, is_static: bool) -> BodyId {
        let body = self.ctx.create_body(radius, mass, position, is_static);
        self.add_body(body, Motion::passive())
    }

    /// Vehicle steered by [`set_input`](Self::set_input)
    pub fn spawn_vehicle(&mut self, radius: f32, mass: f32, position: Vec3, heading: f32) -> BodyId {
        let mut body = self.ctx.create_body(radius, mass, position, false);
        body.set_heading(heading);
        let motion = Motion::vehicle(&body, &self.settings);
        self.add_body(body, motion)
    }

    /// AI vehicle driving along `waypoints`
    pub fn spawn_path_follower(
        &mut self,
        radius: f32,
        mass: f32,
        position: Vec3,
        heading: f32,
        waypoints: Vec<Vec3>,
        looped: bool,
    ) -> BodyId {
        let mut body = self.ctx.create_body(radius, mass, position, false);
        body.set_heading(heading);
        body.set_outer_radius(body.radius() * 2.0);
        let motion = Motion::path_follower(&body, waypoints, looped, &self.settings);
        self.add_body(body, motion)
    }

    pub fn add_wall(&mut self, wall: LineSegment) -> usize {
        self.walls.push(wall);
        self.walls.len() - 1
    }

    fn index_of(&self, id: BodyId) -> Option<usize> {
        self.entities.binary_search_by_key(&id, |e| e.body.id).ok()
    }

    pub fn entity(&self, id: BodyId) -> Option<&Entity> {
        self.index_of(id).map(|i| &self.entities[i])
    }

    pub fn entity_mut(&mut self, id: BodyId) -> Option<&mut Entity> {
        self.index_of(id).map(|i| &mut self.entities[i])
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.entity(id).map(|e| &e.body)
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.entity_mut(id).map(|e| &mut e.body)
    }

    /// Remove a body from the world
    pub fn remove_body(&mut self, id: BodyId) -> Option<Entity> {
        self.index_of(id).map(|i| self.entities.remove(i))
    }

    /// Set the control input used from the next step on
    pub fn set_input(&mut self, id: BodyId, input: SteerInput) -> bool {
        match self.entity_mut(id) {
            Some(e) => {
                e.input = input;
                true
            }
            None => false,
        }
    }

    /// Bodies the stepper will move
    pub fn active_count(&self) -> usize {
        self.entities.iter().filter(|e| !e.body.is_disabled()).count()
    }

    /// Take the events recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    /// Tear down: drop everything and restart id allocation
    pub fn clear(&mut self) {
        self.entities.clear();
        self.walls.clear();
        self.events.clear();
        self.phantoms.clear();
        self.ctx.reset();
        self.frame = 0;
        log::info!("World cleared");
    }

    /// Scatter passive props inside a square of `half_extent` around the
    /// origin without overlapping anything already placed.
    ///
    /// Deterministic per seed. Returns the ids actually placed; placement gives
    /// up on a prop after a bounded number of attempts.
    pub fn scatter_props(
        &mut self,
        seed: u64,
        count: usize,
        half_extent: f32,
        radius: (f32, f32),
    ) -> Vec<BodyId> {
        const ATTEMPTS: usize = 32;
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut placed = Vec::with_capacity(count);

        for _ in 0..count {
            for _ in 0..ATTEMPTS {
                let r = if radius.1 > radius.0 {
                    rng.random_range(radius.0..radius.1)
                } else {
                    radius.0
                };
                let limit = (half_extent - r).max(0.0);
                let x = rng.random_range(-limit..=limit);
                let z = rng.random_range(-limit..=limit);
                let candidate = Body::new(
                    BodyId::PHANTOM,
                    r * self.ctx.base_scale,
                    1.0,
                    Vec3::new(x, 0.0, z),
                    false,
                );

                let blocked = self
                    .entities
                    .iter()
                    .any(|e| e.body.distance_to(&candidate) < e.body.radius() + candidate.radius())
                    || self
                        .walls
                        .iter()
                        .any(|w| super::collision::wall_contact(&candidate, w).is_some());
                if blocked {
                    continue;
                }

                let mass = r * r;
                placed.push(self.spawn_prop(r, mass, candidate.position(), false));
                break;
            }
        }

        log::debug!("Scattered {} of {} props (seed {})", placed.len(), count, seed);
        placed
    }
}
