//! Sub-stepped simulation step
//!
//! A frame is cut into `sub_updates` equal slices. Each slice runs up to
//! `max_simulation_steps` refinement passes: integrate whatever time bodies
//! have left, detect and push apart overlaps, then exchange momentum for the
//! pairs found. Pile-ups that need more passes than the cap simply carry
//! their residual overlap into the next slice.

use std::collections::HashSet;

use super::body::BodyId;
use super::collision::{Overlap, clears_walls, overlaps, wall_contact};
use super::phantom::{PhantomArena, PhantomHandle};
use super::resolve::{collision_response, push_out_of_wall, separate, wall_response};
use super::segment::LineSegment;
use super::terrain::{HeightOracle, follow_terrain};
use super::world::{Entity, SimEvent, World};
use crate::consts::MAX_PENDING_EVENTS;
use crate::planar;
use crate::settings::Settings;

/// Pairs found during one refinement pass
#[derive(Debug, Default)]
struct PassQueues {
    /// Entity index pairs that overlapped (already pushed apart)
    colliding: Vec<(usize, usize)>,
    /// (entity, other) where other is inside entity's outer radius
    future: Vec<(usize, usize)>,
    /// (entity, wall index, phantom standing in for the wall)
    walls: Vec<(usize, usize, PhantomHandle)>,
}

impl PassQueues {
    fn clear(&mut self) {
        self.colliding.clear();
        self.future.clear();
        self.walls.clear();
    }
}

/// Event recording for one step.
///
/// Wall and future-collision events are kept once per pair per step, however
/// many passes saw them. Nothing is recorded past [`MAX_PENDING_EVENTS`]
/// undrained events.
struct EventSink<'a> {
    events: &'a mut Vec<SimEvent>,
    walls: HashSet<(BodyId, usize)>,
    future: HashSet<(BodyId, BodyId)>,
    dropped: usize,
}

impl<'a> EventSink<'a> {
    fn new(events: &'a mut Vec<SimEvent>) -> Self {
        Self {
            events,
            walls: HashSet::new(),
            future: HashSet::new(),
            dropped: 0,
        }
    }

    fn push(&mut self, event: SimEvent) {
        let fresh = match event {
            SimEvent::BodyCollision { .. } => true,
            SimEvent::WallCollision { body, wall } => self.walls.insert((body, wall)),
            SimEvent::FutureCollision { body, other } => self.future.insert((body, other)),
        };
        if !fresh {
            return;
        }
        if self.events.len() >= MAX_PENDING_EVENTS {
            self.dropped += 1;
            return;
        }
        self.events.push(event);
    }
}

/// Mutable access to two distinct elements
fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    debug_assert_ne!(i, j);
    if i < j {
        let (lo, hi) = items.split_at_mut(j);
        (&mut lo[i], &mut hi[0])
    } else {
        let (lo, hi) = items.split_at_mut(i);
        (&mut hi[0], &mut lo[j])
    }
}

/// Advance the world by one rendered frame
pub fn step(world: &mut World, terrain: &dyn HeightOracle, frame_time: f32) {
    world.frame += 1;
    let frame = world.frame;
    if frame_time <= 0.0 || world.entities.is_empty() {
        return;
    }

    let World {
        ctx,
        settings,
        entities,
        walls,
        events,
        phantoms,
        ..
    } = world;

    let sub_updates = settings.sub_updates.max(1);
    let passes = settings.max_simulation_steps.max(1);
    let sub_time = frame_time / sub_updates as f32;
    let mut queues = PassQueues::default();
    let mut sink = EventSink::new(events);

    for _ in 0..sub_updates {
        for e in entities.iter_mut().filter(|e| !e.body.is_disabled()) {
            e.body.begin_sub_update(sub_time);
        }

        let mut unsettled = 0;
        for _ in 0..passes {
            integrate_pass(entities, terrain, ctx.height_scale, settings);
            detect_pass(entities, walls, phantoms, &mut queues, settings);
            unsettled = queues.colliding.len();
            resolve_pass(entities, phantoms, &queues, &mut sink, settings, sub_time);

            queues.clear();
            phantoms.clear();
        }

        if unsettled > 0 {
            log::debug!(
                "frame {}: {} body pairs still overlapping after {} passes",
                frame,
                unsettled,
                passes
            );
        }
    }

    if sink.dropped > 0 {
        log::warn!(
            "frame {}: event queue full ({} pending), dropped {} events",
            frame,
            MAX_PENDING_EVENTS,
            sink.dropped
        );
    }

    debug_assert!(world.phantoms.is_empty());
}

/// Move every body that still has time left in this slice
fn integrate_pass(
    entities: &mut [Entity],
    terrain: &dyn HeightOracle,
    height_scale: f32,
    settings: &Settings,
) {
    for e in entities.iter_mut() {
        if e.body.is_disabled() || e.body.remaining_time <= 0.0 {
            continue;
        }
        let dt = e.body.remaining_time;
        e.body.step_origin = e.body.position;
        e.motion.model_mut().integrate(&mut e.body, e.input, dt, settings);
        e.body.mark_integrated();
        follow_terrain(&mut e.body, terrain, height_scale, settings, dt);
    }
}

/// Find contacts, push shapes apart and queue the pairs for momentum exchange
fn detect_pass(
    entities: &mut [Entity],
    walls: &[LineSegment],
    phantoms: &mut PhantomArena,
    queues: &mut PassQueues,
    settings: &Settings,
) {
    for i in 0..entities.len() {
        if entities[i].body.is_disabled() {
            continue;
        }
        // Static bodies only ever collide as the partner of a dynamic one
        if entities[i].body.is_static() {
            entities[i].body.commit_simulation();
            continue;
        }

        if !clears_walls(&entities[i].body, settings.wall_fly_height) {
            let body = &mut entities[i].body;
            for (w, wall) in walls.iter().enumerate() {
                let Some(contact) = wall_contact(body, wall) else {
                    continue;
                };
                push_out_of_wall(body, wall, &contact);
                let phantom = body
                    .make_collision_ball(wall.radius, contact.point)
                    .with_mass_multiplier(settings.wall_mass_multiplier);
                queues.walls.push((i, w, phantoms.spawn(phantom)));
            }
        }

        for j in 0..entities.len() {
            if i == j || entities[j].body.is_disabled() {
                continue;
            }
            match overlaps(&entities[i].body, &entities[j].body) {
                Overlap::Overlaps => {
                    let (a, b) = pair_mut(entities, i, j);
                    separate(&mut a.body, &mut b.body);
                    if !queues.colliding.contains(&(j, i)) && !queues.colliding.contains(&(i, j)) {
                        queues.colliding.push((i, j));
                    }
                }
                Overlap::OverlapsOuter => queues.future.push((i, j)),
                Overlap::None => {}
            }
        }

        entities[i].body.commit_simulation();
    }
}

/// Exchange momentum for queued contacts and deliver the hooks
fn resolve_pass(
    entities: &mut [Entity],
    phantoms: &PhantomArena,
    queues: &PassQueues,
    events: &mut EventSink<'_>,
    settings: &Settings,
    sub_time: f32,
) {
    let efficiency = settings.collision_efficiency;

    for &(i, j) in &queues.colliding {
        let (a, b) = pair_mut(entities, i, j);
        let Some((va, vb)) = collision_response(&a.body, &b.body, efficiency) else {
            continue;
        };
        let impact_speed = planar(a.body.velocity - b.body.velocity).length();
        a.motion
            .model_mut()
            .on_collision(&mut a.body, va, sub_time, settings);
        b.motion
            .model_mut()
            .on_collision(&mut b.body, vb, sub_time, settings);
        events.push(SimEvent::BodyCollision {
            a: a.body.id,
            b: b.body.id,
            impact_speed,
        });
    }

    for &(i, w, handle) in &queues.walls {
        let Some(phantom) = phantoms.get(handle) else {
            continue;
        };
        let e = &mut entities[i];
        let Some(velocity) = wall_response(&e.body, phantom, efficiency) else {
            continue;
        };
        e.motion
            .model_mut()
            .on_collision(&mut e.body, velocity, sub_time, settings);
        events.push(SimEvent::WallCollision {
            body: e.body.id,
            wall: w,
        });
    }

    for &(i, j) in &queues.future {
        let other_id = entities[j].body.id;
        let other_pos = entities[j].body.position;
        let e = &mut entities[i];
        e.motion
            .model_mut()
            .on_future_collision(&e.body, other_pos, settings);
        events.push(SimEvent::FutureCollision {
            body: e.body.id,
            other: other_id,
        });
    }
}
