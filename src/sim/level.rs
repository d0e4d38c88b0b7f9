//! Level description: a versioned JSON document listing walls and body
//! placements, and the world it builds.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::body::BodyId;
use super::segment::LineSegment;
use super::world::World;
use crate::error::{Error, Result};
use crate::settings::Settings;

/// Current level format version
pub const LEVEL_FORMAT_VERSION: u32 = 1;

/// What a placement spawns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlacementKind {
    Prop,
    Vehicle,
    PathFollower {
        waypoints: Vec<Vec3>,
        #[serde(default)]
        looped: bool,
    },
}

/// One body in the level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub kind: PlacementKind,
    pub position: Vec3,
    #[serde(default)]
    pub heading: f32,
    pub radius: f32,
    pub mass: f32,
    #[serde(default)]
    pub is_static: bool,
    /// Predictive radius; 0 keeps the kind's default
    #[serde(default)]
    pub outer_radius: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDescription {
    pub version: u32,
    #[serde(default)]
    pub walls: Vec<LineSegment>,
    #[serde(default)]
    pub bodies: Vec<Placement>,
}

impl Default for LevelDescription {
    fn default() -> Self {
        Self {
            version: LEVEL_FORMAT_VERSION,
            walls: Vec::new(),
            bodies: Vec::new(),
        }
    }
}

impl LevelDescription {
    /// Parse and validate
    pub fn from_json(json: &str) -> Result<Self> {
        let level: LevelDescription = serde_json::from_str(json)?;
        level.validate()?;
        Ok(level)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let level = Self::from_json(&json)?;
        log::info!(
            "Loaded level from {} ({} walls, {} bodies)",
            path.as_ref().display(),
            level.walls.len(),
            level.bodies.len()
        );
        Ok(level)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.version != LEVEL_FORMAT_VERSION {
            return Err(Error::UnsupportedLevelVersion {
                found: self.version,
                expected: LEVEL_FORMAT_VERSION,
            });
        }

        for (i, wall) in self.walls.iter().enumerate() {
            if !(wall.radius >= 0.0) {
                return Err(Error::InvalidLevel(format!(
                    "wall {i} has radius {}",
                    wall.radius
                )));
            }
        }

        for (i, p) in self.bodies.iter().enumerate() {
            if !p.position.is_finite() {
                return Err(Error::InvalidLevel(format!("body {i} has a non-finite position")));
            }
            if !(p.radius > 0.0) {
                return Err(Error::InvalidLevel(format!("body {i} has radius {}", p.radius)));
            }
            if !(p.mass > 0.0) {
                return Err(Error::InvalidLevel(format!("body {i} has mass {}", p.mass)));
            }
            if p.outer_radius < 0.0 {
                return Err(Error::InvalidLevel(format!("body {i} has a negative outer radius")));
            }
            match &p.kind {
                PlacementKind::PathFollower { waypoints, .. } if waypoints.is_empty() => {
                    return Err(Error::InvalidLevel(format!("path follower {i} has no waypoints")));
                }
                PlacementKind::Vehicle | PlacementKind::PathFollower { .. } if p.is_static => {
                    return Err(Error::InvalidLevel(format!("driven body {i} cannot be static")));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

impl World {
    /// Build a world from a level. Bodies get ids in placement order.
    pub fn from_level(level: &LevelDescription, settings: Settings) -> Result<World> {
        level.validate()?;
        settings.validate()?;

        let mut world = World::new(settings);
        for wall in &level.walls {
            world.add_wall(wall.clone());
        }
        for p in &level.bodies {
            let id = world.spawn_placement(p);
            if p.outer_radius > 0.0 {
                if let Some(body) = world.body_mut(id) {
                    body.set_outer_radius(p.outer_radius);
                }
            }
        }

        log::info!(
            "Built world: {} walls, {} bodies",
            world.walls.len(),
            world.entities.len()
        );
        Ok(world)
    }

    fn spawn_placement(&mut self, p: &Placement) -> BodyId {
        match &p.kind {
            PlacementKind::Prop => {
                let id = self.spawn_prop(p.radius, p.mass, p.position, p.is_static);
                if let Some(body) = self.body_mut(id) {
                    body.set_heading(p.heading);
                }
                id
            }
            PlacementKind::Vehicle => self.spawn_vehicle(p.radius, p.mass, p.position, p.heading),
            PlacementKind::PathFollower { waypoints, looped } => self.spawn_path_follower(
                p.radius,
                p.mass,
                p.position,
                p.heading,
                waypoints.clone(),
                *looped,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVEL: &str = r#"{
        "version": 1,
        "walls": [
            { "start": [0.0, 0.0, 0.0], "end": [10.0, 0.0, 0.0], "radius": 0.5 }
        ],
        "bodies": [
            { "kind": { "type": "prop" }, "position": [2.0, 0.0, 2.0], "radius": 1.0, "mass": 1.0 },
            { "kind": { "type": "vehicle" }, "position": [5.0, 0.0, 5.0], "heading": 1.0,
              "radius": 1.0, "mass": 2.0 },
            { "kind": { "type": "path_follower", "waypoints": [[0.0, 0.0, 20.0]], "looped": true },
              "position": [8.0, 0.0, 5.0], "radius": 1.0, "mass": 2.0, "outer_radius": 4.0 }
        ]
    }"#;

    #[test]
    fn test_parse_and_build() {
        let level = LevelDescription::from_json(LEVEL).unwrap();
        assert_eq!(level.walls.len(), 1);
        assert_eq!(level.bodies.len(), 3);

        let world = World::from_level(&level, Settings::default()).unwrap();
        assert_eq!(world.walls.len(), 1);
        let ids: Vec<_> = world.entities.iter().map(|e| e.body.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        assert!(world.entities[0].motion.steering().is_none());
        let car = &world.entities[1];
        assert!(car.motion.steering().is_some());
        assert_eq!(car.body.heading(), 1.0);
        assert_eq!(world.entities[2].body.outer_radius(), 4.0);
    }

    #[test]
    fn test_wrong_version_rejected() {
        let json = LEVEL.replace("\"version\": 1", "\"version\": 7");
        let err = LevelDescription::from_json(&json).unwrap_err();
        assert!(err.is_version_mismatch());
        assert!(matches!(
            err,
            Error::UnsupportedLevelVersion {
                found: 7,
                expected: LEVEL_FORMAT_VERSION
            }
        ));
    }

    #[test]
    fn test_invalid_placements_rejected() {
        let mut level = LevelDescription::from_json(LEVEL).unwrap();
        level.bodies[0].radius = 0.0;
        assert!(matches!(level.validate(), Err(Error::InvalidLevel(_))));

        let mut level = LevelDescription::from_json(LEVEL).unwrap();
        level.bodies[1].is_static = true;
        assert!(matches!(level.validate(), Err(Error::InvalidLevel(_))));

        let mut level = LevelDescription::from_json(LEVEL).unwrap();
        level.bodies[2].kind = PlacementKind::PathFollower {
            waypoints: Vec::new(),
            looped: false,
        };
        assert!(World::from_level(&level, Settings::default()).is_err());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            LevelDescription::from_json("{ not json"),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn test_json_roundtrip() {
        let level = LevelDescription::from_json(LEVEL).unwrap();
        let json = level.to_json().unwrap();
        assert_eq!(LevelDescription::from_json(&json).unwrap(), level);
    }

    #[test]
    fn test_empty_level() {
        let world = World::from_level(&LevelDescription::default(), Settings::default()).unwrap();
        assert!(world.entities.is_empty());
    }
}
