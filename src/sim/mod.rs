//! Ball physics and collision sub-stepping
//!
//! Everything here is deterministic for identical inputs:
//! - Entities are visited in body id order
//! - Time only advances through [`step`] with the frame time given
//! - Randomness only comes from seeded RNGs
//! - No rendering or platform dependencies

pub mod body;
pub mod collision;
pub mod level;
pub mod motion;
pub mod phantom;
pub mod resolve;
pub mod segment;
pub mod steering;
pub mod step;
pub mod terrain;
pub mod world;

pub use body::{Body, BodyId, SimContext};
pub use collision::{Overlap, WallContact, clears_walls, overlaps, wall_contact};
pub use level::{LEVEL_FORMAT_VERSION, LevelDescription, Placement, PlacementKind};
pub use motion::{Motion, MotionModel, PathFollower, Passive};
pub use phantom::{PhantomArena, PhantomHandle};
pub use resolve::{collision_response, kinetic_energy, push_out_of_wall, separate, wall_response};
pub use segment::LineSegment;
pub use steering::{SteerInput, SteeringState};
pub use step::step;
pub use terrain::{FlatGround, HeightGrid, HeightOracle, follow_terrain};
pub use world::{Entity, SimEvent, World};
