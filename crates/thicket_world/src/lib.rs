//! Recursive structure builder: plants, street layouts and UFO fleets built
//! from the `thicket_procgen` shapes.

pub mod layout;
pub mod placement;
pub mod plants;
pub mod streets;
pub mod ufo;

pub use layout::{PlacedBuilding, PlacedTile, StreetConfig, StreetGenerator, StreetLayout};
pub use placement::PlacementRegistry;
pub use plants::{BranchNode, BranchRole, GrowthStats, Plant, PlantConfig, PlantGenerator, PlantKind};
pub use streets::{canonical_arms, CarveRules, CellType, Connections, Direction, StreetGrid};
pub use ufo::{Ufo, UfoConfig, UfoGenerator, UfoVariant};
