pub mod branch;
pub mod building;
pub mod primitives;
pub mod revolution;
pub mod texture;
pub mod tiles;

pub use branch::*;
pub use building::*;
pub use primitives::{annulus, bark_trunk, cone, cylinder, frustum, hemisphere, icosphere, quad};
pub use revolution::*;
pub use texture::*;
pub use tiles::{ground, TileDims, TileKind, TileSet};
