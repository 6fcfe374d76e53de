//! Shared layer for the generators and the flock: seeded randomness,
//! vector helpers, the mesh type, transforms and the output sink.

pub mod error;
pub mod math;
pub mod mesh;
pub mod seed;
pub mod sink;
pub mod transform;

pub use error::ConfigError;
pub use mesh::{Bounds, Mesh, MeshVertex};
pub use seed::{GenRng, WorldSeed};
pub use sink::{MeshCollector, SceneNode, SceneSink};
pub use transform::Transform;
