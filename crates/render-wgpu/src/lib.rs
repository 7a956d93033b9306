//! wgpu render backend for the shooting-range demos.
//!
//! Draws the arena as instanced, textured spheres seen through a fly camera,
//! and the triangle scene through an orbiting camera. Meshes and textures
//! are generated procedurally.
//!
//! # Invariants
//! - Renderers never mutate arena state.
//! - Camera motion is NOT part of the deterministic kernel.
//! - Kernel tick is separate from render frame rate.

mod camera;
mod gpu;
mod mesh;
mod shaders;
mod texture;
mod triangles;

pub use camera::{FlyCamera, OrbitAxis, OrbitCamera};
pub use gpu::ArenaRenderer;
pub use mesh::{MeshError, TRIANGLE_PAIR, Vertex, uv_sphere};
pub use texture::skin_pixels;
pub use triangles::TriangleRenderer;
