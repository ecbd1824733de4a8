use std::sync::Arc;

use glam::{Quat, Vec3};

pub mod material;
pub mod mesh;
pub mod texture;

pub use material::{Material, ShadingModel, TextureChannel};
pub use mesh::{Geometry, MeshObject};
pub use texture::{Texture, TextureCreateDesc, TextureFormat};

/// One node of a loaded scene graph. The root node is exclusively owned by
/// whoever loaded the scene until teardown.
pub struct SceneNode {
    pub name: String,

    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,

    pub mesh: Option<Arc<MeshObject>>,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(name: &str, translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            name: name.to_owned(),
            translation,
            rotation,
            scale,
            mesh: None,
            children: Vec::new(),
        }
    }
}

/// Immutable snapshot of a mesh's identity and metrics taken at load time.
/// Superseded wholesale on the next load, never mutated in place.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshRecord {
    pub name: String,
    pub material_name: String,

    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,

    pub vertex_count: usize,
    /// Approximated as `vertex_count / 3`, valid for non-indexed
    /// triangle-list geometry without vertex sharing.
    pub triangle_count: usize,
}
