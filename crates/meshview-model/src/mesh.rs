use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use glam::{Quat, Vec3};
use parking_lot::Mutex;

use crate::material::Material;

/// Vertex buffer destined for the external engine. Same exactly-once
/// release contract as `Texture`.
pub struct Geometry {
    vertex_count: usize,
    positions: Mutex<Option<Box<[f32]>>>,
    disposed: AtomicBool,
}

impl Geometry {
    pub fn new(positions: Vec<f32>) -> Self {
        let vertex_count = positions.len() / 3;
        Self {
            vertex_count,
            positions: Mutex::new(Some(positions.into_boxed_slice())),
            disposed: AtomicBool::new(false),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn dispose(&self) -> bool {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.positions.lock().take();
        true
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }
}

/// A renderable mesh instance. Visibility and shadow flags are atomic so
/// they can be flipped through a shared handle while the scene is held
/// elsewhere.
pub struct MeshObject {
    pub name: String,

    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,

    pub geometry: Arc<Geometry>,
    pub materials: Vec<Arc<Material>>,

    visible: AtomicBool,
    cast_shadow: AtomicBool,
    receive_shadow: AtomicBool,
}

impl MeshObject {
    pub fn new(
        name: &str,
        translation: Vec3,
        rotation: Quat,
        scale: Vec3,
        geometry: Arc<Geometry>,
        materials: Vec<Arc<Material>>,
    ) -> Self {
        Self {
            name: name.to_owned(),
            translation,
            rotation,
            scale,
            geometry,
            materials,
            visible: AtomicBool::new(true),
            cast_shadow: AtomicBool::new(false),
            receive_shadow: AtomicBool::new(false),
        }
    }

    pub fn visible(&self) -> bool {
        self.visible.load(Ordering::Acquire)
    }

    pub fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::Release);
    }

    pub fn cast_shadow(&self) -> bool {
        self.cast_shadow.load(Ordering::Acquire)
    }

    pub fn set_cast_shadow(&self, cast: bool) {
        self.cast_shadow.store(cast, Ordering::Release);
    }

    pub fn receive_shadow(&self) -> bool {
        self.receive_shadow.load(Ordering::Acquire)
    }

    pub fn set_receive_shadow(&self, receive: bool) {
        self.receive_shadow.store(receive, Ordering::Release);
    }
}
