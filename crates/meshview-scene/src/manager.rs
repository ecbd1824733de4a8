//! Scene asset ownership and deterministic teardown.
//!
//! The manager exclusively owns everything a load produced: the scene
//! graph root and the three dedup registries (meshes, materials,
//! textures). Disposal iterates the registries rather than re-walking the
//! graph, which keeps the release pass exactly-once no matter how many
//! graph edges point at a shared resource.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use meshview_model::{Material, MeshObject, MeshRecord, SceneNode, Texture};
use uuid::Uuid;

use crate::error::SceneError;
use crate::fetch::AssetFetcher;
use crate::loader::{self, ParsedScene};

/// Snapshot handed back from a successful load. Shares the registries
/// through `Arc`s; the scene-graph root itself stays with the manager.
pub struct LoadedScene {
    pub generation: Uuid,
    pub mesh_records: Vec<MeshRecord>,
    pub meshes: HashMap<String, Arc<MeshObject>>,
    pub materials: HashMap<String, Arc<Material>>,
    pub textures: HashMap<String, Arc<Texture>>,
}

pub struct SceneAssetManager<F: AssetFetcher> {
    fetcher: F,

    /// Regenerated on every clear/load; an in-flight load only installs
    /// its result while its token still matches.
    generation: Uuid,
    is_loading: bool,
    last_error: Option<String>,

    root: Option<SceneNode>,
    mesh_records: Vec<MeshRecord>,
    meshes: HashMap<String, Arc<MeshObject>>,
    materials: HashMap<String, Arc<Material>>,
    textures: HashMap<String, Arc<Texture>>,
}

impl<F: AssetFetcher> SceneAssetManager<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            generation: Uuid::new_v4(),
            is_loading: false,
            last_error: None,
            root: None,
            mesh_records: Vec::new(),
            meshes: HashMap::new(),
            materials: HashMap::new(),
            textures: HashMap::new(),
        }
    }

    /// Load the asset at `url`, replacing whatever scene is currently
    /// held. The previous scene is fully released before any network
    /// traffic starts. Not safe to overlap with itself on one instance.
    pub async fn load(
        &mut self,
        url: &str,
        mut on_progress: Option<&mut dyn FnMut(f32)>,
    ) -> Result<LoadedScene, SceneError> {
        self.is_loading = true;
        let result = self.load_inner(url, &mut on_progress).await;
        self.is_loading = false;
        self.last_error = result.as_ref().err().map(|err| err.to_string());
        result
    }

    async fn load_inner(
        &mut self,
        url: &str,
        on_progress: &mut Option<&mut dyn FnMut(f32)>,
    ) -> Result<LoadedScene, SceneError> {
        log::info!("Loading scene from {url}");
        self.clear();

        let generation = Uuid::new_v4();
        self.generation = generation;

        // Fail fast on a missing asset instead of surfacing a confusing
        // parse error further down.
        if !self.fetcher.exists(url).await {
            return Err(SceneError::NotFound(url.to_owned()));
        }

        let mut forward = |value: f32| {
            if let Some(callback) = on_progress.as_mut() {
                callback(value);
            }
        };
        let data = self.fetcher.fetch(url, &mut forward).await?;

        let parsed = loader::parse_scene(&data)?;

        if self.generation != generation {
            dispose_parsed(&parsed);
            return Err(SceneError::Superseded);
        }

        log::info!(
            "Scene loaded: {} mesh entries, {} materials, {} textures",
            parsed.meshes.len(),
            parsed.materials.len(),
            parsed.textures.len()
        );

        self.root = Some(parsed.root);
        self.mesh_records = parsed.mesh_records;
        self.meshes = parsed.meshes;
        self.materials = parsed.materials;
        self.textures = parsed.textures;

        Ok(LoadedScene {
            generation,
            mesh_records: self.mesh_records.clone(),
            meshes: self.meshes.clone(),
            materials: self.materials.clone(),
            textures: self.textures.clone(),
        })
    }

    /// Release every held resource exactly once and drop the scene graph.
    /// A no-op when nothing is loaded.
    pub fn clear(&mut self) {
        if self.root.is_none() && self.meshes.is_empty() {
            return;
        }

        self.generation = Uuid::new_v4();

        dispose_tables(&self.meshes, &self.materials, &self.textures);
        log::debug!(
            "Released {} materials and {} textures",
            self.materials.len(),
            self.textures.len()
        );

        self.meshes.clear();
        self.materials.clear();
        self.textures.clear();
        self.mesh_records.clear();
        self.root = None;
    }

    /// Same implementation as `clear`, called once at end-of-life.
    pub fn dispose(&mut self) {
        self.clear();
    }

    pub fn get_mesh(&self, name: &str) -> Option<Arc<MeshObject>> {
        self.meshes.get(name).cloned()
    }

    /// Silently tolerates unknown names; visibility maps may reference
    /// meshes from a previous or not-yet-loaded scene.
    pub fn set_visibility(&self, name: &str, visible: bool) {
        if let Some(mesh) = self.meshes.get(name) {
            mesh.set_visible(visible);
        }
    }

    pub fn apply_visibility(&self, visibility: &HashMap<String, bool>) {
        for (name, visible) in visibility {
            self.set_visibility(name, *visible);
        }
    }

    pub fn mesh_records(&self) -> &[MeshRecord] {
        &self.mesh_records
    }

    pub fn root(&self) -> Option<&SceneNode> {
        self.root.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

impl<F: AssetFetcher> Drop for SceneAssetManager<F> {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn dispose_tables(
    meshes: &HashMap<String, Arc<MeshObject>>,
    materials: &HashMap<String, Arc<Material>>,
    textures: &HashMap<String, Arc<Texture>>,
) {
    // A mesh sits in the table under up to two spellings; its geometry is
    // still released once.
    let mut seen_geometries = HashSet::new();
    for mesh in meshes.values() {
        if seen_geometries.insert(Arc::as_ptr(&mesh.geometry) as usize) {
            mesh.geometry.dispose();
        }
    }

    // Material and texture tables hold one entry per distinct instance.
    for material in materials.values() {
        material.dispose();
    }
    for texture in textures.values() {
        texture.dispose();
    }
}

fn dispose_parsed(parsed: &ParsedScene) {
    dispose_tables(&parsed.meshes, &parsed.materials, &parsed.textures);
}
