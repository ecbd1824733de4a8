//! Generated glTF documents for tests: data-URI buffers, optional 1x1 PNG
//! textures, everything non-indexed triangle lists.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::json;

pub(crate) struct FixtureMesh {
    pub mesh_name: &'static str,
    pub node_name: &'static str,
    pub vertices: usize,
    pub textured: bool,
    pub translation: [f32; 3],
}

impl FixtureMesh {
    pub fn new(mesh_name: &'static str, node_name: &'static str, vertices: usize) -> Self {
        Self {
            mesh_name,
            node_name,
            vertices,
            textured: false,
            translation: [0.0, 0.0, 0.0],
        }
    }

    pub fn textured(mut self) -> Self {
        self.textured = true;
        self
    }

    pub fn at(mut self, translation: [f32; 3]) -> Self {
        self.translation = translation;
        self
    }
}

fn png_bytes() -> Vec<u8> {
    let mut png = Vec::new();
    image::RgbaImage::from_pixel(1, 1, image::Rgba([255, 0, 0, 255]))
        .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
        .unwrap();
    png
}

fn buffer_data_uri(bytes: &[u8]) -> String {
    format!(
        "data:application/octet-stream;base64,{}",
        STANDARD.encode(bytes)
    )
}

/// Build a glTF JSON document with one node per fixture mesh.
pub(crate) fn document(meshes: &[FixtureMesh]) -> Vec<u8> {
    let total_bytes: usize = meshes.iter().map(|m| m.vertices * 12).sum();

    let mut buffer_views = Vec::new();
    let mut accessors = Vec::new();
    let mut materials = Vec::new();
    let mut textures = Vec::new();
    let mut images = Vec::new();
    let mut gltf_meshes = Vec::new();
    let mut nodes = Vec::new();
    let mut image_blobs: Vec<Vec<u8>> = Vec::new();

    let mut byte_offset = 0usize;
    for (index, mesh) in meshes.iter().enumerate() {
        let byte_length = mesh.vertices * 12;
        buffer_views.push(json!({
            "buffer": 0,
            "byteOffset": byte_offset,
            "byteLength": byte_length,
        }));
        byte_offset += byte_length;

        accessors.push(json!({
            "bufferView": index,
            "componentType": 5126,
            "count": mesh.vertices,
            "type": "VEC3",
            "min": [0.0, 0.0, 0.0],
            "max": [0.0, 0.0, 0.0],
        }));

        let mut pbr = json!({
            "baseColorFactor": [1.0, 1.0, 1.0, 1.0],
            "metallicFactor": 0.0,
            "roughnessFactor": 0.5,
        });
        if mesh.textured {
            let texture_index = textures.len();
            textures.push(json!({ "source": images.len() }));
            // `import_slice` rejects image URIs (even data URIs), so images
            // go through buffer views appended after the position views.
            images.push(json!({
                "bufferView": meshes.len() + image_blobs.len(),
                "mimeType": "image/png",
            }));
            image_blobs.push(png_bytes());
            pbr["baseColorTexture"] = json!({ "index": texture_index });
        }
        materials.push(json!({
            "name": format!("{}Material", mesh.mesh_name),
            "pbrMetallicRoughness": pbr,
        }));

        gltf_meshes.push(json!({
            "name": mesh.mesh_name,
            "primitives": [{
                "attributes": { "POSITION": index },
                "material": index,
            }],
        }));

        nodes.push(json!({
            "name": mesh.node_name,
            "mesh": index,
            "translation": mesh.translation,
        }));
    }

    // Positions are all zeros; only the counts matter to the loader.
    let mut buffer_bytes = vec![0u8; total_bytes];
    for blob in &image_blobs {
        buffer_views.push(json!({
            "buffer": 0,
            "byteOffset": buffer_bytes.len(),
            "byteLength": blob.len(),
        }));
        buffer_bytes.extend_from_slice(blob);
    }

    let mut document = json!({
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": (0..meshes.len()).collect::<Vec<_>>() }],
        "nodes": nodes,
        "meshes": gltf_meshes,
        "materials": materials,
        "accessors": accessors,
        "bufferViews": buffer_views,
        "buffers": [{
            "byteLength": buffer_bytes.len(),
            "uri": buffer_data_uri(&buffer_bytes),
        }],
    });
    if !textures.is_empty() {
        document["textures"] = json!(textures);
        document["images"] = json!(images);
    }

    serde_json::to_vec(&document).unwrap()
}

/// One mesh whose base-color and metallic-roughness textures point at the
/// same underlying image.
pub(crate) fn document_with_shared_image(mesh_name: &str, node_name: &str) -> Vec<u8> {
    let vertices = 36usize;
    let byte_length = vertices * 12;

    let png = png_bytes();
    let mut buffer_bytes = vec![0u8; byte_length];
    buffer_bytes.extend_from_slice(&png);

    let document = json!({
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [{ "name": node_name, "mesh": 0 }],
        "meshes": [{
            "name": mesh_name,
            "primitives": [{
                "attributes": { "POSITION": 0 },
                "material": 0,
            }],
        }],
        "materials": [{
            "pbrMetallicRoughness": {
                "baseColorTexture": { "index": 0 },
                "metallicRoughnessTexture": { "index": 1 },
            },
        }],
        "textures": [{ "source": 0 }, { "source": 0 }],
        "images": [{ "bufferView": 1, "mimeType": "image/png" }],
        "accessors": [{
            "bufferView": 0,
            "componentType": 5126,
            "count": vertices,
            "type": "VEC3",
            "min": [0.0, 0.0, 0.0],
            "max": [0.0, 0.0, 0.0],
        }],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": byte_length },
            { "buffer": 0, "byteOffset": byte_length, "byteLength": png.len() },
        ],
        "buffers": [{
            "byteLength": buffer_bytes.len(),
            "uri": buffer_data_uri(&buffer_bytes),
        }],
    });

    serde_json::to_vec(&document).unwrap()
}
