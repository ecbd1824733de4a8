//! Binary asset parsing and mesh index extraction.
//!
//! `parse_scene` turns raw glTF bytes into an owned scene graph plus the
//! three name-keyed registries the manager disposes from. Materials are
//! dedup'd by glTF material index and textures by glTF image index, so a
//! resource shared by several meshes or channel slots gets exactly one
//! registry entry.

use std::collections::HashMap;
use std::sync::Arc;

use glam::{Quat, Vec3, Vec4};
use image::DynamicImage;
use meshview_model::{
    Geometry, Material, MeshObject, MeshRecord, SceneNode, ShadingModel, Texture, TextureChannel,
    TextureCreateDesc, TextureFormat,
};

use crate::error::SceneError;

pub struct ParsedScene {
    pub root: SceneNode,
    pub mesh_records: Vec<MeshRecord>,
    pub meshes: HashMap<String, Arc<MeshObject>>,
    pub materials: HashMap<String, Arc<Material>>,
    pub textures: HashMap<String, Arc<Texture>>,
}

#[derive(Default)]
struct LoadContext {
    mesh_records: Vec<MeshRecord>,
    meshes: HashMap<String, Arc<MeshObject>>,
    materials: HashMap<String, Arc<Material>>,
    textures: HashMap<String, Arc<Texture>>,

    // Dedup caches: one material per glTF material index (None is the
    // glTF default material), one texture per glTF image index.
    material_cache: HashMap<Option<usize>, (String, Arc<Material>)>,
    texture_cache: HashMap<usize, Arc<Texture>>,
}

pub fn parse_scene(data: &[u8]) -> Result<ParsedScene, SceneError> {
    let (document, buffers, images) = gltf::import_slice(data)?;

    let mut ctx = LoadContext::default();
    let mut root = SceneNode::new("Scene", Vec3::ZERO, Quat::IDENTITY, Vec3::ONE);

    if let Some(scene) = document.default_scene() {
        for node in scene.nodes() {
            root.children.push(process_node(&node, &buffers, &images, &mut ctx)?);
        }
    }

    Ok(ParsedScene {
        root,
        mesh_records: ctx.mesh_records,
        meshes: ctx.meshes,
        materials: ctx.materials,
        textures: ctx.textures,
    })
}

fn process_node(
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    images: &[gltf::image::Data],
    ctx: &mut LoadContext,
) -> Result<SceneNode, SceneError> {
    let (translation, rotation, scale) = node.transform().decomposed();
    let translation = Vec3::from(translation);
    let rotation = Quat::from_xyzw(rotation[0], rotation[1], rotation[2], rotation[3]);
    let scale = Vec3::from(scale);

    let structural_name = node.name().unwrap_or("Unnamed");
    let mut scene_node = SceneNode::new(structural_name, translation, rotation, scale);

    if let Some(mesh) = node.mesh() {
        // Assets are inconsistent about which identifier callers will use,
        // so the mesh is registered under both its logical and structural
        // spelling.
        let logical_name = mesh.name().unwrap_or(structural_name).to_owned();

        let mesh_object = process_mesh(
            &mesh,
            &logical_name,
            translation,
            rotation,
            scale,
            buffers,
            images,
            ctx,
        )?;

        register_mesh(ctx, &logical_name, mesh_object.clone());
        if structural_name != logical_name {
            register_mesh(ctx, structural_name, mesh_object.clone());
        }

        scene_node.mesh = Some(mesh_object);
    }

    for child in node.children() {
        scene_node
            .children
            .push(process_node(&child, buffers, images, ctx)?);
    }

    Ok(scene_node)
}

fn register_mesh(ctx: &mut LoadContext, name: &str, mesh: Arc<MeshObject>) {
    if let Some(existing) = ctx.meshes.get(name) {
        if !Arc::ptr_eq(existing, &mesh) {
            // Intended resolution of this collision is unspecified; flag
            // it rather than resolving it silently.
            log::warn!("Mesh name collision: \"{name}\" already registered to a different mesh, overwriting");
        }
    }
    ctx.meshes.insert(name.to_owned(), mesh);
}

#[allow(clippy::too_many_arguments)]
fn process_mesh(
    mesh: &gltf::Mesh,
    name: &str,
    translation: Vec3,
    rotation: Quat,
    scale: Vec3,
    buffers: &[gltf::buffer::Data],
    images: &[gltf::image::Data],
    ctx: &mut LoadContext,
) -> Result<Arc<MeshObject>, SceneError> {
    let mut positions: Vec<f32> = Vec::new();
    let mut materials = Vec::new();
    let mut first_material_name = String::new();

    let primitive_count = mesh.primitives().count();
    for (index, primitive) in mesh.primitives().enumerate() {
        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
        if let Some(iter) = reader.read_positions() {
            for position in iter {
                positions.extend_from_slice(&position);
            }
        }

        let derived_name = if primitive_count > 1 {
            format!("{name}_material_{index}")
        } else {
            format!("{name}_material")
        };
        let (registered_name, material) =
            resolve_material(&primitive.material(), derived_name, images, ctx)?;
        if index == 0 {
            first_material_name = registered_name;
        }
        materials.push(material);
    }

    let geometry = Arc::new(Geometry::new(positions));
    let vertex_count = geometry.vertex_count();
    // Approximation for non-indexed triangle lists.
    let triangle_count = vertex_count / 3;

    let mesh_object = Arc::new(MeshObject::new(
        name,
        translation,
        rotation,
        scale,
        geometry,
        materials,
    ));
    mesh_object.set_cast_shadow(true);
    mesh_object.set_receive_shadow(true);

    ctx.mesh_records.push(MeshRecord {
        name: name.to_owned(),
        material_name: first_material_name,
        translation,
        rotation,
        scale,
        vertex_count,
        triangle_count,
    });

    Ok(mesh_object)
}

fn resolve_material(
    material: &gltf::Material,
    derived_name: String,
    images: &[gltf::image::Data],
    ctx: &mut LoadContext,
) -> Result<(String, Arc<Material>), SceneError> {
    let key = material.index();
    if let Some((registered_name, cached)) = ctx.material_cache.get(&key) {
        return Ok((registered_name.clone(), cached.clone()));
    }

    let converted = Arc::new(convert_material(material, &derived_name, images, ctx)?);
    ctx.materials.insert(derived_name.clone(), converted.clone());
    ctx.material_cache
        .insert(key, (derived_name.clone(), converted.clone()));
    Ok((derived_name, converted))
}

fn convert_material(
    material: &gltf::Material,
    registered_name: &str,
    images: &[gltf::image::Data],
    ctx: &mut LoadContext,
) -> Result<Material, SceneError> {
    let shading = if material.unlit() {
        ShadingModel::Basic
    } else {
        ShadingModel::Standard
    };
    let mut converted = Material::new(shading);

    let pbr = material.pbr_metallic_roughness();
    converted.base_color = Vec4::from(pbr.base_color_factor());
    converted.metallic = pbr.metallic_factor();
    converted.roughness = pbr.roughness_factor();
    converted.emissive = Vec3::from(material.emissive_factor());

    if let Some(info) = pbr.base_color_texture() {
        let texture = resolve_texture(
            &info.texture(),
            registered_name,
            TextureChannel::Color,
            images,
            ctx,
        )?;
        converted.set_texture(TextureChannel::Color, texture);
    }

    if let Some(normal) = material.normal_texture() {
        let texture = resolve_texture(
            &normal.texture(),
            registered_name,
            TextureChannel::Normal,
            images,
            ctx,
        )?;
        converted.set_texture(TextureChannel::Normal, texture);
    }

    if let Some(info) = pbr.metallic_roughness_texture() {
        // glTF packs roughness and metalness in one image; the same
        // texture instance feeds both channel slots.
        let texture = resolve_texture(
            &info.texture(),
            registered_name,
            TextureChannel::Roughness,
            images,
            ctx,
        )?;
        converted.set_texture(TextureChannel::Roughness, texture.clone());
        converted.set_texture(TextureChannel::Metalness, texture);
    }

    if let Some(occlusion) = material.occlusion_texture() {
        let texture = resolve_texture(
            &occlusion.texture(),
            registered_name,
            TextureChannel::AmbientOcclusion,
            images,
            ctx,
        )?;
        converted.set_texture(TextureChannel::AmbientOcclusion, texture);
    }

    if let Some(info) = material.emissive_texture() {
        let texture = resolve_texture(
            &info.texture(),
            registered_name,
            TextureChannel::Emissive,
            images,
            ctx,
        )?;
        converted.set_texture(TextureChannel::Emissive, texture);
    }

    Ok(converted)
}

fn resolve_texture(
    texture: &gltf::Texture,
    material_name: &str,
    channel: TextureChannel,
    images: &[gltf::image::Data],
    ctx: &mut LoadContext,
) -> Result<Arc<Texture>, SceneError> {
    let image_idx = texture.source().index();
    if let Some(cached) = ctx.texture_cache.get(&image_idx) {
        return Ok(cached.clone());
    }

    let table_key = format!("{material_name}_{}", channel.suffix());
    let created = Arc::new(create_texture(
        &images[image_idx],
        texture.name().unwrap_or(&table_key),
    )?);
    ctx.textures.insert(table_key, created.clone());
    ctx.texture_cache.insert(image_idx, created.clone());
    Ok(created)
}

fn create_texture(data: &gltf::image::Data, name: &str) -> Result<Texture, SceneError> {
    use gltf::image::Format;

    let desc = match data.format {
        Format::R8G8B8 => {
            let image = image::RgbImage::from_raw(data.width, data.height, data.pixels.clone())
                .ok_or_else(|| SceneError::UnsupportedImage("truncated RGB image".to_owned()))?;
            let image = DynamicImage::ImageRgb8(image).to_rgba8();

            TextureCreateDesc {
                name: Some(name.to_owned()),
                width: data.width,
                height: data.height,
                format: TextureFormat::Rgba8Unorm,
                data: image.into_raw().into_boxed_slice(),
            }
        }
        Format::R8G8B8A8 => TextureCreateDesc {
            name: Some(name.to_owned()),
            width: data.width,
            height: data.height,
            format: TextureFormat::Rgba8Unorm,
            data: data.pixels.clone().into_boxed_slice(),
        },
        Format::R8G8 => TextureCreateDesc {
            name: Some(name.to_owned()),
            width: data.width,
            height: data.height,
            format: TextureFormat::Rg8Unorm,
            data: data.pixels.clone().into_boxed_slice(),
        },
        Format::R8 => TextureCreateDesc {
            name: Some(name.to_owned()),
            width: data.width,
            height: data.height,
            format: TextureFormat::R8Unorm,
            data: data.pixels.clone().into_boxed_slice(),
        },
        other => return Err(SceneError::UnsupportedImage(format!("{other:?}"))),
    };

    Ok(Texture::new(desc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn garbage_bytes_fail_to_parse() {
        assert!(matches!(
            parse_scene(b"definitely not a gltf asset"),
            Err(SceneError::Parse(_))
        ));
    }

    #[test]
    fn meshes_register_under_logical_and_structural_names() {
        let data = fixtures::document(&[fixtures::FixtureMesh::new("Cube", "CubeNode", 36)]);
        let parsed = parse_scene(&data).unwrap();

        let logical = parsed.meshes.get("Cube").unwrap();
        let structural = parsed.meshes.get("CubeNode").unwrap();
        assert!(Arc::ptr_eq(logical, structural));
        assert_eq!(parsed.mesh_records.len(), 1);
    }

    #[test]
    fn every_mesh_casts_and_receives_shadows() {
        let data = fixtures::document(&[
            fixtures::FixtureMesh::new("Cube", "CubeNode", 36),
            fixtures::FixtureMesh::new("Sphere", "SphereNode", 96),
        ]);
        let parsed = parse_scene(&data).unwrap();

        for mesh in parsed.meshes.values() {
            assert!(mesh.cast_shadow());
            assert!(mesh.receive_shadow());
            assert!(mesh.visible());
        }
    }

    #[test]
    fn triangle_count_is_a_third_of_the_vertex_count() {
        let data = fixtures::document(&[fixtures::FixtureMesh::new("Cube", "CubeNode", 300)]);
        let parsed = parse_scene(&data).unwrap();

        let record = &parsed.mesh_records[0];
        assert_eq!(record.vertex_count, 300);
        assert_eq!(record.triangle_count, 100);
    }

    #[test]
    fn materials_key_off_the_mesh_name() {
        let data = fixtures::document(&[fixtures::FixtureMesh::new("Cube", "CubeNode", 36)]);
        let parsed = parse_scene(&data).unwrap();

        assert!(parsed.materials.contains_key("Cube_material"));
        assert_eq!(parsed.mesh_records[0].material_name, "Cube_material");
    }

    #[test]
    fn textured_material_registers_its_texture_once() {
        let data =
            fixtures::document(&[fixtures::FixtureMesh::new("Cube", "CubeNode", 36).textured()]);
        let parsed = parse_scene(&data).unwrap();

        assert_eq!(parsed.textures.len(), 1);
        assert!(parsed.textures.contains_key("Cube_material_map"));

        let material = parsed.materials.get("Cube_material").unwrap();
        let texture = material.texture(TextureChannel::Color).unwrap();
        assert_eq!(texture.width(), 1);
        assert_eq!(texture.height(), 1);
        assert_eq!(texture.format(), TextureFormat::Rgba8Unorm);
        assert_eq!(texture.stride(), 4);
    }

    #[test]
    fn image_shared_across_channels_is_a_single_table_entry() {
        // base color and metallic-roughness point at the same image.
        let data = fixtures::document_with_shared_image("Cube", "CubeNode");
        let parsed = parse_scene(&data).unwrap();

        assert_eq!(parsed.textures.len(), 1);
        let material = parsed.materials.get("Cube_material").unwrap();
        let color = material.texture(TextureChannel::Color).unwrap();
        let roughness = material.texture(TextureChannel::Roughness).unwrap();
        let metalness = material.texture(TextureChannel::Metalness).unwrap();
        assert!(Arc::ptr_eq(color, roughness));
        assert!(Arc::ptr_eq(color, metalness));
    }

    #[test]
    fn node_transform_lands_in_the_record() {
        let data = fixtures::document(&[
            fixtures::FixtureMesh::new("Cube", "CubeNode", 36).at([1.0, 2.0, 3.0])
        ]);
        let parsed = parse_scene(&data).unwrap();

        assert_eq!(parsed.mesh_records[0].translation, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(parsed.mesh_records[0].scale, Vec3::ONE);
    }
}
