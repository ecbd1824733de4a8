use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use glam::{Vec3, Vec4};

use crate::texture::Texture;

/// Shading models map to different subsets of texture channels. New kinds
/// are added by extending the channel table, not by branching on material
/// identity elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadingModel {
    Standard,
    Basic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureChannel {
    Color,
    Normal,
    Roughness,
    Metalness,
    AmbientOcclusion,
    Emissive,
}

pub const TEXTURE_CHANNEL_COUNT: usize = 6;

const STANDARD_CHANNELS: [TextureChannel; TEXTURE_CHANNEL_COUNT] = [
    TextureChannel::Color,
    TextureChannel::Normal,
    TextureChannel::Roughness,
    TextureChannel::Metalness,
    TextureChannel::AmbientOcclusion,
    TextureChannel::Emissive,
];

const BASIC_CHANNELS: [TextureChannel; 1] = [TextureChannel::Color];

impl TextureChannel {
    fn slot(&self) -> usize {
        match self {
            Self::Color => 0,
            Self::Normal => 1,
            Self::Roughness => 2,
            Self::Metalness => 3,
            Self::AmbientOcclusion => 4,
            Self::Emissive => 5,
        }
    }

    /// Suffix used when deriving registry keys for a channel's texture.
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Color => "map",
            Self::Normal => "normal_map",
            Self::Roughness => "roughness_map",
            Self::Metalness => "metalness_map",
            Self::AmbientOcclusion => "ao_map",
            Self::Emissive => "emissive_map",
        }
    }
}

pub struct Material {
    pub shading: ShadingModel,

    pub base_color: Vec4,
    pub metallic: f32,
    pub roughness: f32,
    pub emissive: Vec3,

    textures: [Option<Arc<Texture>>; TEXTURE_CHANNEL_COUNT],
    disposed: AtomicBool,
}

impl Material {
    pub fn new(shading: ShadingModel) -> Self {
        Self {
            shading,
            base_color: Vec4::ONE,
            metallic: 0.0,
            roughness: 0.5,
            emissive: Vec3::ZERO,
            textures: Default::default(),
            disposed: AtomicBool::new(false),
        }
    }

    /// The texture channels this material's shading model exposes.
    pub fn channels(&self) -> &'static [TextureChannel] {
        match self.shading {
            ShadingModel::Standard => &STANDARD_CHANNELS,
            ShadingModel::Basic => &BASIC_CHANNELS,
        }
    }

    pub fn supports(&self, channel: TextureChannel) -> bool {
        self.channels().contains(&channel)
    }

    pub fn set_texture(&mut self, channel: TextureChannel, texture: Arc<Texture>) {
        if !self.supports(channel) {
            log::debug!(
                "Ignoring texture for unsupported channel {:?} on {:?} material",
                channel,
                self.shading
            );
            return;
        }
        self.textures[channel.slot()] = Some(texture);
    }

    pub fn texture(&self, channel: TextureChannel) -> Option<&Arc<Texture>> {
        if !self.supports(channel) {
            return None;
        }
        self.textures[channel.slot()].as_ref()
    }

    /// Mark the material's engine-side program released. Channel textures
    /// are tracked and disposed separately by their own registry.
    pub fn dispose(&self) -> bool {
        !self.disposed.swap(true, Ordering::AcqRel)
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }
}
