use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFormat {
    Rgba8Unorm,
    Rg8Unorm,
    R8Unorm,
}

impl TextureFormat {
    pub fn num_channels(&self) -> usize {
        match self {
            Self::Rgba8Unorm => 4,
            Self::Rg8Unorm => 2,
            Self::R8Unorm => 1,
        }
    }
}

pub struct TextureCreateDesc {
    pub name: Option<String>,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub data: Box<[u8]>,
}

/// Pixel data destined for the external engine. Disposal releases the
/// allocation exactly once; the texture object itself may stay referenced
/// from several material channel slots afterwards.
#[derive(Debug)]
pub struct Texture {
    name: Option<String>,
    width: u32,
    height: u32,
    format: TextureFormat,
    data: Mutex<Option<Box<[u8]>>>,
    disposed: AtomicBool,
}

impl Texture {
    pub fn new(create_desc: TextureCreateDesc) -> Self {
        Self {
            name: create_desc.name,
            width: create_desc.width,
            height: create_desc.height,
            format: create_desc.format,
            data: Mutex::new(Some(create_desc.data)),
            disposed: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> TextureFormat {
        self.format
    }

    pub fn stride(&self) -> usize {
        self.format.num_channels()
    }

    /// Release the pixel allocation. Returns true only for the call that
    /// actually released it.
    pub fn dispose(&self) -> bool {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.data.lock().take();
        true
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_texture() -> Texture {
        Texture::new(TextureCreateDesc {
            name: Some("Color".to_owned()),
            width: 2,
            height: 2,
            format: TextureFormat::Rgba8Unorm,
            data: vec![0u8; 16].into_boxed_slice(),
        })
    }

    #[test]
    fn dispose_releases_exactly_once() {
        let texture = test_texture();
        assert!(!texture.is_disposed());

        assert!(texture.dispose());
        assert!(texture.is_disposed());

        // Second call must not report a release.
        assert!(!texture.dispose());
        assert!(texture.is_disposed());
    }

    #[test]
    fn format_strides() {
        assert_eq!(TextureFormat::Rgba8Unorm.num_channels(), 4);
        assert_eq!(TextureFormat::Rg8Unorm.num_channels(), 2);
        assert_eq!(TextureFormat::R8Unorm.num_channels(), 1);
    }
}
