use thiserror::Error;

/// Load failures surfaced to the caller. Exactly one of these is returned
/// per failed `load`; the manager never retains a partial scene afterwards.
#[derive(Debug, Error)]
pub enum SceneError {
    /// The existence probe failed before any resource was allocated.
    #[error("File not found: {0}")]
    NotFound(String),

    /// The asset download itself failed.
    #[error("Failed to download asset: {0}")]
    Fetch(String),

    /// The binary asset could not be parsed into a scene graph.
    #[error("Failed to load GLTF: {0}")]
    Parse(#[from] gltf::Error),

    /// The asset embeds an image in a pixel format the runtime types do
    /// not carry.
    #[error("Unsupported image format: {0}")]
    UnsupportedImage(String),

    /// A newer load or clear superseded this load before its result could
    /// be installed.
    #[error("Load superseded by a newer request")]
    Superseded,
}
