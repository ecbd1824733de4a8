pub mod error;
pub mod fetch;
pub mod loader;
pub mod manager;

pub use error::SceneError;
pub use fetch::{AssetFetcher, HttpFetcher};
pub use manager::{LoadedScene, SceneAssetManager};

#[cfg(test)]
pub(crate) mod fixtures;
