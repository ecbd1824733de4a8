//! Scene configuration document.
//!
//! An external JSON file may override any subset of the built-in scene
//! defaults. The file is parsed into an all-optional partial document and
//! merged field by field; an absent or unreadable file yields the full
//! defaults with a warning, never an error.

use std::path::Path;

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    pub background: String,
    pub camera: CameraConfig,
    pub controls: ControlsConfig,
    pub lights: LightsConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CameraConfig {
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControlsConfig {
    pub enable_damping: bool,
    pub damping_factor: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AmbientLightConfig {
    pub color: String,
    pub intensity: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalLightConfig {
    pub color: String,
    pub intensity: f32,
    pub position: [f32; 3],
}

#[derive(Debug, Clone, PartialEq)]
pub struct LightsConfig {
    pub ambient: AmbientLightConfig,
    pub directional: Vec<DirectionalLightConfig>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            background: "#1a1a2e".to_owned(),
            camera: CameraConfig {
                fov: 50.0,
                near: 0.1,
                far: 2000.0,
                position: [5.0, 5.0, 5.0],
            },
            controls: ControlsConfig {
                enable_damping: true,
                damping_factor: 0.05,
            },
            lights: LightsConfig {
                ambient: AmbientLightConfig {
                    color: "#ffffff".to_owned(),
                    intensity: 0.5,
                },
                directional: vec![DirectionalLightConfig {
                    color: "#ffffff".to_owned(),
                    intensity: 1.0,
                    position: [10.0, 10.0, 5.0],
                }],
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialSceneConfig {
    pub background: Option<String>,
    pub camera: Option<PartialCameraConfig>,
    pub controls: Option<PartialControlsConfig>,
    pub lights: Option<PartialLightsConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialCameraConfig {
    pub fov: Option<f32>,
    pub near: Option<f32>,
    pub far: Option<f32>,
    pub position: Option<[f32; 3]>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialControlsConfig {
    pub enable_damping: Option<bool>,
    pub damping_factor: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialAmbientLightConfig {
    pub color: Option<String>,
    pub intensity: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialDirectionalLightConfig {
    pub color: Option<String>,
    pub intensity: Option<f32>,
    pub position: Option<[f32; 3]>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialLightsConfig {
    pub ambient: Option<PartialAmbientLightConfig>,
    pub directional: Option<Vec<PartialDirectionalLightConfig>>,
}

impl SceneConfig {
    /// Merge a partial document over the built-in defaults.
    pub fn merged(partial: PartialSceneConfig) -> Self {
        let defaults = Self::default();
        let camera = partial.camera.unwrap_or_default();
        let controls = partial.controls.unwrap_or_default();
        let lights = partial.lights.unwrap_or_default();
        let ambient = lights.ambient.unwrap_or_default();
        // Every supplied directional light merges against the first
        // default light, not positionally.
        let default_light = defaults.lights.directional[0].clone();

        Self {
            background: partial.background.unwrap_or(defaults.background),
            camera: CameraConfig {
                fov: camera.fov.unwrap_or(defaults.camera.fov),
                near: camera.near.unwrap_or(defaults.camera.near),
                far: camera.far.unwrap_or(defaults.camera.far),
                position: camera.position.unwrap_or(defaults.camera.position),
            },
            controls: ControlsConfig {
                enable_damping: controls
                    .enable_damping
                    .unwrap_or(defaults.controls.enable_damping),
                damping_factor: controls
                    .damping_factor
                    .unwrap_or(defaults.controls.damping_factor),
            },
            lights: LightsConfig {
                ambient: AmbientLightConfig {
                    color: ambient.color.unwrap_or(defaults.lights.ambient.color),
                    intensity: ambient
                        .intensity
                        .unwrap_or(defaults.lights.ambient.intensity),
                },
                directional: match lights.directional {
                    Some(entries) => entries
                        .into_iter()
                        .map(|entry| DirectionalLightConfig {
                            color: entry.color.unwrap_or_else(|| default_light.color.clone()),
                            intensity: entry.intensity.unwrap_or(default_light.intensity),
                            position: entry.position.unwrap_or(default_light.position),
                        })
                        .collect(),
                    None => defaults.lights.directional,
                },
            },
        }
    }

    /// Parse and merge a JSON document. Malformed input falls back to the
    /// defaults with a warning.
    pub fn from_json(text: &str) -> Self {
        match serde_json::from_str::<PartialSceneConfig>(text) {
            Ok(partial) => Self::merged(partial),
            Err(err) => {
                log::warn!("Failed to parse scene config, using defaults: {err}");
                Self::default()
            }
        }
    }

    /// Read, parse and merge the document at `path`. A missing or
    /// unreadable file falls back to the defaults with a warning.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_json(&text),
            Err(err) => {
                log::warn!(
                    "Failed to read scene config {}, using defaults: {err}",
                    path.display()
                );
                Self::default()
            }
        }
    }
}
