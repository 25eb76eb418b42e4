use anyhow::Context;
use beacon_math::{Axis, rotate};
use beacon_scene::MaterialDesc;
use glam::{Mat4, Vec3};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "beacon.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowSection {
    pub title: String,
    pub fps: u32,
}

impl Default for WindowSection {
    fn default() -> Self {
        Self {
            title: "Beacon".into(),
            fps: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AssetsSection {
    pub root: PathBuf,
}

impl Default for AssetsSection {
    fn default() -> Self {
        Self {
            root: PathBuf::from("assets"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RendererSection {
    pub clear_color: String,
}

impl Default for RendererSection {
    fn default() -> Self {
        Self {
            clear_color: "#d3fbf5".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProjectionConfig {
    Perspective { fov_y_degrees: f32 },
    Orthographic { width: f32, height: f32, depth: f32 },
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        ProjectionConfig::Perspective {
            fov_y_degrees: 45.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraSection {
    pub location: [f32; 3],
    pub target: [f32; 3],
    pub near: f32,
    pub far: f32,
    /// Radians the camera orbits about the Y axis each frame.
    pub rotation_step: f32,
    pub projection: ProjectionConfig,
}

impl Default for CameraSection {
    fn default() -> Self {
        Self {
            location: [0.0, 13.0, -18.0],
            target: [0.0, 2.0, 0.0],
            near: 0.5,
            far: 100.0,
            rotation_step: -0.008,
            projection: ProjectionConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LightSection {
    pub position: [f32; 3],
    pub ambient_intensity: f32,
    pub diffuse_intensity: f32,
    pub specular_intensity: f32,
}

impl Default for LightSection {
    fn default() -> Self {
        Self {
            position: [3.0, 12.0, 0.0],
            ambient_intensity: 0.5,
            diffuse_intensity: 0.8,
            specular_intensity: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MaterialConfig {
    pub shader: String,
    pub ambient_coefficient: f32,
    pub diffuse_coefficient: f32,
    #[serde(default)]
    pub specular_coefficient: Option<f32>,
    pub ambient_color: String,
    pub diffuse_color: String,
    pub shininess: f32,
}

impl From<&MaterialConfig> for MaterialDesc {
    fn from(m: &MaterialConfig) -> Self {
        MaterialDesc {
            shader: m.shader.clone(),
            ambient_coefficient: m.ambient_coefficient,
            diffuse_coefficient: m.diffuse_coefficient,
            specular_coefficient: m.specular_coefficient,
            ambient_color: m.ambient_color.clone(),
            diffuse_color: m.diffuse_color.clone(),
            shininess: m.shininess,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelConfig {
    pub name: String,
    pub mesh: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub translation: Option<[f32; 3]>,
    #[serde(default)]
    pub rotation_degrees: Option<[f32; 3]>,
    #[serde(default)]
    pub scale: Option<[f32; 3]>,
    pub material: MaterialConfig,
}

impl ModelConfig {
    /// Local transform `T · Rz · Ry · Rx · S`; missing parts are identity.
    pub fn transform(&self) -> Mat4 {
        let t = self.translation.map_or(Mat4::IDENTITY, |t| {
            Mat4::from_translation(Vec3::from_array(t))
        });
        let r = self.rotation_degrees.map_or(Mat4::IDENTITY, |[x, y, z]| {
            rotate(Axis::Z, z.to_radians())
                * rotate(Axis::Y, y.to_radians())
                * rotate(Axis::X, x.to_radians())
        });
        let s = self
            .scale
            .map_or(Mat4::IDENTITY, |s| Mat4::from_scale(Vec3::from_array(s)));
        t * r * s
    }
}

/// Everything the demo needs to build its scene, read from `beacon.toml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub shaders: Vec<String>,
    pub window: WindowSection,
    pub assets: AssetsSection,
    pub renderer: RendererSection,
    pub camera: CameraSection,
    pub light: LightSection,
    pub models: Vec<ModelConfig>,
}

impl DemoConfig {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Distinct mesh names in first-use order.
    pub fn mesh_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for model in &self.models {
            if !names.contains(&model.mesh) {
                names.push(model.mesh.clone());
            }
        }
        names
    }
}
