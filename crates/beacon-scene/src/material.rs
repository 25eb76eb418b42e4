use beacon_math::{ColorError, parse_hex_color};
use glam::Vec3;

#[derive(Debug, thiserror::Error)]
pub enum MaterialError {
    #[error("invalid {field}: {source}")]
    Color {
        field: &'static str,
        #[source]
        source: ColorError,
    },

    #[error("{field} must lie in [0, 1], got {value}")]
    Coefficient { field: &'static str, value: f32 },

    #[error("shininess must be positive, got {0}")]
    Shininess(f32),
}

/// Authoring form of a [`Material`]: colors still as `#rrggbb` strings.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialDesc {
    pub shader: String,
    pub ambient_coefficient: f32,
    pub diffuse_coefficient: f32,
    pub specular_coefficient: Option<f32>,
    pub ambient_color: String,
    pub diffuse_color: String,
    pub shininess: f32,
}

/// Shading parameters of one model. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    shader: String,
    ambient_coefficient: f32,
    diffuse_coefficient: f32,
    specular_coefficient: Option<f32>,
    ambient_color: Vec3,
    diffuse_color: Vec3,
    shininess: f32,
}

impl Material {
    pub fn new(desc: MaterialDesc) -> Result<Self, MaterialError> {
        let ambient_color = parse_hex_color(&desc.ambient_color).map_err(|source| {
            MaterialError::Color {
                field: "ambient_color",
                source,
            }
        })?;
        let diffuse_color = parse_hex_color(&desc.diffuse_color).map_err(|source| {
            MaterialError::Color {
                field: "diffuse_color",
                source,
            }
        })?;

        unit_range("ambient_coefficient", desc.ambient_coefficient)?;
        unit_range("diffuse_coefficient", desc.diffuse_coefficient)?;
        if let Some(ks) = desc.specular_coefficient {
            unit_range("specular_coefficient", ks)?;
        }
        if desc.shininess.is_nan() || desc.shininess <= 0.0 {
            return Err(MaterialError::Shininess(desc.shininess));
        }

        Ok(Self {
            shader: desc.shader,
            ambient_coefficient: desc.ambient_coefficient,
            diffuse_coefficient: desc.diffuse_coefficient,
            specular_coefficient: desc.specular_coefficient,
            ambient_color,
            diffuse_color,
            shininess: desc.shininess,
        })
    }

    /// Key into the resource manager's program table.
    pub fn shader(&self) -> &str {
        &self.shader
    }

    pub fn ambient_coefficient(&self) -> f32 {
        self.ambient_coefficient
    }

    pub fn diffuse_coefficient(&self) -> f32 {
        self.diffuse_coefficient
    }

    pub fn specular_coefficient(&self) -> Option<f32> {
        self.specular_coefficient
    }

    pub fn ambient_color(&self) -> Vec3 {
        self.ambient_color
    }

    pub fn diffuse_color(&self) -> Vec3 {
        self.diffuse_color
    }

    pub fn shininess(&self) -> f32 {
        self.shininess
    }
}

fn unit_range(field: &'static str, value: f32) -> Result<(), MaterialError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(MaterialError::Coefficient { field, value })
    }
}
