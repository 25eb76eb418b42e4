use glam::Vec3;

/// Point light in world space. A scene has exactly one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub position: Vec3,
    pub ambient_intensity: f32,
    pub diffuse_intensity: f32,
    pub specular_intensity: f32,
}

impl Light {
    pub fn new(
        position: Vec3,
        ambient_intensity: f32,
        diffuse_intensity: f32,
        specular_intensity: f32,
    ) -> Self {
        Self {
            position,
            ambient_intensity,
            diffuse_intensity,
            specular_intensity,
        }
    }
}
