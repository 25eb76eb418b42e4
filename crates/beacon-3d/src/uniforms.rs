use crate::shader::ShaderError;
use glam::{Mat3, Mat4, Vec3};
use std::collections::HashMap;

pub const U_MODEL_VIEW: &str = "u_mv";
pub const U_PROJECTION: &str = "u_p";
pub const U_NORMAL_MATRIX: &str = "u_normal_mat";
pub const U_LIGHT_POSITION: &str = "u_light_position";
pub const U_LIGHT_AMBIENT: &str = "u_ia";
pub const U_LIGHT_DIFFUSE: &str = "u_id";
pub const U_LIGHT_SPECULAR: &str = "u_is";
pub const U_AMBIENT_COLOR: &str = "u_mat_color_a";
pub const U_DIFFUSE_COLOR: &str = "u_mat_color_d";
pub const U_AMBIENT_COEFFICIENT: &str = "u_ka";
pub const U_DIFFUSE_COEFFICIENT: &str = "u_kd";
pub const U_SPECULAR_COEFFICIENT: &str = "u_ks";
pub const U_SHININESS: &str = "u_shininess";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformKind {
    F32,
    Vec3,
    Vec4,
    Mat3,
    Mat4,
    Other,
}

/// Where a named uniform lives inside the program's uniform block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformSlot {
    pub offset: u32,
    pub kind: UniformKind,
}

pub type UniformTable = HashMap<String, UniformSlot>;

/// The uniforms the frame loop writes, resolved once when a program links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundUniforms {
    pub model_view: UniformSlot,
    pub projection: UniformSlot,
    pub normal_matrix: UniformSlot,
    pub light_position: UniformSlot,
    pub light_ambient: UniformSlot,
    pub light_diffuse: UniformSlot,
    pub ambient_color: UniformSlot,
    pub diffuse_color: UniformSlot,
    pub ambient_coefficient: UniformSlot,
    pub diffuse_coefficient: UniformSlot,
    pub light_specular: Option<UniformSlot>,
    pub specular_coefficient: Option<UniformSlot>,
    pub shininess: Option<UniformSlot>,
}

impl BoundUniforms {
    pub fn resolve(program: &str, table: &UniformTable) -> Result<Self, ShaderError> {
        let optional = |name: &'static str, expected: UniformKind| match table.get(name) {
            Some(slot) if slot.kind != expected => Err(ShaderError::UniformType {
                program: program.to_string(),
                name,
                expected,
                found: slot.kind,
            }),
            found => Ok(found.copied()),
        };
        let required = |name: &'static str, expected: UniformKind| {
            optional(name, expected)?.ok_or_else(|| ShaderError::MissingUniform {
                program: program.to_string(),
                name,
            })
        };

        Ok(Self {
            model_view: required(U_MODEL_VIEW, UniformKind::Mat4)?,
            projection: required(U_PROJECTION, UniformKind::Mat4)?,
            normal_matrix: required(U_NORMAL_MATRIX, UniformKind::Mat3)?,
            light_position: required(U_LIGHT_POSITION, UniformKind::Vec3)?,
            light_ambient: required(U_LIGHT_AMBIENT, UniformKind::F32)?,
            light_diffuse: required(U_LIGHT_DIFFUSE, UniformKind::F32)?,
            ambient_color: required(U_AMBIENT_COLOR, UniformKind::Vec3)?,
            diffuse_color: required(U_DIFFUSE_COLOR, UniformKind::Vec3)?,
            ambient_coefficient: required(U_AMBIENT_COEFFICIENT, UniformKind::F32)?,
            diffuse_coefficient: required(U_DIFFUSE_COEFFICIENT, UniformKind::F32)?,
            light_specular: optional(U_LIGHT_SPECULAR, UniformKind::F32)?,
            specular_coefficient: optional(U_SPECULAR_COEFFICIENT, UniformKind::F32)?,
            shininess: optional(U_SHININESS, UniformKind::F32)?,
        })
    }
}

/// CPU copy of one program's uniform block, laid out with WGSL uniform rules.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformBlock {
    bytes: Vec<u8>,
}

impl UniformBlock {
    pub fn new(size: u64) -> Self {
        Self {
            bytes: vec![0; size as usize],
        }
    }

    pub fn set_f32(&mut self, slot: UniformSlot, value: f32) {
        self.write(slot.offset, bytemuck::bytes_of(&value));
    }

    pub fn set_vec3(&mut self, slot: UniformSlot, value: Vec3) {
        self.write(slot.offset, bytemuck::cast_slice(&value.to_array()));
    }

    pub fn set_mat4(&mut self, slot: UniformSlot, value: Mat4) {
        self.write(slot.offset, bytemuck::cast_slice(&value.to_cols_array()));
    }

    // mat3x3<f32> columns are padded to 16 bytes.
    pub fn set_mat3(&mut self, slot: UniformSlot, value: Mat3) {
        for (i, column) in value.to_cols_array_2d().iter().enumerate() {
            self.write(slot.offset + 16 * i as u32, bytemuck::cast_slice(column));
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn write(&mut self, offset: u32, data: &[u8]) {
        let start = offset as usize;
        self.bytes[start..start + data.len()].copy_from_slice(data);
    }
}
