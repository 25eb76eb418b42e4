//! CPU half of a frame: per-model matrices and uniform blocks, computed
//! without touching the GPU.

use crate::resources::{Program, ResourceError, ResourceManager};
use crate::uniforms::{BoundUniforms, UniformBlock};
use beacon_camera::Camera;
use beacon_math::{normal_matrix, transform_point};
use beacon_scene::{Light, Material, MeshHandle, ModelId, Scene};
use glam::{Mat3, Mat4, Vec3};

/// The three matrices every program receives for one model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelMatrices {
    pub model_view: Mat4,
    pub projection: Mat4,
    pub normal: Mat3,
}

impl ModelMatrices {
    pub fn compute(camera: &Camera, transform: Mat4) -> Self {
        let model_view = camera.view_matrix() * transform;
        Self {
            model_view,
            projection: camera.projection_matrix(),
            normal: normal_matrix(model_view),
        }
    }
}

/// Light position in view space, where the shaders do their lighting.
pub fn light_view_position(camera: &Camera, light: &Light) -> Vec3 {
    transform_point(camera.view_matrix(), light.position)
}

/// Fills a program's uniform block for one model.
///
/// Optional uniforms the program declares but the material does not carry
/// are written as zero.
pub fn pack_uniforms(
    bound: &BoundUniforms,
    block_size: u64,
    matrices: &ModelMatrices,
    light_position: Vec3,
    light: &Light,
    material: &Material,
) -> UniformBlock {
    let mut block = UniformBlock::new(block_size);

    block.set_mat4(bound.model_view, matrices.model_view);
    block.set_mat4(bound.projection, matrices.projection);
    block.set_mat3(bound.normal_matrix, matrices.normal);

    block.set_vec3(bound.light_position, light_position);
    block.set_f32(bound.light_ambient, light.ambient_intensity);
    block.set_f32(bound.light_diffuse, light.diffuse_intensity);

    block.set_vec3(bound.ambient_color, material.ambient_color());
    block.set_vec3(bound.diffuse_color, material.diffuse_color());
    block.set_f32(bound.ambient_coefficient, material.ambient_coefficient());
    block.set_f32(bound.diffuse_coefficient, material.diffuse_coefficient());

    if let Some(slot) = bound.light_specular {
        block.set_f32(slot, light.specular_intensity);
    }
    if let Some(slot) = bound.specular_coefficient {
        block.set_f32(slot, material.specular_coefficient().unwrap_or(0.0));
    }
    if let Some(slot) = bound.shininess {
        block.set_f32(slot, material.shininess());
    }

    block
}

/// One model ready to draw with its program and filled uniforms.
pub struct DrawItem<'a, H> {
    pub model: ModelId,
    pub mesh: MeshHandle,
    pub program: &'a Program<H>,
    pub uniforms: UniformBlock,
}

pub struct FramePlan<'a, H> {
    pub draws: Vec<DrawItem<'a, H>>,
    /// Models skipped this frame because their program is not available.
    pub failures: Vec<(ModelId, ResourceError)>,
}

/// Resolves programs and packs uniforms for every model in `order`.
pub fn plan_frame<'a, H>(
    scene: &Scene,
    order: &[ModelId],
    resources: &'a ResourceManager<H>,
) -> FramePlan<'a, H> {
    let camera = scene.camera();
    let light = scene.light();
    let light_position = light_view_position(camera, light);

    let mut draws = Vec::with_capacity(order.len());
    let mut failures = Vec::new();

    for &id in order {
        let Some(model) = scene.model(id) else {
            continue;
        };
        let program = match resources.get_program(model.material.shader()) {
            Ok(program) => program,
            Err(err) => {
                failures.push((id, err));
                continue;
            }
        };

        let matrices = ModelMatrices::compute(camera, model.transform);
        let uniforms = pack_uniforms(
            program.bound(),
            program.block_size(),
            &matrices,
            light_position,
            light,
            &model.material,
        );

        draws.push(DrawItem {
            model: id,
            mesh: model.mesh,
            program,
            uniforms,
        });
    }

    FramePlan { draws, failures }
}

/// Runs the per-frame callback, then plans the frame against the scene it
/// left behind.
pub fn advance_frame<'a, H, F>(
    scene: &mut Scene,
    order: &[ModelId],
    resources: &'a ResourceManager<H>,
    on_frame: F,
) -> FramePlan<'a, H>
where
    F: FnOnce(&mut Scene),
{
    on_frame(scene);
    plan_frame(scene, order, resources)
}

/// The program currently bound in a pass.
#[derive(Debug, Default)]
pub struct ActiveProgram<'a> {
    name: Option<&'a str>,
}

impl<'a> ActiveProgram<'a> {
    /// Binds `name`, returning whether it differs from the bound program.
    pub fn switch_to(&mut self, name: &'a str) -> bool {
        if self.name == Some(name) {
            return false;
        }
        self.name = Some(name);
        true
    }
}
