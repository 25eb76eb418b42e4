pub mod depth;
pub mod frame;
pub mod mesh;
pub mod pipeline;
pub mod render;
pub mod resources;
pub mod shader;
pub mod uniforms;

pub use depth::{DEPTH_FORMAT, create_depth};
pub use frame::{
    ActiveProgram, DrawItem, FramePlan, ModelMatrices, advance_frame, light_view_position,
    pack_uniforms, plan_frame,
};
pub use mesh::{GpuMesh, MeshStore};
pub use pipeline::{GpuProgram, WgpuShaderCompiler};
pub use render::Renderer3D;
pub use resources::{CompiledProgram, Program, ResourceError, ResourceManager, ShaderCompiler};
pub use shader::{ProgramLayout, ShaderError, VertexInputs, reflect_program};
pub use uniforms::{BoundUniforms, UniformBlock, UniformKind, UniformSlot, UniformTable};
