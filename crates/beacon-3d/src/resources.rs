use crate::shader::{ProgramLayout, ShaderError, VertexInputs};
use crate::uniforms::{BoundUniforms, UniformTable};
use beacon_assets::{AssetError, AssetLoader, ShaderSource};
use futures::future::join_all;
use std::collections::HashMap;

#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("no shader program named `{0}` has been loaded")]
    NotFound(String),

    #[error("shader program `{name}` is unavailable: {reason}")]
    Unavailable { name: String, reason: String },

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Shader(#[from] ShaderError),
}

/// Output of a [`ShaderCompiler`]: the backend handle plus its reflected layout.
pub struct CompiledProgram<H> {
    pub handle: H,
    pub layout: ProgramLayout,
}

/// Turns vertex/fragment source into a linked, backend-specific program.
pub trait ShaderCompiler {
    type Handle;

    fn compile(&self, source: &ShaderSource) -> Result<CompiledProgram<Self::Handle>, ShaderError>;
}

/// A linked program with its uniform and attribute locations cached.
pub struct Program<H> {
    name: String,
    handle: H,
    uniforms: UniformTable,
    attributes: HashMap<String, u32>,
    block_size: u64,
    bound: BoundUniforms,
    inputs: VertexInputs,
}

impl<H> Program<H> {
    /// Resolves every uniform and attribute the frame loop needs, failing if
    /// any is missing or has the wrong type.
    pub fn link(name: &str, compiled: CompiledProgram<H>) -> Result<Self, ShaderError> {
        let CompiledProgram { handle, layout } = compiled;
        let bound = BoundUniforms::resolve(name, &layout.uniforms)?;
        let inputs = layout.vertex_inputs(name)?;

        Ok(Self {
            name: name.to_string(),
            handle,
            uniforms: layout.uniforms,
            attributes: layout.attributes,
            block_size: layout.block_size,
            bound,
            inputs,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handle(&self) -> &H {
        &self.handle
    }

    pub fn uniforms(&self) -> &UniformTable {
        &self.uniforms
    }

    pub fn attributes(&self) -> &HashMap<String, u32> {
        &self.attributes
    }

    pub fn block_size(&self) -> u64 {
        self.block_size
    }

    pub fn bound(&self) -> &BoundUniforms {
        &self.bound
    }

    pub fn vertex_inputs(&self) -> VertexInputs {
        self.inputs
    }
}

enum ProgramSlot<H> {
    Ready(Program<H>),
    Failed(String),
}

/// Named shader programs, compiled once and looked up by material shader name.
pub struct ResourceManager<H> {
    programs: HashMap<String, ProgramSlot<H>>,
}

impl<H> Default for ResourceManager<H> {
    fn default() -> Self {
        Self {
            programs: HashMap::new(),
        }
    }
}

impl<H> ResourceManager<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches every `<name>.vert`/`<name>.frag` pair concurrently, then
    /// compiles and links them one by one.
    ///
    /// A program that fails at any stage is logged and recorded as
    /// unavailable; the rest of the batch still loads. Returns how many
    /// programs are ready.
    pub async fn load_programs<L, C>(&mut self, loader: &L, compiler: &C, names: &[String]) -> usize
    where
        L: AssetLoader,
        C: ShaderCompiler<Handle = H>,
    {
        let sources = join_all(names.iter().map(|name| ShaderSource::load(loader, name))).await;

        let mut ready = 0;
        for (name, source) in names.iter().zip(sources) {
            let result = source
                .map_err(ResourceError::from)
                .and_then(|source| self.insert_source(compiler, &source));
            match result {
                Ok(()) => ready += 1,
                Err(err) => {
                    log::error!("failed to load shader program `{name}`: {err}");
                    self.programs
                        .insert(name.clone(), ProgramSlot::Failed(err.to_string()));
                }
            }
        }

        log::info!("loaded {ready}/{} shader programs", names.len());
        ready
    }

    /// Compiles and links an already fetched source pair under its name.
    pub fn insert_source<C>(
        &mut self,
        compiler: &C,
        source: &ShaderSource,
    ) -> Result<(), ResourceError>
    where
        C: ShaderCompiler<Handle = H>,
    {
        let compiled = compiler.compile(source)?;
        let program = Program::link(&source.name, compiled)?;
        log::debug!(
            "linked `{}`: {} uniforms, {} attributes, {} byte block",
            source.name,
            program.uniforms.len(),
            program.attributes.len(),
            program.block_size
        );
        self.programs
            .insert(source.name.clone(), ProgramSlot::Ready(program));
        Ok(())
    }

    pub fn get_program(&self, name: &str) -> Result<&Program<H>, ResourceError> {
        match self.programs.get(name) {
            Some(ProgramSlot::Ready(program)) => Ok(program),
            Some(ProgramSlot::Failed(reason)) => Err(ResourceError::Unavailable {
                name: name.to_string(),
                reason: reason.clone(),
            }),
            None => Err(ResourceError::NotFound(name.to_string())),
        }
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::reflect_program;
    use beacon_assets::MemoryAssetLoader;

    const VERT: &str = r#"
struct Uniforms {
    u_mv: mat4x4<f32>,
    u_p: mat4x4<f32>,
    u_normal_mat: mat3x3<f32>,
    u_light_position: vec3<f32>,
    u_ia: f32,
    u_mat_color_a: vec3<f32>,
    u_id: f32,
    u_mat_color_d: vec3<f32>,
    u_ka: f32,
    u_kd: f32,
};

@group(0) @binding(0) var<uniform> u: Uniforms;

@vertex
fn vs_main(
    @location(0) a_position: vec3<f32>,
    @location(1) a_normal: vec3<f32>,
) -> @builtin(position) vec4<f32> {
    let n = u.u_normal_mat * a_normal;
    return u.u_p * u.u_mv * vec4<f32>(a_position + n * 0.0, 1.0);
}
"#;

    const FRAG: &str = r#"
struct Uniforms {
    u_mv: mat4x4<f32>,
    u_p: mat4x4<f32>,
    u_normal_mat: mat3x3<f32>,
    u_light_position: vec3<f32>,
    u_ia: f32,
    u_mat_color_a: vec3<f32>,
    u_id: f32,
    u_mat_color_d: vec3<f32>,
    u_ka: f32,
    u_kd: f32,
};

@group(0) @binding(0) var<uniform> u: Uniforms;

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    let c = u.u_mat_color_a * u.u_ka * u.u_ia + u.u_mat_color_d * u.u_kd * u.u_id;
    return vec4<f32>(c + u.u_light_position * 0.0, 1.0);
}
"#;

    /// Reflects the source and hands out sequential ids instead of GPU objects.
    struct CountingCompiler {
        next: std::cell::Cell<u32>,
    }

    impl ShaderCompiler for CountingCompiler {
        type Handle = u32;

        fn compile(&self, source: &ShaderSource) -> Result<CompiledProgram<u32>, ShaderError> {
            let layout = reflect_program(&source.name, &source.vertex, &source.fragment)?;
            let handle = self.next.get();
            self.next.set(handle + 1);
            Ok(CompiledProgram { handle, layout })
        }
    }

    fn compiler() -> CountingCompiler {
        CountingCompiler {
            next: std::cell::Cell::new(1),
        }
    }

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn loads_and_links_named_programs() {
        let loader = MemoryAssetLoader::new()
            .with("shaders/lambertian.vert", VERT)
            .with("shaders/lambertian.frag", FRAG);
        let mut resources = ResourceManager::new();

        let ready = pollster::block_on(resources.load_programs(
            &loader,
            &compiler(),
            &names(&["lambertian"]),
        ));

        assert_eq!(ready, 1);
        let program = resources.get_program("lambertian").unwrap();
        assert_eq!(program.name(), "lambertian");
        assert_eq!(*program.handle(), 1);
        assert_eq!(program.block_size(), 240);
        assert_eq!(program.bound().diffuse_coefficient.offset, 224);
        assert_eq!(program.bound().shininess, None);
        assert_eq!(
            program.vertex_inputs(),
            VertexInputs {
                position: 0,
                normal: 1
            }
        );
    }

    #[test]
    fn legacy_name_loads_the_fixed_pair() {
        let loader = MemoryAssetLoader::new()
            .with("shaders/vertex_shader.glsl", VERT)
            .with("shaders/fragment_shader.glsl", FRAG);
        let mut resources = ResourceManager::new();

        let ready =
            pollster::block_on(resources.load_programs(&loader, &compiler(), &names(&["legacy"])));

        assert_eq!(ready, 1);
        assert_eq!(resources.get_program("legacy").unwrap().block_size(), 240);
    }

    #[test]
    fn one_bad_program_does_not_abort_the_batch() {
        let loader = MemoryAssetLoader::new()
            .with("shaders/lambertian.vert", VERT)
            .with("shaders/lambertian.frag", FRAG)
            .with("shaders/broken.vert", "fn vs_main( {")
            .with("shaders/broken.frag", FRAG)
            .with("shaders/half.vert", VERT);
        let mut resources = ResourceManager::new();

        let ready = pollster::block_on(resources.load_programs(
            &loader,
            &compiler(),
            &names(&["broken", "lambertian", "half"]),
        ));

        assert_eq!(ready, 1);
        assert_eq!(resources.len(), 3);
        assert!(resources.get_program("lambertian").is_ok());
        assert!(matches!(
            resources.get_program("broken"),
            Err(ResourceError::Unavailable { reason, .. }) if reason.contains("vertex")
        ));
        assert!(matches!(
            resources.get_program("half"),
            Err(ResourceError::Unavailable { reason, .. }) if reason.contains("half.frag")
        ));
    }

    #[test]
    fn program_missing_a_required_uniform_is_unavailable() {
        let fragment = FRAG
            .replace("    u_kd: f32,\n", "")
            .replace(" + u.u_mat_color_d * u.u_kd * u.u_id", "");
        let vertex = VERT.replace("    u_kd: f32,\n", "");
        let source = ShaderSource {
            name: "unlit".into(),
            vertex,
            fragment,
        };
        let mut resources = ResourceManager::new();

        let err = resources.insert_source(&compiler(), &source).unwrap_err();

        assert!(matches!(
            err,
            ResourceError::Shader(ShaderError::MissingUniform { name: "u_kd", .. })
        ));
        assert!(matches!(
            resources.get_program("unlit"),
            Err(ResourceError::NotFound(_))
        ));
    }

    #[test]
    fn unknown_program_is_not_found() {
        let resources: ResourceManager<u32> = ResourceManager::new();
        assert!(resources.is_empty());
        assert!(matches!(
            resources.get_program("toon"),
            Err(ResourceError::NotFound(name)) if name == "toon"
        ));
    }
}
