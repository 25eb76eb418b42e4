use beacon_3d::{ShaderError, UniformKind, VertexInputs, reflect_program};
use beacon_3d::{CompiledProgram, ResourceManager, ShaderCompiler};
use beacon_assets::{FsAssetLoader, ShaderSource};

const BUNDLED: [&str; 3] = ["lambertian", "phong", "gouraud"];

fn asset_root() -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets")
}

struct ReflectOnly;

impl ShaderCompiler for ReflectOnly {
    type Handle = ();

    fn compile(&self, source: &ShaderSource) -> Result<CompiledProgram<()>, ShaderError> {
        let layout = reflect_program(&source.name, &source.vertex, &source.fragment)?;
        Ok(CompiledProgram { handle: (), layout })
    }
}

#[test]
fn every_bundled_program_links() {
    let loader = FsAssetLoader::new(asset_root());
    let names: Vec<String> = BUNDLED.iter().map(|n| n.to_string()).collect();
    let mut resources = ResourceManager::new();

    let ready = pollster::block_on(resources.load_programs(&loader, &ReflectOnly, &names));

    assert_eq!(ready, BUNDLED.len());
    for name in BUNDLED {
        let program = resources.get_program(name).unwrap();
        assert_eq!(
            program.vertex_inputs(),
            VertexInputs {
                position: 0,
                normal: 1
            }
        );
        assert_eq!(program.block_size(), 240);
    }
}

#[test]
fn specular_uniforms_only_where_declared() {
    let loader = FsAssetLoader::new(asset_root());
    let names: Vec<String> = BUNDLED.iter().map(|n| n.to_string()).collect();
    let mut resources = ResourceManager::new();
    pollster::block_on(resources.load_programs(&loader, &ReflectOnly, &names));

    let lambert = resources.get_program("lambertian").unwrap().bound();
    assert_eq!(lambert.shininess, None);
    assert_eq!(lambert.light_specular, None);

    let phong = resources.get_program("phong").unwrap().bound();
    assert_eq!(phong.shininess.map(|s| (s.offset, s.kind)), Some((232, UniformKind::F32)));
    assert_eq!(phong.specular_coefficient.map(|s| s.offset), Some(228));
    assert_eq!(phong.light_specular.map(|s| s.offset), Some(236));
}

#[test]
fn gouraud_fragment_stage_needs_no_uniforms() {
    let root = asset_root();
    let vertex = std::fs::read_to_string(root.join("shaders/gouraud.vert")).unwrap();
    let fragment = std::fs::read_to_string(root.join("shaders/gouraud.frag")).unwrap();

    let layout = reflect_program("gouraud", &vertex, &fragment).unwrap();

    assert_eq!(layout.uniforms["u_normal_mat"].offset, 128);
    assert_eq!(layout.uniforms["u_light_position"].kind, UniformKind::Vec3);
}
