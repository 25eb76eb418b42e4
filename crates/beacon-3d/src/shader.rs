//! WGSL reflection: turns a vertex/fragment source pair into the uniform and
//! attribute tables of a program.
//!
//! Both stages are parsed and validated with naga. The uniform struct bound at
//! `@group(0) @binding(0)` becomes the uniform table; the `@location` inputs of
//! `vs_main` become the attribute table. A member declared by both stages must
//! agree on offset and type, and members of different names must not share
//! bytes across the stages, otherwise linking fails.

use crate::uniforms::{UniformKind, UniformSlot, UniformTable};
use naga::valid::{Capabilities, ValidationFlags, Validator};
use naga::{
    AddressSpace, Binding, Module, ResourceBinding, Scalar, ShaderStage, TypeInner, VectorSize,
};
use std::collections::HashMap;
use std::ops::Range;

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

pub const A_POSITION: &str = "a_position";
pub const A_NORMAL: &str = "a_normal";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShaderError {
    #[error("{stage} stage of `{program}` failed to compile:\n{log}")]
    Compile {
        program: String,
        stage: &'static str,
        log: String,
    },

    #[error("program `{program}` failed to link: {log}")]
    Link { program: String, log: String },

    #[error("program `{program}` does not declare uniform `{name}`")]
    MissingUniform { program: String, name: &'static str },

    #[error("uniform `{name}` of `{program}` is {found:?}, expected {expected:?}")]
    UniformType {
        program: String,
        name: &'static str,
        expected: UniformKind,
        found: UniformKind,
    },

    #[error("program `{program}` does not declare vertex attribute `{name}`")]
    MissingAttribute { program: String, name: &'static str },
}

/// Everything the renderer needs to know about a linked program's inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramLayout {
    pub uniforms: UniformTable,
    /// Byte size of the uniform block, padded to 16.
    pub block_size: u64,
    pub attributes: HashMap<String, u32>,
}

/// Shader locations of the two vertex streams every program consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexInputs {
    pub position: u32,
    pub normal: u32,
}

impl ProgramLayout {
    pub fn vertex_inputs(&self, program: &str) -> Result<VertexInputs, ShaderError> {
        let location = |name: &'static str| {
            self.attributes
                .get(name)
                .copied()
                .ok_or_else(|| ShaderError::MissingAttribute {
                    program: program.to_string(),
                    name,
                })
        };
        Ok(VertexInputs {
            position: location(A_POSITION)?,
            normal: location(A_NORMAL)?,
        })
    }
}

struct UniformBlock {
    members: UniformTable,
    /// Byte size of each member, for overlap checks between stages.
    sizes: HashMap<String, u32>,
    span: u32,
}

pub fn reflect_program(
    program: &str,
    vertex_source: &str,
    fragment_source: &str,
) -> Result<ProgramLayout, ShaderError> {
    let vertex = parse_stage(program, "vertex", vertex_source)?;
    let fragment = parse_stage(program, "fragment", fragment_source)?;
    let link_err = |log: String| ShaderError::Link {
        program: program.to_string(),
        log,
    };

    find_entry(&vertex, VERTEX_ENTRY, ShaderStage::Vertex).map_err(link_err)?;
    find_entry(&fragment, FRAGMENT_ENTRY, ShaderStage::Fragment).map_err(link_err)?;

    let block = match (
        uniform_block(&vertex).map_err(link_err)?,
        uniform_block(&fragment).map_err(link_err)?,
    ) {
        (Some(vs), Some(fs)) => merge_blocks(vs, fs).map_err(link_err)?,
        (Some(block), None) | (None, Some(block)) => block,
        (None, None) => {
            return Err(link_err(
                "no uniform block at @group(0) @binding(0)".to_string(),
            ));
        }
    };

    let attributes = vertex_attributes(&vertex).map_err(link_err)?;
    let block_size = (block.span as u64).next_multiple_of(16);

    Ok(ProgramLayout {
        uniforms: block.members,
        block_size,
        attributes,
    })
}

fn parse_stage(program: &str, stage: &'static str, source: &str) -> Result<Module, ShaderError> {
    let compile_err = |log: String| ShaderError::Compile {
        program: program.to_string(),
        stage,
        log,
    };

    let module = naga::front::wgsl::parse_str(source)
        .map_err(|e| compile_err(e.emit_to_string(source)))?;
    Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .map_err(|e| compile_err(error_chain(e.as_inner())))?;

    Ok(module)
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut log = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        log.push_str(": ");
        log.push_str(&inner.to_string());
        source = inner.source();
    }
    log
}

fn find_entry<'m>(
    module: &'m Module,
    name: &str,
    stage: ShaderStage,
) -> Result<&'m naga::EntryPoint, String> {
    module
        .entry_points
        .iter()
        .find(|ep| ep.name == name && ep.stage == stage)
        .ok_or_else(|| format!("missing {stage:?} entry point `{name}`"))
}

impl UniformBlock {
    fn extent(&self, name: &str, slot: &UniformSlot) -> Range<u32> {
        let size = self.sizes.get(name).copied().unwrap_or(0);
        slot.offset..slot.offset + size
    }
}

fn uniform_block(module: &Module) -> Result<Option<UniformBlock>, String> {
    let mut block = None;

    for (_, var) in module.global_variables.iter() {
        if var.space != AddressSpace::Uniform {
            continue;
        }
        let var_name = var.name.as_deref().unwrap_or("<unnamed>");
        if !matches!(var.binding, Some(ResourceBinding { group: 0, binding: 0 })) {
            return Err(format!(
                "uniform `{var_name}` must be bound at @group(0) @binding(0)"
            ));
        }
        if block.is_some() {
            return Err("only one uniform block per stage is supported".to_string());
        }

        let TypeInner::Struct { members, span } = &module.types[var.ty].inner else {
            return Err(format!("uniform `{var_name}` must be a struct"));
        };

        let mut table = UniformTable::new();
        let mut sizes = HashMap::new();
        for member in members {
            let Some(name) = member.name.clone() else {
                continue;
            };
            let inner = &module.types[member.ty].inner;
            sizes.insert(name.clone(), inner.size(module.to_ctx()));
            table.insert(
                name,
                UniformSlot {
                    offset: member.offset,
                    kind: uniform_kind(inner),
                },
            );
        }

        block = Some(UniformBlock {
            members: table,
            sizes,
            span: *span,
        });
    }

    Ok(block)
}

fn uniform_kind(inner: &TypeInner) -> UniformKind {
    match *inner {
        TypeInner::Scalar(Scalar::F32) => UniformKind::F32,
        TypeInner::Vector {
            size: VectorSize::Tri,
            scalar: Scalar::F32,
        } => UniformKind::Vec3,
        TypeInner::Vector {
            size: VectorSize::Quad,
            scalar: Scalar::F32,
        } => UniformKind::Vec4,
        TypeInner::Matrix {
            columns: VectorSize::Tri,
            rows: VectorSize::Tri,
            scalar: Scalar::F32,
        } => UniformKind::Mat3,
        TypeInner::Matrix {
            columns: VectorSize::Quad,
            rows: VectorSize::Quad,
            scalar: Scalar::F32,
        } => UniformKind::Mat4,
        _ => UniformKind::Other,
    }
}

fn merge_blocks(vertex: UniformBlock, fragment: UniformBlock) -> Result<UniformBlock, String> {
    for (name, slot) in &fragment.members {
        if let Some(existing) = vertex.members.get(name) {
            if existing != slot {
                return Err(format!(
                    "uniform `{name}` declared as {existing:?} in the vertex stage \
                     and {slot:?} in the fragment stage"
                ));
            }
            continue;
        }

        let bytes = fragment.extent(name, slot);
        for (other, other_slot) in &vertex.members {
            let other_bytes = vertex.extent(other, other_slot);
            if other != name && bytes.start < other_bytes.end && other_bytes.start < bytes.end {
                return Err(format!(
                    "fragment uniform `{name}` at bytes {bytes:?} overlaps \
                     vertex uniform `{other}` at bytes {other_bytes:?}"
                ));
            }
        }
    }

    let span = vertex.span.max(fragment.span);
    let mut members = vertex.members;
    let mut sizes = vertex.sizes;
    members.extend(fragment.members);
    sizes.extend(fragment.sizes);

    Ok(UniformBlock {
        members,
        sizes,
        span,
    })
}

fn vertex_attributes(module: &Module) -> Result<HashMap<String, u32>, String> {
    let entry = find_entry(module, VERTEX_ENTRY, ShaderStage::Vertex)?;
    let mut attributes = HashMap::new();

    for arg in &entry.function.arguments {
        match (&arg.binding, &module.types[arg.ty].inner) {
            (Some(Binding::Location { location, .. }), _) => {
                if let Some(name) = &arg.name {
                    attributes.insert(name.clone(), *location);
                }
            }
            (None, TypeInner::Struct { members, .. }) => {
                for member in members {
                    if let (Some(name), Some(Binding::Location { location, .. })) =
                        (&member.name, &member.binding)
                    {
                        attributes.insert(name.clone(), *location);
                    }
                }
            }
            _ => {}
        }
    }

    Ok(attributes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERT: &str = r#"
struct Uniforms {
    u_mv: mat4x4<f32>,
    u_p: mat4x4<f32>,
    u_normal_mat: mat3x3<f32>,
    u_light_position: vec3<f32>,
    u_ia: f32,
};

@group(0) @binding(0) var<uniform> u: Uniforms;

struct VertexInput {
    @location(0) a_position: vec3<f32>,
    @location(3) a_normal: vec3<f32>,
};

@vertex
fn vs_main(input: VertexInput) -> @builtin(position) vec4<f32> {
    let n = u.u_normal_mat * input.a_normal;
    return u.u_p * u.u_mv * vec4<f32>(input.a_position + n * 0.0, 1.0);
}
"#;

    const FRAG: &str = r#"
struct Uniforms {
    u_mv: mat4x4<f32>,
    u_p: mat4x4<f32>,
    u_normal_mat: mat3x3<f32>,
    u_light_position: vec3<f32>,
    u_ia: f32,
};

@group(0) @binding(0) var<uniform> u: Uniforms;

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(u.u_light_position * u.u_ia, 1.0);
}
"#;

    #[test]
    fn reflects_offsets_kinds_and_attributes() {
        let layout = reflect_program("test", VERT, FRAG).unwrap();

        let slot = |name: &str| layout.uniforms[name];
        assert_eq!(slot("u_mv"), UniformSlot { offset: 0, kind: UniformKind::Mat4 });
        assert_eq!(slot("u_p"), UniformSlot { offset: 64, kind: UniformKind::Mat4 });
        assert_eq!(slot("u_normal_mat"), UniformSlot { offset: 128, kind: UniformKind::Mat3 });
        assert_eq!(slot("u_light_position"), UniformSlot { offset: 176, kind: UniformKind::Vec3 });
        assert_eq!(slot("u_ia"), UniformSlot { offset: 188, kind: UniformKind::F32 });
        assert_eq!(layout.block_size, 192);

        assert_eq!(
            layout.vertex_inputs("test").unwrap(),
            VertexInputs { position: 0, normal: 3 }
        );
    }

    #[test]
    fn syntax_errors_carry_the_stage() {
        let err = reflect_program("broken", "fn vs_main( {", FRAG).unwrap_err();
        assert!(matches!(err, ShaderError::Compile { stage: "vertex", .. }));
    }

    #[test]
    fn conflicting_declarations_fail_to_link() {
        let fragment = FRAG.replace(
            "u_light_position: vec3<f32>,\n    u_ia: f32,",
            "u_ia: f32,\n    u_light_position: vec3<f32>,",
        );
        assert_ne!(fragment, FRAG);
        let err = reflect_program("mismatch", VERT, &fragment).unwrap_err();
        assert!(matches!(err, ShaderError::Link { log, .. } if log.contains("declared as")));
    }

    #[test]
    fn different_structs_sharing_bytes_fail_to_link() {
        let vertex = r#"
struct Transform {
    u_mv: mat4x4<f32>,
};

@group(0) @binding(0) var<uniform> t: Transform;

@vertex
fn vs_main(
    @location(0) a_position: vec3<f32>,
    @location(1) a_normal: vec3<f32>,
) -> @builtin(position) vec4<f32> {
    return t.u_mv * vec4<f32>(a_position + a_normal * 0.0, 1.0);
}
"#;
        let fragment = r#"
struct Surface {
    u_mat_color_a: vec3<f32>,
    u_ka: f32,
};

@group(0) @binding(0) var<uniform> s: Surface;

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(s.u_mat_color_a * s.u_ka, 1.0);
}
"#;
        let err = reflect_program("split", vertex, fragment).unwrap_err();
        assert!(matches!(err, ShaderError::Link { log, .. } if log.contains("overlaps")));
    }

    #[test]
    fn fragment_prefix_of_vertex_block_links() {
        let fragment = r#"
struct Uniforms {
    u_mv: mat4x4<f32>,
};

@group(0) @binding(0) var<uniform> u: Uniforms;

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return u.u_mv[0];
}
"#;
        let layout = reflect_program("prefix", VERT, fragment).unwrap();
        assert_eq!(layout.uniforms.len(), 5);
        assert_eq!(layout.block_size, 192);
    }

    #[test]
    fn missing_entry_point_fails_to_link() {
        let fragment = FRAG.replace("fn fs_main", "fn main");
        let err = reflect_program("unnamed", VERT, &fragment).unwrap_err();
        assert!(matches!(err, ShaderError::Link { log, .. } if log.contains("fs_main")));
    }

    #[test]
    fn missing_attribute_is_reported() {
        let vertex = VERT.replace("a_normal", "a_tangent");
        let layout = reflect_program("tangent", &vertex, FRAG).unwrap();
        assert_eq!(
            layout.vertex_inputs("tangent"),
            Err(ShaderError::MissingAttribute {
                program: "tangent".into(),
                name: A_NORMAL
            })
        );
    }
}
