use crate::depth::create_depth;
use crate::frame::{ActiveProgram, advance_frame};
use crate::mesh::MeshStore;
use crate::pipeline::{GpuProgram, WgpuShaderCompiler};
use crate::resources::ResourceManager;
use beacon_assets::AssetLoader;
use beacon_scene::{ModelId, Scene};
use glam::Vec3;
use std::collections::{HashMap, HashSet};
use wgpu::*;

/// Uniform buffer and bind group of one model.
struct ModelBinding {
    buffer: Buffer,
    bind_group: BindGroup,
}

pub struct Renderer3D {
    pub resources: ResourceManager<GpuProgram>,
    pub meshes: MeshStore,
    bindings: HashMap<ModelId, ModelBinding>,
    order: Vec<ModelId>,
    reported: HashSet<ModelId>,
    pub depth_view: TextureView,
    pub depth_tex: Texture,
    color_format: TextureFormat,
    clear_color: Color,
}

impl Renderer3D {
    pub fn new(
        device: &Device,
        color_format: TextureFormat,
        width: u32,
        height: u32,
        clear_color: Vec3,
    ) -> Self {
        let (depth_view, depth_tex) = create_depth(device, width, height);

        Self {
            resources: ResourceManager::new(),
            meshes: MeshStore::new(),
            bindings: HashMap::new(),
            order: Vec::new(),
            reported: HashSet::new(),
            depth_view,
            depth_tex,
            color_format,
            clear_color: Color {
                r: clear_color.x as f64,
                g: clear_color.y as f64,
                b: clear_color.z as f64,
                a: 1.0,
            },
        }
    }

    /// Loads and links `names` into pipelines for this renderer's target format.
    pub async fn load_programs<L: AssetLoader>(
        &mut self,
        device: &Device,
        loader: &L,
        names: &[String],
    ) -> usize {
        let compiler = WgpuShaderCompiler::new(device, self.color_format);
        self.resources.load_programs(loader, &compiler, names).await
    }

    /// Fixes the draw order and creates a uniform buffer for every model whose
    /// program is available. Call again after adding models.
    pub fn prepare(&mut self, device: &Device, scene: &Scene) {
        self.order = scene.render_order();
        self.bindings.clear();
        self.reported.clear();

        for &id in &self.order {
            let Some(model) = scene.model(id) else {
                continue;
            };
            let Ok(program) = self.resources.get_program(model.material.shader()) else {
                continue;
            };

            let buffer = device.create_buffer(&BufferDescriptor {
                label: Some(&format!("{}_uniforms", model.name)),
                size: program.block_size(),
                usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let bind_group = device.create_bind_group(&BindGroupDescriptor {
                label: Some(&format!("{}_bg", model.name)),
                layout: &program.handle().bind_group_layout,
                entries: &[BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                }],
            });
            self.bindings.insert(id, ModelBinding { buffer, bind_group });
        }

        log::info!(
            "prepared {}/{} models for drawing",
            self.bindings.len(),
            self.order.len()
        );
    }

    pub fn resize(&mut self, device: &Device, width: u32, height: u32) {
        let (dv, dt) = create_depth(device, width, height);
        self.depth_view = dv;
        self.depth_tex = dt;
    }

    /// Runs one frame: `on_frame` mutates the scene, then every model in the
    /// prepared order is drawn into `target_view`.
    ///
    /// A model whose program or mesh is missing, or whose mesh has no
    /// triangles, is skipped; the rest of the frame still renders.
    pub fn render<F>(
        &mut self,
        queue: &Queue,
        encoder: &mut CommandEncoder,
        target_view: &TextureView,
        scene: &mut Scene,
        on_frame: F,
    ) where
        F: FnOnce(&mut Scene),
    {
        let plan = advance_frame(scene, &self.order, &self.resources, on_frame);

        for (id, err) in &plan.failures {
            let name = scene.model(*id).map_or("<unknown>", |m| m.name.as_str());
            if self.reported.insert(*id) {
                log::warn!("skipping model `{name}`: {err}");
            } else {
                log::debug!("skipping model `{name}`: {err}");
            }
        }

        for draw in &plan.draws {
            if let Some(binding) = self.bindings.get(&draw.model) {
                queue.write_buffer(&binding.buffer, 0, draw.uniforms.as_bytes());
            }
        }

        let mut r_pass = encoder.begin_render_pass(&RenderPassDescriptor {
            label: Some("scene_pass"),
            color_attachments: &[Some(RenderPassColorAttachment {
                view: target_view,
                depth_slice: None,
                resolve_target: None,
                ops: Operations {
                    load: LoadOp::Clear(self.clear_color),
                    store: StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(Operations {
                    load: LoadOp::Clear(1.0),
                    store: StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        let mut active = ActiveProgram::default();
        for draw in &plan.draws {
            let mesh = self.meshes.get(draw.mesh).filter(|m| m.index_count > 0);
            let (Some(binding), Some(mesh)) = (self.bindings.get(&draw.model), mesh) else {
                if self.reported.insert(draw.model) {
                    log::warn!("model {:?} has no GPU buffers; skipping", draw.model);
                }
                continue;
            };

            if active.switch_to(draw.program.name()) {
                r_pass.set_pipeline(&draw.program.handle().pipeline);
            }
            r_pass.set_bind_group(0, &binding.bind_group, &[]);
            r_pass.set_vertex_buffer(0, mesh.positions.slice(..));
            r_pass.set_vertex_buffer(1, mesh.normals.slice(..));
            r_pass.set_index_buffer(mesh.indices.slice(..), IndexFormat::Uint32);
            r_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }

        log::trace!("drew {} models", plan.draws.len());
    }
}
