use beacon_assets::MeshData;
use beacon_scene::MeshHandle;
use wgpu::util::{BufferInitDescriptor, DeviceExt};
use wgpu::*;

/// Vertex and index buffers of one uploaded mesh.
pub struct GpuMesh {
    pub positions: Buffer,
    pub normals: Buffer,
    pub indices: Buffer,
    pub index_count: u32,
}

impl GpuMesh {
    pub fn upload(device: &Device, label: &str, data: &MeshData) -> Self {
        let positions = device.create_buffer_init(&BufferInitDescriptor {
            label: Some(&format!("{label}_positions")),
            contents: bytemuck::cast_slice(&data.positions),
            usage: BufferUsages::VERTEX,
        });
        let normals = device.create_buffer_init(&BufferInitDescriptor {
            label: Some(&format!("{label}_normals")),
            contents: bytemuck::cast_slice(&data.normals),
            usage: BufferUsages::VERTEX,
        });
        let indices = device.create_buffer_init(&BufferInitDescriptor {
            label: Some(&format!("{label}_indices")),
            contents: bytemuck::cast_slice(&data.indices),
            usage: BufferUsages::INDEX,
        });

        Self {
            positions,
            normals,
            indices,
            index_count: data.indices.len() as u32,
        }
    }
}

/// Owns every uploaded mesh and hands out the handles models refer to.
#[derive(Default)]
pub struct MeshStore {
    meshes: Vec<GpuMesh>,
}

impl MeshStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upload(&mut self, device: &Device, label: &str, data: &MeshData) -> MeshHandle {
        log::debug!(
            "uploading mesh `{label}`: {} vertices, {} triangles",
            data.vertex_count(),
            data.triangle_count()
        );
        self.insert(GpuMesh::upload(device, label, data))
    }

    pub fn insert(&mut self, mesh: GpuMesh) -> MeshHandle {
        let handle = MeshHandle(self.meshes.len() as u32);
        self.meshes.push(mesh);
        handle
    }

    pub fn get(&self, handle: MeshHandle) -> Option<&GpuMesh> {
        self.meshes.get(handle.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}
