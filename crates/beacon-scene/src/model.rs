use crate::material::Material;
use glam::Mat4;

/// Index of a model inside its [`Scene`](crate::Scene).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(pub(crate) usize);

impl ModelId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Opaque handle to GPU-resident vertex and index buffers.
///
/// Issued by whoever uploads the mesh; the scene only carries it around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u32);

#[derive(Debug)]
pub struct Model {
    pub name: String,
    pub transform: Mat4,
    pub material: Material,
    pub mesh: MeshHandle,
    pub(crate) children: Vec<ModelId>,
    pub(crate) parent: Option<ModelId>,
}

impl Model {
    pub fn new(name: impl Into<String>, mesh: MeshHandle, material: Material) -> Self {
        Self {
            name: name.into(),
            transform: Mat4::IDENTITY,
            material,
            mesh,
            children: Vec::new(),
            parent: None,
        }
    }

    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }

    pub fn children(&self) -> &[ModelId] {
        &self.children
    }

    /// Bookkeeping only; the parent does not own this model's lifetime.
    pub fn parent(&self) -> Option<ModelId> {
        self.parent
    }
}
