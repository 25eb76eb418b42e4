pub mod light;
pub mod material;
pub mod model;

pub use beacon_camera::Camera;
pub use light::Light;
pub use material::{Material, MaterialDesc, MaterialError};
pub use model::{MeshHandle, Model, ModelId};

/// The scene graph: one camera, one light and a forest of models.
///
/// Models live in an arena indexed by [`ModelId`]. Setup code populates the
/// scene once; afterwards the per-frame callback is the only writer and the
/// renderer reads it between callbacks.
#[derive(Debug)]
pub struct Scene {
    camera: Camera,
    light: Light,
    models: Vec<Model>,
    roots: Vec<ModelId>,
}

impl Scene {
    pub fn new(camera: Camera, light: Light) -> Self {
        Self {
            camera,
            light,
            models: Vec::new(),
            roots: Vec::new(),
        }
    }

    /// Registers `model`, optionally under `parent`.
    ///
    /// Attaching composes the transforms once: the child's stored transform
    /// becomes `parent.transform · model.transform` and does not follow later
    /// changes to the parent. A parent id that is not part of this scene makes
    /// the model a new root with its transform untouched.
    pub fn add_model(&mut self, mut model: Model, parent: Option<ModelId>) -> ModelId {
        let id = ModelId(self.models.len());
        model.children.clear();
        model.parent = None;

        match parent {
            Some(parent_id) if parent_id.0 < self.models.len() => {
                let parent_model = &mut self.models[parent_id.0];
                model.transform = parent_model.transform * model.transform;
                model.parent = Some(parent_id);
                parent_model.children.push(id);
            }
            Some(parent_id) => {
                log::warn!(
                    "parent {parent_id:?} of model `{}` is not in the scene; adding it as a root",
                    model.name
                );
                self.roots.push(id);
            }
            None => self.roots.push(id),
        }

        self.models.push(model);
        id
    }

    pub fn model(&self, id: ModelId) -> Option<&Model> {
        self.models.get(id.0)
    }

    pub fn model_mut(&mut self, id: ModelId) -> Option<&mut Model> {
        self.models.get_mut(id.0)
    }

    /// First model registered under `name`.
    pub fn find(&self, name: &str) -> Option<ModelId> {
        self.models
            .iter()
            .position(|m| m.name == name)
            .map(ModelId)
    }

    pub fn roots(&self) -> &[ModelId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn light(&self) -> &Light {
        &self.light
    }

    pub fn light_mut(&mut self) -> &mut Light {
        &mut self.light
    }

    /// Every model, each root followed by its subtree in pre-order.
    pub fn flatten(&self) -> Vec<ModelId> {
        let mut out = Vec::with_capacity(self.models.len());
        let mut stack: Vec<ModelId> = self.roots.iter().rev().copied().collect();

        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.models[id.0].children.iter().rev().copied());
        }

        out
    }

    /// [`flatten`](Self::flatten) stably sorted by shader name, so models
    /// sharing a program are drawn back to back.
    pub fn render_order(&self) -> Vec<ModelId> {
        let mut order = self.flatten();
        order.sort_by(|a, b| {
            self.models[a.0]
                .material
                .shader()
                .cmp(self.models[b.0].material.shader())
        });
        order
    }
}
