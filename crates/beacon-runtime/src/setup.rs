use crate::config::{CameraSection, DemoConfig, LightSection, ProjectionConfig};
use anyhow::Context;
use beacon_camera::{Camera, Orthographic, Perspective, Projection};
use beacon_scene::{Light, Material, MaterialDesc, MeshHandle, Model, ModelId, Scene};
use glam::Vec3;
use std::collections::{HashMap, HashSet};

pub fn build_camera(config: &CameraSection, aspect_ratio: f32) -> Camera {
    let projection = match config.projection {
        ProjectionConfig::Perspective { fov_y_degrees } => Projection::Perspective(Perspective {
            fov_y: fov_y_degrees.to_radians(),
            near: config.near,
            far: config.far,
        }),
        ProjectionConfig::Orthographic {
            width,
            height,
            depth,
        } => Projection::Orthographic(Orthographic {
            width,
            height,
            depth,
        }),
    };
    Camera::new(
        Vec3::from_array(config.location),
        Vec3::from_array(config.target),
        projection,
        aspect_ratio,
    )
}

pub fn build_light(config: &LightSection) -> Light {
    Light::new(
        Vec3::from_array(config.position),
        config.ambient_intensity,
        config.diffuse_intensity,
        config.specular_intensity,
    )
}

/// Builds the scene described by `config` from the meshes that loaded.
///
/// A model whose mesh is not in `meshes` is left out together with its
/// descendants. A parent name that matches no earlier model makes the model
/// a root. Invalid materials abort setup.
pub fn build_scene(
    config: &DemoConfig,
    aspect_ratio: f32,
    meshes: &HashMap<String, MeshHandle>,
) -> anyhow::Result<Scene> {
    let mut scene = Scene::new(
        build_camera(&config.camera, aspect_ratio),
        build_light(&config.light),
    );
    let mut by_name: HashMap<&str, ModelId> = HashMap::new();
    let mut skipped: HashSet<&str> = HashSet::new();

    for model in &config.models {
        let Some(&mesh) = meshes.get(&model.mesh) else {
            log::warn!("model `{}`: mesh `{}` is not loaded; skipping", model.name, model.mesh);
            skipped.insert(&model.name);
            continue;
        };

        let parent = match model.parent.as_deref() {
            None => None,
            Some(p) if skipped.contains(p) => {
                log::warn!("model `{}`: parent `{p}` was skipped; skipping", model.name);
                skipped.insert(&model.name);
                continue;
            }
            Some(p) => match by_name.get(p) {
                Some(&id) => Some(id),
                None => {
                    log::warn!(
                        "model `{}`: parent `{p}` is not defined before it; adding as a root",
                        model.name
                    );
                    None
                }
            },
        };

        let material = Material::new(MaterialDesc::from(&model.material))
            .with_context(|| format!("material of model `{}`", model.name))?;
        let id = scene.add_model(
            Model::new(model.name.clone(), mesh, material).with_transform(model.transform()),
            parent,
        );
        by_name.entry(&model.name).or_insert(id);
    }

    log::info!(
        "scene has {} models ({} roots), {} skipped",
        scene.len(),
        scene.roots().len(),
        skipped.len()
    );
    Ok(scene)
}
