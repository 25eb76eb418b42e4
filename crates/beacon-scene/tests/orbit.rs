use beacon_math::{Axis, look_at, rotate, transform_direction};
use beacon_scene::{Camera, Light, Material, MaterialDesc, MeshHandle, Model, Scene};
use glam::{Mat4, Vec3};

fn lambertian() -> Material {
    Material::new(MaterialDesc {
        shader: "lambertian".into(),
        ambient_coefficient: 0.4,
        diffuse_coefficient: 0.8,
        specular_coefficient: None,
        ambient_color: "#1340a0".into(),
        diffuse_color: "#1340a0".into(),
        shininess: 1.0,
    })
    .unwrap()
}

#[test]
fn camera_orbit_over_frames_matches_single_rotation() {
    let location = Vec3::new(0.0, 4.0, 12.0);
    let target = Vec3::ZERO;
    let camera = Camera::perspective(location, target, 16.0 / 9.0, 0.5, 100.0);
    let mut scene = Scene::new(camera, Light::new(Vec3::new(3.0, 12.0, 0.0), 0.5, 0.8, 1.0));

    scene.add_model(
        Model::new("left", MeshHandle(0), lambertian())
            .with_transform(Mat4::from_translation(Vec3::new(-2.0, 0.0, 0.0))),
        None,
    );
    scene.add_model(
        Model::new("right", MeshHandle(0), lambertian())
            .with_transform(Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0))),
        None,
    );

    let step = 0.01;
    let frames = 120;
    let mut on_frame = |scene: &mut Scene| scene.camera_mut().rotate(step);
    for _ in 0..frames {
        on_frame(&mut scene);
    }

    let expected = transform_direction(rotate(Axis::Y, frames as f32 * step), location);
    let camera = scene.camera();
    assert!(camera.location().abs_diff_eq(expected, 1e-3));
    assert!(
        camera
            .view_matrix()
            .abs_diff_eq(look_at(camera.location(), target, Vec3::Y), 1e-6)
    );
    assert_eq!(scene.render_order().len(), 2);
}
