use beacon_math::{Axis, look_at, orthographic, perspective, rotate, transform_direction};
use glam::{Mat4, Vec3};

pub const DEFAULT_FOV_Y: f32 = std::f32::consts::FRAC_PI_4;

/// Anything that can turn its own parameters into a projection matrix.
pub trait Projector {
    fn projection_matrix(&self, aspect_ratio: f32) -> Mat4;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perspective {
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Projector for Perspective {
    fn projection_matrix(&self, aspect_ratio: f32) -> Mat4 {
        perspective(self.fov_y, aspect_ratio, self.near, self.far)
    }
}

/// Parallel projection of a fixed view box; ignores the viewport aspect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orthographic {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

impl Projector for Orthographic {
    fn projection_matrix(&self, _aspect_ratio: f32) -> Mat4 {
        orthographic(self.width, self.height, self.depth)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Perspective(Perspective),
    Orthographic(Orthographic),
}

impl Projector for Projection {
    fn projection_matrix(&self, aspect_ratio: f32) -> Mat4 {
        match self {
            Projection::Perspective(p) => p.projection_matrix(aspect_ratio),
            Projection::Orthographic(o) => o.projection_matrix(aspect_ratio),
        }
    }
}

/// Eye position and target in world space, with cached view and projection.
///
/// The view matrix is rebuilt whenever location or target change, the
/// projection whenever the aspect ratio changes.
#[derive(Debug, Clone)]
pub struct Camera {
    location: Vec3,
    target: Vec3,
    up: Vec3,
    projection: Projection,
    view_matrix: Mat4,
    projection_matrix: Mat4,
}

impl Camera {
    pub fn new(location: Vec3, target: Vec3, projection: Projection, aspect_ratio: f32) -> Self {
        let up = Vec3::Y;
        Self {
            location,
            target,
            up,
            projection,
            view_matrix: look_at(location, target, up),
            projection_matrix: projection.projection_matrix(aspect_ratio),
        }
    }

    pub fn perspective(
        location: Vec3,
        target: Vec3,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    ) -> Self {
        let projection = Projection::Perspective(Perspective {
            fov_y: DEFAULT_FOV_Y,
            near,
            far,
        });
        Self::new(location, target, projection, aspect_ratio)
    }

    pub fn orthographic(location: Vec3, target: Vec3, width: f32, height: f32, depth: f32) -> Self {
        let projection = Projection::Orthographic(Orthographic {
            width,
            height,
            depth,
        });
        Self::new(location, target, projection, width / height)
    }

    /// Recomputes the projection for a new viewport aspect ratio.
    pub fn update(&mut self, aspect_ratio: f32) {
        self.projection_matrix = self.projection.projection_matrix(aspect_ratio);
    }

    /// Orbits the eye about the world Y axis by `angle` radians.
    pub fn rotate(&mut self, angle: f32) {
        self.location = transform_direction(rotate(Axis::Y, angle), self.location);
        self.refresh_view();
    }

    pub fn set_location(&mut self, location: Vec3) {
        self.location = location;
        self.refresh_view();
    }

    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
        self.refresh_view();
    }

    pub fn location(&self) -> Vec3 {
        self.location
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.view_matrix
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    fn refresh_view(&mut self) {
        self.view_matrix = look_at(self.location, self.target, self.up);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotate_orbits_location_and_rebuilds_view() {
        let start = Vec3::new(0.0, 13.0, -18.0);
        let target = Vec3::new(0.0, 2.0, 0.0);
        let mut camera = Camera::perspective(start, target, 1.5, 0.5, 100.0);

        camera.rotate(-0.008);

        let expected = transform_direction(rotate(Axis::Y, -0.008), start);
        assert!(camera.location().abs_diff_eq(expected, 1e-5));
        assert_eq!(camera.location().y, 13.0);
        assert!(
            camera
                .view_matrix()
                .abs_diff_eq(look_at(expected, target, Vec3::Y), 1e-5)
        );
    }

    #[test]
    fn update_only_touches_projection() {
        let mut camera = Camera::perspective(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 1.0, 0.1, 10.0);
        let view = camera.view_matrix();

        camera.update(2.0);

        assert_eq!(camera.view_matrix(), view);
        assert!(
            camera
                .projection_matrix()
                .abs_diff_eq(perspective(DEFAULT_FOV_Y, 2.0, 0.1, 10.0), 1e-6)
        );
    }

    #[test]
    fn orthographic_projection_ignores_aspect() {
        let mut camera = Camera::orthographic(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 8.0, 4.0, 20.0);
        let before = camera.projection_matrix();
        camera.update(3.0);
        assert_eq!(camera.projection_matrix(), before);
        assert!(matches!(camera.projection(), Projection::Orthographic(_)));
    }

    #[test]
    fn set_target_recomputes_view() {
        let mut camera = Camera::perspective(Vec3::new(4.0, 1.0, 4.0), Vec3::ZERO, 1.0, 0.1, 10.0);
        camera.set_target(Vec3::new(1.0, 0.0, 0.0));
        assert!(camera.view_matrix().abs_diff_eq(
            look_at(Vec3::new(4.0, 1.0, 4.0), Vec3::new(1.0, 0.0, 0.0), Vec3::Y),
            1e-6
        ));
    }
}
