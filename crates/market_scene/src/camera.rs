//! Orbital perspective camera and damped orbit controls.

use glam::{Mat4, Vec3};

/// Perspective camera orbiting a target point.
#[derive(Debug, Clone)]
pub struct Camera {
    // --- Orbital Parameters (Primary State) ---
    /// The point the camera orbits around.
    pub target: Vec3,
    /// Distance from the camera to the target.
    pub radius: f32,
    /// Angle around the vertical axis, measured from +Z towards +X (radians).
    pub azimuth_rad: f32,
    /// Angle above the horizontal plane (radians).
    pub elevation_rad: f32,

    // --- Derived (Updated by `update()`) ---
    position: Vec3,

    // --- Projection ---
    pub fov_y_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// Creates a camera at `position` looking at `target`.
    pub fn looking_at(position: Vec3, target: Vec3, fov_y_deg: f32, near: f32, far: f32) -> Self {
        let offset = position - target;
        let radius = offset.length().max(f32::EPSILON);
        let mut camera = Self {
            target,
            radius,
            azimuth_rad: offset.x.atan2(offset.z),
            elevation_rad: (offset.y / radius).clamp(-1.0, 1.0).asin(),
            position,
            fov_y_deg,
            aspect: 1.0,
            near,
            far,
        };
        camera.update();
        camera
    }

    /// Recomputes the position from the orbital parameters. Must be called
    /// after any of them change.
    pub fn update(&mut self) {
        let (sin_az, cos_az) = self.azimuth_rad.sin_cos();
        let (sin_el, cos_el) = self.elevation_rad.sin_cos();
        let offset = Vec3::new(
            self.radius * cos_el * sin_az,
            self.radius * sin_el,
            self.radius * cos_el * cos_az,
        );
        self.position = self.target + offset;
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Sets the aspect ratio; degenerate values are ignored.
    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    pub fn proj(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_deg.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.proj() * self.view()
    }
}

/// Orbit controls with exponential damping.
///
/// Input only accumulates deltas; [`OrbitControls::update`] applies a
/// `damping_factor` share of them each frame and decays the remainder.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub damping_factor: f32,
    /// Radians per pixel of drag.
    pub rotate_speed: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    azimuth_delta: f32,
    elevation_delta: f32,
    zoom_scale: f32,
}

const MIN_ELEVATION_RAD: f32 = -89.0 * std::f32::consts::PI / 180.0;
const MAX_ELEVATION_RAD: f32 = 89.0 * std::f32::consts::PI / 180.0;
const SETTLED: f32 = 1e-5;

impl OrbitControls {
    pub fn new(damping_factor: f32) -> Self {
        Self {
            damping_factor: damping_factor.clamp(0.0, 1.0),
            rotate_speed: 0.005,
            min_radius: 3.0,
            max_radius: 200.0,
            azimuth_delta: 0.0,
            elevation_delta: 0.0,
            zoom_scale: 1.0,
        }
    }

    /// Queues a drag of `dx`/`dy` pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.azimuth_delta -= dx * self.rotate_speed;
        self.elevation_delta += dy * self.rotate_speed;
    }

    /// Queues a zoom; positive `scroll` moves closer.
    pub fn zoom(&mut self, scroll: f32) {
        self.zoom_scale *= 1.1_f32.powf(-scroll);
    }

    pub fn is_settled(&self) -> bool {
        self.azimuth_delta.abs() < SETTLED
            && self.elevation_delta.abs() < SETTLED
            && (self.zoom_scale - 1.0).abs() < SETTLED
    }

    /// Advances the damping state by one frame and writes the result into
    /// `camera`. Returns `true` if the camera moved.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        if self.is_settled() {
            return false;
        }

        let k = self.damping_factor;
        camera.azimuth_rad += self.azimuth_delta * k;
        camera.elevation_rad = (camera.elevation_rad + self.elevation_delta * k)
            .clamp(MIN_ELEVATION_RAD, MAX_ELEVATION_RAD);
        camera.radius = (camera.radius * self.zoom_scale).clamp(self.min_radius, self.max_radius);

        self.azimuth_delta *= 1.0 - k;
        self.elevation_delta *= 1.0 - k;
        self.zoom_scale = 1.0;

        camera.update();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::looking_at(Vec3::new(0.0, 0.0, 30.0), Vec3::ZERO, 60.0, 0.1, 1000.0)
    }

    #[test]
    fn orbital_state_matches_start_position() {
        let cam = camera();
        assert!((cam.radius - 30.0).abs() < 1e-5);
        assert!(cam.azimuth_rad.abs() < 1e-6);
        assert!(cam.elevation_rad.abs() < 1e-6);
        assert!(cam.position().distance(Vec3::new(0.0, 0.0, 30.0)) < 1e-4);
    }

    #[test]
    fn idle_controls_leave_camera_untouched() {
        let mut cam = camera();
        let mut controls = OrbitControls::new(0.05);
        assert!(!controls.update(&mut cam));
        assert!(cam.position().distance(Vec3::new(0.0, 0.0, 30.0)) < 1e-4);
    }

    #[test]
    fn damped_rotation_converges_to_requested_delta() {
        let mut cam = camera();
        let mut controls = OrbitControls::new(0.05);
        controls.rotate(-100.0, 0.0);
        let requested = 100.0 * controls.rotate_speed;

        let first = {
            controls.update(&mut cam);
            cam.azimuth_rad
        };
        assert!(first > 0.0 && first < requested);

        for _ in 0..2000 {
            controls.update(&mut cam);
        }
        assert!(controls.is_settled());
        assert!((cam.azimuth_rad - requested).abs() < 1e-3);
    }

    #[test]
    fn elevation_and_radius_are_clamped() {
        let mut cam = camera();
        let mut controls = OrbitControls::new(1.0);
        controls.rotate(0.0, 1.0e6);
        controls.zoom(-1000.0);
        controls.update(&mut cam);
        assert!(cam.elevation_rad <= MAX_ELEVATION_RAD);
        assert_eq!(cam.radius, controls.max_radius);
    }

    #[test]
    fn aspect_ignores_degenerate_values() {
        let mut cam = camera();
        cam.set_aspect(2.0);
        cam.set_aspect(0.0);
        cam.set_aspect(f32::NAN);
        assert_eq!(cam.aspect, 2.0);
    }
}
