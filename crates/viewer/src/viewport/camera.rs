use glam::{Mat4, Vec3, Vec4};
use shared::Bounds;

/// Arc-ball camera orbiting a target, with +Z as the up axis
#[derive(Debug, Clone, Copy)]
pub struct ArcBallCamera {
    /// Rotation around +Z (radians)
    pub yaw: f32,
    /// Elevation above the XY plane (radians)
    pub pitch: f32,
    /// Distance from target
    pub distance: f32,
    /// Roll around the view axis (radians)
    pub roll: f32,
    /// Camera target point
    pub target: Vec3,
    /// Vertical field of view (radians)
    pub fov: f32,
    /// Size of the framed scene, scales zoom limits and clip planes
    pub scene_radius: f32,
}

impl ArcBallCamera {
    pub fn new() -> Self {
        Self {
            yaw: -0.8,
            pitch: 0.45,
            distance: 6.0,
            roll: 0.0,
            target: Vec3::ZERO,
            fov: 30.0_f32.to_radians(),
            scene_radius: 1.0,
        }
    }

    /// Default orientation, looking at the whole of `bounds`
    pub fn framing(bounds: &Bounds) -> Self {
        let mut camera = Self::new();
        let center = bounds.center();
        camera.target = Vec3::new(center[0] as f32, center[1] as f32, center[2] as f32);
        camera.scene_radius = (0.5 * bounds.diagonal() as f32).max(1e-3);
        camera.distance = camera.scene_radius / (0.5 * camera.fov).sin();
        camera
    }

    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx.to_radians();
        self.pitch = (self.pitch + dy.to_radians()).clamp(-1.5, 1.5);
    }

    /// Turn the picture around the view axis
    pub fn spin(&mut self, radians: f32) {
        self.roll = (self.roll + radians).rem_euclid(std::f32::consts::TAU);
    }

    /// Move the target to `point`, keeping orientation and distance
    pub fn focus(&mut self, point: Vec3) {
        self.target = point;
    }

    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance * (1.0 - delta))
            .clamp(0.01 * self.scene_radius, 100.0 * self.scene_radius);
    }

    /// Move the target in the view plane, `dx`/`dy` in fractions of the view height
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let scale = 2.0 * self.distance * (0.5 * self.fov).tan();
        let offset = self.right_vector() * (-dx * scale) + self.up_vector() * (dy * scale);
        self.target += offset;
    }

    /// Camera position in world space
    pub fn eye_position(&self) -> Vec3 {
        let cy = self.yaw.cos();
        let sy = self.yaw.sin();
        let cp = self.pitch.cos();
        let sp = self.pitch.sin();

        self.target
            + Vec3::new(
                self.distance * cp * cy,
                self.distance * cp * sy,
                self.distance * sp,
            )
    }

    /// View matrix (world -> camera)
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_z(self.roll) * Mat4::look_at_rh(self.eye_position(), self.target, Vec3::Z)
    }

    /// Projection matrix (camera -> clip)
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        let near = (self.distance - 4.0 * self.scene_radius).max(1e-3 * self.distance);
        let far = self.distance + 4.0 * self.scene_radius;
        Mat4::perspective_rh_gl(self.fov, aspect, near, far)
    }

    /// Combined view-projection matrix
    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    /// Unit vector from the target towards the eye
    pub fn view_direction(&self) -> Vec3 {
        (self.eye_position() - self.target).normalize_or_zero()
    }

    // Rows of the view rotation are the camera axes in world space
    fn right_vector(&self) -> Vec3 {
        self.view_matrix().row(0).truncate()
    }

    fn up_vector(&self) -> Vec3 {
        self.view_matrix().row(1).truncate()
    }

    /// Project a 3D point to 2D screen coords (for overlay text)
    pub fn project(&self, point: Vec3, rect: egui::Rect) -> Option<egui::Pos2> {
        let aspect = rect.width() / rect.height();
        let vp = self.view_projection(aspect);
        let p = vp * Vec4::new(point.x, point.y, point.z, 1.0);
        if p.w <= 0.0 {
            return None;
        }
        let ndc = p.truncate() / p.w;
        let screen_x = rect.center().x + ndc.x * rect.width() * 0.5;
        let screen_y = rect.center().y - ndc.y * rect.height() * 0.5;
        Some(egui::pos2(screen_x, screen_y))
    }

    /// Point under `pos` lying in the plane through the target facing the camera
    pub fn unproject_at_target_depth(&self, pos: egui::Pos2, rect: egui::Rect) -> Option<Vec3> {
        let aspect = rect.width() / rect.height();
        let inv = self.view_projection(aspect).inverse();
        let ndc_x = (pos.x - rect.center().x) / (rect.width() * 0.5);
        let ndc_y = (rect.center().y - pos.y) / (rect.height() * 0.5);
        let near = inv.project_point3(Vec3::new(ndc_x, ndc_y, -1.0));
        let far = inv.project_point3(Vec3::new(ndc_x, ndc_y, 1.0));

        let dir = (far - near).normalize_or_zero();
        let normal = self.view_direction();
        let denom = dir.dot(normal);
        if denom.abs() < 1e-6 {
            return None;
        }
        let t = (self.target - near).dot(normal) / denom;
        Some(near + dir * t)
    }

    /// Direction of a world axis on screen, ignoring perspective (for the triad)
    pub fn screen_axis(&self, axis: Vec3) -> egui::Vec2 {
        let v = self.view_matrix().transform_vector3(axis);
        egui::vec2(v.x, -v.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> egui::Rect {
        egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(800.0, 600.0))
    }

    #[test]
    fn test_spin_keeps_eye_and_rolls_axes() {
        let mut camera = ArcBallCamera::new();
        let eye = camera.eye_position();
        let x_before = camera.screen_axis(Vec3::X);

        camera.spin(std::f32::consts::FRAC_PI_2);
        assert!(camera.eye_position().distance(eye) < 1e-5);
        let x_after = camera.screen_axis(Vec3::X);
        assert!(x_before.dot(x_after).abs() < 1e-4);
        assert!((x_before.length() - x_after.length()).abs() < 1e-4);

        camera.spin(-std::f32::consts::FRAC_PI_2);
        assert!(camera.screen_axis(Vec3::X).distance(x_before) < 1e-4);
    }

    #[test]
    fn test_unproject_center_is_target() {
        let mut camera = ArcBallCamera::new();
        camera.target = Vec3::new(1.0, 2.0, 3.0);
        let p = camera.unproject_at_target_depth(rect().center(), rect()).unwrap();
        assert!(p.distance(camera.target) < 1e-3);
    }

    #[test]
    fn test_focus_centers_cursor_point() {
        let mut camera = ArcBallCamera::new();
        camera.spin(0.3);
        let cursor = egui::pos2(600.0, 150.0);
        let point = camera.unproject_at_target_depth(cursor, rect()).unwrap();
        assert!(camera.project(point, rect()).unwrap().distance(cursor) < 0.5);

        let distance = camera.distance;
        camera.focus(point);
        assert_eq!(camera.distance, distance);
        assert!(camera.project(point, rect()).unwrap().distance(rect().center()) < 0.5);
    }
}
