//! Orbit camera for the panorama viewer.
//!
//! The eye stays at the sphere centre. Dragging turns the view direction, the wheel narrows
//! or widens the field of view, and panning is disabled.

use foundation::math::{Spherical, Vec3};

use crate::picking::Ray;

pub const DEFAULT_FOV_DEG: f64 = 75.0;
pub const MIN_FOV_DEG: f64 = 30.0;
pub const MAX_FOV_DEG: f64 = 100.0;

/// Keeps the view basis defined at the poles.
const POLAR_EPSILON: f64 = 1e-6;

/// Pointer travel (pixels) below which a press/release pair counts as a click.
pub const CLICK_SLOP_PX: f64 = 4.0;

/// Wheel sensitivity for exponential zoom.
const WHEEL_ZOOM_RATE: f64 = 0.002;

/// Drag button type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragButton {
    #[default]
    None,
    Left,
    Right,
    Middle,
}

impl DragButton {
    /// DOM button index: 0=left, 1=middle, 2=right.
    pub fn from_index(button: i32) -> Self {
        match button {
            1 => Self::Middle,
            2 => Self::Right,
            _ => Self::Left,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrbitCamera {
    /// View direction from the sphere centre.
    pub view: Spherical,
    /// Vertical field of view in degrees.
    fov_deg: f64,

    canvas_width: f64,
    canvas_height: f64,

    dragging: bool,
    pub drag_button: DragButton,
    last_pos_px: [f64; 2],
    start_pos_px: [f64; 2],
    /// Largest distance from `start_pos_px` seen during the current press.
    travel_px: f64,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            view: Spherical::forward(),
            fov_deg: DEFAULT_FOV_DEG,
            canvas_width: 1280.0,
            canvas_height: 720.0,
            dragging: false,
            drag_button: DragButton::None,
            last_pos_px: [0.0, 0.0],
            start_pos_px: [0.0, 0.0],
            travel_px: 0.0,
        }
    }
}

impl OrbitCamera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_canvas_size(&mut self, width: f64, height: f64) {
        self.canvas_width = width.max(1.0);
        self.canvas_height = height.max(1.0);
    }

    pub fn canvas_size(&self) -> [f64; 2] {
        [self.canvas_width, self.canvas_height]
    }

    pub fn aspect(&self) -> f64 {
        self.canvas_width / self.canvas_height
    }

    pub fn fov_deg(&self) -> f64 {
        self.fov_deg
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Eye position. Fixed: there is no positional navigation.
    pub fn position(&self) -> Vec3 {
        Vec3::ZERO
    }

    pub fn forward(&self) -> Vec3 {
        self.view.to_direction()
    }

    /// Handle pointer down event.
    ///
    /// - `pos_px`: Pointer position in pixels [x, y].
    /// - `button`: Which button was pressed (0=left, 1=middle, 2=right).
    pub fn on_pointer_down(&mut self, pos_px: [f64; 2], button: i32) {
        self.dragging = true;
        self.drag_button = DragButton::from_index(button);
        self.last_pos_px = pos_px;
        self.start_pos_px = pos_px;
        self.travel_px = 0.0;
    }

    /// Handle pointer move event. Left drags rotate, middle drags zoom, right drags
    /// (pan) are ignored.
    pub fn on_pointer_move(&mut self, pos_px: [f64; 2]) {
        if !self.dragging {
            return;
        }
        let dx = pos_px[0] - self.last_pos_px[0];
        let dy = pos_px[1] - self.last_pos_px[1];
        let from_start = [
            pos_px[0] - self.start_pos_px[0],
            pos_px[1] - self.start_pos_px[1],
        ];
        self.travel_px = self.travel_px.max(from_start[0].hypot(from_start[1]));
        self.last_pos_px = pos_px;

        match self.drag_button {
            DragButton::Left => self.rotate_by_pixels(dx, dy),
            DragButton::Middle => self.zoom_by(dy),
            DragButton::Right | DragButton::None => {}
        }
    }

    /// Handle pointer up event.
    ///
    /// Returns `true` when the press was a left-button click (travel within
    /// [`CLICK_SLOP_PX`]) rather than a drag.
    pub fn on_pointer_up(&mut self, pos_px: [f64; 2]) -> bool {
        if !self.dragging {
            return false;
        }
        self.on_pointer_move(pos_px);
        let was_click = self.drag_button == DragButton::Left && self.travel_px <= CLICK_SLOP_PX;
        self.dragging = false;
        self.drag_button = DragButton::None;
        was_click
    }

    /// Handle mouse wheel event for zoom.
    ///
    /// - `delta`: Wheel delta (positive = zoom out, negative = zoom in).
    pub fn on_wheel(&mut self, delta: f64) {
        self.zoom_by(delta);
    }

    fn zoom_by(&mut self, delta: f64) {
        let factor = (delta * WHEEL_ZOOM_RATE).exp();
        self.fov_deg = (self.fov_deg * factor).clamp(MIN_FOV_DEG, MAX_FOV_DEG);
    }

    /// A full canvas height of drag turns the view by one revolution.
    fn rotate_by_pixels(&mut self, dx: f64, dy: f64) {
        let per_px = std::f64::consts::TAU / self.canvas_height;
        self.view.azimuth = foundation::math::wrap_angle(self.view.azimuth - dx * per_px);
        self.view.polar = (self.view.polar - dy * per_px)
            .clamp(POLAR_EPSILON, std::f64::consts::PI - POLAR_EPSILON);
    }

    /// Turns the camera to face `dir`. Ignored for a zero direction.
    pub fn look_at(&mut self, dir: Vec3) {
        if let Some(s) = Spherical::from_direction(dir) {
            self.view = Spherical::new(
                s.polar
                    .clamp(POLAR_EPSILON, std::f64::consts::PI - POLAR_EPSILON),
                s.azimuth,
            );
        }
    }

    /// Orthonormal (right, up, forward) basis of the current view.
    pub fn basis(&self) -> Option<(Vec3, Vec3, Vec3)> {
        let forward = self.forward().normalized()?;
        let right = forward.cross(Vec3::UNIT_Y).normalized()?;
        let up = right.cross(forward);
        Some((right, up, forward))
    }

    /// World-space ray from the eye through a canvas pixel.
    pub fn ray_through(&self, pos_px: [f64; 2]) -> Option<Ray> {
        let (right, up, forward) = self.basis()?;
        let ndc_x = 2.0 * pos_px[0] / self.canvas_width - 1.0;
        let ndc_y = 1.0 - 2.0 * pos_px[1] / self.canvas_height;
        let half_h = (self.fov_deg.to_radians() * 0.5).tan();
        let half_w = half_h * self.aspect();
        let dir = forward + right.scale(ndc_x * half_w) + up.scale(ndc_y * half_h);
        Some(Ray::new(self.position(), dir.normalized()?))
    }

    pub fn screen_center(&self) -> [f64; 2] {
        [self.canvas_width * 0.5, self.canvas_height * 0.5]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-9
    }

    #[test]
    fn starts_looking_down_negative_z() {
        let cam = OrbitCamera::new();
        assert!(approx(cam.forward(), Vec3::new(0.0, 0.0, -1.0)));
        assert_eq!(cam.fov_deg(), DEFAULT_FOV_DEG);
        assert_eq!(cam.position(), Vec3::ZERO);
    }

    #[test]
    fn centre_ray_matches_forward() {
        let mut cam = OrbitCamera::new();
        cam.set_canvas_size(800.0, 600.0);
        let ray = cam.ray_through(cam.screen_center()).expect("ray");
        assert!(approx(ray.dir, cam.forward()));
    }

    #[test]
    fn ray_through_right_edge_points_right() {
        let mut cam = OrbitCamera::new();
        cam.set_canvas_size(800.0, 600.0);
        let ray = cam.ray_through([800.0, 300.0]).expect("ray");
        assert!(ray.dir.x > 0.0);
        let ray = cam.ray_through([400.0, 0.0]).expect("ray");
        assert!(ray.dir.y > 0.0);
    }

    #[test]
    fn small_press_is_click_and_large_is_drag() {
        let mut cam = OrbitCamera::new();
        cam.on_pointer_down([100.0, 100.0], 0);
        cam.on_pointer_move([102.0, 101.0]);
        assert!(cam.on_pointer_up([102.0, 101.0]));

        let before = cam.view;
        cam.on_pointer_down([100.0, 100.0], 0);
        cam.on_pointer_move([160.0, 100.0]);
        // Returning to the start still counts as a drag.
        assert!(!cam.on_pointer_up([100.0, 100.0]));
        assert!((cam.view.azimuth - before.azimuth).abs() < 1e-9);
    }

    #[test]
    fn drag_rotates_without_moving_eye() {
        let mut cam = OrbitCamera::new();
        cam.on_pointer_down([0.0, 0.0], 0);
        cam.on_pointer_move([90.0, 0.0]);
        assert!(cam.view.azimuth < 0.0);
        assert_eq!(cam.position(), Vec3::ZERO);
    }

    #[test]
    fn right_drag_is_ignored() {
        let mut cam = OrbitCamera::new();
        let before = cam.view;
        cam.on_pointer_down([0.0, 0.0], 2);
        cam.on_pointer_move([200.0, 150.0]);
        assert!(!cam.on_pointer_up([200.0, 150.0]));
        assert_eq!(cam.view, before);
    }

    #[test]
    fn polar_is_clamped() {
        let mut cam = OrbitCamera::new();
        cam.on_pointer_down([0.0, 0.0], 0);
        cam.on_pointer_move([0.0, 10_000.0]);
        assert!(cam.view.polar > 0.0);
        assert!(cam.basis().is_some());
        cam.on_pointer_move([0.0, -20_000.0]);
        assert!(cam.view.polar < std::f64::consts::PI);
    }

    #[test]
    fn wheel_zoom_stays_in_bounds() {
        let mut cam = OrbitCamera::new();
        cam.on_wheel(-1.0e6);
        assert_eq!(cam.fov_deg(), MIN_FOV_DEG);
        cam.on_wheel(1.0e6);
        assert_eq!(cam.fov_deg(), MAX_FOV_DEG);
    }

    #[test]
    fn look_at_faces_target() {
        let mut cam = OrbitCamera::new();
        cam.look_at(Vec3::new(3.0, 0.0, 0.0));
        assert!(approx(cam.forward(), Vec3::new(1.0, 0.0, 0.0)));
        let before = cam.view;
        cam.look_at(Vec3::ZERO);
        assert_eq!(cam.view, before);
    }
}
