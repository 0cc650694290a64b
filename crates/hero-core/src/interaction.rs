//! Pointer/touch tracking against the displayed mesh.
//!
//! Screen coordinates are turned into a world-space ray through the same
//! camera used for rendering and intersected with the image plane. Surface
//! uv has its origin at the top-left corner of the image, matching texture
//! addressing in the simulation fields.

use crate::constants::{CAMERA_FOV_Y_DEG, CAMERA_Z, CAMERA_ZFAR, CAMERA_ZNEAR, MIN_MESH_SCALE};
use glam::{Mat4, Vec3, Vec4};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

/// Simple right-handed camera description with perspective projection.
#[derive(Clone, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, CAMERA_Z),
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect: 1.0,
            fovy_radians: CAMERA_FOV_Y_DEG.to_radians(),
            znear: CAMERA_ZNEAR,
            zfar: CAMERA_ZFAR,
        }
    }
}

impl Camera {
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// World-space ray through pixel `(sx, sy)` of a `width` x `height`
    /// viewport (origin top-left).
    pub fn screen_to_world_ray(&self, sx: f32, sy: f32, width: f32, height: f32) -> Ray {
        let width = width.max(1.0);
        let height = height.max(1.0);
        let ndc_x = (2.0 * sx / width) - 1.0;
        let ndc_y = 1.0 - (2.0 * sy / height);
        let inv = self.view_proj().inverse();
        let p_far = inv * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
        let p1: Vec3 = p_far.truncate() / p_far.w;
        Ray {
            origin: self.eye,
            dir: (p1 - self.eye).normalize_or_zero(),
        }
    }
}

/// The image plane: centred at the origin, facing +z, spanning
/// `[-half_extent, half_extent]` in x and y.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshQuad {
    pub half_extent: f32,
}

impl MeshQuad {
    pub fn from_scale(scale: f32) -> Self {
        Self {
            half_extent: scale.max(MIN_MESH_SCALE),
        }
    }

    /// Surface uv of the ray hit, or `None` when the ray misses the quad.
    pub fn intersect(&self, ray: &Ray) -> Option<[f32; 2]> {
        if ray.dir.z.abs() <= 1e-6 {
            return None;
        }
        let t = -ray.origin.z / ray.dir.z;
        if t < 0.0 {
            return None;
        }
        let hit = ray.origin + ray.dir * t;
        let span = 2.0 * self.half_extent;
        let u = 0.5 + hit.x / span;
        let v = 0.5 - hit.y / span;
        ((0.0..=1.0).contains(&u) && (0.0..=1.0).contains(&v)).then_some([u, v])
    }
}

impl Default for MeshQuad {
    fn default() -> Self {
        Self::from_scale(crate::constants::DEFAULT_MESH_SCALE)
    }
}

/// Current contact on the mesh surface.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Contact {
    pub uv: [f32; 2],
    pub previous_uv: [f32; 2],
    pub active: bool,
}

/// What a touch handler should do with the browser's default behaviour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TouchResponse {
    /// Suppress default scrolling for this event.
    pub consume: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Source {
    Mouse,
    Touch(i32),
}

#[derive(Clone, Debug)]
pub struct InteractionTracker {
    camera: Camera,
    quad: MeshQuad,
    viewport: [f32; 2],
    contact: Contact,
    source: Option<Source>,
    input_disabled: bool,
}

impl Default for InteractionTracker {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_MESH_SCALE)
    }
}

impl InteractionTracker {
    pub fn new(scale: f32) -> Self {
        Self {
            camera: Camera::default(),
            quad: MeshQuad::from_scale(scale),
            viewport: [1.0, 1.0],
            contact: Contact::default(),
            source: None,
            input_disabled: false,
        }
    }

    #[inline]
    pub fn contact(&self) -> Contact {
        self.contact
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn quad(&self) -> MeshQuad {
        self.quad
    }

    pub fn input_disabled(&self) -> bool {
        self.input_disabled
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        let w = width.max(1) as f32;
        let h = height.max(1) as f32;
        self.viewport = [w, h];
        self.camera.aspect = w / h;
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.quad = MeshQuad::from_scale(scale);
    }

    /// Disabling drops an in-progress touch contact so the containing page
    /// can scroll freely. Mouse hover is unaffected.
    pub fn set_input_disabled(&mut self, disabled: bool) {
        self.input_disabled = disabled;
        if disabled && matches!(self.source, Some(Source::Touch(_))) {
            self.release();
        }
    }

    /// Surface uv under a viewport pixel, if any.
    pub fn pick(&self, sx: f32, sy: f32) -> Option<[f32; 2]> {
        let ray = self
            .camera
            .screen_to_world_ray(sx, sy, self.viewport[0], self.viewport[1]);
        self.quad.intersect(&ray)
    }

    /// Drag since the end of the previous frame (zero when inactive).
    pub fn drag_delta(&self) -> [f32; 2] {
        if !self.contact.active {
            return [0.0, 0.0];
        }
        [
            self.contact.uv[0] - self.contact.previous_uv[0],
            self.contact.uv[1] - self.contact.previous_uv[1],
        ]
    }

    /// Roll `previous_uv` forward; call once per simulated frame.
    pub fn end_frame(&mut self) {
        self.contact.previous_uv = self.contact.uv;
    }

    pub fn pointer_move(&mut self, sx: f32, sy: f32) {
        if matches!(self.source, Some(Source::Touch(_))) {
            return;
        }
        match self.pick(sx, sy) {
            Some(uv) => self.engage(Source::Mouse, uv),
            None => self.release(),
        }
    }

    pub fn pointer_down(&mut self, sx: f32, sy: f32) {
        self.pointer_move(sx, sy);
    }

    /// Mouse contact follows hover, so releasing a button changes nothing.
    pub fn pointer_up(&mut self) {}

    pub fn pointer_leave(&mut self) {
        if matches!(self.source, Some(Source::Mouse)) {
            self.release();
        }
    }

    pub fn touch_start(&mut self, id: i32, sx: f32, sy: f32) -> TouchResponse {
        match self.source {
            Some(Source::Touch(tracked)) if tracked != id => TouchResponse::default(),
            _ => self.touch_at(id, sx, sy),
        }
    }

    pub fn touch_move(&mut self, id: i32, sx: f32, sy: f32) -> TouchResponse {
        match self.source {
            Some(Source::Touch(tracked)) if tracked == id => self.touch_at(id, sx, sy),
            _ => TouchResponse::default(),
        }
    }

    pub fn touch_end(&mut self, id: i32) {
        if self.source == Some(Source::Touch(id)) {
            self.release();
        }
    }

    fn touch_at(&mut self, id: i32, sx: f32, sy: f32) -> TouchResponse {
        if self.input_disabled {
            self.release();
            return TouchResponse::default();
        }
        match self.pick(sx, sy) {
            Some(uv) => {
                self.engage(Source::Touch(id), uv);
                TouchResponse { consume: true }
            }
            None => {
                // Keep tracking the finger so it can re-enter the mesh.
                self.contact.active = false;
                self.source = Some(Source::Touch(id));
                TouchResponse::default()
            }
        }
    }

    fn engage(&mut self, source: Source, uv: [f32; 2]) {
        if !self.contact.active {
            self.contact.previous_uv = uv;
        }
        self.contact.uv = uv;
        self.contact.active = true;
        self.source = Some(source);
    }

    fn release(&mut self) {
        self.contact.active = false;
        self.source = None;
    }

    pub fn reset(&mut self) {
        self.contact = Contact::default();
        self.source = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> InteractionTracker {
        let mut t = InteractionTracker::new(1.0);
        t.set_viewport(800, 600);
        t
    }

    #[test]
    fn centre_pixel_hits_centre_of_mesh() {
        let t = tracker();
        let uv = t.pick(400.0, 300.0).expect("hit");
        assert!((uv[0] - 0.5).abs() < 1e-4);
        assert!((uv[1] - 0.5).abs() < 1e-4);
    }

    #[test]
    fn corner_pixel_misses_small_mesh() {
        let mut t = tracker();
        t.set_scale(0.2);
        assert!(t.pick(0.0, 0.0).is_none());
    }

    #[test]
    fn uv_origin_is_top_left() {
        let t = tracker();
        let upper_left = t.pick(300.0, 200.0).expect("hit");
        assert!(upper_left[0] < 0.5);
        assert!(upper_left[1] < 0.5);
    }

    #[test]
    fn parallel_ray_misses() {
        let q = MeshQuad::from_scale(1.0);
        let ray = Ray {
            origin: Vec3::new(0.0, 0.0, 3.0),
            dir: Vec3::X,
        };
        assert!(q.intersect(&ray).is_none());
    }

    #[test]
    fn drag_delta_is_zero_on_first_contact() {
        let mut t = tracker();
        t.pointer_move(400.0, 300.0);
        assert!(t.contact().active);
        assert_eq!(t.drag_delta(), [0.0, 0.0]);
        t.end_frame();
        t.pointer_move(420.0, 300.0);
        let d = t.drag_delta();
        assert!(d[0] > 0.0);
        assert!(d[1].abs() < 1e-6);
    }

    #[test]
    fn leaving_the_mesh_deactivates_contact() {
        let mut t = tracker();
        t.set_scale(0.2);
        t.pointer_move(400.0, 300.0);
        assert!(t.contact().active);
        t.pointer_move(5.0, 5.0);
        assert!(!t.contact().active);
        t.pointer_move(400.0, 300.0);
        t.pointer_leave();
        assert!(!t.contact().active);
    }

    #[test]
    fn touch_consumes_only_when_on_mesh() {
        let mut t = tracker();
        t.set_scale(0.2);
        assert!(!t.touch_start(1, 5.0, 5.0).consume);
        assert!(!t.contact().active);
        assert!(t.touch_move(1, 400.0, 300.0).consume);
        assert!(t.contact().active);
        t.touch_end(1);
        assert!(!t.contact().active);
    }

    #[test]
    fn only_first_touch_is_tracked() {
        let mut t = tracker();
        assert!(t.touch_start(1, 400.0, 300.0).consume);
        assert!(!t.touch_start(2, 410.0, 300.0).consume);
        assert!(!t.touch_move(2, 420.0, 300.0).consume);
        t.touch_end(2);
        assert!(t.contact().active);
        t.touch_end(1);
        assert!(!t.contact().active);
    }

    #[test]
    fn disabled_input_suppresses_touch() {
        let mut t = tracker();
        assert!(t.touch_start(1, 400.0, 300.0).consume);
        t.set_input_disabled(true);
        assert!(!t.contact().active);
        assert!(!t.touch_start(3, 400.0, 300.0).consume);
        assert!(!t.contact().active);
        t.set_input_disabled(false);
        assert!(t.touch_start(3, 400.0, 300.0).consume);
    }
}
