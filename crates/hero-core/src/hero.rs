//! One mounted hero: all mutable simulation state plus the per-frame step.

use crate::burn::BurnMeter;
use crate::compositor::{CompositeFrame, CompositeUniforms};
use crate::constants::{HOVER_FALL_TAU_SEC, HOVER_RISE_TAU_SEC, MAX_STEP_DT_SEC};
use crate::error::HeroError;
use crate::interaction::{InteractionTracker, TouchResponse};
use crate::lifecycle::{ImageRequest, ImageSource, Release, TextureLifecycle, Ticket, TransitionState};
use crate::params::HeroParams;
use crate::passes::{decay_factor, FrameInputs, FramePlan};

/// Upper bound on the peak smoke density.
///
/// Splats add at most the splat amount to any cell and advection never
/// raises the maximum, so tracking `(peak + amount) * decay` while active and
/// `peak * decay` while idle bounds every cell from above without reading
/// the density field back from the GPU.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ResidualSmoke {
    peak: f32,
}

impl ResidualSmoke {
    pub fn update(&mut self, contact_active: bool, dt: f32, params: &HeroParams) {
        if contact_active {
            let decay = decay_factor(params.density_dissipation_active, dt);
            self.peak = (self.peak + params.density_splat_amount) * decay;
        } else {
            self.peak *= decay_factor(params.density_dissipation_idle, dt);
        }
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.peak
    }

    pub fn reset(&mut self) {
        self.peak = 0.0;
    }
}

/// Everything the renderer needs to draw one frame.
#[derive(Clone, Debug)]
pub struct FrameOutput {
    pub inputs: FrameInputs,
    pub plan: FramePlan,
    /// New burned state, reported only on change.
    pub burned_changed: Option<bool>,
    /// Image load to start, if any.
    pub request: Option<ImageRequest>,
    /// False until a current image is bound; the mesh is not drawn.
    pub render: bool,
    pub composite: CompositeUniforms,
    pub texture_revision: u64,
}

pub struct HeroState<T: Release> {
    params: HeroParams,
    tracker: InteractionTracker,
    burn: BurnMeter,
    textures: TextureLifecycle<T>,
    smoke: ResidualSmoke,
    hover: f32,
    hover_uv: [f32; 2],
    time: f32,
    frame: u64,
}

impl<T: Release> HeroState<T> {
    pub fn new(params: HeroParams, source: ImageSource) -> Self {
        let params = params.sanitized();
        Self {
            tracker: InteractionTracker::new(params.mesh_scale),
            burn: BurnMeter::new(&params),
            textures: TextureLifecycle::new(source),
            smoke: ResidualSmoke::default(),
            hover: 0.0,
            hover_uv: [0.5, 0.5],
            time: 0.0,
            frame: 0,
            params,
        }
    }

    /// Reset per-mount state and request the first image.
    pub fn mount(&mut self) -> ImageRequest {
        self.tracker.reset();
        self.burn = BurnMeter::new(&self.params);
        self.smoke.reset();
        self.hover = 0.0;
        self.time = 0.0;
        self.frame = 0;
        log::info!("[hero] mounted");
        self.textures.load_initial()
    }

    pub fn unmount(&mut self) {
        self.textures.dispose_all();
        self.tracker.reset();
        log::info!("[hero] unmounted after {} frames", self.frame);
    }

    pub fn step(&mut self, dt: f32) -> FrameOutput {
        let dt = if dt.is_finite() { dt.clamp(0.0, MAX_STEP_DT_SEC) } else { 0.0 };
        self.time += dt;
        self.frame += 1;

        let contact = self.tracker.contact();
        let inputs = FrameInputs {
            dt,
            contact_active: contact.active,
            contact_uv: contact.uv,
            drag_delta: self.tracker.drag_delta(),
        };
        let plan = FramePlan::build(&inputs, &self.params);
        self.smoke.update(contact.active, dt, &self.params);

        let mut burned_changed = self.burn.tick(contact.active);
        let mut reissued = None;
        if !contact.active && self.burn.burned() && self.textures.state() == TransitionState::Idle {
            self.textures.begin_reveal();
            reissued = self.textures.request_next_if_missing();
            burned_changed = self.burn.reset();
        }

        self.textures.advance_blend(dt, self.params.reveal_blend_tau_sec);
        let completed = self.textures.try_complete_reveal(
            self.burn.level(),
            contact.active,
            self.smoke.value(),
            self.params.reveal_epsilon,
        );
        let request = reissued.or(completed);

        self.ease_hover(contact.active, contact.uv, dt);
        self.tracker.end_frame();

        let composite = CompositeUniforms::build(
            self.tracker.camera(),
            self.tracker.quad(),
            &self.params,
            &CompositeFrame {
                blend: self.textures.effective_blend(),
                next_ready: self.textures.next().is_some(),
                hover_uv: self.hover_uv,
                hover_amount: self.hover,
                time: self.time,
            },
        );

        FrameOutput {
            inputs,
            plan,
            burned_changed,
            request,
            render: self.textures.current().is_some(),
            composite,
            texture_revision: self.textures.revision(),
        }
    }

    fn ease_hover(&mut self, active: bool, uv: [f32; 2], dt: f32) {
        let (target, tau) = if active {
            self.hover_uv = uv;
            (1.0, HOVER_RISE_TAU_SEC)
        } else {
            (0.0, HOVER_FALL_TAU_SEC)
        };
        self.hover += (target - self.hover) * (1.0 - (-dt / tau).exp());
    }

    /// Bind a finished load; returns the follow-up prefetch if one is due.
    pub fn on_image_loaded(&mut self, ticket: Ticket, texture: T) -> Option<ImageRequest> {
        match self.textures.on_loaded(ticket, texture) {
            Ok(request) => request,
            Err(e) => {
                log::warn!("[loader] discarded result: {}", e);
                None
            }
        }
    }

    pub fn on_image_failed(&mut self, ticket: Ticket, err: &HeroError) {
        self.textures.on_failed(ticket, err);
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.tracker.set_viewport(width, height);
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.tracker.set_scale(scale);
        self.params.mesh_scale = self.tracker.quad().half_extent;
    }

    pub fn set_input_disabled(&mut self, disabled: bool) {
        log::debug!("[input] touch input disabled = {}", disabled);
        self.tracker.set_input_disabled(disabled);
    }

    pub fn on_pointer_move(&mut self, sx: f32, sy: f32) {
        self.tracker.pointer_move(sx, sy);
    }

    pub fn on_pointer_down(&mut self, sx: f32, sy: f32) {
        self.tracker.pointer_down(sx, sy);
    }

    pub fn on_pointer_up(&mut self) {
        self.tracker.pointer_up();
    }

    pub fn on_pointer_leave(&mut self) {
        self.tracker.pointer_leave();
    }

    pub fn on_touch_start(&mut self, id: i32, sx: f32, sy: f32) -> TouchResponse {
        self.tracker.touch_start(id, sx, sy)
    }

    pub fn on_touch_move(&mut self, id: i32, sx: f32, sy: f32) -> TouchResponse {
        self.tracker.touch_move(id, sx, sy)
    }

    pub fn on_touch_end(&mut self, id: i32) {
        self.tracker.touch_end(id);
    }

    pub fn params(&self) -> &HeroParams {
        &self.params
    }

    pub fn tracker(&self) -> &InteractionTracker {
        &self.tracker
    }

    pub fn burn(&self) -> &BurnMeter {
        &self.burn
    }

    pub fn textures(&self) -> &TextureLifecycle<T> {
        &self.textures
    }

    pub fn residual_smoke(&self) -> f32 {
        self.smoke.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn residual_smoke_grows_while_active_and_decays_idle() {
        let p = HeroParams::default();
        let mut s = ResidualSmoke::default();
        for _ in 0..10 {
            s.update(true, 1.0 / 60.0, &p);
        }
        let peak = s.value();
        assert!(peak > p.density_splat_amount);
        s.update(false, 1.0 / 60.0, &p);
        assert!(s.value() < peak);
    }

    #[test]
    fn residual_smoke_is_static_for_zero_dt_when_idle() {
        let p = HeroParams::default();
        let mut s = ResidualSmoke::default();
        s.update(true, 1.0 / 60.0, &p);
        let v = s.value();
        s.update(false, 0.0, &p);
        assert_eq!(s.value(), v);
    }
}
