use crate::dom;
use crate::frame_loop::LoopState;
use crate::loader;
use crate::render::{GpuState, ImageTexture};
use hero_core::{HeroState, ImageRequest};
use instant::Instant;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

/// Everything a mounted hero owns on the page.
pub struct HeroContext {
    pub hero: HeroState<ImageTexture>,
    pub gpu: GpuState,
    pub canvas: web::HtmlCanvasElement,
    pub on_burned: Option<js_sys::Function>,
    pub last_instant: Option<Instant>,
    pub frame_loop: LoopState,
    pub disposed: bool,
}

/// Side effects of a step that must run after the context borrow ends.
#[derive(Default)]
pub struct FrameEffects {
    pub burned_changed: Option<bool>,
    pub request: Option<ImageRequest>,
}

impl HeroContext {
    /// Step using wall-clock time since the previous call.
    pub fn frame(&mut self) -> FrameEffects {
        let now = Instant::now();
        let dt_sec = self
            .last_instant
            .map(|prev| (now - prev).as_secs_f32())
            .unwrap_or(0.0);
        self.last_instant = Some(now);
        self.step(dt_sec)
    }

    pub fn step(&mut self, dt_sec: f32) -> FrameEffects {
        if self.disposed {
            return FrameEffects::default();
        }
        let (w, h) = dom::sync_canvas_backing_size(&self.canvas);
        self.gpu.resize_if_needed(w, h);
        self.hero.set_viewport(w, h);

        let out = self.hero.step(dt_sec);
        let textures = self.hero.textures();
        if let Err(e) = self.gpu.execute(&out, textures.current(), textures.next()) {
            match e {
                wgpu::SurfaceError::Timeout => log::warn!("[gpu] surface timeout"),
                other => log::error!("[gpu] frame dropped: {:?}", other),
            }
        }
        if let Some(b) = out.burned_changed {
            log::info!("[hero] burned -> {}", b);
        }
        FrameEffects {
            burned_changed: out.burned_changed,
            request: out.request,
        }
    }

    /// Tear down GPU state and textures. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.frame_loop.stop();
        self.gpu.invalidate_images();
        self.hero.unmount();
        self.gpu.dispose();
    }
}

/// Start loads and invoke the host callback. Runs with no borrow held so
/// the callback may call back into the hero.
pub fn dispatch(ctx: &Rc<RefCell<HeroContext>>, effects: FrameEffects) {
    if let Some(req) = effects.request {
        loader::spawn_load(Rc::downgrade(ctx), req);
    }
    if let Some(burned) = effects.burned_changed {
        let callback = ctx.borrow().on_burned.clone();
        if let Some(f) = callback {
            if let Err(e) = f.call1(&JsValue::NULL, &JsValue::from_bool(burned)) {
                log::error!("[hero] burned callback threw: {:?}", e);
            }
        }
    }
}

pub fn step_and_dispatch(ctx: &Rc<RefCell<HeroContext>>, dt_sec: Option<f32>) {
    let effects = {
        let mut c = ctx.borrow_mut();
        match dt_sec {
            Some(dt) => c.step(dt),
            None => c.frame(),
        }
    };
    dispatch(ctx, effects);
}

/// requestAnimationFrame loop; ends once it is stopped or restarted or the
/// context is dropped. The closure keeps itself alive through `tick` and
/// drops that handle on the frame it stops.
pub fn start_loop(ctx: &Rc<RefCell<HeroContext>>) {
    let id = {
        let mut c = ctx.borrow_mut();
        if c.disposed {
            return;
        }
        let Some(id) = c.frame_loop.start() else {
            return;
        };
        c.last_instant = None;
        id
    };
    let weak = Rc::downgrade(ctx);
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        let live = weak
            .upgrade()
            .filter(|ctx| ctx.borrow().frame_loop.is_current(id));
        let Some(ctx) = live else {
            // Breaks the tick <-> closure cycle; freed once this call returns.
            let _ = tick_clone.borrow_mut().take();
            return;
        };
        step_and_dispatch(&ctx, None);
        if let (Some(w), Some(cb)) = (web::window(), tick_clone.borrow().as_ref()) {
            let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut()>));
    if let (Some(w), Some(cb)) = (web::window(), tick.borrow().as_ref()) {
        let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}
