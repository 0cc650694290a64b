#![cfg(target_arch = "wasm32")]
use hero_core::{HeroParams, HeroState, ImageSource};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

mod constants;
mod dom;
mod events;
mod frame;
mod frame_loop;
mod input;
mod loader;
mod render;
mod shaders;

use frame::HeroContext;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("hero-web loaded");
    Ok(())
}

/// Mount-time configuration.
#[wasm_bindgen]
#[derive(Clone, Debug)]
pub struct HeroOptions {
    scale: f32,
    image_base_url: Option<String>,
    sim_resolution: Option<u32>,
    input_disabled: bool,
    dom_events: bool,
    autostart: bool,
}

impl Default for HeroOptions {
    fn default() -> Self {
        Self {
            scale: hero_core::constants::DEFAULT_MESH_SCALE,
            image_base_url: None,
            sim_resolution: None,
            input_disabled: false,
            dom_events: true,
            autostart: true,
        }
    }
}

#[wasm_bindgen]
impl HeroOptions {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Half extent of the image plane in world units.
    pub fn scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn image_base_url(mut self, url: String) -> Self {
        self.image_base_url = Some(url);
        self
    }

    pub fn sim_resolution(mut self, resolution: u32) -> Self {
        self.sim_resolution = Some(resolution);
        self
    }

    pub fn input_disabled(mut self, disabled: bool) -> Self {
        self.input_disabled = disabled;
        self
    }

    /// When false the host feeds input through the `on_*` methods itself.
    pub fn dom_events(mut self, enabled: bool) -> Self {
        self.dom_events = enabled;
        self
    }

    /// When false the host drives frames with `step` or starts them with `run`.
    pub fn autostart(mut self, enabled: bool) -> Self {
        self.autostart = enabled;
        self
    }
}

impl HeroOptions {
    fn params(&self) -> HeroParams {
        let mut params = HeroParams {
            mesh_scale: self.scale,
            ..HeroParams::default()
        };
        if let Some(url) = &self.image_base_url {
            params.image_base_url = url.clone();
        }
        if let Some(res) = self.sim_resolution {
            params.sim_resolution = res;
        }
        params.sanitized()
    }
}

/// Handle to a mounted hero.
#[wasm_bindgen]
pub struct BurnHero {
    ctx: Rc<RefCell<HeroContext>>,
    listeners: RefCell<Option<events::Listeners>>,
}

/// Mount the hero on `canvas`. Resolves once WebGPU is ready; images load in
/// the background and the plane is drawn once the first one arrives.
#[wasm_bindgen]
pub async fn mount(canvas: web_sys::HtmlCanvasElement, options: Option<HeroOptions>) -> Result<BurnHero, JsValue> {
    let options = options.unwrap_or_default();
    init(canvas, options)
        .await
        .map_err(|e| JsValue::from_str(&hero_core::HeroError::GpuInit(format!("{:?}", e)).to_string()))
}

async fn init(canvas: web_sys::HtmlCanvasElement, options: HeroOptions) -> anyhow::Result<BurnHero> {
    let params = options.params();
    let (w, h) = dom::sync_canvas_backing_size(&canvas);
    let gpu = render::GpuState::new(&canvas, params.sim_resolution).await?;

    let source = ImageSource::from_entropy(params.image_base_url.clone());
    let mut hero = HeroState::new(params, source);
    hero.set_viewport(w, h);
    hero.set_input_disabled(options.input_disabled);
    let first = hero.mount();

    let ctx = Rc::new(RefCell::new(HeroContext {
        hero,
        gpu,
        canvas: canvas.clone(),
        on_burned: None,
        last_instant: None,
        frame_loop: Default::default(),
        disposed: false,
    }));
    loader::spawn_load(Rc::downgrade(&ctx), first);

    let listeners = if options.dom_events {
        let mut l = events::Listeners::default();
        events::wire_pointer_handlers(&ctx, &canvas, &mut l);
        events::wire_touch_handlers(&ctx, &canvas, &mut l);
        log::info!("[input] {} listeners attached", l.count());
        Some(l)
    } else {
        None
    };

    if options.autostart {
        frame::start_loop(&ctx);
    }
    Ok(BurnHero {
        ctx,
        listeners: RefCell::new(listeners),
    })
}

impl BurnHero {
    fn client_px(&self, client_x: f32, client_y: f32) -> Option<[f32; 2]> {
        let canvas = self.ctx.borrow().canvas.clone();
        input::client_px_on_canvas(client_x, client_y, &canvas)
    }

    fn with_hero<R: Default>(&self, f: impl FnOnce(&mut HeroState<render::ImageTexture>) -> R) -> R {
        let mut c = self.ctx.borrow_mut();
        if c.disposed {
            return R::default();
        }
        f(&mut c.hero)
    }
}

#[wasm_bindgen]
impl BurnHero {
    /// Advance one frame by `dt_sec` and render it.
    pub fn step(&self, dt_sec: f32) {
        frame::step_and_dispatch(&self.ctx, Some(dt_sec));
    }

    /// Drive frames from requestAnimationFrame.
    pub fn run(&self) {
        frame::start_loop(&self.ctx);
    }

    pub fn stop(&self) {
        self.ctx.borrow_mut().frame_loop.stop();
    }

    /// Pointer position in viewport (client) CSS pixels.
    pub fn on_pointer_move(&self, client_x: f32, client_y: f32) {
        if let Some([sx, sy]) = self.client_px(client_x, client_y) {
            self.with_hero(|h| h.on_pointer_move(sx, sy));
        }
    }

    pub fn on_pointer_down(&self, client_x: f32, client_y: f32) {
        if let Some([sx, sy]) = self.client_px(client_x, client_y) {
            self.with_hero(|h| h.on_pointer_down(sx, sy));
        }
    }

    pub fn on_pointer_up(&self) {
        self.with_hero(|h| h.on_pointer_up());
    }

    pub fn on_pointer_leave(&self) {
        self.with_hero(|h| h.on_pointer_leave());
    }

    /// Returns true when the host should call `preventDefault`.
    pub fn on_touch_start(&self, id: i32, client_x: f32, client_y: f32) -> bool {
        match self.client_px(client_x, client_y) {
            Some([sx, sy]) => self.with_hero(|h| h.on_touch_start(id, sx, sy).consume),
            None => false,
        }
    }

    pub fn on_touch_move(&self, id: i32, client_x: f32, client_y: f32) -> bool {
        match self.client_px(client_x, client_y) {
            Some([sx, sy]) => self.with_hero(|h| h.on_touch_move(id, sx, sy).consume),
            None => false,
        }
    }

    pub fn on_touch_end(&self, id: i32) {
        self.with_hero(|h| h.on_touch_end(id));
    }

    pub fn set_input_disabled(&self, disabled: bool) {
        self.with_hero(|h| h.set_input_disabled(disabled));
    }

    pub fn set_scale(&self, scale: f32) {
        self.with_hero(|h| h.set_scale(scale));
    }

    /// `callback(burned: boolean)` fires on every change of the burned state.
    pub fn set_on_burned_change(&self, callback: Option<js_sys::Function>) {
        self.ctx.borrow_mut().on_burned = callback;
    }

    pub fn burned(&self) -> bool {
        self.with_hero(|h| h.burn().burned())
    }

    /// Stop the loop, detach listeners and free every GPU resource. Safe to
    /// call more than once; in-flight image loads are discarded.
    pub fn unmount(&self) {
        self.listeners.borrow_mut().take();
        self.ctx.borrow_mut().dispose();
    }
}

impl Drop for BurnHero {
    fn drop(&mut self) {
        self.unmount();
    }
}
