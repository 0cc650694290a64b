use super::Listeners;
use crate::frame::HeroContext;
use crate::input;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Touch listeners are registered non-passive so a touch that lands on the
/// mesh can suppress page scrolling. Touches off the mesh, or any touch
/// while input is disabled, are left to the browser.
pub fn wire_touch_handlers(ctx: &Rc<RefCell<HeroContext>>, canvas: &web::HtmlCanvasElement, listeners: &mut Listeners) {
    let target: &web::EventTarget = canvas.as_ref();

    for kind in ["touchstart", "touchmove"] {
        let weak = Rc::downgrade(ctx);
        let canvas_m = canvas.clone();
        let start = kind == "touchstart";
        listeners.add(target, kind, false, move |ev: web::Event| {
            let Some(ev) = ev.dyn_ref::<web::TouchEvent>() else {
                return;
            };
            let Some(ctx) = weak.upgrade() else {
                return;
            };
            let mut consume = false;
            {
                let mut c = ctx.borrow_mut();
                if c.disposed {
                    return;
                }
                let touches = ev.changed_touches();
                for i in 0..touches.length() {
                    let Some(touch) = touches.get(i) else {
                        continue;
                    };
                    let Some([sx, sy]) = input::touch_canvas_px(&touch, &canvas_m) else {
                        continue;
                    };
                    let resp = if start {
                        c.hero.on_touch_start(touch.identifier(), sx, sy)
                    } else {
                        c.hero.on_touch_move(touch.identifier(), sx, sy)
                    };
                    consume |= resp.consume;
                }
            }
            if consume && ev.cancelable() {
                ev.prevent_default();
            }
        });
    }

    for kind in ["touchend", "touchcancel"] {
        let weak = Rc::downgrade(ctx);
        listeners.add(target, kind, true, move |ev: web::Event| {
            let Some(ev) = ev.dyn_ref::<web::TouchEvent>() else {
                return;
            };
            let Some(ctx) = weak.upgrade() else {
                return;
            };
            let mut c = ctx.borrow_mut();
            if c.disposed {
                return;
            }
            let touches = ev.changed_touches();
            for i in 0..touches.length() {
                if let Some(touch) = touches.get(i) {
                    c.hero.on_touch_end(touch.identifier());
                }
            }
        });
    }
}
