use super::Listeners;
use crate::frame::HeroContext;
use crate::input;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::JsCast;
use web_sys as web;

// Touch contacts arrive through the touch listeners.
fn is_touch(ev: &web::PointerEvent) -> bool {
    ev.pointer_type() == "touch"
}

fn with_hero(ctx: &Weak<RefCell<HeroContext>>, f: impl FnOnce(&mut HeroContext)) {
    if let Some(ctx) = ctx.upgrade() {
        let mut c = ctx.borrow_mut();
        if !c.disposed {
            f(&mut c);
        }
    }
}

pub fn wire_pointer_handlers(ctx: &Rc<RefCell<HeroContext>>, canvas: &web::HtmlCanvasElement, listeners: &mut Listeners) {
    let target: &web::EventTarget = canvas.as_ref();

    for kind in ["pointermove", "pointerdown"] {
        let weak = Rc::downgrade(ctx);
        let canvas_m = canvas.clone();
        let down = kind == "pointerdown";
        listeners.add(target, kind, true, move |ev: web::Event| {
            let Some(ev) = ev.dyn_ref::<web::PointerEvent>() else {
                return;
            };
            if is_touch(ev) {
                return;
            }
            let Some([sx, sy]) = input::pointer_canvas_px(ev, &canvas_m) else {
                return;
            };
            with_hero(&weak, |c| {
                if down {
                    c.hero.on_pointer_down(sx, sy);
                } else {
                    c.hero.on_pointer_move(sx, sy);
                }
            });
        });
    }

    {
        let weak = Rc::downgrade(ctx);
        listeners.add(target, "pointerup", true, move |ev: web::Event| {
            if ev.dyn_ref::<web::PointerEvent>().is_some_and(is_touch) {
                return;
            }
            with_hero(&weak, |c| c.hero.on_pointer_up());
        });
    }

    for kind in ["pointerleave", "pointercancel"] {
        let weak = Rc::downgrade(ctx);
        listeners.add(target, kind, true, move |ev: web::Event| {
            if ev.dyn_ref::<web::PointerEvent>().is_some_and(is_touch) {
                return;
            }
            with_hero(&weak, |c| c.hero.on_pointer_leave());
        });
    }
}
