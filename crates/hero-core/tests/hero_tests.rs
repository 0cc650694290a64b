// End-to-end scheduler scenarios driven through the public step API.

use hero_core::constants::MAX_STEP_DT_SEC;
use hero_core::{HeroError, HeroParams, HeroState, ImageSource, Pass, Release, Slot, TransitionState};
use std::cell::RefCell;
use std::rc::Rc;

const DT: f32 = 1.0 / 60.0;

#[derive(Default)]
struct Ledger {
    live: Vec<u32>,
    released: Vec<u32>,
}

struct FakeTexture {
    id: u32,
    ledger: Rc<RefCell<Ledger>>,
}

impl Release for FakeTexture {
    fn release(self) {
        let mut l = self.ledger.borrow_mut();
        l.live.retain(|&id| id != self.id);
        l.released.push(self.id);
    }
}

struct Harness {
    hero: HeroState<FakeTexture>,
    ledger: Rc<RefCell<Ledger>>,
    next_id: u32,
}

impl Harness {
    fn new() -> Self {
        let mut hero = HeroState::new(HeroParams::default(), ImageSource::new("https://img.test/hero", 42));
        hero.set_viewport(800, 600);
        Self {
            hero,
            ledger: Rc::new(RefCell::new(Ledger::default())),
            next_id: 1,
        }
    }

    fn texture(&mut self) -> FakeTexture {
        let id = self.next_id;
        self.next_id += 1;
        self.ledger.borrow_mut().live.push(id);
        FakeTexture {
            id,
            ledger: self.ledger.clone(),
        }
    }

    /// Mount and resolve both the current and the prefetched image.
    fn mount_loaded(&mut self) {
        let first = self.hero.mount();
        let tex = self.texture();
        let next = self.hero.on_image_loaded(first.ticket, tex).expect("prefetch");
        let tex = self.texture();
        assert!(self.hero.on_image_loaded(next.ticket, tex).is_none());
    }

    /// Hold the pointer on the plane until the meter latches, then leave.
    /// Returns the output of the first frame without contact.
    fn burn_and_release(&mut self) -> hero_core::FrameOutput {
        self.hero.on_pointer_move(400.0, 300.0);
        for _ in 0..417 {
            self.hero.step(DT);
        }
        assert!(self.hero.burn().burned());
        self.hero.on_pointer_leave();
        self.hero.step(DT)
    }

    fn assert_bound_textures_live(&self) {
        let l = self.ledger.borrow();
        let textures = self.hero.textures();
        for t in textures.current().into_iter().chain(textures.next()) {
            assert!(!l.released.contains(&t.id), "released texture {} still bound", t.id);
        }
        assert!(l.live.len() <= 2);
    }
}

#[test]
fn nothing_renders_before_the_first_image() {
    let mut h = Harness::new();
    let _req = h.hero.mount();
    let out = h.hero.step(DT);
    assert!(!out.render);
    assert!(out.burned_changed.is_none());
}

#[test]
fn burn_then_release_reveals_next_image_once() {
    let mut h = Harness::new();
    h.mount_loaded();

    h.hero.on_pointer_move(400.0, 300.0);
    assert!(h.hero.tracker().contact().active);

    let mut burned_at = Vec::new();
    for frame in 1..=417 {
        let out = h.hero.step(DT);
        assert!(out.render);
        assert_eq!(out.plan.schedule().as_slice(), &Pass::ALL);
        if let Some(b) = out.burned_changed {
            burned_at.push((frame, b));
        }
    }
    assert_eq!(burned_at, vec![(417, true)]);

    h.hero.on_pointer_leave();
    let out = h.hero.step(DT);
    assert_eq!(out.burned_changed, Some(false));
    assert_eq!(h.hero.textures().state(), TransitionState::Revealing);

    let mut requests = Vec::new();
    for _ in 0..1000 {
        let out = h.hero.step(DT);
        h.assert_bound_textures_live();
        assert!(out.render);
        assert!(out.burned_changed.is_none());
        assert_eq!(out.plan.schedule().len(), 3);
        if let Some(req) = out.request {
            requests.push(req);
        }
    }
    assert_eq!(requests.len(), 1);
    assert_eq!(h.ledger.borrow().released, vec![1]);
    assert_eq!(h.hero.textures().current().map(|t| t.id), Some(2));
    assert_eq!(h.hero.textures().state(), TransitionState::Idle);
}

#[test]
fn reveal_waits_for_contact_to_stay_off() {
    let mut h = Harness::new();
    h.mount_loaded();
    h.hero.on_pointer_move(400.0, 300.0);
    for _ in 0..417 {
        h.hero.step(DT);
    }
    h.hero.on_pointer_leave();
    h.hero.step(DT);
    h.hero.on_pointer_move(400.0, 300.0);
    for _ in 0..300 {
        let out = h.hero.step(DT);
        assert!(out.request.is_none());
    }
    assert_eq!(h.hero.textures().state(), TransitionState::Revealing);
    assert!(h.ledger.borrow().released.is_empty());
}

#[test]
fn step_clamps_long_and_invalid_intervals() {
    let mut h = Harness::new();
    h.mount_loaded();
    assert_eq!(h.hero.step(2.0).inputs.dt, MAX_STEP_DT_SEC);
    assert_eq!(h.hero.step(f32::NAN).inputs.dt, 0.0);
    assert_eq!(h.hero.step(-1.0).inputs.dt, 0.0);
}

#[test]
fn hover_raises_ripple_strength() {
    let mut h = Harness::new();
    h.mount_loaded();
    let idle = h.hero.step(DT).composite.ripple_strength;
    h.hero.on_pointer_move(400.0, 300.0);
    let mut hovered = 0.0;
    for _ in 0..30 {
        hovered = h.hero.step(DT).composite.ripple_strength;
    }
    assert_eq!(idle, 0.0);
    assert!(hovered > 0.0);
}

#[test]
fn remount_discards_late_results() {
    let mut h = Harness::new();
    let stale = h.hero.mount();
    h.hero.unmount();
    let fresh = h.hero.mount();
    let tex = h.texture();
    assert!(h.hero.on_image_loaded(stale.ticket, tex).is_none());
    assert!(h.hero.textures().current().is_none());
    assert_eq!(h.ledger.borrow().released, vec![1]);
    let tex = h.texture();
    assert!(h.hero.on_image_loaded(fresh.ticket, tex).is_some());
    assert!(h.hero.step(DT).render);
}

#[test]
fn touch_is_ignored_while_input_disabled() {
    let mut h = Harness::new();
    h.mount_loaded();
    h.hero.set_input_disabled(true);
    assert!(!h.hero.on_touch_start(0, 400.0, 300.0).consume);
    assert!(!h.hero.step(DT).inputs.contact_active);
    h.hero.set_input_disabled(false);
    assert!(h.hero.on_touch_start(0, 400.0, 300.0).consume);
    assert!(h.hero.step(DT).inputs.contact_active);
}

#[test]
fn failed_prefetch_is_reissued_when_a_reveal_begins() {
    let mut h = Harness::new();
    let first = h.hero.mount();
    let tex = h.texture();
    let next = h.hero.on_image_loaded(first.ticket, tex).expect("prefetch");
    h.hero.on_image_failed(next.ticket, &HeroError::ImageFetch("HTTP 503".into()));

    let out = h.burn_and_release();
    assert_eq!(out.burned_changed, Some(false));
    let retry = out.request.expect("reissued prefetch");
    assert_eq!(retry.slot, Slot::Next);
    assert_eq!(h.hero.textures().state(), TransitionState::Revealing);

    let tex = h.texture();
    assert!(h.hero.on_image_loaded(retry.ticket, tex).is_none());
    let mut requests = 0;
    for _ in 0..1000 {
        if h.hero.step(DT).request.is_some() {
            requests += 1;
        }
        h.assert_bound_textures_live();
    }
    assert_eq!(requests, 1);
    assert!(h.hero.residual_smoke() < h.hero.params().reveal_epsilon);
    assert_eq!(h.hero.textures().state(), TransitionState::Idle);
    assert_eq!(h.hero.textures().current().map(|t| t.id), Some(2));
    assert_eq!(h.ledger.borrow().released, vec![1]);

    // The follow-up prefetch is still in flight, so a second burn just waits.
    let out = h.burn_and_release();
    assert_eq!(out.burned_changed, Some(false));
    assert!(out.request.is_none());
    assert!(!h.hero.burn().burned());
}

#[test]
fn prefetch_failing_mid_reveal_lets_the_next_burn_retry() {
    let mut h = Harness::new();
    let first = h.hero.mount();
    let tex = h.texture();
    let next = h.hero.on_image_loaded(first.ticket, tex).expect("prefetch");

    let out = h.burn_and_release();
    assert!(out.request.is_none());
    assert_eq!(h.hero.textures().state(), TransitionState::Revealing);
    h.hero.on_image_failed(next.ticket, &HeroError::ImageDecode("truncated".into()));
    assert_eq!(h.hero.textures().state(), TransitionState::Idle);
    assert!(h.hero.step(DT).render);

    let out = h.burn_and_release();
    assert_eq!(out.burned_changed, Some(false));
    assert_eq!(out.request.map(|r| r.slot), Some(Slot::Next));
    assert_eq!(h.hero.textures().state(), TransitionState::Revealing);
}
