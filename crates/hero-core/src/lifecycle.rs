//! Current/next image textures and the reveal transition between them.
//!
//! Image loads are asynchronous. Each request carries a [`Ticket`]; a result
//! is only bound if its ticket is the one outstanding for the current mount
//! generation, otherwise the texture is released on the spot. At most one
//! request is outstanding, which bounds the live set to current + next.

use crate::constants::IMAGE_RANDOM_MAX;
use crate::error::HeroError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// GPU (or test) resource that must be explicitly freed.
pub trait Release {
    fn release(self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    Current,
    Next,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionState {
    Idle,
    Revealing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub generation: u32,
    pub serial: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageRequest {
    pub ticket: Ticket,
    pub slot: Slot,
    pub url: String,
}

/// Builds cache-busting image URLs.
#[derive(Clone, Debug)]
pub struct ImageSource {
    base: String,
    rng: StdRng,
}

impl ImageSource {
    pub fn new(base: impl Into<String>, seed: u64) -> Self {
        Self {
            base: base.into(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            rng: StdRng::from_entropy(),
        }
    }

    pub fn next_url(&mut self) -> String {
        let n: u32 = self.rng.gen_range(0..IMAGE_RANDOM_MAX);
        let sep = if self.base.contains('?') { '&' } else { '?' };
        format!("{}{}random={}", self.base, sep, n)
    }
}

pub struct TextureLifecycle<T: Release> {
    source: ImageSource,
    generation: u32,
    serial: u32,
    pending: Option<(Ticket, Slot)>,
    current: Option<T>,
    next: Option<T>,
    state: TransitionState,
    blend: f32,
    revision: u64,
}

impl<T: Release> TextureLifecycle<T> {
    pub fn new(source: ImageSource) -> Self {
        Self {
            source,
            generation: 0,
            serial: 0,
            pending: None,
            current: None,
            next: None,
            state: TransitionState::Idle,
            blend: 0.0,
            revision: 0,
        }
    }

    /// Request the first image of a mount. Anything still bound from an
    /// earlier mount is released first.
    pub fn load_initial(&mut self) -> ImageRequest {
        if self.live_count() > 0 || self.pending.is_some() {
            self.dispose_all();
        }
        self.issue(Slot::Current)
    }

    /// Bind a finished load. A freshly bound current image immediately
    /// yields the prefetch request for the next one.
    pub fn on_loaded(&mut self, ticket: Ticket, texture: T) -> Result<Option<ImageRequest>, HeroError> {
        let slot = match self.pending {
            Some((expected, slot)) if expected == ticket => slot,
            _ => {
                texture.release();
                return Err(self.classify(ticket));
            }
        };
        self.pending = None;
        self.revision += 1;
        match slot {
            Slot::Current => {
                if let Some(old) = self.current.replace(texture) {
                    old.release();
                }
                log::info!("[loader] current image bound (gen {})", ticket.generation);
                Ok(Some(self.issue(Slot::Next)))
            }
            Slot::Next => {
                if let Some(old) = self.next.replace(texture) {
                    old.release();
                }
                log::info!("[loader] next image ready (gen {})", ticket.generation);
                Ok(None)
            }
        }
    }

    /// Record a failed load and clear the outstanding request; there is no
    /// immediate retry. A reveal waiting on the failed prefetch is dropped
    /// back to idle so the next burn can start over.
    pub fn on_failed(&mut self, ticket: Ticket, err: &HeroError) {
        match self.pending {
            Some((t, slot)) if t == ticket => {
                self.pending = None;
                log::error!("[loader] {}", err);
                if slot == Slot::Next && self.state == TransitionState::Revealing {
                    self.state = TransitionState::Idle;
                    self.blend = 0.0;
                    log::warn!("[reveal] abandoned, next image unavailable");
                }
            }
            _ => log::debug!("[loader] ignoring failure for {:?}: {}", ticket, err),
        }
    }

    /// Issue a fresh prefetch when there is neither a next image nor a
    /// request in flight, e.g. after an earlier prefetch failed.
    pub fn request_next_if_missing(&mut self) -> Option<ImageRequest> {
        if self.next.is_some() || self.pending.is_some() {
            return None;
        }
        log::info!("[loader] reissuing next image request");
        Some(self.issue(Slot::Next))
    }

    /// Enter the reveal. Returns false if a reveal is already running.
    pub fn begin_reveal(&mut self) -> bool {
        if self.state == TransitionState::Revealing {
            return false;
        }
        self.state = TransitionState::Revealing;
        log::info!("[reveal] started");
        true
    }

    /// Ease the blend factor toward its target. The blend only rises once
    /// the next image is available.
    pub fn advance_blend(&mut self, dt: f32, tau: f32) {
        let target = match self.state {
            TransitionState::Revealing if self.next.is_some() => 1.0,
            TransitionState::Revealing => self.blend,
            TransitionState::Idle => 0.0,
        };
        let k = 1.0 - (-dt.max(0.0) / tau.max(1e-3)).exp();
        self.blend += (target - self.blend) * k;
        self.blend = self.blend.clamp(0.0, 1.0);
    }

    /// Promote next to current once the reveal has settled. Returns the
    /// prefetch for the image after that.
    pub fn try_complete_reveal(
        &mut self,
        burn_level: f32,
        contact_active: bool,
        residual_smoke: f32,
        epsilon: f32,
    ) -> Option<ImageRequest> {
        if self.state != TransitionState::Revealing
            || contact_active
            || burn_level >= epsilon
            || residual_smoke >= epsilon
            || self.blend < 1.0 - epsilon
        {
            return None;
        }
        let promoted = self.next.take()?;
        if let Some(old) = self.current.replace(promoted) {
            old.release();
        }
        self.state = TransitionState::Idle;
        self.blend = 0.0;
        self.revision += 1;
        log::info!("[reveal] complete, next image promoted");
        Some(self.issue(Slot::Next))
    }

    /// Release every texture and invalidate outstanding requests. Safe to
    /// call repeatedly.
    pub fn dispose_all(&mut self) {
        let had_textures = self.live_count() > 0;
        if let Some(t) = self.current.take() {
            t.release();
        }
        if let Some(t) = self.next.take() {
            t.release();
        }
        if had_textures || self.pending.is_some() {
            self.generation = self.generation.wrapping_add(1);
            self.revision += 1;
        }
        self.pending = None;
        self.state = TransitionState::Idle;
        self.blend = 0.0;
    }

    fn issue(&mut self, slot: Slot) -> ImageRequest {
        self.serial = self.serial.wrapping_add(1);
        let ticket = Ticket {
            generation: self.generation,
            serial: self.serial,
        };
        self.pending = Some((ticket, slot));
        ImageRequest {
            ticket,
            slot,
            url: self.source.next_url(),
        }
    }

    fn classify(&self, ticket: Ticket) -> HeroError {
        if ticket.generation != self.generation || ticket.serial < self.serial {
            HeroError::StaleTicket
        } else {
            HeroError::UnknownTicket
        }
    }

    pub fn current(&self) -> Option<&T> {
        self.current.as_ref()
    }

    pub fn next(&self) -> Option<&T> {
        self.next.as_ref()
    }

    pub fn state(&self) -> TransitionState {
        self.state
    }

    pub fn blend(&self) -> f32 {
        self.blend
    }

    /// Blend as the compositor should apply it; zero without a next image.
    pub fn effective_blend(&self) -> f32 {
        if self.next.is_some() {
            self.blend
        } else {
            0.0
        }
    }

    pub fn live_count(&self) -> usize {
        self.current.is_some() as usize + self.next.is_some() as usize
    }

    /// Bumps whenever the bound (current, next) pair changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn pending(&self) -> Option<(Ticket, Slot)> {
        self.pending
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl<T: Release> Drop for TextureLifecycle<T> {
    fn drop(&mut self) {
        self.dispose_all();
    }
}
