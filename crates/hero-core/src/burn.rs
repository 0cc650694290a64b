use crate::params::HeroParams;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BurnPhase {
    Dormant,
    Charging,
    Triggered,
}

/// Accumulates contact time into a burn level and latches once it crosses
/// the threshold. The latch is only cleared by [`BurnMeter::reset`].
#[derive(Clone, Debug)]
pub struct BurnMeter {
    level: f32,
    burned: bool,
    charge_per_frame: f32,
    decay_per_frame: f32,
    threshold: f32,
}

impl Default for BurnMeter {
    fn default() -> Self {
        Self::new(&HeroParams::default())
    }
}

impl BurnMeter {
    pub fn new(params: &HeroParams) -> Self {
        Self {
            level: 0.0,
            burned: false,
            charge_per_frame: params.burn_charge_per_frame.max(0.0),
            decay_per_frame: params.burn_decay_per_frame.max(0.0),
            threshold: params.burn_threshold,
        }
    }

    #[inline]
    pub fn level(&self) -> f32 {
        self.level
    }

    #[inline]
    pub fn burned(&self) -> bool {
        self.burned
    }

    pub fn phase(&self) -> BurnPhase {
        if self.burned {
            BurnPhase::Triggered
        } else if self.level > 0.0 {
            BurnPhase::Charging
        } else {
            BurnPhase::Dormant
        }
    }

    /// Advance one frame. Returns `Some(true)` on the frame the threshold is
    /// first crossed, `None` otherwise.
    pub fn tick(&mut self, contact_active: bool) -> Option<bool> {
        if contact_active {
            self.level += self.charge_per_frame;
        } else {
            self.level = (self.level - self.decay_per_frame).max(0.0);
        }
        if !self.burned && self.level >= self.threshold {
            self.burned = true;
            log::info!("[burn] threshold crossed at level {:.3}", self.level);
            return Some(true);
        }
        None
    }

    /// Clear level and latch. Returns `Some(false)` if the meter was latched.
    pub fn reset(&mut self) -> Option<bool> {
        self.level = 0.0;
        if std::mem::take(&mut self.burned) {
            Some(false)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_meter_is_dormant() {
        let m = BurnMeter::default();
        assert_eq!(m.phase(), BurnPhase::Dormant);
        assert_eq!(m.level(), 0.0);
        assert!(!m.burned());
    }

    #[test]
    fn near_miss_returns_to_dormant_silently() {
        let mut m = BurnMeter::default();
        for _ in 0..100 {
            assert_eq!(m.tick(true), None);
        }
        assert_eq!(m.phase(), BurnPhase::Charging);
        for _ in 0..100 {
            assert_eq!(m.tick(false), None);
        }
        assert_eq!(m.phase(), BurnPhase::Dormant);
    }

    #[test]
    fn latch_survives_decay_until_reset() {
        let mut m = BurnMeter::default();
        let mut fired = 0;
        for _ in 0..500 {
            if m.tick(true) == Some(true) {
                fired += 1;
            }
        }
        assert_eq!(fired, 1);
        for _ in 0..500 {
            assert_eq!(m.tick(false), None);
        }
        assert_eq!(m.level(), 0.0);
        assert_eq!(m.phase(), BurnPhase::Triggered);
        assert_eq!(m.reset(), Some(false));
        assert_eq!(m.reset(), None);
        assert_eq!(m.phase(), BurnPhase::Dormant);
    }
}
