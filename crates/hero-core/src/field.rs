//! Double-buffered field storage.
//!
//! Each simulated field lives in two fixed slots. One slot is "current"
//! (read by the next pass), the other is the write target; [`PingPong::swap`]
//! flips the roles once a pass has written a full-grid result. The same
//! abstraction holds CPU grids and GPU render targets.

/// Logical simulation fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Velocity,
    Density,
    /// Scratch field, recomputed every frame.
    Curl,
}

impl Field {
    #[inline]
    pub fn is_double_buffered(self) -> bool {
        !matches!(self, Field::Curl)
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Velocity => "velocity",
            Field::Density => "density",
            Field::Curl => "curl",
        }
    }
}

/// Two fixed slots plus the index of the current one.
#[derive(Clone, Debug)]
pub struct PingPong<T> {
    slots: [T; 2],
    current: usize,
}

impl<T> PingPong<T> {
    pub fn new(first: T, second: T) -> Self {
        Self {
            slots: [first, second],
            current: 0,
        }
    }

    pub fn from_fn(mut make: impl FnMut(usize) -> T) -> Self {
        Self::new(make(0), make(1))
    }

    /// Slot holding the latest complete result.
    #[inline]
    pub fn read(&self) -> &T {
        &self.slots[self.current]
    }

    #[inline]
    pub fn write_target(&self) -> &T {
        &self.slots[1 - self.current]
    }

    #[inline]
    pub fn write_target_mut(&mut self) -> &mut T {
        &mut self.slots[1 - self.current]
    }

    /// Borrow the current slot for reading and the other for writing.
    pub fn split(&mut self) -> (&T, &mut T) {
        let [a, b] = &mut self.slots;
        if self.current == 0 {
            (&*a, b)
        } else {
            (&*b, a)
        }
    }

    #[inline]
    pub fn swap(&mut self) {
        self.current = 1 - self.current;
    }

    #[inline]
    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter()
    }

    /// Clear both slots in place and make slot 0 current again.
    pub fn reset_with(&mut self, mut clear: impl FnMut(&mut T)) {
        for slot in &mut self.slots {
            clear(slot);
        }
        self.current = 0;
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> PingPong<U> {
        let [a, b] = self.slots;
        PingPong {
            slots: [f(a), f(b)],
            current: self.current,
        }
    }
}
