/// Bookkeeping for the requestAnimationFrame loop. Each `start` hands out a
/// new id; a scheduled callback keeps going only while its id is current.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoopState {
    running: bool,
    id: u32,
}

impl LoopState {
    /// Begin a new loop. Returns `None` if one is already running.
    pub fn start(&mut self) -> Option<u32> {
        if self.running {
            return None;
        }
        self.running = true;
        self.id = self.id.wrapping_add(1);
        Some(self.id)
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Whether the callback started as `id` should schedule another frame.
    #[inline]
    pub fn is_current(&self, id: u32) -> bool {
        self.running && self.id == id
    }
}
