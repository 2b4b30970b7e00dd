use glam::DVec2;

/// Per-point output of the force phase.
///
/// Each curve point owns exactly one slot for the duration of a step;
/// the force phase writes only its own slot, which keeps the phase
/// race-free under parallel execution.
#[derive(Clone, Copy, Debug, Default)]
pub struct ForceSlot {
    /// Accumulated displacement from all force contributions.
    pub delta: DVec2,
    /// Number of segments that exerted a repulsion contribution.
    pub contacts: u32,
    /// Whether the point crossed the freeze threshold this step.
    pub freeze: bool,
}

impl ForceSlot {
    /// Adds one force contribution.
    #[inline]
    pub fn add(&mut self, contribution: DVec2) {
        self.delta += contribution;
    }

    /// Rescales the accumulated displacement to `max_step` if its
    /// magnitude exceeds the clamp, preserving direction.
    pub fn clamp(&mut self, max_step: f64, max_step_sq: f64) {
        let sq = self.delta.length_squared();
        if sq > max_step_sq {
            self.delta *= max_step / sq.sqrt();
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// A buffer of [`ForceSlot`]s, one per live curve point.
///
/// Reused across steps; [`ForceBuffer::ensure_len`] resizes and clears
/// it at the start of every force phase.
#[derive(Debug)]
pub struct ForceBuffer {
    slots: Vec<ForceSlot>,
}

impl ForceBuffer {
    pub fn with_len(len: usize) -> Self {
        Self {
            slots: vec![ForceSlot::default(); len],
        }
    }

    /// Resizes the buffer to `len` and clears every slot, even when
    /// the length was already correct.
    pub fn ensure_len(&mut self, len: usize) {
        if self.slots.len() != len {
            self.slots.resize(len, ForceSlot::default());
        }
        self.clear();
    }

    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[ForceSlot] {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut [ForceSlot] {
        &mut self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_len_initializes_zeroed_slots() {
        let buf = ForceBuffer::with_len(3);
        assert_eq!(buf.len(), 3);
        for slot in buf.slots() {
            assert_eq!(slot.delta, DVec2::ZERO);
            assert_eq!(slot.contacts, 0);
            assert!(!slot.freeze);
        }
    }

    #[test]
    fn ensure_len_resizes_and_clears() {
        let mut buf = ForceBuffer::with_len(2);
        buf.slots_mut()[0].add(DVec2::new(1.0, 0.0));
        buf.slots_mut()[0].contacts = 4;
        buf.slots_mut()[1].freeze = true;

        buf.ensure_len(4);
        assert_eq!(buf.len(), 4);
        for slot in buf.slots() {
            assert_eq!(slot.delta, DVec2::ZERO);
            assert_eq!(slot.contacts, 0);
            assert!(!slot.freeze);
        }

        buf.ensure_len(1);
        assert_eq!(buf.len(), 1);
    }

    #[test]
    fn ensure_len_clears_even_when_length_matches() {
        let mut buf = ForceBuffer::with_len(2);
        buf.slots_mut()[1].add(DVec2::new(0.0, 2.0));

        buf.ensure_len(2);
        assert_eq!(buf.slots()[1].delta, DVec2::ZERO);
    }

    #[test]
    fn add_accumulates_contributions() {
        let mut slot = ForceSlot::default();
        slot.add(DVec2::new(1.0, 0.0));
        slot.add(DVec2::new(0.5, -2.0));
        assert_eq!(slot.delta, DVec2::new(1.5, -2.0));
    }

    #[test]
    fn clamp_rescales_to_max_magnitude() {
        let mut slot = ForceSlot::default();
        slot.add(DVec2::new(3.0, 4.0)); // magnitude 5
        slot.clamp(1.0, 1.0);

        assert!((slot.delta.x - 0.6).abs() < 1e-12);
        assert!((slot.delta.y - 0.8).abs() < 1e-12);
        assert!((slot.delta.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn clamp_leaves_small_displacements_untouched() {
        let mut slot = ForceSlot::default();
        slot.add(DVec2::new(0.1, 0.0));
        slot.clamp(1.0, 1.0);
        assert_eq!(slot.delta, DVec2::new(0.1, 0.0));
    }
}
