//! Per-frame draw accounting, keyed on the host's flip counter.

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameCounters {
    pub flip_epoch: u64,
    pub prims_this_frame: i32,
    pub prims_last_frame: i32,
}

impl FrameCounters {
    pub const ZERO: Self = Self {
        flip_epoch: 0,
        prims_this_frame: 0,
        prims_last_frame: 0,
    };

    /// Rolls the counts over if `epoch` is new. Returns true on rollover.
    pub fn observe(&mut self, epoch: u64) -> bool {
        if epoch == self.flip_epoch {
            return false;
        }
        self.prims_last_frame = self.prims_this_frame;
        self.prims_this_frame = 0;
        self.flip_epoch = epoch;
        true
    }

    /// Counts one draw and returns its 1-based index within the frame.
    pub fn count_prim(&mut self) -> i32 {
        self.prims_this_frame = self.prims_this_frame.saturating_add(1);
        self.prims_this_frame
    }
}
