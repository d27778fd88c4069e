//! Coarse engine events that move a pending break request along.

use crate::debugger::Debugger;
use crate::state::BreakMode;

impl Debugger {
    /// The draw engine flushed. Flushes never pass through `notify`, so a
    /// draw request becomes a break on the prim that follows.
    pub fn on_draw_flush(&mut self) {
        if !self.state.active {
            return;
        }
        if self.state.mode == BreakMode::SingleDraw
            && !self.stepping.is_stepping()
            && self.state.prim_after_draw
        {
            info!("flush detected, breaking at next PRIM");
            self.state.prim_after_draw = false;
            self.set_mode(BreakMode::Primitive);
        }
    }

    /// A frame was handed to the display.
    pub fn on_display(&mut self, framebuf: u32, stride: u32, format: u32) {
        if !self.state.active {
            return;
        }
        trace!("display fb {:#010x} stride {} format {}", framebuf, stride, format);
        if self.state.mode == BreakMode::Frame {
            self.state.mode = BreakMode::SingleOp;
        }
    }

    /// Vblank ended and a new frame begins.
    pub fn on_begin_frame(&mut self) {
        if !self.state.active {
            return;
        }
        if self.state.mode == BreakMode::Vsync {
            self.state.mode = BreakMode::SingleOp;
        }
    }
}
