//! The GE debugger context and its control operations.
//!
//! Control operations are made from a UI or control thread, typically while
//! the emulation thread is parked in the stepping lock. Any of them that
//! changes what the debugger waits for also releases that thread.

use std::sync::Arc;
use std::time::Instant;

use crate::breakpoints::GeBreakpoints;
use crate::frame::FrameCounters;
use crate::range::{PrimRange, PrimRangeFilter};
use crate::state::{BreakMode, BreakState};
use crate::stepping::Stepping;

#[derive(Debug)]
pub struct Debugger {
    pub(crate) state: BreakState,
    pub(crate) frame: FrameCounters,
    pub(crate) prims: PrimRangeFilter,
    pub(crate) breakpoints: Box<dyn GeBreakpoints>,
    pub(crate) stepping: Arc<dyn Stepping>,
}

impl Debugger {
    pub fn new(breakpoints: Box<dyn GeBreakpoints>, stepping: Arc<dyn Stepping>) -> Self {
        Self {
            state: BreakState::new(),
            frame: FrameCounters::ZERO,
            prims: PrimRangeFilter::new(),
            breakpoints,
            stepping,
        }
    }

    /// `true` engages the gate without touching the mode, `false` is `deactivate`.
    pub fn activate(&mut self, flag: bool) {
        if !flag {
            self.deactivate();
        } else if !self.state.active {
            debug!("GE debugger activated");
            self.state.active = true;
        }
    }

    /// Drops any break request and releases a halted GE. Counters, the
    /// restriction rule and the skip-once address survive.
    pub fn deactivate(&mut self) {
        if self.state.active {
            debug!("GE debugger deactivated");
        }
        self.state.active = false;
        self.state.mode = BreakMode::None;
        self.state.target_count = None;
        self.breakpoints.clear_temp();
        self.stepping.resume();
        self.state.requested_at = None;
    }

    pub fn is_active(&self) -> bool {
        self.state.active
    }

    pub fn mode(&self) -> BreakMode {
        self.state.mode
    }

    pub fn set_mode(&mut self, mode: BreakMode) {
        self.activate(true);
        debug!("break mode {} -> {}", self.state.mode, mode);

        self.breakpoints.clear_temp();
        self.state.mode = mode;
        self.state.target_count = None;
        match mode {
            BreakMode::TextureChange => self.breakpoints.add_texture_change_temp(),
            BreakMode::Primitive | BreakMode::Count | BreakMode::Curve => {
                for cmd in mode.temp_triggers().codes() {
                    self.breakpoints.add_cmd_breakpoint(cmd, true);
                }
            }
            // Turned into Primitive by the next draw flush.
            BreakMode::SingleDraw => self.state.prim_after_draw = true,
            BreakMode::None
            | BreakMode::SingleOp
            | BreakMode::NonTextureCommand
            | BreakMode::Frame
            | BreakMode::Vsync => {}
        }

        if self.stepping.is_stepping() {
            self.stepping.resume();
        }
        self.state.requested_at = match mode {
            BreakMode::None => None,
            _ => Some(Instant::now()),
        };
    }

    /// Prim index to halt at in `BreakMode::Count`, absolute or from the current count.
    pub fn set_target_count(&mut self, value: i32, relative: bool) {
        let target = if relative {
            self.frame.prims_this_frame.saturating_add(value)
        } else {
            value
        };
        self.state.target_count = Some(target);
    }

    pub fn target_count(&self) -> Option<i32> {
        self.state.target_count
    }

    /// Address of the most recent halt, until execution moves past it.
    pub fn halted_at(&self) -> Option<u32> {
        self.state.skip_once_pc
    }

    pub fn prims_this_frame(&self) -> i32 {
        self.frame.prims_this_frame
    }

    pub fn prims_last_frame(&self) -> i32 {
        self.frame.prims_last_frame
    }

    /// Restricts which draws are processed. Rejects malformed rules with no effect.
    pub fn set_restriction_rule(&mut self, rule: &str) -> bool {
        self.activate(true);
        match self.prims.set_rule(Some(rule)) {
            Ok(()) => {
                debug!("prim restriction '{}'", rule);
                true
            }
            Err(e) => {
                warn!("rejected prim restriction: {}", e);
                false
            }
        }
    }

    pub fn restriction_rule(&self) -> &str {
        self.prims.rule()
    }

    pub fn restriction(&self) -> &[PrimRange] {
        self.prims.ranges()
    }

    pub fn breakpoints(&self) -> &dyn GeBreakpoints {
        self.breakpoints.as_ref()
    }

    pub fn breakpoints_mut(&mut self) -> &mut dyn GeBreakpoints {
        self.breakpoints.as_mut()
    }
}
