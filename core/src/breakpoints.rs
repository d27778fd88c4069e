//! GE breakpoints: by address, by command code, and on texture changes.

use std::collections::HashSet;
use std::fmt::Debug;

use crate::cmd::{cmd_of, is_texture_cmd};
use crate::error::{Error, Result};

/// Breakpoint storage the debugger consults and installs temporary triggers into.
pub trait GeBreakpoints: Debug + Send {
    /// Sees every command word the gate processes, breakpoints or not.
    fn observe(&mut self, _op: u32) {}

    fn is_breakpoint(&mut self, pc: u32, op: u32) -> bool;

    /// Whether any breakpoint, persistent or temporary, exists.
    fn has_breakpoints(&self) -> bool;

    fn add_texture_change_temp(&mut self);

    fn add_cmd_breakpoint(&mut self, cmd: u8, temp: bool);

    fn clear_temp(&mut self);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum CmdBreak {
    #[default]
    Off,
    Temp,
    Persistent,
}

#[derive(Debug)]
pub struct CmdBreakpoints {
    addrs: HashSet<u32>,
    cmds: [CmdBreak; 256],
    texture_change: bool,
    /// Last word seen per texture register, to tell a change from a rewrite.
    last_texture_ops: [Option<u32>; 16],
    /// The most recent observed word, if it changed a texture register.
    texture_changed_by: Option<u32>,
}

impl Default for CmdBreakpoints {
    fn default() -> Self {
        Self::new()
    }
}

impl CmdBreakpoints {
    pub fn new() -> Self {
        Self {
            addrs: HashSet::new(),
            cmds: [CmdBreak::Off; 256],
            texture_change: false,
            last_texture_ops: [None; 16],
            texture_changed_by: None,
        }
    }

    pub fn set_breakpoint(&mut self, gaddr: u32) -> Result<()> {
        if !self.addrs.insert(gaddr) {
            return Err(Error::RepeatedBreakpoint(gaddr));
        }
        Ok(())
    }

    pub fn rm_breakpoint(&mut self, gaddr: u32) -> Result<()> {
        if !self.addrs.remove(&gaddr) {
            return Err(Error::BreakpointNotFound(gaddr));
        }
        Ok(())
    }

    pub fn rm_cmd_breakpoint(&mut self, cmd: u8) {
        self.cmds[cmd as usize] = CmdBreak::Off;
    }

    pub fn has_temp(&self) -> bool {
        self.texture_change || self.cmds.iter().any(|c| *c == CmdBreak::Temp)
    }

    fn texture_changed(&mut self, op: u32) -> bool {
        let cmd = cmd_of(op);
        if !is_texture_cmd(cmd) {
            return false;
        }
        let slot = &mut self.last_texture_ops[(cmd & 0x0F) as usize];
        let changed = slot.is_some_and(|last| last != op);
        *slot = Some(op);
        changed
    }
}

impl GeBreakpoints for CmdBreakpoints {
    fn observe(&mut self, op: u32) {
        self.texture_changed_by = self.texture_changed(op).then_some(op);
    }

    fn is_breakpoint(&mut self, pc: u32, op: u32) -> bool {
        if self.addrs.contains(&pc) {
            return true;
        }
        if self.cmds[cmd_of(op) as usize] != CmdBreak::Off {
            return true;
        }
        self.texture_change && self.texture_changed_by == Some(op)
    }

    fn has_breakpoints(&self) -> bool {
        !self.addrs.is_empty() || self.texture_change || self.cmds.iter().any(|c| *c != CmdBreak::Off)
    }

    fn add_texture_change_temp(&mut self) {
        self.texture_change = true;
    }

    fn add_cmd_breakpoint(&mut self, cmd: u8, temp: bool) {
        let slot = &mut self.cmds[cmd as usize];
        *slot = match (*slot, temp) {
            // A temporary trigger never downgrades a persistent one.
            (CmdBreak::Persistent, _) => CmdBreak::Persistent,
            (_, true) => CmdBreak::Temp,
            (_, false) => CmdBreak::Persistent,
        };
    }

    fn clear_temp(&mut self) {
        self.texture_change = false;
        for slot in self.cmds.iter_mut() {
            if *slot == CmdBreak::Temp {
                *slot = CmdBreak::Off;
            }
        }
    }
}
