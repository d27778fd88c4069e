//! What the debugger reads from the emulator around it.

use std::fmt::Debug;

use crate::cmd;
use crate::error::Result;

pub trait Disassembler: Debug {
    fn disassemble(&self, pc: u32, op: u32) -> String;
}

/// Names the command and its argument, without list context.
#[derive(Debug, Default, Clone, Copy)]
pub struct BasicDisassembler;

impl Disassembler for BasicDisassembler {
    fn disassemble(&self, _pc: u32, op: u32) -> String {
        cmd::describe(op)
    }
}

/// The GPU side of the emulator, as seen from the command gate.
pub trait GpuHost: Debug {
    /// Monotonic count of displayed frames.
    fn flip_count(&self) -> u64;

    fn read_u32(&self, gaddr: u32) -> Result<u32>;

    fn is_shutting_down(&self) -> bool;

    /// `None` when nothing can inspect a halted GE.
    fn disassembler(&self) -> Option<&dyn Disassembler>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_disassembler() {
        let dis = BasicDisassembler;
        assert_eq!(dis.disassemble(0x0880_0000, 0x0C00_0000), "END 000000");
    }
}
