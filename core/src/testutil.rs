//! Fakes shared by the unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::error::{Error, Result};
use crate::host::{BasicDisassembler, Disassembler, GpuHost};
use crate::stepping::Stepping;

/// Records resumes instead of blocking.
#[derive(Debug, Default)]
pub struct FakeStepping {
    stepping: AtomicBool,
    resumes: AtomicUsize,
}

impl FakeStepping {
    pub fn park(&self) {
        self.stepping.store(true, Ordering::SeqCst);
    }

    pub fn resumes(&self) -> usize {
        self.resumes.load(Ordering::SeqCst)
    }
}

impl Stepping for FakeStepping {
    fn is_stepping(&self) -> bool {
        self.stepping.load(Ordering::SeqCst)
    }

    fn resume(&self) {
        if self.stepping.swap(false, Ordering::SeqCst) {
            self.resumes.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Command words at 4-byte steps from address 0.
#[derive(Debug, Default)]
pub struct VecHost {
    pub words: Vec<u32>,
    pub flips: u64,
    pub shutting_down: bool,
    pub headless: bool,
}

impl VecHost {
    pub fn new(words: &[u32]) -> Self {
        Self {
            words: words.to_vec(),
            ..Self::default()
        }
    }

    pub fn pc(index: usize) -> u32 {
        (index * 4) as u32
    }
}

impl GpuHost for VecHost {
    fn flip_count(&self) -> u64 {
        self.flips
    }

    fn read_u32(&self, gaddr: u32) -> Result<u32> {
        self.words
            .get(gaddr as usize / 4)
            .copied()
            .ok_or(Error::MemAccessFault(gaddr))
    }

    fn is_shutting_down(&self) -> bool {
        self.shutting_down
    }

    fn disassembler(&self) -> Option<&dyn Disassembler> {
        if self.headless {
            None
        } else {
            Some(&BasicDisassembler)
        }
    }
}

pub fn op(cmd: u8, arg: u32) -> u32 {
    debug_assert!(arg <= 0x00FF_FFFF);
    ((cmd as u32) << 24) | arg
}
