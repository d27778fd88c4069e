//! Drives a recorded display list through the debugger, the way the GE
//! interpreter would: one `notify` per command, flush/display/vblank events
//! around the draws, and a halt whenever the gate asks for one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::cmd::{cmd_of, is_draw, is_list_end};
use crate::debugger::Debugger;
use crate::error::Result;
use crate::gate::Verdict;
use crate::host::{BasicDisassembler, Disassembler, GpuHost};
use crate::mem::GeMemory;
use crate::stepping::SteppingLock;

/// Framebuffer parameters reported on each display.
const DISPLAY_FB: u32 = 0x0400_0000;
const DISPLAY_STRIDE: u32 = 512;
const DISPLAY_FORMAT: u32 = 3;

#[derive(Debug)]
pub struct ReplayHost {
    mem: GeMemory,
    flips: u64,
    shutting_down: Arc<AtomicBool>,
    disassembler: BasicDisassembler,
}

impl GpuHost for ReplayHost {
    fn flip_count(&self) -> u64 {
        self.flips
    }

    fn read_u32(&self, gaddr: u32) -> Result<u32> {
        self.mem.read_u32(gaddr)
    }

    fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::SeqCst)
    }

    fn disassembler(&self) -> Option<&dyn Disassembler> {
        Some(&self.disassembler)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplayStats {
    pub executed: usize,
    pub skipped: usize,
    pub breaks: usize,
    pub frames: u64,
}

#[derive(Debug)]
pub struct Replay {
    host: ReplayHost,
}

fn lock(dbg: &Mutex<Debugger>) -> MutexGuard<'_, Debugger> {
    dbg.lock().unwrap_or_else(|e| e.into_inner())
}

impl Replay {
    pub fn new(mem: GeMemory) -> Self {
        Self {
            host: ReplayHost {
                mem,
                flips: 0,
                shutting_down: Arc::new(AtomicBool::new(false)),
                disassembler: BasicDisassembler,
            },
        }
    }

    /// Raising this flag abandons pending halts and ends the replay.
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.host.shutting_down)
    }

    pub fn host(&self) -> &ReplayHost {
        &self.host
    }

    /// Replays the list `frames` times. The debugger lock is never held while halted.
    pub fn run(
        &mut self,
        dbg: &Mutex<Debugger>,
        stepping: &SteppingLock,
        frames: u64,
    ) -> Result<ReplayStats> {
        let mut stats = ReplayStats::default();

        for _ in 0..frames {
            let mut pc = self.host.mem.base();
            let mut pending_flush = false;

            loop {
                if self.host.is_shutting_down() {
                    debug!("replay stopped by shutdown at {:#010x}", pc);
                    return Ok(stats);
                }

                let op = self.host.read_u32(pc)?;
                let cmd = cmd_of(op);
                if pending_flush && !is_draw(cmd) {
                    lock(dbg).on_draw_flush();
                    pending_flush = false;
                }

                // A halt is armed under the debugger lock, so a control thread
                // that takes the lock afterwards always sees it and can resume it.
                let (verdict, suspension) = {
                    let mut dbg = lock(dbg);
                    if dbg.is_active() {
                        let verdict = dbg.notify(&self.host, pc);
                        let suspension = (verdict == Verdict::Break).then(|| stepping.arm());
                        (verdict, suspension)
                    } else {
                        (Verdict::Execute, None)
                    }
                };

                match verdict {
                    Verdict::Break => {
                        stats.breaks += 1;
                        if let Some(suspension) = suspension {
                            stepping.wait(suspension);
                        }
                        // Same command again, the gate lets it through this time.
                        continue;
                    }
                    Verdict::Skip => stats.skipped += 1,
                    Verdict::Execute => {
                        stats.executed += 1;
                        pending_flush |= is_draw(cmd);
                    }
                }

                if is_list_end(cmd) {
                    break;
                }
                match pc.checked_add(4) {
                    Some(next) if self.host.mem.contains(next) => pc = next,
                    _ => {
                        warn!("display list ran off the end at {:#010x}", pc);
                        break;
                    }
                }
            }

            let mut dbg = lock(dbg);
            if pending_flush {
                dbg.on_draw_flush();
            }
            self.host.flips += 1;
            stats.frames += 1;
            dbg.on_display(DISPLAY_FB, DISPLAY_STRIDE, DISPLAY_FORMAT);
            dbg.on_begin_frame();
        }

        Ok(stats)
    }
}
