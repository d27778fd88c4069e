//! The per-command decision: execute, skip, or halt.

use crate::cmd::{cmd_of, is_draw};
use crate::debugger::Debugger;
use crate::host::GpuHost;
use crate::state::BreakMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Execute,
    /// Not selected by the prim restriction, don't run it.
    Skip,
    /// Halt here. The caller enters the stepping lock.
    Break,
}

impl Debugger {
    /// Called by the command interpreter before each command, only while active.
    pub fn notify(&mut self, host: &dyn GpuHost, pc: u32) -> Verdict {
        if !self.state.active {
            error!("GE debugger notified at {:#010x} while inactive", pc);
            debug_assert!(false, "GE debugger notified while inactive");
            return Verdict::Skip;
        }

        let op = host.read_u32(pc).unwrap_or_else(|e| {
            warn!("cannot read GE command: {}", e);
            0
        });
        let cmd = cmd_of(op);
        self.breakpoints.observe(op);
        if self.frame.observe(host.flip_count()) {
            trace!(
                "flip {}: {} prims last frame",
                self.frame.flip_epoch, self.frame.prims_last_frame
            );
        }

        let mut process = true;
        if is_draw(cmd) {
            let prim = self.frame.count_prim();
            process = self.prims.is_eligible(prim);
        }
        let verdict = if process { Verdict::Execute } else { Verdict::Skip };

        let is_breakpoint = match self.state.mode {
            BreakMode::SingleOp => true,
            BreakMode::Count => self.state.target_count == Some(self.frame.prims_this_frame),
            BreakMode::None
            | BreakMode::SingleDraw
            | BreakMode::TextureChange
            | BreakMode::NonTextureCommand
            | BreakMode::Frame
            | BreakMode::Vsync
            | BreakMode::Primitive
            | BreakMode::Curve => {
                self.breakpoints.has_breakpoints() && self.breakpoints.is_breakpoint(pc, op)
            }
        };

        let skip_once = self.state.skip_once_pc.take();
        if !is_breakpoint {
            return verdict;
        }
        if skip_once == Some(pc) {
            info!("skipping GE break at {:#010x} (last break was here)", pc);
            return verdict;
        }

        self.breakpoints.clear_temp();

        let dis = match host.disassembler() {
            Some(dis) if !host.is_shutting_down() => dis,
            _ => {
                self.state.mode = BreakMode::None;
                return verdict;
            }
        };

        let desc = dis.disassemble(pc, op);
        match self.state.requested_at.take() {
            Some(at) => info!(
                "waiting at {:#010x}, {} ({:.3}ms)",
                pc,
                desc,
                at.elapsed().as_secs_f64() * 1000.0
            ),
            None => info!("waiting at {:#010x}, {}", pc, desc),
        }

        self.state.skip_once_pc = Some(pc);
        self.state.mode = BreakMode::None;
        Verdict::Break
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::breakpoints::{CmdBreakpoints, GeBreakpoints};
    use crate::config::*;
    use crate::log;
    use crate::testutil::{op, FakeStepping, VecHost};

    fn debugger() -> Debugger {
        log::log_init(log::Level::Off);
        Debugger::new(Box::new(CmdBreakpoints::new()), Arc::new(FakeStepping::default()))
    }

    fn prim() -> u32 {
        op(GE_CMD_PRIM, 0x03_0003)
    }

    fn run(dbg: &mut Debugger, host: &VecHost) -> Vec<Verdict> {
        (0..host.words.len()).map(|i| dbg.notify(host, VecHost::pc(i))).collect()
    }

    #[test]
    fn test_counts_draws_only() {
        let mut dbg = debugger();
        dbg.activate(true);
        let host = VecHost::new(&[
            op(GE_CMD_VERTEXTYPE, 0),
            prim(),
            op(GE_CMD_BEZIER, 0x0202),
            op(GE_CMD_SPLINE, 0x0202),
            op(GE_CMD_VAP, 0),
            op(GE_CMD_TEXADDR0, 0),
        ]);
        assert!(run(&mut dbg, &host).iter().all(|v| *v == Verdict::Execute));
        assert_eq!(dbg.prims_this_frame(), 4);
    }

    #[test]
    fn test_frame_rollover() {
        let mut dbg = debugger();
        dbg.activate(true);
        let mut host = VecHost::new(&[prim(), prim(), prim(), op(GE_CMD_END, 0)]);
        run(&mut dbg, &host);
        assert_eq!(dbg.prims_this_frame(), 3);

        host.flips += 1;
        dbg.notify(&host, VecHost::pc(3));
        assert_eq!(dbg.prims_last_frame(), 3);
        assert_eq!(dbg.prims_this_frame(), 0);
    }

    #[test]
    fn test_single_op_skip_once() {
        let mut dbg = debugger();
        let host = VecHost::new(&[op(GE_CMD_VERTEXTYPE, 0)]);
        let pc = VecHost::pc(0);

        dbg.set_mode(BreakMode::SingleOp);
        assert_eq!(dbg.notify(&host, pc), Verdict::Break);
        assert_eq!(dbg.halted_at(), Some(pc));
        assert_eq!(dbg.mode(), BreakMode::None);

        // Resumed with another step request: the same command runs first.
        dbg.set_mode(BreakMode::SingleOp);
        assert_eq!(dbg.notify(&host, pc), Verdict::Execute);
        assert_eq!(dbg.halted_at(), None);
        assert_eq!(dbg.notify(&host, pc), Verdict::Break);
    }

    #[test]
    fn test_skip_once_is_single_use() {
        let mut dbg = debugger();
        let host = VecHost::new(&[op(GE_CMD_NOP, 0), op(GE_CMD_NOP, 1)]);
        dbg.set_mode(BreakMode::SingleOp);
        assert_eq!(dbg.notify(&host, 0), Verdict::Break);

        // Moving to another command drops the guard even without a break.
        assert_eq!(dbg.notify(&host, 4), Verdict::Execute);
        assert_eq!(dbg.halted_at(), None);
        dbg.set_mode(BreakMode::SingleOp);
        assert_eq!(dbg.notify(&host, 0), Verdict::Break);
    }

    #[test]
    fn test_restriction_eligibility() {
        let mut dbg = debugger();
        assert!(dbg.set_restriction_rule("2-3"));
        let host = VecHost::new(&[prim(), prim(), prim(), prim()]);
        assert_eq!(
            run(&mut dbg, &host),
            vec![Verdict::Skip, Verdict::Execute, Verdict::Execute, Verdict::Skip]
        );
    }

    #[test]
    fn test_restriction_ignores_non_draws() {
        let mut dbg = debugger();
        assert!(dbg.set_restriction_rule("5"));
        let host = VecHost::new(&[op(GE_CMD_VERTEXTYPE, 0), prim(), op(GE_CMD_END, 0)]);
        assert_eq!(
            run(&mut dbg, &host),
            vec![Verdict::Execute, Verdict::Skip, Verdict::Execute]
        );
    }

    #[test]
    fn test_negated_restrictions() {
        let mut dbg = debugger();
        assert!(dbg.set_restriction_rule("!2"));
        let host = VecHost::new(&[prim(), prim(), prim(), prim()]);
        assert_eq!(
            run(&mut dbg, &host),
            vec![Verdict::Execute, Verdict::Skip, Verdict::Execute, Verdict::Execute]
        );

        let mut dbg = debugger();
        assert!(dbg.set_restriction_rule("1-5,!3"));
        let host = VecHost::new(&[prim(); 6]);
        assert_eq!(
            run(&mut dbg, &host),
            vec![
                Verdict::Execute,
                Verdict::Execute,
                Verdict::Skip,
                Verdict::Execute,
                Verdict::Execute,
                Verdict::Skip
            ]
        );
    }

    #[test]
    fn test_malformed_rule_keeps_filtering() {
        let mut dbg = debugger();
        assert!(dbg.set_restriction_rule("2"));
        assert!(!dbg.set_restriction_rule("abc"));
        let host = VecHost::new(&[prim(), prim()]);
        assert_eq!(run(&mut dbg, &host), vec![Verdict::Skip, Verdict::Execute]);
    }

    #[test]
    fn test_primitive_mode() {
        let mut dbg = debugger();
        let host = VecHost::new(&[op(GE_CMD_VERTEXTYPE, 0), op(GE_CMD_VADDR, 0), prim(), prim()]);
        dbg.set_mode(BreakMode::Primitive);
        assert_eq!(dbg.notify(&host, VecHost::pc(0)), Verdict::Execute);
        assert_eq!(dbg.notify(&host, VecHost::pc(1)), Verdict::Execute);
        assert_eq!(dbg.notify(&host, VecHost::pc(2)), Verdict::Break);
        // The halt consumed the temporary triggers.
        assert!(!dbg.breakpoints().has_breakpoints());
        assert_eq!(dbg.notify(&host, VecHost::pc(3)), Verdict::Execute);
    }

    #[test]
    fn test_curve_mode() {
        let mut dbg = debugger();
        let host = VecHost::new(&[prim(), op(GE_CMD_VAP, 0), op(GE_CMD_SPLINE, 0x0404)]);
        dbg.set_mode(BreakMode::Curve);
        assert_eq!(
            run(&mut dbg, &host),
            vec![Verdict::Execute, Verdict::Execute, Verdict::Break]
        );
    }

    #[test]
    fn test_count_mode() {
        let mut dbg = debugger();
        let host = VecHost::new(&[prim(), op(GE_CMD_VERTEXTYPE, 0), prim(), prim()]);
        dbg.set_mode(BreakMode::Count);
        dbg.set_target_count(2, false);
        assert_eq!(dbg.notify(&host, VecHost::pc(0)), Verdict::Execute);
        assert_eq!(dbg.notify(&host, VecHost::pc(1)), Verdict::Execute);
        assert_eq!(dbg.notify(&host, VecHost::pc(2)), Verdict::Break);
        assert_eq!(dbg.halted_at(), Some(VecHost::pc(2)));

        // Moving on drops the halt address.
        assert_eq!(dbg.notify(&host, VecHost::pc(3)), Verdict::Execute);
        assert_eq!(dbg.halted_at(), None);
        assert_eq!(dbg.prims_this_frame(), 3);
    }

    #[test]
    fn test_skipped_draw_can_still_break() {
        let mut dbg = debugger();
        assert!(dbg.set_restriction_rule("2"));
        dbg.set_mode(BreakMode::Primitive);
        let host = VecHost::new(&[prim(), prim()]);
        // The halt happens on prim 1 even though it won't be drawn.
        assert_eq!(dbg.notify(&host, 0), Verdict::Break);
        assert_eq!(dbg.notify(&host, 4), Verdict::Execute);
    }

    #[test]
    fn test_skip_once_honours_restriction() {
        let mut dbg = debugger();
        assert!(dbg.set_restriction_rule("5"));
        let host = VecHost::new(&[prim()]);
        dbg.set_mode(BreakMode::SingleOp);
        assert_eq!(dbg.notify(&host, 0), Verdict::Break);
        dbg.set_mode(BreakMode::SingleOp);
        assert_eq!(dbg.notify(&host, 0), Verdict::Skip);
    }

    #[test]
    fn test_persistent_breakpoints() {
        log::log_init(log::Level::Off);
        let mut bps = CmdBreakpoints::new();
        bps.set_breakpoint(VecHost::pc(1)).unwrap();
        let mut dbg = Debugger::new(Box::new(bps), Arc::new(FakeStepping::default()));
        dbg.activate(true);

        let host = VecHost::new(&[op(GE_CMD_NOP, 0), op(GE_CMD_NOP, 0), op(GE_CMD_NOP, 0)]);
        assert_eq!(
            run(&mut dbg, &host),
            vec![Verdict::Execute, Verdict::Break, Verdict::Execute]
        );
        // Persistent ones are not consumed.
        assert!(dbg.breakpoints().has_breakpoints());
        assert_eq!(dbg.notify(&host, VecHost::pc(1)), Verdict::Break);
    }

    #[test]
    fn test_texture_change_mode() {
        let mut dbg = debugger();
        dbg.activate(true);
        assert!(!dbg.breakpoints().has_breakpoints());
        let host = VecHost::new(&[
            op(GE_CMD_TEXADDR0, 0x1000),
            op(GE_CMD_TEXADDR0, 0x1000),
            op(GE_CMD_TEXADDR0, 0x2000),
        ]);
        assert_eq!(dbg.notify(&host, 0), Verdict::Execute);
        dbg.set_mode(BreakMode::TextureChange);
        assert_eq!(dbg.notify(&host, 4), Verdict::Execute);
        assert_eq!(dbg.notify(&host, 8), Verdict::Break);
    }

    #[test]
    fn test_texture_change_first_write_after_arming() {
        let mut dbg = debugger();
        dbg.activate(true);
        let host = VecHost::new(&[op(GE_CMD_TEXADDR0, 0x1000), op(GE_CMD_TEXADDR0, 0x2000)]);
        assert_eq!(dbg.notify(&host, 0), Verdict::Execute);
        dbg.set_mode(BreakMode::TextureChange);
        assert_eq!(dbg.notify(&host, 4), Verdict::Break);
    }

    #[test]
    fn test_halt_abandoned_when_shutting_down() {
        let mut dbg = debugger();
        let mut host = VecHost::new(&[prim()]);
        host.shutting_down = true;
        dbg.set_mode(BreakMode::Primitive);
        assert_eq!(dbg.notify(&host, 0), Verdict::Execute);
        assert_eq!(dbg.mode(), BreakMode::None);
        assert_eq!(dbg.halted_at(), None);
        assert!(!dbg.breakpoints().has_breakpoints());
    }

    #[test]
    fn test_halt_abandoned_without_disassembler() {
        let mut dbg = debugger();
        assert!(dbg.set_restriction_rule("2"));
        let mut host = VecHost::new(&[prim()]);
        host.headless = true;
        dbg.set_mode(BreakMode::SingleOp);
        assert_eq!(dbg.notify(&host, 0), Verdict::Skip);
        assert_eq!(dbg.mode(), BreakMode::None);
    }

    #[test]
    fn test_unreadable_command_is_nop() {
        let mut dbg = debugger();
        dbg.set_mode(BreakMode::Primitive);
        let host = VecHost::new(&[]);
        assert_eq!(dbg.notify(&host, 0x100), Verdict::Execute);
        assert_eq!(dbg.prims_this_frame(), 0);
        assert_eq!(dbg.mode(), BreakMode::Primitive);
    }

    #[test]
    fn test_reactivation_cycles() {
        let mut dbg = debugger();
        let host = VecHost::new(&[prim()]);
        for _ in 0..3 {
            dbg.set_mode(BreakMode::Primitive);
            dbg.deactivate();
            assert!(!dbg.breakpoints().has_breakpoints());
            dbg.activate(true);
            assert_eq!(dbg.notify(&host, 0), Verdict::Execute);
        }
        assert_eq!(dbg.prims_this_frame(), 3);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "while inactive")]
    fn test_notify_inactive_panics() {
        let mut dbg = debugger();
        let host = VecHost::new(&[prim()]);
        dbg.notify(&host, 0);
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn test_notify_inactive_skips() {
        let mut dbg = debugger();
        let host = VecHost::new(&[prim()]);
        assert_eq!(dbg.notify(&host, 0), Verdict::Skip);
        assert_eq!(dbg.prims_this_frame(), 0);
    }
}
