//! GE command word decoding.
//!
//! A command word carries its command code in the top byte and a 24-bit
//! argument in the rest.

use bitflags::bitflags;

use crate::config::*;

#[inline]
pub fn cmd_of(op: u32) -> u8 {
    (op >> 24) as u8
}

#[inline]
pub fn arg_of(op: u32) -> u32 {
    op & 0x00FF_FFFF
}

bitflags! {
    /// The draw-issuing command kinds. Each one advances the per-frame prim count.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DrawCmds: u8 {
        const PRIM = 1 << 0;
        const BEZIER = 1 << 1;
        const SPLINE = 1 << 2;
        const VAP = 1 << 3;

        const CURVES = Self::BEZIER.bits() | Self::SPLINE.bits();
    }
}

impl DrawCmds {
    pub fn from_cmd(cmd: u8) -> Self {
        match cmd {
            GE_CMD_PRIM => DrawCmds::PRIM,
            GE_CMD_BEZIER => DrawCmds::BEZIER,
            GE_CMD_SPLINE => DrawCmds::SPLINE,
            GE_CMD_VAP => DrawCmds::VAP,
            _ => DrawCmds::empty(),
        }
    }

    /// Command codes contained in this set, in ascending order.
    pub fn codes(self) -> Vec<u8> {
        let mut codes = Vec::with_capacity(4);
        if self.contains(DrawCmds::PRIM) {
            codes.push(GE_CMD_PRIM);
        }
        if self.contains(DrawCmds::BEZIER) {
            codes.push(GE_CMD_BEZIER);
        }
        if self.contains(DrawCmds::SPLINE) {
            codes.push(GE_CMD_SPLINE);
        }
        if self.contains(DrawCmds::VAP) {
            codes.push(GE_CMD_VAP);
        }
        codes
    }
}

pub fn is_draw(cmd: u8) -> bool {
    !DrawCmds::from_cmd(cmd).is_empty()
}

/// Texture address and buffer width registers, the ones a texture change goes through.
pub fn is_texture_cmd(cmd: u8) -> bool {
    (GE_CMD_TEXADDR0..=GE_CMD_TEXADDR7).contains(&cmd)
        || (GE_CMD_TEXBUFWIDTH0..=GE_CMD_TEXBUFWIDTH7).contains(&cmd)
}

pub fn is_list_end(cmd: u8) -> bool {
    cmd == GE_CMD_END || cmd == GE_CMD_FINISH
}

pub fn cmd_name(cmd: u8) -> Option<&'static str> {
    let name = match cmd {
        GE_CMD_NOP => "NOP",
        GE_CMD_VADDR => "VADDR",
        GE_CMD_IADDR => "IADDR",
        GE_CMD_PRIM => "PRIM",
        GE_CMD_BEZIER => "BEZIER",
        GE_CMD_SPLINE => "SPLINE",
        GE_CMD_JUMP => "JUMP",
        GE_CMD_CALL => "CALL",
        GE_CMD_RET => "RET",
        GE_CMD_END => "END",
        GE_CMD_SIGNAL => "SIGNAL",
        GE_CMD_FINISH => "FINISH",
        GE_CMD_BASE => "BASE",
        GE_CMD_VAP => "VAP",
        GE_CMD_VERTEXTYPE => "VERTEXTYPE",
        GE_CMD_TEXFLUSH => "TEXFLUSH",
        GE_CMD_TEXADDR0..=GE_CMD_TEXADDR7 => "TEXADDR",
        GE_CMD_TEXBUFWIDTH0..=GE_CMD_TEXBUFWIDTH7 => "TEXBUFWIDTH",
        _ => return None,
    };
    Some(name)
}

/// One-line description of a command word, e.g. `PRIM 000003 (tris, 3 verts)`.
pub fn describe(op: u32) -> String {
    let cmd = cmd_of(op);
    let arg = arg_of(op);
    let mut desc = match cmd_name(cmd) {
        Some(name) if is_texture_cmd(cmd) => format!("{}{} {:06x}", name, cmd & 7, arg),
        Some(name) => format!("{} {:06x}", name, arg),
        None => format!("CMD_{:02X} {:06x}", cmd, arg),
    };
    if cmd == GE_CMD_PRIM {
        let count = arg & 0xFFFF;
        let kind = match (arg >> 16) & 7 {
            0 => "points",
            1 => "lines",
            2 => "line strip",
            3 => "tris",
            4 => "tri strip",
            5 => "tri fan",
            _ => "rects",
        };
        desc.push_str(&format!(" ({}, {} verts)", kind, count));
    }
    desc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmd_fields() {
        let op = 0x0403_0006;
        assert_eq!(cmd_of(op), GE_CMD_PRIM);
        assert_eq!(arg_of(op), 0x03_0006);
        assert!(is_draw(cmd_of(op)));
        assert!(!is_draw(GE_CMD_VERTEXTYPE));
    }

    #[test]
    fn test_draw_cmd_sets() {
        let all = DrawCmds::all();
        assert_eq!(all.codes(), vec![GE_CMD_PRIM, GE_CMD_BEZIER, GE_CMD_SPLINE, GE_CMD_VAP]);
        assert_eq!(DrawCmds::CURVES.codes(), vec![GE_CMD_BEZIER, GE_CMD_SPLINE]);
        assert_eq!(DrawCmds::from_cmd(GE_CMD_VAP), DrawCmds::VAP);
        assert!(DrawCmds::from_cmd(GE_CMD_END).is_empty());
    }

    #[test]
    fn test_describe() {
        assert_eq!(describe(0x0403_0006), "PRIM 030006 (tris, 6 verts)");
        assert_eq!(describe(0xA2_001234), "TEXADDR2 001234");
        assert_eq!(describe(0xF0_000001), "CMD_F0 000001");
        assert!(is_texture_cmd(0xAF));
        assert!(!is_texture_cmd(0xB0));
    }
}
