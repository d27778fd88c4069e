/// Largest primitive index a restriction rule can name.
pub const MAX_PRIMS: i32 = 0x7FFFFFFF;

/// Default guest address a command list is mapped at.
pub const LIST_BASE: u32 = 0x0880_0000;

/// Granularity of the command memory mapping.
pub const PAGE_SIZE: usize = 4096;

/// Interval the control thread polls the stepping lock at, in milliseconds.
pub const POLL_INTERVAL_MS: u64 = 50;

// GE command codes, the top byte of a command word.
pub const GE_CMD_NOP: u8 = 0x00;
pub const GE_CMD_VADDR: u8 = 0x01;
pub const GE_CMD_IADDR: u8 = 0x02;
pub const GE_CMD_PRIM: u8 = 0x04;
pub const GE_CMD_BEZIER: u8 = 0x05;
pub const GE_CMD_SPLINE: u8 = 0x06;
pub const GE_CMD_JUMP: u8 = 0x08;
pub const GE_CMD_CALL: u8 = 0x0A;
pub const GE_CMD_RET: u8 = 0x0B;
pub const GE_CMD_END: u8 = 0x0C;
pub const GE_CMD_SIGNAL: u8 = 0x0E;
pub const GE_CMD_FINISH: u8 = 0x0F;
pub const GE_CMD_BASE: u8 = 0x10;
pub const GE_CMD_VAP: u8 = 0x11;
pub const GE_CMD_VERTEXTYPE: u8 = 0x12;
pub const GE_CMD_TEXADDR0: u8 = 0xA0;
pub const GE_CMD_TEXADDR7: u8 = 0xA7;
pub const GE_CMD_TEXBUFWIDTH0: u8 = 0xA8;
pub const GE_CMD_TEXBUFWIDTH7: u8 = 0xAF;
pub const GE_CMD_TEXFLUSH: u8 = 0xCB;
