//! Break mode and the state of the current break request.

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use crate::cmd::DrawCmds;
use crate::error::Error;

/// What the debugger is waiting for before it halts the GE.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BreakMode {
    #[default]
    None,
    /// The very next command.
    SingleOp,
    /// The first draw after the next flush.
    SingleDraw,
    TextureChange,
    NonTextureCommand,
    /// The first command of the next frame.
    Frame,
    /// The first command after the next vblank.
    Vsync,
    Primitive,
    Curve,
    /// A given prim index within the frame.
    Count,
}

impl BreakMode {
    pub const ALL: [BreakMode; 10] = [
        BreakMode::None,
        BreakMode::SingleOp,
        BreakMode::SingleDraw,
        BreakMode::TextureChange,
        BreakMode::NonTextureCommand,
        BreakMode::Frame,
        BreakMode::Vsync,
        BreakMode::Primitive,
        BreakMode::Curve,
        BreakMode::Count,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BreakMode::None => "NONE",
            BreakMode::SingleOp => "OP",
            BreakMode::SingleDraw => "DRAW",
            BreakMode::TextureChange => "TEX",
            BreakMode::NonTextureCommand => "NONTEX",
            BreakMode::Frame => "FRAME",
            BreakMode::Vsync => "VSYNC",
            BreakMode::Primitive => "PRIM",
            BreakMode::Curve => "CURVE",
            BreakMode::Count => "COUNT",
        }
    }

    /// Draw commands this mode installs temporary breakpoints on.
    pub fn temp_triggers(&self) -> DrawCmds {
        match self {
            BreakMode::Primitive | BreakMode::Count => DrawCmds::all(),
            BreakMode::Curve => DrawCmds::CURVES,
            BreakMode::None
            | BreakMode::SingleOp
            | BreakMode::SingleDraw
            | BreakMode::TextureChange
            | BreakMode::NonTextureCommand
            | BreakMode::Frame
            | BreakMode::Vsync => DrawCmds::empty(),
        }
    }
}

impl fmt::Display for BreakMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BreakMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        BreakMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == upper)
            .ok_or_else(|| Error::InvalidMode(s.to_string()))
    }
}

#[derive(Debug, Default, Clone)]
pub struct BreakState {
    pub active: bool,
    pub mode: BreakMode,
    /// Only meaningful with `BreakMode::Count`.
    pub target_count: Option<i32>,
    /// When the current break request was made, for elapsed time on halt.
    pub requested_at: Option<Instant>,
    /// Address of the last halt, ignored once so resuming makes progress.
    pub skip_once_pc: Option<u32>,
    pub prim_after_draw: bool,
}

impl BreakState {
    pub fn new() -> Self {
        Self::default()
    }
}
