// gedbg is the execution-control core of a GE (PSP GPU) debugger: it decides,
// per display-list command, whether to run it, skip it, or halt the emulator.

#[macro_use]
pub mod log;
pub mod utils;

pub mod config;
pub mod error;
pub mod cmd;
pub mod mem;
pub mod range;
pub mod frame;
pub mod state;
pub mod breakpoints;
pub mod stepping;
pub mod host;
pub mod debugger;
pub mod gate;
pub mod hooks;
pub mod replay;

#[cfg(test)]
mod testutil;

pub use error::{
    Error,
    Result,
};
pub use debugger::Debugger;
pub use gate::Verdict;
pub use state::BreakMode;
