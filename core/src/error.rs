use std::error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// Guest address outside the command memory
    MemAccessFault(u32),
    OutOfBounds,
    /// Unparseable token of a restriction rule
    InvalidRange(String),
    InvalidMode(String),
    IoError(std::io::Error, String),
    Other(String),
    InternalError(String),

    // Breakpoints
    RepeatedBreakpoint(u32),
    BreakpointNotFound(u32),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::MemAccessFault(gaddr) => write!(f, "Memory access fault at {:#010x}", gaddr),
            Error::OutOfBounds => write!(f, "Data exceeds command memory"),
            Error::InvalidRange(token) => write!(f, "Invalid prim range: '{}'", token),
            Error::InvalidMode(name) => write!(f, "Unknown break mode: '{}'", name),
            Error::InternalError(msg) => write!(f, "Internal error: {}", msg),
            Error::RepeatedBreakpoint(addr) => write!(f, "Repeated breakpoint at {:#010x}", addr),
            Error::BreakpointNotFound(addr) => write!(f, "Breakpoint not found at {:#010x}", addr),
            Error::IoError(err, path) => {
                let msg = err.to_string();
                if path.is_empty() {
                    write!(f, "I/O error: {}", msg)
                } else {
                    write!(f, "I/O error on '{}': {}", path, msg)
                }
            }
            Error::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl error::Error for Error {}
