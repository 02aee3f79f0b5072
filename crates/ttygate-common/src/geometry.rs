use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal type used when a client negotiates a PTY without naming one.
pub const DEFAULT_TERM: &str = "xterm-256color";

/// Terminal size in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Geometry {
    pub cols: u16,
    pub rows: u16,
}

impl Geometry {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }

    /// Build from the 32-bit sizes carried by SSH requests, saturating at
    /// `u16::MAX`.
    pub fn from_wire(cols: u32, rows: u32) -> Self {
        Self {
            cols: u16::try_from(cols).unwrap_or(u16::MAX),
            rows: u16::try_from(rows).unwrap_or(u16::MAX),
        }
    }

    /// A geometry is usable only when both dimensions are positive.
    pub fn is_valid(&self) -> bool {
        self.cols > 0 && self.rows > 0
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.cols, self.rows)
    }
}
