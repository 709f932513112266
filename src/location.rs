//! Source location for tokens and diagnostics

use std::fmt::{self, Display};

/// Represents a position in the program text being compiled.
/// Lines and columns are both 1-based.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash, Default)]
pub enum Location {
    /// A line and column within the input.
    SrcPos { line: usize, col: usize },
    /// Location unknown.
    #[default]
    Unknown,
}

impl Location {
    pub fn new(line: usize, col: usize) -> Self {
        Location::SrcPos { line, col }
    }

    /// Is this a known location?
    pub fn is_known(&self) -> bool {
        matches!(self, Location::SrcPos { .. })
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::SrcPos { line, col } => write!(f, "{line}:{col}"),
            Location::Unknown => write!(f, "<unknown>"),
        }
    }
}

crate::impl_printable_for_display!(Location);

/// Anything that has a source location.
pub trait Located {
    fn loc(&self) -> Location;
    fn set_loc(&mut self, loc: Location);
}
