//! Stable error codes.
//!
//! Format: E#### where the first digit is the category:
//! - E1xxx: duplicate definitions
//! - E2xxx: unresolved references
//! - E3xxx: unsupported constructs
//! - E4xxx: layout errors

use std::fmt;

use crate::ErrorCategory;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Duplicate definitions (E1xxx)
    /// Symbol defined twice in one module
    E1001,

    // Unresolved references (E2xxx)
    /// Unknown variable
    E2001,
    /// Unknown struct
    E2002,
    /// Unknown struct member
    E2003,
    /// Unknown function callee
    E2004,
    /// Import source module not in the working set
    E2005,
    /// Name not exported by a standard-library module
    E2006,
    /// Name not exported by a user module
    E2007,
    /// Import used before linking resolved it
    E2008,
    /// `break`/`continue` outside a loop
    E2009,

    // Unsupported constructs (E3xxx)
    /// Construct has no lowering or inference rule
    E3001,
    /// Literal cannot be encoded as constant data
    E3002,
    /// Call with the wrong number of arguments
    E3003,

    // Layout errors (E4xxx)
    /// Alignment request is not positive
    E4001,
    /// Encoded signature string is malformed
    E4002,
    /// Constant data overflows the address space
    E4003,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "E1001",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E2008 => "E2008",
            ErrorCode::E2009 => "E2009",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
            ErrorCode::E4001 => "E4001",
            ErrorCode::E4002 => "E4002",
            ErrorCode::E4003 => "E4003",
        }
    }

    /// Category implied by the leading digit.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ErrorCode::E1001 => ErrorCategory::DuplicateDefinition,
            ErrorCode::E2001
            | ErrorCode::E2002
            | ErrorCode::E2003
            | ErrorCode::E2004
            | ErrorCode::E2005
            | ErrorCode::E2006
            | ErrorCode::E2007
            | ErrorCode::E2008
            | ErrorCode::E2009 => ErrorCategory::UnresolvedReference,
            ErrorCode::E3001 | ErrorCode::E3002 | ErrorCode::E3003 => {
                ErrorCategory::UnsupportedConstruct
            }
            ErrorCode::E4001 | ErrorCode::E4002 | ErrorCode::E4003 => ErrorCategory::Layout,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests;
