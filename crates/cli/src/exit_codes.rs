//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract — scripts rely on them.
//!
//! | Code | Description                              |
//! |------|------------------------------------------|
//! | 0    | Success                                  |
//! | 1    | General error (unspecified)              |
//! | 2    | CLI usage error (bad args, missing file) |
//! | 3    | Invalid reconciliation config            |
//! | 4    | Runtime error (IO, bad input data)       |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
#[allow(dead_code)]
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Config failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 3;

/// Runtime failure: unreadable files, malformed CSV rows, bad categories.
pub const EXIT_RUNTIME: u8 = 4;
