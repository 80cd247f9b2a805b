//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and sysexits.h where applicable.

/// Success - every manifest processed
pub const SUCCESS: i32 = 0;

/// General error - a manifest failed or nothing was discovered
pub const ERROR: i32 = 1;

/// Usage error - invalid arguments or options (following sysexits.h convention)
pub const USAGE_ERROR: i32 = 64;
