//! Command implementations.

pub mod collections;
pub mod completions;
pub mod init;
pub mod sync;

use crate::error::Error;

/// Map a failed interactive prompt into the crate error type.
pub(crate) fn prompt_error(e: dialoguer::Error) -> Error {
    Error::Io(std::io::Error::other(e.to_string()))
}
