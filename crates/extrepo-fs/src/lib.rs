//! Filesystem helpers for the local extension repository
//!
//! Provides atomic, advisory-locked reads and writes for descriptor files.

pub mod error;
pub mod io;

pub use error::{Error, Result};
pub use io::{ensure_dir, list_files_with_extension, read_locked, write_atomic};
