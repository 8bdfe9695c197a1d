// src/encoder/capture.rs

//! Capturing what test bodies print to the process's stdout.
//!
//! Inside an executor the result frames and the test bodies share stdout.
//! Frames are written to a duplicate of the stdout handle taken before any
//! redirect, while each body runs with the real stdout redirected into a
//! buffer.

use std::fs::File;
use std::io::{self, Read, Write};

use gag::BufferRedirect;
use tracing::trace;

/// A handle to the process's stdout that is unaffected by later redirects.
#[cfg(unix)]
pub fn stdout_handle() -> io::Result<File> {
    use std::os::fd::AsFd;

    let fd = io::stdout().as_fd().try_clone_to_owned()?;
    Ok(File::from(fd))
}

/// A handle to the process's stdout that is unaffected by later redirects.
#[cfg(windows)]
pub fn stdout_handle() -> io::Result<File> {
    use std::os::windows::io::AsHandle;

    let handle = io::stdout().as_handle().try_clone_to_owned()?;
    Ok(File::from(handle))
}

/// Run `body` with stdout redirected and return what it printed.
///
/// Only one redirect can be active per process.
pub fn capture_stdout<T>(body: impl FnOnce() -> T) -> io::Result<(T, String)> {
    io::stdout().flush()?;
    let mut redirect = BufferRedirect::stdout()?;

    let value = body();

    io::stdout().flush()?;
    let mut raw = Vec::new();
    redirect.read_to_end(&mut raw)?;
    drop(redirect);

    let printed = String::from_utf8_lossy(&raw).into_owned();
    trace!(bytes = raw.len(), "captured test stdout");
    Ok((value, printed))
}
