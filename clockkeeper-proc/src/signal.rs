//! Signal delivery.

use std::io;

use crate::error::ProcError;
use crate::types::Pid;

/// Signals that can be sent to processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Interrupt (Ctrl+C).
    Int,
    /// Terminate.
    Term,
    /// Kill (cannot be caught).
    Kill,
}

impl Signal {
    /// Convert to libc signal number.
    pub fn to_libc(self) -> libc::c_int {
        match self {
            Signal::Int => libc::SIGINT,
            Signal::Term => libc::SIGTERM,
            Signal::Kill => libc::SIGKILL,
        }
    }

    /// Exit code a shell reports for a process terminated by this signal.
    pub fn exit_code(self) -> i32 {
        128 + self.to_libc()
    }
}

/// Send a signal to a specific process.
pub fn signal_pid(pid: Pid, sig: Signal) -> Result<(), ProcError> {
    let ret = unsafe { libc::kill(pid.0, sig.to_libc()) };
    if ret != 0 {
        return Err(ProcError::Signal(io::Error::last_os_error()));
    }
    Ok(())
}
