//! Core process types.

/// Process ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pid(pub i32);

impl Pid {
    /// Create a new Pid.
    pub fn new(pid: i32) -> Self {
        Self(pid)
    }

    /// Get the raw pid value.
    pub fn as_raw(&self) -> i32 {
        self.0
    }
}

/// A spawned child process.
///
/// Dropping this does not reap the child; call [`crate::wait`] or
/// [`crate::try_wait`] until it reports an exit status.
#[derive(Debug)]
pub struct ProcChild {
    /// The child's process ID.
    pub pid: Pid,
}
