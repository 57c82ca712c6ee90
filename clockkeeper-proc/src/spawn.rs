//! Child process spawning.

use std::ffi::{CStr, CString};
use std::io;
use std::os::fd::{AsRawFd, OwnedFd};
use std::path::PathBuf;

use crate::error::ProcError;
use crate::types::{Pid, ProcChild};

/// Exit code of a child whose exec failed, matching the shell convention for
/// "command not found".
pub const EXEC_FAILED_CODE: i32 = 127;

/// Specification for spawning a child process.
///
/// The child inherits the parent's stdin, stdout and environment. Stderr is
/// inherited unless a replacement descriptor is supplied.
#[derive(Debug)]
pub struct SpawnSpec {
    /// Program to execute (a path, or a command name looked up in `PATH`).
    pub program: CString,
    /// Arguments after argv[0]; argv[0] is always the program.
    pub args: Vec<CString>,
    /// Working directory for the child, or `None` to inherit the parent's.
    pub cwd: Option<PathBuf>,
    /// Descriptor installed as the child's stderr.
    pub stderr: Option<OwnedFd>,
}

impl SpawnSpec {
    /// Create a new SpawnSpec with the given program.
    pub fn new(program: impl Into<Vec<u8>>) -> Result<Self, ProcError> {
        let program =
            CString::new(program).map_err(|e| ProcError::InvalidArgument(e.to_string()))?;
        Ok(Self {
            program,
            args: Vec::new(),
            cwd: None,
            stderr: None,
        })
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<Vec<u8>>) -> Result<Self, ProcError> {
        let arg = CString::new(arg).map_err(|e| ProcError::InvalidArgument(e.to_string()))?;
        self.args.push(arg);
        Ok(self)
    }

    /// Append several arguments.
    pub fn args<I, S>(self, args: I) -> Result<Self, ProcError>
    where
        I: IntoIterator<Item = S>,
        S: Into<Vec<u8>>,
    {
        args.into_iter().try_fold(self, |spec, arg| spec.arg(arg))
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Redirect the child's stderr to `fd`.
    pub fn stderr(mut self, fd: impl Into<OwnedFd>) -> Self {
        self.stderr = Some(fd.into());
        self
    }

    /// The full argv the child will see.
    pub fn argv(&self) -> Vec<&CStr> {
        std::iter::once(self.program.as_c_str())
            .chain(self.args.iter().map(|s| s.as_c_str()))
            .collect()
    }
}

/// Spawn a child process.
///
/// This function:
/// 1. Prepares argv and the working directory before forking
/// 2. Forks the process
/// 3. In the child: installs the stderr redirection, changes directory and execs
/// 4. In the parent: closes its copy of the stderr descriptor and returns the pid
///
/// A failed exec does not surface as an error here: the child exits with
/// [`EXEC_FAILED_CODE`], which the caller observes through `wait`.
pub fn spawn(spec: SpawnSpec) -> Result<ProcChild, ProcError> {
    let cwd_cstr = spec
        .cwd
        .as_ref()
        .map(|cwd| {
            CString::new(cwd.to_string_lossy().as_bytes())
                .map_err(|e| ProcError::InvalidPath(e.to_string()))
        })
        .transpose()?;

    // Null-terminated argv, built before fork so the child does not allocate
    let mut argv_ptrs: Vec<*const libc::c_char> =
        spec.argv().iter().map(|s| s.as_ptr()).collect();
    argv_ptrs.push(std::ptr::null());

    let stderr_fd = spec.stderr.as_ref().map(|fd| fd.as_raw_fd());

    let pid = unsafe { libc::fork() };

    if pid < 0 {
        return Err(ProcError::Fork(io::Error::last_os_error()));
    }

    if pid == 0 {
        // === CHILD PROCESS ===
        // Only async-signal-safe calls from here on; errors exit the child.

        if let Some(fd) = stderr_fd {
            if unsafe { libc::dup2(fd, libc::STDERR_FILENO) } < 0 {
                unsafe { libc::_exit(1) };
            }
        }

        if let Some(cwd) = &cwd_cstr {
            if unsafe { libc::chdir(cwd.as_ptr()) } < 0 {
                unsafe { libc::_exit(1) };
            }
        }

        unsafe { libc::execvp(spec.program.as_ptr(), argv_ptrs.as_ptr()) };

        unsafe { libc::_exit(EXEC_FAILED_CODE) };
    }

    // === PARENT PROCESS ===
    // Dropping the spec closes the parent's copy of the stderr descriptor
    drop(spec);

    Ok(ProcChild { pid: Pid::new(pid) })
}
