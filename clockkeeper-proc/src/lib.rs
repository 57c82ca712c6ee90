//! Process primitives for clockkeeper.
//!
//! This crate wraps the fork/exec, waitpid and kill syscalls the supervisor
//! needs behind a small safe API. Unlike `std::process`, waiting is split into
//! a non-blocking [`try_wait`] so the caller can poll from an async loop.
//!
//! # Example
//!
//! ```no_run
//! use clockkeeper_proc::{spawn, try_wait, signal_pid, Signal, SpawnSpec};
//!
//! let spec = SpawnSpec::new("python3")
//!     .unwrap()
//!     .arg("main.py")
//!     .unwrap()
//!     .cwd("/tmp");
//!
//! let child = spawn(spec).unwrap();
//!
//! if let Some(status) = try_wait(child.pid).unwrap() {
//!     println!("child exited with {}", status);
//! }
//!
//! signal_pid(child.pid, Signal::Term).unwrap();
//! ```

mod error;
mod signal;
mod spawn;
mod types;
mod wait;

pub use error::ProcError;
pub use signal::{signal_pid, Signal};
pub use spawn::{spawn, SpawnSpec, EXEC_FAILED_CODE};
pub use types::{Pid, ProcChild};
pub use wait::{try_wait, wait, ExitStatus};
