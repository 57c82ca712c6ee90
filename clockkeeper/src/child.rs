//! Child process management using clockkeeper-proc.

use std::fs::File;
use std::time::{Duration, Instant};

use clockkeeper_proc::{
    signal_pid, spawn, try_wait, wait, ExitStatus, Pid, ProcChild, ProcError, Signal, SpawnSpec,
};

use crate::config::SupervisorConfig;

/// Interval between non-blocking exit checks.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Wrapper around ProcChild with helper methods.
pub struct Child {
    inner: ProcChild,
}

impl Child {
    /// Launch the clock program described by `config`.
    ///
    /// `stderr` replaces the child's stderr when given; otherwise the child
    /// writes to the supervisor's own stderr.
    pub fn spawn(config: &SupervisorConfig, stderr: Option<File>) -> Result<Self, ProcError> {
        let mut spec = SpawnSpec::new(config.interpreter.as_bytes())?
            .args(config.child_args())?
            .cwd(&config.workdir);
        if let Some(file) = stderr {
            spec = spec.stderr(file);
        }

        let child = spawn(spec)?;

        tracing::info!(
            pid = child.pid.as_raw(),
            interpreter = %config.interpreter,
            args = ?config.child_args(),
            "child process spawned"
        );

        Ok(Self { inner: child })
    }

    /// Get the child's PID.
    pub fn pid(&self) -> Pid {
        self.inner.pid
    }

    /// Non-blocking check for exit status.
    pub fn try_wait(&self) -> Result<Option<ExitStatus>, ProcError> {
        try_wait(self.inner.pid)
    }

    /// Poll until the child exits.
    pub async fn exited(&self) -> Result<ExitStatus, ProcError> {
        loop {
            if let Some(status) = self.try_wait()? {
                return Ok(status);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Ask the child to stop with `sig`, escalating to SIGKILL after `grace`.
    pub async fn terminate(&self, sig: Signal, grace: Duration) -> Result<ExitStatus, ProcError> {
        if let Some(status) = self.try_wait()? {
            return Ok(status);
        }

        signal_pid(self.inner.pid, sig)?;

        let deadline = Instant::now() + grace;
        while Instant::now() < deadline {
            if let Some(status) = self.try_wait()? {
                return Ok(status);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }

        tracing::warn!(
            pid = self.inner.pid.as_raw(),
            grace_ms = grace.as_millis() as u64,
            "child ignored {:?}, killing",
            sig
        );
        signal_pid(self.inner.pid, Signal::Kill)?;
        wait(self.inner.pid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::Flags;
    use std::fs;

    fn config_in(dir: &std::path::Path, script: &str) -> SupervisorConfig {
        fs::write(dir.join("main.py"), script).unwrap();
        let mut config = SupervisorConfig::new(Flags::default(), "test");
        config.workdir = dir.to_path_buf();
        config.interpreter = "/bin/sh".to_string();
        config
    }

    #[tokio::test]
    async fn test_exit_code_reported() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), "exit 7\n");

        let child = Child::spawn(&config, None).unwrap();
        let status = child.exited().await.unwrap();
        assert_eq!(status, ExitStatus::Code(7));
    }

    #[tokio::test]
    async fn test_runs_in_workdir_with_flags() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path(), "echo \"$@\" > args.txt\n");
        config.flags = Flags {
            verbose: false,
            clock: true,
            local_run: true,
        };

        let child = Child::spawn(&config, None).unwrap();
        assert!(child.exited().await.unwrap().success());

        let args = fs::read_to_string(dir.path().join("args.txt")).unwrap();
        assert_eq!(args.trim(), "--clock --local_run");
    }

    #[tokio::test]
    async fn test_terminate_running_child() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), "exec sleep 30\n");

        let child = Child::spawn(&config, None).unwrap();
        let status = child
            .terminate(Signal::Term, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(status.signal(), Some(libc::SIGTERM));
    }

    #[tokio::test]
    async fn test_terminate_escalates_to_kill() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(
            dir.path(),
            "trap '' TERM\ntouch ready\nwhile true; do sleep 1; done\n",
        );

        let child = Child::spawn(&config, None).unwrap();
        let ready = dir.path().join("ready");
        for _ in 0..100 {
            if ready.exists() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        let status = child
            .terminate(Signal::Term, Duration::from_millis(200))
            .await
            .unwrap();
        assert_eq!(status.signal(), Some(libc::SIGKILL));
    }
}
