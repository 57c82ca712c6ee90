//! The restart loop.

use anyhow::Result;
use chrono::Local;
use clockkeeper_proc::{ExitStatus, Signal};

use crate::child::Child;
use crate::config::{SupervisorConfig, CHILD_SCRIPT};
use crate::failure_log::FailureLog;
use crate::util::shutdown::ShutdownSignal;

/// How a single launch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The child exited on its own (for any reason).
    Exited(Option<ExitStatus>),
    /// Shutdown was requested while the child was running.
    Interrupted(Signal),
}

pub struct Supervisor<'a> {
    config: &'a SupervisorConfig,
    log: FailureLog,
    shutdown: ShutdownSignal,
    attempt: u64,
}

impl<'a> Supervisor<'a> {
    pub fn new(config: &'a SupervisorConfig, shutdown: ShutdownSignal) -> Self {
        Self {
            config,
            log: FailureLog::new(config.failure_log_path()),
            shutdown,
            attempt: 0,
        }
    }

    /// Number of launches so far.
    pub fn attempts(&self) -> u64 {
        self.attempt
    }

    /// Launch the child once, wait for it, and append the crash record.
    ///
    /// Every exit is recorded as a crash, clean exits included. A child that
    /// could not be started at all is recorded the same way.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        self.attempt += 1;
        println!("Starting {}...", CHILD_SCRIPT);

        let stderr = if self.config.flags.verbose {
            None
        } else {
            match self.log.stderr_sink() {
                Ok(file) => Some(file),
                Err(e) => {
                    tracing::warn!(
                        path = %self.log.path().display(),
                        error = %e,
                        "cannot open failure log, child stderr left unredirected"
                    );
                    None
                }
            }
        };

        let status = match Child::spawn(self.config, stderr) {
            Ok(child) => {
                // Shutdown first: on Ctrl+C the child sees SIGINT too and may
                // exit in the same tick
                tokio::select! {
                    biased;

                    sig = self.shutdown.recv() => {
                        match child.terminate(Signal::Term, self.config.shutdown_grace).await {
                            Ok(status) => tracing::info!(%status, "child stopped for shutdown"),
                            Err(e) => tracing::error!("failed to stop child: {}", e),
                        }
                        return CycleOutcome::Interrupted(sig);
                    }
                    result = child.exited() => match result {
                        Ok(status) => Some(status),
                        Err(e) => {
                            tracing::error!(pid = child.pid().as_raw(), "waitpid error: {}", e);
                            None
                        }
                    },
                }
            }
            Err(e) => {
                tracing::error!(attempt = self.attempt, "failed to spawn child: {}", e);
                None
            }
        };

        match status {
            Some(ExitStatus::Code(code)) => {
                tracing::info!(attempt = self.attempt, code, "child exited with code")
            }
            Some(ExitStatus::Signaled(signal)) => {
                tracing::info!(attempt = self.attempt, signal, "child killed by signal")
            }
            None => {}
        }

        if let Err(e) = self.log.record_crash(&Local::now()) {
            tracing::error!(path = %self.log.path().display(), "failed to record crash: {}", e);
        }

        CycleOutcome::Exited(status)
    }

    /// Run the restart loop until shutdown is requested.
    ///
    /// Returns the signal that ended the loop. Without one, this never
    /// returns.
    pub async fn run(&mut self) -> Signal {
        loop {
            if let Some(sig) = self.shutdown.requested() {
                return sig;
            }

            match self.run_cycle().await {
                CycleOutcome::Interrupted(sig) => return sig,
                CycleOutcome::Exited(status) => tracing::debug!(
                    ?status,
                    delay_ms = self.config.restart_delay.as_millis() as u64,
                    "restarting after delay"
                ),
            }

            tokio::select! {
                biased;

                sig = self.shutdown.recv() => return sig,
                _ = tokio::time::sleep(self.config.restart_delay) => {}
            }
        }
    }
}

/// Run the supervisor.
///
/// Returns the exit code to use.
pub async fn run(config: &SupervisorConfig, shutdown: ShutdownSignal) -> Result<i32> {
    tracing::info!(
        workdir = %config.workdir.display(),
        interpreter = %config.interpreter,
        restart_delay_ms = config.restart_delay.as_millis() as u64,
        "supervisor started"
    );

    let mut supervisor = Supervisor::new(config, shutdown);
    let sig = supervisor.run().await;

    tracing::info!(attempts = supervisor.attempts(), "supervisor stopped");
    Ok(sig.exit_code())
}
