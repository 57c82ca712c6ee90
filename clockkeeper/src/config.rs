//! Supervisor configuration.
//!
//! Built once at startup from the parsed flags plus a few environment
//! overrides, then passed by reference into the restart loop.

use std::path::PathBuf;
use std::time::Duration;

use crate::args::Flags;
use crate::workdir::{self, WorkdirError};

/// Script launched by the supervisor, relative to the working directory.
pub const CHILD_SCRIPT: &str = "main.py";

/// Log file, relative to the working directory.
pub const FAILURE_LOG: &str = "failures.txt";

const DEFAULT_INTERPRETER: &str = "python3";
const DEFAULT_RESTART_DELAY: Duration = Duration::from_secs(5);
const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

const WORKDIR_VAR: &str = "CLOCKKEEPER_WORKDIR";
const INTERPRETER_VAR: &str = "CLOCKKEEPER_PYTHON";
const RESTART_DELAY_VAR: &str = "CLOCKKEEPER_RESTART_DELAY_MS";

#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    pub flags: Flags,
    /// Directory the supervisor enters and runs the child from.
    pub workdir: PathBuf,
    /// Interpreter that runs [`CHILD_SCRIPT`].
    pub interpreter: String,
    /// Pause between a child exit and the next launch.
    pub restart_delay: Duration,
    /// How long a child gets to exit after SIGTERM on shutdown.
    pub shutdown_grace: Duration,
}

impl SupervisorConfig {
    /// Defaults for `flags`, with the working directory derived from `user`.
    pub fn new(flags: Flags, user: &str) -> Self {
        Self {
            flags,
            workdir: workdir::default_workdir(user),
            interpreter: DEFAULT_INTERPRETER.to_string(),
            restart_delay: DEFAULT_RESTART_DELAY,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }

    /// Build the configuration from `flags` and the process environment.
    pub fn from_env(flags: Flags) -> Result<Self, WorkdirError> {
        Self::from_lookup(flags, |key| std::env::var(key).ok())
    }

    fn from_lookup(
        flags: Flags,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, WorkdirError> {
        let workdir_override = lookup(WORKDIR_VAR).filter(|v| !v.is_empty());

        // The user lookup only matters when the directory is not overridden
        let mut config = match &workdir_override {
            Some(dir) => {
                let mut config = Self::new(flags, "");
                config.workdir = PathBuf::from(dir);
                config
            }
            None => Self::new(flags, &workdir::current_user()?),
        };

        if let Some(interpreter) = lookup(INTERPRETER_VAR).filter(|v| !v.is_empty()) {
            config.interpreter = interpreter;
        }

        if let Some(raw) = lookup(RESTART_DELAY_VAR) {
            match raw.trim().parse::<u64>() {
                Ok(ms) => config.restart_delay = Duration::from_millis(ms),
                Err(e) => tracing::warn!(
                    value = %raw,
                    error = %e,
                    "ignoring invalid {}",
                    RESTART_DELAY_VAR
                ),
            }
        }

        Ok(config)
    }

    /// The child's argv after the interpreter: the script and mirrored flags.
    pub fn child_args(&self) -> Vec<&str> {
        let mut args = vec![CHILD_SCRIPT];
        args.extend(self.flags.child_args());
        args
    }

    pub fn failure_log_path(&self) -> PathBuf {
        self.workdir.join(FAILURE_LOG)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = SupervisorConfig::new(Flags::default(), "pi");
        assert_eq!(config.workdir, PathBuf::from("/home/pi/spotify-clock"));
        assert_eq!(config.interpreter, "python3");
        assert_eq!(config.restart_delay, Duration::from_secs(5));
        assert_eq!(config.shutdown_grace, Duration::from_secs(5));
        assert_eq!(
            config.failure_log_path(),
            PathBuf::from("/home/pi/spotify-clock/failures.txt")
        );
    }

    #[test]
    fn test_child_args_start_with_script() {
        let flags = Flags {
            verbose: true,
            clock: true,
            local_run: false,
        };
        let config = SupervisorConfig::new(flags, "pi");
        assert_eq!(config.child_args(), vec!["main.py", "-v", "--clock"]);
    }

    #[test]
    fn test_env_overrides() {
        let lookup = lookup_from(&[
            (WORKDIR_VAR, "/srv/clock"),
            (INTERPRETER_VAR, "/usr/bin/python3.11"),
            (RESTART_DELAY_VAR, "250"),
        ]);
        let config = SupervisorConfig::from_lookup(Flags::default(), lookup).unwrap();

        assert_eq!(config.workdir, PathBuf::from("/srv/clock"));
        assert_eq!(config.interpreter, "/usr/bin/python3.11");
        assert_eq!(config.restart_delay, Duration::from_millis(250));
    }

    #[test]
    fn test_invalid_delay_keeps_default() {
        let lookup = lookup_from(&[(WORKDIR_VAR, "/srv/clock"), (RESTART_DELAY_VAR, "soon")]);
        let config = SupervisorConfig::from_lookup(Flags::default(), lookup).unwrap();
        assert_eq!(config.restart_delay, Duration::from_secs(5));
    }

    #[test]
    fn test_empty_overrides_ignored() {
        let lookup = lookup_from(&[(WORKDIR_VAR, "/srv/clock"), (INTERPRETER_VAR, "")]);
        let config = SupervisorConfig::from_lookup(Flags::default(), lookup).unwrap();
        assert_eq!(config.interpreter, "python3");
    }
}
