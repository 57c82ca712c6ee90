//! Append-only crash log.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::config::CHILD_SCRIPT;

/// Format a crash record (without trailing newline).
pub fn crash_line(at: &DateTime<Local>) -> String {
    format!("{} crashed at: {}", CHILD_SCRIPT, at.format("%Y-%m-%d %H:%M:%S"))
}

/// The supervisor's `failures.txt`.
///
/// Every handle is opened with `append`, never `truncate`.
#[derive(Debug, Clone)]
pub struct FailureLog {
    path: PathBuf,
}

impl FailureLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> io::Result<File> {
        OpenOptions::new().create(true).append(true).open(&self.path)
    }

    /// Handle to give the child as its stderr.
    pub fn stderr_sink(&self) -> io::Result<File> {
        self.open()
    }

    /// Append one crash record.
    pub fn record_crash(&self, at: &DateTime<Local>) -> io::Result<()> {
        let mut file = self.open()?;
        writeln!(file, "{}", crash_line(at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;

    fn sample_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 42).unwrap()
    }

    #[test]
    fn test_crash_line_format() {
        assert_eq!(
            crash_line(&sample_time()),
            "main.py crashed at: 2024-03-09 07:05:42"
        );
    }

    #[test]
    fn test_record_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let log = FailureLog::new(dir.path().join("failures.txt"));

        log.record_crash(&sample_time()).unwrap();

        assert_eq!(
            fs::read_to_string(log.path()).unwrap(),
            "main.py crashed at: 2024-03-09 07:05:42\n"
        );
    }

    #[test]
    fn test_record_never_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("failures.txt");
        fs::write(&path, "Traceback (most recent call last):\n").unwrap();

        let log = FailureLog::new(&path);
        log.record_crash(&sample_time()).unwrap();
        log.record_crash(&sample_time()).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Traceback (most recent call last):");
        assert!(lines[1..].iter().all(|l| l.starts_with("main.py crashed at: ")));
    }

    #[test]
    fn test_stderr_sink_appends() {
        let dir = tempfile::tempdir().unwrap();
        let log = FailureLog::new(dir.path().join("failures.txt"));
        log.record_crash(&sample_time()).unwrap();

        let mut sink = log.stderr_sink().unwrap();
        sink.write_all(b"KeyError: 'album'\n").unwrap();

        let contents = fs::read_to_string(log.path()).unwrap();
        assert!(contents.starts_with("main.py crashed at: "));
        assert!(contents.ends_with("KeyError: 'album'\n"));
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let log = FailureLog::new(dir.path().join("gone").join("failures.txt"));
        assert!(log.record_crash(&sample_time()).is_err());
    }
}
