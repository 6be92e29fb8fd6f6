/*============================================================
  Synavera Project: Syn-IIM
  Module: ibmim_core::logger
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Structured, append-only logging for IBM IM provisioning
    runs. Stdout is reserved for the module result document,
    so every log line goes to stderr and/or a log file.

  Security / Safety Notes:
    Vendor command lines are logged verbatim; they contain
    paths and flags only.

  Dependencies:
    std::sync::Mutex, chrono for stamps, sha2 for digests.

  Operational Scope:
    Shared by the prober and invokers to narrate each run.

  Revision History:
    2025-11-12 COD  Adapted logging module for Syn-IIM.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Append-only logging with UTC timestamps
    - Deterministic formatting for auditability
    - Graceful error propagation on I/O failures
============================================================*/

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{SecondsFormat, Utc};
use sha2::{Digest, Sha256};

use crate::error::{IbmimError, Result};

/// Structured log level for provisioning events.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
    Debug,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Debug => "DEBUG",
        }
    }

    fn always_echoed(self) -> bool {
        matches!(self, LogLevel::Warn | LogLevel::Error)
    }
}

/// Logger that narrates to stderr and optionally appends to a file.
pub struct Logger {
    sink: Option<Mutex<BufWriter<File>>>,
    path: Option<PathBuf>,
    verbose: bool,
}

impl Logger {
    /// Build a logger; `path` enables the file sink.
    pub fn new(path: Option<PathBuf>, verbose: bool) -> Result<Self> {
        let sink = match path.as_deref() {
            Some(file_path) => Some(Mutex::new(BufWriter::new(open_sink(file_path)?))),
            None => None,
        };
        Ok(Self {
            sink,
            path,
            verbose,
        })
    }

    /// Logger with no file sink that only echoes warnings and errors.
    #[cfg(test)]
    pub fn quiet() -> Self {
        Self {
            sink: None,
            path: None,
            verbose: false,
        }
    }

    pub fn log<S: AsRef<str>>(&self, level: LogLevel, code: &str, message: S) {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let line = format!(
            "{timestamp} [{}] [{code}] {}",
            level.as_str(),
            message.as_ref()
        );

        if self.verbose || level.always_echoed() {
            eprintln!("{line}");
        }

        let Some(sink) = &self.sink else {
            return;
        };
        if let Ok(mut writer) = sink.lock() {
            let written = writeln!(writer, "{line}").and_then(|_| writer.flush());
            if let Err(err) = written {
                eprintln!("{timestamp} [ERROR] [LOGGER] Failed to append to log file: {err}");
            }
        }
    }

    pub fn info<S: AsRef<str>>(&self, code: &str, message: S) {
        self.log(LogLevel::Info, code, message);
    }

    pub fn warn<S: AsRef<str>>(&self, code: &str, message: S) {
        self.log(LogLevel::Warn, code, message);
    }

    pub fn error<S: AsRef<str>>(&self, code: &str, message: S) {
        self.log(LogLevel::Error, code, message);
    }

    pub fn debug<S: AsRef<str>>(&self, code: &str, message: S) {
        self.log(LogLevel::Debug, code, message);
    }

    /// Return the path backing this logger, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write `<log>.hash` holding the SHA-256 digest of the log file.
    pub fn finalize(&self) -> Result<Option<PathBuf>> {
        let Some(path) = self.path() else {
            return Ok(None);
        };
        if let Some(sink) = &self.sink {
            if let Ok(mut writer) = sink.lock() {
                writer.flush()?;
            }
        }

        let data = std::fs::read(path).map_err(|err| {
            IbmimError::Filesystem(format!(
                "Failed to read log for hashing {}: {err}",
                path.display()
            ))
        })?;
        let digest = Sha256::digest(&data);

        let mut hash_os = path.as_os_str().to_os_string();
        hash_os.push(".hash");
        let hash_path = PathBuf::from(hash_os);
        let record = format!(
            "{:x}  {}\n",
            digest,
            path.file_name().unwrap_or_default().to_string_lossy()
        );
        std::fs::write(&hash_path, record).map_err(|err| {
            IbmimError::Filesystem(format!(
                "Failed to write hash file {}: {err}",
                hash_path.display()
            ))
        })?;
        Ok(Some(hash_path))
    }
}

fn open_sink(file_path: &Path) -> Result<File> {
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| {
            IbmimError::Filesystem(format!(
                "Failed to create log directory {}: {err}",
                parent.display()
            ))
        })?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(file_path)
        .map_err(|err| {
            IbmimError::Filesystem(format!(
                "Failed to open log file {}: {err}",
                file_path.display()
            ))
        })
}
