/*============================================================
  Synavera Project: Syn-IIM
  Module: ibmim_core::error
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Centralise IBM IM provisioning error types so every failure
    path ends in a structured, diagnosable result.

  Security / Safety Notes:
    Errors expose filesystem paths and vendor tool output only;
    no credentials are handled by this crate.

  Dependencies:
    thiserror for ergonomic error definitions.

  Operational Scope:
    Used across modules to propagate precondition, process and
    configuration failures up to the module entry point.

  Revision History:
    2025-11-12 COD  Established provisioning error taxonomy.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Explicit error taxonomy with actionable context
    - No silent failure paths
    - Vendor diagnostics carried verbatim
============================================================*/

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias for provisioning operations.
pub type Result<T> = std::result::Result<T, IbmimError>;

/// Enumerates high-level error domains surfaced while provisioning IBM IM.
#[derive(Debug, Error)]
pub enum IbmimError {
    #[error("{} not found", .path.display())]
    MissingSourcePath { path: PathBuf },
    #[error("{} does not exist", .path.display())]
    MissingUninstallerPath { path: PathBuf },
    #[error("IBM IM {action} failed: `{command}` exited with status {status}")]
    CommandFailure {
        action: String,
        command: String,
        status: i32,
        stdout: String,
        stderr: String,
    },
    #[error("Required command `{command}` could not be found")]
    CommandMissing { command: String },
    #[error("Configuration: {0}")]
    Config(String),
    #[error("Filesystem: {0}")]
    Filesystem(String),
    #[error("Serialization: {0}")]
    Serialization(String),
    #[error("Runtime: {0}")]
    Runtime(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl IbmimError {
    /// Captured vendor output for failures that carry it.
    pub fn diagnostics(&self) -> Option<(&str, &str)> {
        match self {
            IbmimError::CommandFailure { stdout, stderr, .. } => {
                Some((stdout.as_str(), stderr.as_str()))
            }
            _ => None,
        }
    }
}
