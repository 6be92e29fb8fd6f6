/*============================================================
  Synavera Project: Syn-IIM
  Module: ibmim_core::result
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    The single externally observable output of a run: the
    Ansible-compatible result document written to stdout.

  Security / Safety Notes:
    Vendor stdout/stderr are echoed verbatim to the caller.

  Dependencies:
    serde for JSON serialization.

  Operational Scope:
    Built by the invokers, emitted once by the entry point.

  Revision History:
    2025-11-12 COD  Authored module result document.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Failures still produce a complete, parseable document
============================================================*/

use std::io::Write;

use serde::Serialize;

use crate::error::{IbmimError, Result};
use crate::facts::VersionFacts;
use crate::imcl::CommandOutput;
use crate::provision::Failure;

/// Outcome of one module run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvocationResult {
    pub changed: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub failed: bool,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
    pub module_facts: VersionFacts,
}

impl InvocationResult {
    pub fn unchanged(msg: impl Into<String>, facts: VersionFacts) -> Self {
        Self {
            changed: false,
            failed: false,
            msg: msg.into(),
            stdout: None,
            stderr: None,
            module_facts: facts,
        }
    }

    pub fn changed(msg: impl Into<String>, facts: VersionFacts) -> Self {
        Self {
            changed: true,
            ..Self::unchanged(msg, facts)
        }
    }

    /// Attach the captured output of the command that caused the change.
    pub fn with_output(mut self, output: CommandOutput) -> Self {
        self.stdout = Some(output.stdout);
        self.stderr = Some(output.stderr);
        self
    }

    /// Failure document; never claims a change.
    pub fn failed(failure: &Failure) -> Self {
        let (stdout, stderr) = match failure.error.diagnostics() {
            Some((stdout, stderr)) => (Some(stdout.to_string()), Some(stderr.to_string())),
            None => (None, None),
        };
        Self {
            changed: false,
            failed: true,
            msg: failure.error.to_string(),
            stdout,
            stderr,
            module_facts: failure.facts.clone(),
        }
    }
}

/// Write the result as one JSON document.
pub fn emit<W: Write>(result: &InvocationResult, mut writer: W) -> Result<()> {
    serde_json::to_writer(&mut writer, result).map_err(|err| {
        IbmimError::Serialization(format!("Failed to encode module result: {err}"))
    })?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
