/*============================================================
  Synavera Project: Syn-IIM
  Module: ibmim_core::imcl
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Launch vendor executables with explicit argument vectors
    and probe whether IBM Installation Manager is present at a
    destination via `eclipse/tools/imcl version`.

  Security / Safety Notes:
    No shell is involved; paths and flags are passed as
    discrete arguments. Runs with caller privileges only.

  Dependencies:
    tokio::process for command execution.

  Operational Scope:
    State probing for the invokers; shared launch helper for
    installer and uninstaller commands.

  Revision History:
    2025-11-12 COD  Crafted imcl integration layer.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Deterministic command invocation with explicit checks
    - Probe failures degrade to "not installed", never panic
    - Reusable helpers for external command diagnostics
============================================================*/

use std::ffi::OsString;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;

use crate::error::{IbmimError, Result};
use crate::facts::VersionFacts;
use crate::logger::Logger;

/// Location of imcl relative to an installation directory.
pub const IMCL_RELATIVE: &str = "eclipse/tools/imcl";

/// A program plus its argument vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append a flag followed by its value.
    pub fn flag(self, name: &str, value: impl Into<OsString>) -> Self {
        self.arg(name).arg(value)
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Exit status plus the fully buffered output of one launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// Installation verdict from the prober.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStatus {
    Installed,
    NotInstalled,
}

/// Verdict plus the facts gathered by the same version query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe {
    pub status: InstallStatus,
    pub facts: VersionFacts,
}

/// Launch `spec` once and wait for it; a non-zero exit is not an error here.
pub async fn run(spec: &CommandSpec) -> Result<CommandOutput> {
    let output = Command::new(&spec.program)
        .args(&spec.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|err| map_spawn_error(err, &spec.program))?;

    Ok(CommandOutput {
        status: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

pub fn imcl_path(dest: &Path) -> PathBuf {
    dest.join(IMCL_RELATIVE)
}

/// Run `<dest>/eclipse/tools/imcl version` and extract whatever facts it prints.
pub async fn query_version(dest: &Path, logger: &Logger) -> VersionFacts {
    let spec = CommandSpec::new(imcl_path(dest)).arg("version");
    logger.debug("PROBE", format!("Running {spec}"));

    match run(&spec).await {
        Ok(output) => {
            if !output.success() {
                logger.debug(
                    "PROBE",
                    format!("{spec} exited with status {}", output.status),
                );
            }
            let facts = VersionFacts::parse(&output.stdout);
            if facts.is_empty() {
                logger.debug("PROBE", "Version output carried no recognisable facts");
            }
            facts
        }
        Err(err) => {
            logger.warn("PROBE", format!("Version query unavailable: {err}"));
            VersionFacts::default()
        }
    }
}

/// Decide whether IBM IM is installed at `dest`.
///
/// A missing destination is definitively not installed and launches
/// nothing; otherwise exactly one version query runs.
pub async fn probe(dest: &Path, logger: &Logger) -> Probe {
    if !dest.exists() {
        logger.info(
            "PROBE",
            format!("{} does not exist; IBM IM not installed", dest.display()),
        );
        return Probe {
            status: InstallStatus::NotInstalled,
            facts: VersionFacts::default(),
        };
    }

    let facts = query_version(dest, logger).await;
    let status = if facts.reports_installed() {
        InstallStatus::Installed
    } else {
        InstallStatus::NotInstalled
    };
    logger.info("PROBE", format!("{} -> {status:?}", dest.display()));
    Probe { status, facts }
}

fn map_spawn_error(err: io::Error, program: &Path) -> IbmimError {
    if err.kind() == io::ErrorKind::NotFound {
        IbmimError::CommandMissing {
            command: program.display().to_string(),
        }
    } else {
        IbmimError::Runtime(format!("Failed to spawn {}: {err}", program.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{invocations, write_script, Sandbox};

    #[test]
    fn display_joins_program_and_arguments() {
        let spec = CommandSpec::new("/opt/IBM/InstallationManager/eclipse/tools/imcl")
            .arg("uninstall")
            .arg("com.ibm.cic.agent");
        assert_eq!(
            spec.to_string(),
            "/opt/IBM/InstallationManager/eclipse/tools/imcl uninstall com.ibm.cic.agent"
        );
    }

    #[tokio::test]
    async fn missing_destination_launches_nothing() {
        let sandbox = Sandbox::new();
        let dest = sandbox.path("InstallationManager");

        let probe = probe(&dest, &Logger::quiet()).await;
        assert_eq!(probe.status, InstallStatus::NotInstalled);
        assert!(probe.facts.is_empty());
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn installed_header_yields_installed_even_on_nonzero_exit() {
        let sandbox = Sandbox::new();
        let dest = sandbox.path("InstallationManager");
        sandbox.stub_imcl(
            &dest,
            "Version: 1.9.2\nInstallation Manager (installed)",
            4,
        );

        let probe = probe(&dest, &Logger::quiet()).await;
        assert_eq!(probe.status, InstallStatus::Installed);
        assert_eq!(probe.facts.im_version.as_deref(), Some("1.9.2"));
        assert_eq!(invocations(&sandbox.calls()), vec!["imcl version"]);
    }

    #[tokio::test]
    async fn header_without_marker_is_not_installed() {
        let sandbox = Sandbox::new();
        let dest = sandbox.path("InstallationManager");
        sandbox.stub_imcl(&dest, "Architecture: 64-bit\nInstallation Manager (agent)", 0);

        let probe = probe(&dest, &Logger::quiet()).await;
        assert_eq!(probe.status, InstallStatus::NotInstalled);
        assert_eq!(probe.facts.im_arch.as_deref(), Some("64-bit"));
    }

    #[tokio::test]
    async fn existing_destination_without_imcl_is_not_installed() {
        let sandbox = Sandbox::new();
        let dest = sandbox.path("InstallationManager");
        std::fs::create_dir_all(&dest).unwrap();

        let probe = probe(&dest, &Logger::quiet()).await;
        assert_eq!(probe.status, InstallStatus::NotInstalled);
        assert!(probe.facts.is_empty());
    }

    #[tokio::test]
    async fn run_captures_status_and_both_streams() {
        let sandbox = Sandbox::new();
        let script = sandbox.path("noisy");
        write_script(&script, "echo out\necho err >&2\nexit 7\n");

        let output = run(&CommandSpec::new(&script)).await.unwrap();
        assert_eq!(output.status, 7);
        assert!(!output.success());
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
    }

    #[tokio::test]
    async fn run_reports_missing_program() {
        let sandbox = Sandbox::new();
        let err = run(&CommandSpec::new(sandbox.path("nope"))).await.unwrap_err();
        assert!(matches!(err, IbmimError::CommandMissing { .. }));
    }
}
