/*============================================================
  Synavera Project: Syn-IIM
  Module: ibmim_core::provision
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Drive IBM Installation Manager between its two states:
    install when absent, uninstall when present, no-op when
    the requested state already holds.

  Security / Safety Notes:
    Launches vendor installers with caller privileges. Dry-run
    performs no probing, no launches and no filesystem writes.

  Dependencies:
    chrono for log stamps, nix for the host name.

  Operational Scope:
    Called once per module invocation by the entry point.

  Revision History:
    2025-11-12 COD  Authored idempotent install/uninstall flow.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Preconditions verified before any launch
    - Every failure carries diagnostics and known facts
    - Exactly one attempt per external command
============================================================*/

use std::path::{Path, PathBuf};

use chrono::Local;

use crate::config::{DesiredState, InstallerKind, Settings, UninstallerKind};
use crate::error::IbmimError;
use crate::facts::VersionFacts;
use crate::imcl::{self, CommandOutput, CommandSpec, InstallStatus};
use crate::logger::Logger;
use crate::result::InvocationResult;

const LAUNCHER_INI: &str = "silent-install.ini";
const PRESERVE_PREFERENCES: [&str; 2] = [
    "com.ibm.cic.common.core.preferences.preserveDownloadedArtifacts",
    "com.ibm.cic.common.core.preferences.keepFetchedFiles",
];

/// A terminal error together with the facts known when it happened.
#[derive(Debug)]
pub struct Failure {
    pub error: IbmimError,
    pub facts: VersionFacts,
}

impl Failure {
    pub fn new(error: IbmimError, facts: VersionFacts) -> Self {
        Self { error, facts }
    }
}

impl From<IbmimError> for Failure {
    fn from(error: IbmimError) -> Self {
        Self::new(error, VersionFacts::default())
    }
}

pub type Outcome = std::result::Result<InvocationResult, Failure>;

/// Files the installer writes into `logdir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallArtifacts {
    pub log_file: PathBuf,
    pub response_file: PathBuf,
}

impl InstallArtifacts {
    pub fn new(logdir: &Path, host: &str, stamp: &str) -> Self {
        Self {
            log_file: logdir.join(format!("{host}_ibmim_{stamp}.xml")),
            response_file: logdir.join(format!("{host}_ibmim_{stamp}_response.xml")),
        }
    }
}

/// Reconcile the installation with the requested state.
pub async fn apply(settings: &Settings, logger: &Logger) -> Outcome {
    match settings.state {
        DesiredState::Present => install(settings, logger).await,
        DesiredState::Absent => uninstall(settings, logger).await,
    }
}

/// Install IBM IM at `dest` unless the prober already finds it there.
pub async fn install(settings: &Settings, logger: &Logger) -> Outcome {
    let dest = &settings.dest;
    if settings.check_mode {
        logger.info("CHECK", "Check mode; skipping probe and installation");
        return Ok(InvocationResult::unchanged(
            format!("IBM IM would be installed at {}", dest.display()),
            VersionFacts::default(),
        ));
    }

    let probe = imcl::probe(dest, logger).await;
    if probe.status == InstallStatus::Installed {
        return Ok(InvocationResult::unchanged(
            "IBM IM is already installed",
            probe.facts,
        ));
    }

    let installer = installer_program(settings);
    if !installer.exists() {
        return Err(Failure::new(
            IbmimError::MissingSourcePath { path: installer },
            probe.facts,
        ));
    }
    if let Err(err) = ensure_log_dir(&settings.logdir) {
        return Err(Failure::new(err, probe.facts));
    }

    let stamp = Local::now().format("%Y%m%d-%H%M%S").to_string();
    let artifacts = InstallArtifacts::new(&settings.logdir, &hostname(), &stamp);
    let spec = install_command(settings, &artifacts);
    logger.info("INSTALL", format!("Running {spec}"));

    let output = match imcl::run(&spec).await {
        Ok(output) => output,
        Err(err) => return Err(Failure::new(err, probe.facts)),
    };
    if !output.success() {
        return Err(Failure::new(
            command_failure("installation", &spec, output),
            probe.facts,
        ));
    }
    logger.info(
        "INSTALL",
        format!("Installer finished; log at {}", artifacts.log_file.display()),
    );

    let facts = imcl::query_version(dest, logger).await;
    Ok(InvocationResult::changed("IBM IM installed successfully", facts).with_output(output))
}

/// Remove IBM IM when the prober finds it installed at `dest`.
pub async fn uninstall(settings: &Settings, logger: &Logger) -> Outcome {
    let dest = &settings.dest;
    if settings.check_mode {
        logger.info("CHECK", "Check mode; skipping probe and uninstallation");
        return Ok(InvocationResult::unchanged(
            format!("IBM IM would be uninstalled from {}", dest.display()),
            VersionFacts::default(),
        ));
    }

    let probe = imcl::probe(dest, logger).await;
    if probe.status == InstallStatus::NotInstalled {
        return Ok(InvocationResult::unchanged(
            "IBM IM is not installed",
            probe.facts,
        ));
    }

    let spec = uninstall_command(settings);
    if !spec.program.exists() {
        return Err(Failure::new(
            IbmimError::MissingUninstallerPath { path: spec.program },
            probe.facts,
        ));
    }
    logger.info("UNINSTALL", format!("Running {spec}"));

    let output = match imcl::run(&spec).await {
        Ok(output) => output,
        Err(err) => return Err(Failure::new(err, probe.facts)),
    };
    if !output.success() {
        return Err(Failure::new(
            command_failure("uninstall", &spec, output),
            probe.facts,
        ));
    }

    Ok(InvocationResult::changed("IBM IM uninstalled successfully", probe.facts)
        .with_output(output))
}

/// Vendor installer executable for the configured flavour.
pub fn installer_program(settings: &Settings) -> PathBuf {
    match settings.installer {
        InstallerKind::Launcher => settings.src.join("install"),
        InstallerKind::Imcl => settings.src.join("tools").join("imcl"),
    }
}

/// Vendor installer invocation; flag order is what the vendor tool expects.
pub fn install_command(settings: &Settings, artifacts: &InstallArtifacts) -> CommandSpec {
    let program = installer_program(settings);
    match settings.installer {
        InstallerKind::Launcher => CommandSpec::new(program)
            .arg("-acceptLicense")
            .flag("--launcher.ini", settings.src.join(LAUNCHER_INI))
            .flag("-log", &artifacts.log_file)
            .flag("-installationDirectory", &settings.dest),
        InstallerKind::Imcl => {
            let mut spec = CommandSpec::new(program)
                .arg("install")
                .arg(&settings.product_id)
                .arg("-acceptLicense")
                .flag("-accessRights", settings.access_rights.as_str())
                .flag("-eclipseLocation", &settings.dest)
                .flag("-installationDirectory", &settings.dest)
                .flag("-dataLocation", &settings.data_location)
                .flag("-log", &artifacts.log_file)
                .flag("-nl", "en");
            if settings.response_file {
                spec = spec.flag("-record", &artifacts.response_file);
            }
            spec.flag("-repositories", &settings.src)
                .flag(
                    "-sharedResourcesDirectory",
                    &settings.shared_resources_directory,
                )
                .flag("-preferences", preferences(settings.preserve))
        }
    }
}

/// Vendor uninstaller invocation for the configured flavour.
pub fn uninstall_command(settings: &Settings) -> CommandSpec {
    match settings.uninstaller {
        UninstallerKind::Imcl => CommandSpec::new(imcl::imcl_path(&settings.dest))
            .arg("uninstall")
            .arg(&settings.product_id),
        UninstallerKind::Uninstallc => CommandSpec::new(settings.uninstallc_path()),
    }
}

fn preferences(preserve: bool) -> String {
    PRESERVE_PREFERENCES
        .iter()
        .map(|key| format!("{key}={preserve}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn ensure_log_dir(logdir: &Path) -> crate::error::Result<()> {
    if logdir.is_dir() {
        return Ok(());
    }
    std::fs::create_dir_all(logdir).map_err(|err| {
        IbmimError::Filesystem(format!(
            "Failed to create log directory {}: {err}",
            logdir.display()
        ))
    })
}

fn command_failure(action: &str, spec: &CommandSpec, output: CommandOutput) -> IbmimError {
    let mut stderr = output.stderr;
    if output.stdout.trim().is_empty() && stderr.trim().is_empty() {
        stderr = format!(
            "{spec} exited with status {} and produced no output",
            output.status
        );
    }
    IbmimError::CommandFailure {
        action: action.to_string(),
        command: spec.to_string(),
        status: output.status,
        stdout: output.stdout,
        stderr,
    }
}

fn hostname() -> String {
    match nix::unistd::gethostname() {
        Ok(name) => match name.to_string_lossy().trim() {
            "" => "localhost".to_string(),
            host => host.to_string(),
        },
        Err(_) => "localhost".to_string(),
    }
}
