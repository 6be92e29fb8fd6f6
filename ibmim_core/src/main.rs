/*============================================================
  Synavera Project: Syn-IIM
  Module: ibmim_core::main
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Entry point for the IBM Installation Manager installer
    module. Resolves parameters, reconciles the installation
    with the requested state and prints the result document.

  Security / Safety Notes:
    Launches vendor installer binaries with caller privileges.
    Check mode launches nothing and writes nothing.

  Dependencies:
    clap for CLI parsing, tokio for process execution.

  Operational Scope:
    Invoked by Ansible as a WANT_JSON binary module (single
    arguments-file operand) or directly by operators.

  Revision History:
    2025-11-12 COD  Authored Syn-IIM installer runtime.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Result-first error handling with deterministic exits
    - Structured logging following Synavera cadence
    - Configurable execution via CLI and config file
============================================================*/

mod config;
mod error;
mod facts;
mod imcl;
mod logger;
mod provision;
mod result;
#[cfg(test)]
mod test_support;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};

use config::{AccessRights, DesiredState, InstallerKind, ModuleArgs, Settings, UninstallerKind};
use logger::Logger;
use provision::{Failure, Outcome};
use result::InvocationResult;

/// Command-line arguments for the installer module.
#[derive(Debug, Parser)]
#[command(
    name = "ibmim_installer",
    version,
    author = "Synavera Systems",
    about = "Install or uninstall IBM Installation Manager idempotently"
)]
struct Cli {
    /// Ansible module arguments file (JSON).
    #[arg(value_name = "ARGS_FILE")]
    args_file: Option<PathBuf>,
    /// TOML file with default parameters.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Append log entries to this file.
    #[arg(long, value_name = "PATH")]
    log: Option<PathBuf>,
    /// Enable verbose logging to stderr.
    #[arg(long, action = ArgAction::SetTrue)]
    verbose: bool,
    /// Report the intended action without performing it.
    #[arg(long, action = ArgAction::SetTrue)]
    check: bool,
    #[arg(long, value_enum)]
    state: Option<DesiredState>,
    /// Installer source repository.
    #[arg(long, value_name = "PATH")]
    src: Option<PathBuf>,
    /// Installation directory.
    #[arg(long, value_name = "PATH")]
    dest: Option<PathBuf>,
    /// Directory for installer log and response files.
    #[arg(long, value_name = "PATH")]
    logdir: Option<PathBuf>,
    #[arg(long, value_name = "PATH")]
    data_location: Option<PathBuf>,
    #[arg(long, value_name = "PATH")]
    shared_resources_directory: Option<PathBuf>,
    #[arg(long, value_enum)]
    access_rights: Option<AccessRights>,
    /// Keep downloaded artifacts.
    #[arg(long, action = ArgAction::SetTrue)]
    preserve: bool,
    /// Record a response file in the log directory.
    #[arg(long, action = ArgAction::SetTrue)]
    response_file: bool,
    #[arg(long, value_enum)]
    installer: Option<InstallerKind>,
    #[arg(long, value_enum)]
    uninstaller: Option<UninstallerKind>,
    #[arg(long, value_name = "PATH")]
    uninstaller_path: Option<PathBuf>,
    #[arg(long, value_name = "ID")]
    product_id: Option<String>,
}

impl Cli {
    /// Flags given on the command line; switches only override when set.
    fn overrides(&self) -> ModuleArgs {
        ModuleArgs {
            state: self.state,
            src: self.src.clone(),
            dest: self.dest.clone(),
            logdir: self.logdir.clone(),
            data_location: self.data_location.clone(),
            shared_resources_directory: self.shared_resources_directory.clone(),
            access_rights: self.access_rights,
            preserve: self.preserve.then_some(true),
            response_file: self.response_file.then_some(true),
            installer: self.installer,
            uninstaller: self.uninstaller,
            uninstaller_path: self.uninstaller_path.clone(),
            product_id: self.product_id.clone(),
            check_mode: self.check.then_some(true),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let (document, code) = match run(&cli).await {
        Ok(document) => (document, ExitCode::SUCCESS),
        Err(failure) => {
            eprintln!("[Syn-IIM] {}", failure.error);
            (InvocationResult::failed(&failure), ExitCode::FAILURE)
        }
    };

    if let Err(err) = result::emit(&document, std::io::stdout().lock()) {
        eprintln!("[Syn-IIM] {err}");
        return ExitCode::FAILURE;
    }
    code
}

async fn run(cli: &Cli) -> Outcome {
    let settings = Settings::resolve(
        cli.config.as_deref(),
        cli.args_file.as_deref(),
        cli.overrides(),
    )?;
    let logger = Logger::new(cli.log.clone(), cli.verbose)?;
    logger.info(
        "INIT",
        format!(
            "state={:?} dest={} check_mode={}",
            settings.state,
            settings.dest.display(),
            settings.check_mode
        ),
    );

    let outcome = provision::apply(&settings, &logger).await;
    match &outcome {
        Ok(document) => logger.info(
            "COMPLETE",
            format!("changed={} {}", document.changed, document.msg),
        ),
        Err(Failure { error, .. }) => logger.error("FAILED", error.to_string()),
    }
    if let Err(err) = logger.finalize() {
        logger.warn("LOGGER", format!("Failed to seal log: {err}"));
    }
    outcome
}
