/*============================================================
  Synavera Project: Syn-IIM
  Module: ibmim_core::test_support
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Temporary sandboxes and POSIX `sh` stand-ins for imcl, the
    vendor installer and uninstallc used by unit tests.

  Security / Safety Notes:
    Test-only; writes confined to per-test temp directories.

  Dependencies:
    tempfile for isolated directories.

  Operational Scope:
    Compiled under `cfg(test)` only.

  Revision History:
    2025-11-12 COD  Added stub harness for provisioning tests.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Every stub launch is recorded for exact assertions
============================================================*/

// Every stub appends one line per launch to `calls.log`.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

pub const INSTALLED_OUTPUT: &str = "Version: 1.8.0\nInternal Version: 1.8.0.20140902_1503\nArchitecture: 64-bit\nInstallation Manager (installed)";

pub enum StubOutcome {
    /// Install, then leave an imcl behind that prints the given version output.
    Succeeds(&'static str),
    /// Exit with the code after printing the text (if any) on stderr.
    Fails(i32, &'static str),
}

pub struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn calls(&self) -> PathBuf {
        self.path("calls.log")
    }

    pub fn stub_imcl(&self, dest: &Path, version_output: &str, version_exit: i32) {
        write_script(
            &dest.join("eclipse/tools/imcl"),
            &imcl_body(&self.calls(), version_output, version_exit),
        );
    }

    pub fn stub_installer(&self, program: &Path, outcome: StubOutcome) {
        let calls = self.calls();
        let mut body = format!(
            "echo \"installer $*\" >> '{calls}'\n\
             dest=''\n\
             while [ $# -gt 0 ]; do\n\
             \x20 if [ \"$1\" = \"-installationDirectory\" ]; then dest=\"$2\"; fi\n\
             \x20 shift\n\
             done\n",
            calls = calls.display()
        );
        match outcome {
            StubOutcome::Fails(code, stderr) => {
                if !stderr.is_empty() {
                    body.push_str(&format!("echo '{stderr}' >&2\n"));
                }
                body.push_str(&format!("exit {code}\n"));
            }
            StubOutcome::Succeeds(version_output) => {
                body.push_str(&format!(
                    "mkdir -p \"$dest/eclipse/tools\"\n\
                     cat > \"$dest/eclipse/tools/imcl\" <<'STUB'\n\
                     #!/bin/sh\n\
                     {imcl}\
                     STUB\n\
                     chmod 755 \"$dest/eclipse/tools/imcl\"\n\
                     echo \"Installed Installation Manager to $dest\"\n",
                    imcl = imcl_body(&calls, version_output, 0)
                ));
            }
        }
        write_script(program, &body);
    }

    pub fn stub_uninstallc(&self, program: &Path, exit: i32) {
        write_script(
            program,
            &format!(
                "echo uninstallc >> '{}'\necho 'Uninstalling Installation Manager'\nexit {exit}\n",
                self.calls().display()
            ),
        );
    }
}

fn imcl_body(calls: &Path, version_output: &str, version_exit: i32) -> String {
    format!(
        "echo \"imcl $*\" >> '{calls}'\n\
         case \"$1\" in\n\
         \x20 version)\n\
         cat <<'OUT'\n\
         {version_output}\n\
         OUT\n\
         \x20   exit {version_exit} ;;\n\
         \x20 uninstall) echo 'Uninstalled'; exit 0 ;;\n\
         esac\n\
         exit 1\n",
        calls = calls.display()
    )
}

/// Write an executable `sh` script, creating parent directories.
pub fn write_script(path: &Path, body: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("script parent");
    }
    fs::write(path, format!("#!/bin/sh\n{body}")).expect("write script");
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).expect("chmod script");
}

/// Lines recorded by stubs, oldest first; empty when nothing ran.
pub fn invocations(calls: &Path) -> Vec<String> {
    fs::read_to_string(calls)
        .map(|log| log.lines().map(|line| line.trim().to_string()).collect())
        .unwrap_or_default()
}
