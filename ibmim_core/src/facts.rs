/*============================================================
  Synavera Project: Syn-IIM
  Module: ibmim_core::facts
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Version facts extracted from `imcl version` output and the
    installed/not-installed verdict derived from them.

  Security / Safety Notes:
    Pure parsing; no I/O performed in this module.

  Dependencies:
    regex for extraction, serde for result serialization.

  Operational Scope:
    Produced by the state prober, carried unchanged into every
    module result as `module_facts`.

  Revision History:
    2025-11-12 COD  Introduced VersionFacts extraction.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Best-effort extraction; absent data is data, not failure
    - Immutable values threaded explicitly between steps
============================================================*/

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*Version: ([0-9].*)$").unwrap());
static INTERNAL_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)Internal Version: ([0-9].*)$").unwrap());
static ARCH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Architecture: ([0-9]+-bit)").unwrap());
static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Installation Manager.*").unwrap());

/// Facts reported by one `imcl version` run. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VersionFacts {
    pub im_version: Option<String>,
    pub im_internal_version: Option<String>,
    pub im_arch: Option<String>,
    pub im_header: Option<String>,
}

impl VersionFacts {
    /// Extract whatever facts the output carries; unmatched fields stay unset.
    pub fn parse(output: &str) -> Self {
        Self {
            im_version: capture(&VERSION_RE, output),
            im_internal_version: capture(&INTERNAL_VERSION_RE, output),
            im_arch: capture(&ARCH_RE, output),
            im_header: HEADER_RE
                .find(output)
                .map(|m| m.as_str().trim_end().to_string()),
        }
    }

    /// True when the header line mentions "installed".
    pub fn reports_installed(&self) -> bool {
        self.im_header
            .as_deref()
            .is_some_and(|header| header.contains("installed"))
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn capture(re: &Regex, output: &str) -> Option<String> {
    re.captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim_end().to_string())
        .filter(|value| !value.is_empty())
}
