/*============================================================
  Synavera Project: Syn-IIM
  Module: ibmim_core::config
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Resolve module parameters from defaults, an optional TOML
    file, the Ansible arguments file and CLI overrides into one
    immutable Settings value.

  Security / Safety Notes:
    Reads operator-supplied files only; never writes.

  Dependencies:
    serde/serde_json/toml for decoding, dirs for config and
    home discovery, clap for value enums.

  Operational Scope:
    Constructed once per invocation by the entry point and
    borrowed read-only by the prober and invokers.

  Revision History:
    2025-11-12 COD  Authored layered parameter resolution.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Explicit precedence between configuration layers
    - Validation before any side effect
============================================================*/

use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

use crate::error::{IbmimError, Result};

pub const DEFAULT_SRC: &str = "/install";
pub const DEFAULT_DEST: &str = "/opt/IBM/InstallationManager";
pub const DEFAULT_LOGDIR: &str = "/tmp";
pub const DEFAULT_DATA_LOCATION: &str = "/opt/IBM/IMDataLocation";
pub const DEFAULT_SHARED_RESOURCES: &str = "/opt/IBM/IMShared";
pub const DEFAULT_PRODUCT_ID: &str = "com.ibm.cic.agent";
pub const ADMIN_UNINSTALLER: &str = "/var/ibm/InstallationManager/uninstall/uninstallc";

/// Desired end state of the installation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DesiredState {
    #[default]
    Present,
    Absent,
}

/// Privilege mode handed to the vendor installer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum AccessRights {
    #[default]
    #[value(name = "admin")]
    Admin,
    #[value(name = "nonAdmin")]
    NonAdmin,
    #[value(name = "group")]
    Group,
}

impl AccessRights {
    pub fn as_str(self) -> &'static str {
        match self {
            AccessRights::Admin => "admin",
            AccessRights::NonAdmin => "nonAdmin",
            AccessRights::Group => "group",
        }
    }
}

/// Which vendor installer contract to drive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum InstallerKind {
    /// `<src>/install` with `silent-install.ini`.
    Launcher,
    /// `<src>/tools/imcl install <product-id>` with full preference flags.
    #[default]
    Imcl,
}

/// Which vendor uninstaller contract to drive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum UninstallerKind {
    #[default]
    Uninstallc,
    Imcl,
}

/// Fully resolved, read-only module configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub state: DesiredState,
    pub src: PathBuf,
    pub dest: PathBuf,
    pub logdir: PathBuf,
    pub data_location: PathBuf,
    pub shared_resources_directory: PathBuf,
    pub access_rights: AccessRights,
    pub preserve: bool,
    pub response_file: bool,
    pub installer: InstallerKind,
    pub uninstaller: UninstallerKind,
    pub uninstaller_path: Option<PathBuf>,
    pub product_id: String,
    pub check_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            state: DesiredState::default(),
            src: PathBuf::from(DEFAULT_SRC),
            dest: PathBuf::from(DEFAULT_DEST),
            logdir: PathBuf::from(DEFAULT_LOGDIR),
            data_location: PathBuf::from(DEFAULT_DATA_LOCATION),
            shared_resources_directory: PathBuf::from(DEFAULT_SHARED_RESOURCES),
            access_rights: AccessRights::default(),
            preserve: false,
            response_file: false,
            installer: InstallerKind::default(),
            uninstaller: UninstallerKind::default(),
            uninstaller_path: None,
            product_id: DEFAULT_PRODUCT_ID.to_string(),
            check_mode: false,
        }
    }
}

/// One layer of partially specified parameters.
///
/// Field names follow the Ansible module interface; aliases accept the
/// short vendor forms and snake_case spellings used in TOML files.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ModuleArgs {
    pub state: Option<DesiredState>,
    #[serde(alias = "repositories")]
    pub src: Option<PathBuf>,
    #[serde(alias = "installationDirectory", alias = "iD")]
    pub dest: Option<PathBuf>,
    pub logdir: Option<PathBuf>,
    #[serde(rename = "dataLocation", alias = "dL", alias = "data_location")]
    pub data_location: Option<PathBuf>,
    #[serde(
        rename = "sharedResourcesDirectory",
        alias = "sRD",
        alias = "shared_resources_directory"
    )]
    pub shared_resources_directory: Option<PathBuf>,
    #[serde(rename = "accessRights", alias = "aR", alias = "access_rights")]
    pub access_rights: Option<AccessRights>,
    #[serde(deserialize_with = "loose_bool")]
    pub preserve: Option<bool>,
    #[serde(
        rename = "reponsefile",
        alias = "responsefile",
        alias = "record",
        alias = "response_file",
        deserialize_with = "loose_bool"
    )]
    pub response_file: Option<bool>,
    pub installer: Option<InstallerKind>,
    pub uninstaller: Option<UninstallerKind>,
    #[serde(alias = "uninstallerPath")]
    pub uninstaller_path: Option<PathBuf>,
    #[serde(alias = "productId")]
    pub product_id: Option<String>,
    #[serde(
        rename = "_ansible_check_mode",
        alias = "check_mode",
        deserialize_with = "loose_bool"
    )]
    pub check_mode: Option<bool>,
}

impl ModuleArgs {
    /// Decode the JSON arguments file Ansible hands to binary modules.
    pub fn from_args_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|err| {
            IbmimError::Config(format!(
                "Failed to read arguments file {}: {err}",
                path.display()
            ))
        })?;
        serde_json::from_str(&raw).map_err(|err| {
            IbmimError::Config(format!(
                "Invalid arguments file {}: {err}",
                path.display()
            ))
        })
    }

    /// Decode a TOML defaults file.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|err| {
            IbmimError::Config(format!(
                "Failed to read config file {}: {err}",
                path.display()
            ))
        })?;
        toml::from_str(&raw).map_err(|err| {
            IbmimError::Config(format!("Invalid config file {}: {err}", path.display()))
        })
    }
}

impl Settings {
    /// Layer defaults < TOML file < args file < CLI overrides, then validate.
    ///
    /// Without an explicit `config_path` the per-user default file is read
    /// only if it exists.
    pub fn resolve(
        config_path: Option<&Path>,
        args_file: Option<&Path>,
        overrides: ModuleArgs,
    ) -> Result<Self> {
        let mut settings = Settings::default();

        match config_path {
            Some(path) => settings.apply(ModuleArgs::from_toml_file(path)?),
            None => {
                if let Some(path) = default_config_path().filter(|p| p.is_file()) {
                    settings.apply(ModuleArgs::from_toml_file(&path)?);
                }
            }
        }
        if let Some(path) = args_file {
            settings.apply(ModuleArgs::from_args_file(path)?);
        }
        settings.apply(overrides);

        settings.validate()?;
        Ok(settings)
    }

    /// Overwrite every field the layer specifies.
    pub fn apply(&mut self, layer: ModuleArgs) {
        if let Some(state) = layer.state {
            self.state = state;
        }
        if let Some(src) = layer.src {
            self.src = src;
        }
        if let Some(dest) = layer.dest {
            self.dest = dest;
        }
        if let Some(logdir) = layer.logdir {
            self.logdir = logdir;
        }
        if let Some(data_location) = layer.data_location {
            self.data_location = data_location;
        }
        if let Some(shared) = layer.shared_resources_directory {
            self.shared_resources_directory = shared;
        }
        if let Some(access_rights) = layer.access_rights {
            self.access_rights = access_rights;
        }
        if let Some(preserve) = layer.preserve {
            self.preserve = preserve;
        }
        if let Some(response_file) = layer.response_file {
            self.response_file = response_file;
        }
        if let Some(installer) = layer.installer {
            self.installer = installer;
        }
        if let Some(uninstaller) = layer.uninstaller {
            self.uninstaller = uninstaller;
        }
        if layer.uninstaller_path.is_some() {
            self.uninstaller_path = layer.uninstaller_path;
        }
        if let Some(product_id) = layer.product_id {
            self.product_id = product_id;
        }
        if let Some(check_mode) = layer.check_mode {
            self.check_mode = check_mode;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.src.as_os_str().is_empty() {
            return Err(IbmimError::Config("src must not be empty".into()));
        }
        if !self.dest.is_absolute() {
            return Err(IbmimError::Config(format!(
                "dest must be an absolute path, got {}",
                self.dest.display()
            )));
        }
        if !self.logdir.is_absolute() {
            return Err(IbmimError::Config(format!(
                "logdir must be an absolute path, got {}",
                self.logdir.display()
            )));
        }
        if self.product_id.trim().is_empty() {
            return Err(IbmimError::Config("product_id must not be empty".into()));
        }
        Ok(())
    }

    /// Location of `uninstallc` for the configured access-rights mode.
    pub fn uninstallc_path(&self) -> PathBuf {
        if let Some(path) = &self.uninstaller_path {
            return path.clone();
        }
        let agent_dir = match self.access_rights {
            AccessRights::Admin => return PathBuf::from(ADMIN_UNINSTALLER),
            AccessRights::NonAdmin => "InstallationManager",
            AccessRights::Group => "InstallationManager_Group",
        };
        match dirs::home_dir() {
            Some(home) => home
                .join("var/ibm")
                .join(agent_dir)
                .join("uninstall/uninstallc"),
            None => PathBuf::from(ADMIN_UNINSTALLER),
        }
    }
}

/// `$XDG_CONFIG_HOME/ibmim/config.toml` or the platform equivalent.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("ibmim").join("config.toml"))
}

// Ansible hands booleans through as whatever the playbook author typed.
fn loose_bool<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Bool(value)) => Ok(Some(value)),
        Some(Raw::Int(value)) => Ok(Some(value != 0)),
        Some(Raw::Text(text)) => match text.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" | "true" | "on" | "1" => Ok(Some(true)),
            "no" | "n" | "false" | "off" | "0" => Ok(Some(false)),
            other => Err(D::Error::custom(format!("invalid boolean value `{other}`"))),
        },
    }
}
