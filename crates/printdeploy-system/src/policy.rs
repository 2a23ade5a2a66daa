use std::process::Command;

use anyhow::Result;
use printdeploy_core::{InstallContext, LOOPBACK_HOST, POINT_AND_PRINT_KEY, UNINSTALL_KEY_ROOT};

use crate::exec::run_command;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryValue {
    Dword(u32),
    Sz(String),
}

impl RegistryValue {
    pub fn reg_type(&self) -> &'static str {
        match self {
            Self::Dword(_) => "REG_DWORD",
            Self::Sz(_) => "REG_SZ",
        }
    }

    pub fn reg_data(&self) -> String {
        match self {
            Self::Dword(value) => value.to_string(),
            Self::Sz(value) => value.clone(),
        }
    }
}

pub fn point_and_print_values() -> Vec<(&'static str, RegistryValue)> {
    vec![
        ("Restricted", RegistryValue::Dword(0)),
        (
            "RestrictDriverInstallationToAdministrators",
            RegistryValue::Dword(0),
        ),
        ("TrustedServers", RegistryValue::Dword(1)),
        ("ServerList", RegistryValue::Sz(LOOPBACK_HOST.to_string())),
        ("NoWarningNoElevationOnInstall", RegistryValue::Dword(1)),
        ("UpdatePromptSettings", RegistryValue::Dword(2)),
    ]
}

pub fn set_point_and_print_policy() -> Vec<String> {
    set_point_and_print_policy_with_executor(run_command)
}

pub(crate) fn set_point_and_print_policy_with_executor<Run>(mut run: Run) -> Vec<String>
where
    Run: FnMut(&mut Command, &str) -> Result<()>,
{
    let mut warnings = Vec::new();
    for (name, value) in point_and_print_values() {
        if let Err(err) = write_registry_value(POINT_AND_PRINT_KEY, name, &value, &mut run) {
            warnings.push(format!("policy value '{name}': {err}"));
        }
    }
    warnings
}

pub fn uninstall_metadata_key(app_id: &str) -> String {
    format!(r"{UNINSTALL_KEY_ROOT}\{app_id}")
}

pub fn uninstall_metadata_values(context: &InstallContext) -> Vec<(&'static str, RegistryValue)> {
    vec![
        (
            "DisplayName",
            RegistryValue::Sz(context.display_name.clone()),
        ),
        (
            "DisplayVersion",
            RegistryValue::Sz(context.version.to_string()),
        ),
        ("Publisher", RegistryValue::Sz(context.publisher.clone())),
        ("HelpLink", RegistryValue::Sz(context.help_url.clone())),
        ("NoModify", RegistryValue::Dword(1)),
        ("MultiUserInstall", RegistryValue::Dword(1)),
    ]
}

pub fn write_uninstall_metadata(context: &InstallContext) -> Vec<String> {
    write_uninstall_metadata_with_executor(context, run_command)
}

pub(crate) fn write_uninstall_metadata_with_executor<Run>(
    context: &InstallContext,
    mut run: Run,
) -> Vec<String>
where
    Run: FnMut(&mut Command, &str) -> Result<()>,
{
    let key = uninstall_metadata_key(&context.app_id);
    let mut warnings = Vec::new();
    for (name, value) in uninstall_metadata_values(context) {
        if let Err(err) = write_registry_value(&key, name, &value, &mut run) {
            warnings.push(format!("uninstall metadata '{name}': {err}"));
        }
    }
    warnings
}

fn write_registry_value<Run>(
    key: &str,
    name: &str,
    value: &RegistryValue,
    run: &mut Run,
) -> Result<()>
where
    Run: FnMut(&mut Command, &str) -> Result<()>,
{
    let mut command = Command::new("reg");
    command
        .arg("add")
        .arg(key)
        .arg("/v")
        .arg(name)
        .arg("/t")
        .arg(value.reg_type())
        .arg("/d")
        .arg(value.reg_data())
        .arg("/f");
    run(&mut command, "failed to write registry value")
}
