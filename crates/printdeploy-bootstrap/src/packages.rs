use std::process::Command;

use anyhow::Result;
use printdeploy_core::PackageSpec;

use crate::runtime::RuntimeLauncher;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInstallOutcome {
    pub name: String,
    pub succeeded: bool,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageVerification {
    pub name: String,
    pub probe_module: String,
    pub importable: bool,
}

pub(crate) fn install_packages_with_executor<Run>(
    launcher: RuntimeLauncher,
    specs: &[PackageSpec],
    run: &mut Run,
) -> Vec<PackageInstallOutcome>
where
    Run: FnMut(&mut Command, &str) -> Result<()>,
{
    let mut outcomes = Vec::with_capacity(specs.len());
    for spec in specs {
        let mut command = launcher.command();
        command
            .arg("-m")
            .arg("pip")
            .arg("install")
            .arg("--disable-pip-version-check")
            .arg(spec.pip_requirement());
        let outcome = match run(&mut command, "failed to install package") {
            Ok(()) => PackageInstallOutcome {
                name: spec.name.to_string(),
                succeeded: true,
                detail: spec.pip_requirement(),
            },
            Err(err) => PackageInstallOutcome {
                name: spec.name.to_string(),
                succeeded: false,
                detail: err.to_string(),
            },
        };
        outcomes.push(outcome);
    }
    outcomes
}

pub(crate) fn verify_packages_with_executor<Run>(
    launcher: RuntimeLauncher,
    specs: &[PackageSpec],
    run: &mut Run,
) -> Vec<PackageVerification>
where
    Run: FnMut(&mut Command, &str) -> Result<()>,
{
    let mut verifications = Vec::with_capacity(specs.len());
    for spec in specs {
        let mut command = launcher.command();
        command
            .arg("-c")
            .arg(format!("import {}", spec.probe_module));
        let importable = run(&mut command, "package import probe failed").is_ok();
        verifications.push(PackageVerification {
            name: spec.name.to_string(),
            probe_module: spec.probe_module.to_string(),
            importable,
        });
    }
    verifications
}
