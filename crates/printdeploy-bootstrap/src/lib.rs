mod packages;
mod runtime;

use std::path::PathBuf;
use std::process::Command;

use anyhow::Result;
use printdeploy_core::{package_specs, PackageSpec, RUNTIME_INSTALLER_URL};
use printdeploy_system::{run_command, run_command_capture};

pub use packages::{PackageInstallOutcome, PackageVerification};
pub use runtime::{
    download_runtime_installer, ProbeSource, RuntimeLauncher, RuntimeProbe,
};

pub trait RuntimePrompt {
    fn confirm_runtime_install(&mut self) -> bool;
}

pub trait DownloadProgress {
    fn on_progress(&mut self, received: u64, total: Option<u64>);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    Completed,
    RuntimeDeclined,
    RuntimeUnavailable,
    PackageInstallDegraded,
}

impl BootstrapOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::RuntimeDeclined => "runtime-declined",
            Self::RuntimeUnavailable => "runtime-unavailable",
            Self::PackageInstallDegraded => "package-install-degraded",
        }
    }

    pub fn is_degraded(&self) -> bool {
        !matches!(self, Self::Completed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapReport {
    pub runtime: Option<RuntimeProbe>,
    pub outcome: BootstrapOutcome,
    pub installed: Vec<PackageInstallOutcome>,
    pub verified: Vec<PackageVerification>,
    pub warnings: Vec<String>,
}

impl BootstrapReport {
    fn new() -> Self {
        Self {
            runtime: None,
            outcome: BootstrapOutcome::Completed,
            installed: Vec::new(),
            verified: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

pub fn detect_runtime() -> Option<RuntimeProbe> {
    runtime::detect_runtime_with_executor(&mut run_command_capture)
}

pub fn run_bootstrap(
    prompt: &mut dyn RuntimePrompt,
    progress: &mut dyn DownloadProgress,
    expected_sha256: Option<&str>,
) -> BootstrapReport {
    run_bootstrap_with_executors(
        package_specs(),
        prompt,
        run_command,
        run_command_capture,
        |progress| {
            download_runtime_installer(
                RUNTIME_INSTALLER_URL,
                &std::env::temp_dir(),
                expected_sha256,
                progress,
            )
        },
        progress,
    )
}

// CHECK_RUNTIME -> DOWNLOAD_RUNTIME -> INSTALL_RUNTIME -> INSTALL_PACKAGES ->
// VERIFY_PACKAGES, every state entered at most once per run.
pub(crate) fn run_bootstrap_with_executors<Run, Capture, Download>(
    specs: &[PackageSpec],
    prompt: &mut dyn RuntimePrompt,
    mut run: Run,
    mut capture: Capture,
    mut download: Download,
    progress: &mut dyn DownloadProgress,
) -> BootstrapReport
where
    Run: FnMut(&mut Command, &str) -> Result<()>,
    Capture: FnMut(&mut Command, &str) -> Result<String>,
    Download: FnMut(&mut dyn DownloadProgress) -> Result<PathBuf>,
{
    let mut report = BootstrapReport::new();

    let launcher = match runtime::detect_runtime_with_executor(&mut capture) {
        Some(probe) => {
            let launcher = probe.launcher;
            report.runtime = Some(probe);
            launcher
        }
        None => {
            if !prompt.confirm_runtime_install() {
                report.outcome = BootstrapOutcome::RuntimeDeclined;
                report.warnings.push(
                    "runtime install declined; the application stays non-functional until Python is installed"
                        .to_string(),
                );
                return report;
            }

            let installer = match download(progress) {
                Ok(path) => path,
                Err(err) => {
                    report.outcome = BootstrapOutcome::RuntimeUnavailable;
                    report.warnings.push(format!("runtime download failed: {err}"));
                    return report;
                }
            };

            if let Err(err) = runtime::install_runtime_with_executor(&installer, &mut run) {
                report.outcome = BootstrapOutcome::RuntimeUnavailable;
                report.warnings.push(format!("runtime install failed: {err}"));
                return report;
            }

            report.runtime = Some(RuntimeProbe {
                launcher: RuntimeLauncher::Python,
                version: None,
                source: ProbeSource::FreshInstall,
            });
            RuntimeLauncher::Python
        }
    };

    report.installed = packages::install_packages_with_executor(launcher, specs, &mut run);
    report.verified = packages::verify_packages_with_executor(launcher, specs, &mut run);

    let failures = report
        .installed
        .iter()
        .filter(|outcome| !outcome.succeeded)
        .count();
    if failures > 0 {
        report.outcome = BootstrapOutcome::PackageInstallDegraded;
        report
            .warnings
            .push(format!("{failures} package install(s) failed"));
    }

    report
}
