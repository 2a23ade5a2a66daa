use std::path::Path;

use anyhow::Result;
use printdeploy_bootstrap::{
    run_bootstrap, BootstrapOutcome, BootstrapReport, DownloadProgress, RuntimePrompt,
};
use printdeploy_core::{InstallContext, PlatformCapabilities, RunLog, RunOutcome, StepClass};
use printdeploy_system::{PrincipalOutcome, ReclaimReport, SpoolerRestart};

pub(crate) const STEP_STOP: &str = "stop-application";
pub(crate) const STEP_RECLAIM: &str = "reclaim-print-resources";
pub(crate) const STEP_GATE: &str = "executable-gate";
pub(crate) const STEP_GRANT: &str = "grant-directory-access";
pub(crate) const STEP_GROUP: &str = "join-print-operators";
pub(crate) const STEP_POLICY: &str = "point-and-print-policy";
pub(crate) const STEP_BOOTSTRAP: &str = "dependency-bootstrap";
pub(crate) const STEP_VERIFY: &str = "verify-packages";
pub(crate) const STEP_SPOOLER: &str = "restart-spooler";
pub(crate) const STEP_METADATA: &str = "uninstall-metadata";

pub(crate) trait Orchestrator {
    fn application_running(&mut self, exe_name: &str) -> Result<bool>;
    fn stop_application(&mut self, exe_name: &str) -> Result<()>;
    fn reclaim_print_resources(&mut self) -> ReclaimReport;
    fn executable_present(&mut self, path: &Path) -> bool;
    fn grant_full_access(&mut self, path: &Path) -> Vec<PrincipalOutcome>;
    fn join_print_operators_group(&mut self) -> Vec<PrincipalOutcome>;
    fn set_point_and_print_policy(&mut self) -> Vec<String>;
    fn run_bootstrap(&mut self) -> BootstrapReport;
    fn restart_spooler(&mut self) -> SpoolerRestart;
    fn write_uninstall_metadata(&mut self, context: &InstallContext) -> Vec<String>;
}

pub(crate) struct PipelineRun {
    pub log: RunLog,
    pub outcome: RunOutcome,
}

pub(crate) fn run_install_pipeline(
    context: &InstallContext,
    ops: &mut dyn Orchestrator,
) -> PipelineRun {
    let mut log = RunLog::new();
    let mut degraded = false;

    record_stop_step(&mut log, &context.executable_name, ops);
    record_reclaim_step(&mut log, ops);

    // The one critical gate: everything after this point assumes the
    // packaging layer deployed the application binary.
    let executable = context.executable_path();
    if !ops.executable_present(&executable) {
        log.failed(
            STEP_GATE,
            StepClass::Critical,
            format!("mandatory artifact missing: {}", executable.display()),
        );
        return PipelineRun {
            log,
            outcome: RunOutcome::Aborted,
        };
    }
    log.succeeded(
        STEP_GATE,
        StepClass::Critical,
        format!("found {}", executable.display()),
    );

    record_principal_step(
        &mut log,
        STEP_GRANT,
        ops.grant_full_access(context.install_dir()),
    );
    record_principal_step(&mut log, STEP_GROUP, ops.join_print_operators_group());

    let policy_warnings = ops.set_point_and_print_policy();
    if policy_warnings.is_empty() {
        log.succeeded(STEP_POLICY, StepClass::BestEffort, "policy values written");
    } else {
        log.failed(STEP_POLICY, StepClass::BestEffort, policy_warnings.join("; "));
    }

    if context.bundled_binary_present {
        log.skipped(
            STEP_BOOTSTRAP,
            StepClass::BestEffort,
            "bundled binary present",
        );
    } else {
        let report = ops.run_bootstrap();
        record_bootstrap_steps(&mut log, &report);
        if report.outcome.is_degraded() {
            degraded = true;
        }
    }

    let restart = ops.restart_spooler();
    if restart.succeeded() {
        log.succeeded(STEP_SPOOLER, StepClass::BestEffort, "spooler restarted");
    } else {
        log.failed(
            STEP_SPOOLER,
            StepClass::BestEffort,
            restart.warnings.join("; "),
        );
    }

    let metadata_warnings = ops.write_uninstall_metadata(context);
    if metadata_warnings.is_empty() {
        log.succeeded(
            STEP_METADATA,
            StepClass::BestEffort,
            "uninstall metadata written",
        );
    } else {
        log.failed(
            STEP_METADATA,
            StepClass::BestEffort,
            metadata_warnings.join("; "),
        );
    }

    PipelineRun {
        log,
        outcome: if degraded {
            RunOutcome::CompletedDegraded
        } else {
            RunOutcome::Completed
        },
    }
}

pub(crate) fn run_uninstall_pipeline(exe_name: &str, ops: &mut dyn Orchestrator) -> PipelineRun {
    let mut log = RunLog::new();

    record_stop_step(&mut log, exe_name, ops);
    record_reclaim_step(&mut log, ops);

    PipelineRun {
        log,
        outcome: RunOutcome::Completed,
    }
}

fn record_stop_step(log: &mut RunLog, exe_name: &str, ops: &mut dyn Orchestrator) {
    match ops.application_running(exe_name) {
        Ok(false) => log.skipped(STEP_STOP, StepClass::BestEffort, "no running instance"),
        Ok(true) => match ops.stop_application(exe_name) {
            Ok(()) => log.succeeded(
                STEP_STOP,
                StepClass::BestEffort,
                format!("terminated {exe_name}"),
            ),
            Err(err) => log.failed(STEP_STOP, StepClass::BestEffort, err.to_string()),
        },
        Err(err) => log.failed(STEP_STOP, StepClass::BestEffort, err.to_string()),
    }
}

fn record_reclaim_step(log: &mut RunLog, ops: &mut dyn Orchestrator) {
    let report = ops.reclaim_print_resources();
    let summary = format!(
        "{} printer(s), {} port(s) removed",
        report.removed_printers.len(),
        report.removed_ports.len()
    );
    if report.warnings.is_empty() {
        log.succeeded(STEP_RECLAIM, StepClass::BestEffort, summary);
    } else {
        log.failed(
            STEP_RECLAIM,
            StepClass::BestEffort,
            format!("{summary}; {}", report.warnings.join("; ")),
        );
    }
}

fn record_principal_step(log: &mut RunLog, step: &str, outcomes: Vec<PrincipalOutcome>) {
    let granted = outcomes.iter().filter(|outcome| outcome.succeeded).count();
    let failures = outcomes
        .iter()
        .filter(|outcome| !outcome.succeeded)
        .map(|outcome| format!("{}: {}", outcome.principal, outcome.detail))
        .collect::<Vec<_>>();
    let summary = format!("{granted}/{} principal(s)", outcomes.len());

    if granted > 0 {
        if failures.is_empty() {
            log.succeeded(step, StepClass::BestEffort, summary);
        } else {
            log.succeeded(
                step,
                StepClass::BestEffort,
                format!("{summary}; {}", failures.join("; ")),
            );
        }
    } else {
        log.failed(
            step,
            StepClass::BestEffort,
            format!("{summary}; {}", failures.join("; ")),
        );
    }
}

fn record_bootstrap_steps(log: &mut RunLog, report: &BootstrapReport) {
    let runtime = report
        .runtime
        .as_ref()
        .map(|probe| probe.describe())
        .unwrap_or_else(|| "runtime unavailable".to_string());
    let installed = report
        .installed
        .iter()
        .filter(|outcome| outcome.succeeded)
        .count();
    let summary = format!(
        "{}; {runtime}; {installed}/{} package(s) installed",
        report.outcome.as_str(),
        report.installed.len()
    );

    if report.outcome == BootstrapOutcome::Completed {
        log.succeeded(STEP_BOOTSTRAP, StepClass::BestEffort, summary);
    } else {
        log.failed(
            STEP_BOOTSTRAP,
            StepClass::BestEffort,
            format!("{summary}; {}", report.warnings.join("; ")),
        );
    }

    // Purely diagnostic; never alters control flow.
    if !report.verified.is_empty() {
        let verdicts = report
            .verified
            .iter()
            .map(|verification| {
                format!(
                    "{}={}",
                    verification.name,
                    if verification.importable { "ok" } else { "missing" }
                )
            })
            .collect::<Vec<_>>()
            .join(" ");
        log.succeeded(STEP_VERIFY, StepClass::BestEffort, verdicts);
    }
}

pub(crate) struct HostOrchestrator {
    caps: PlatformCapabilities,
    assume_yes: bool,
    runtime_sha256: Option<String>,
}

impl HostOrchestrator {
    pub(crate) fn new(assume_yes: bool, runtime_sha256: Option<String>) -> Self {
        Self {
            caps: PlatformCapabilities::detect(),
            assume_yes,
            runtime_sha256,
        }
    }
}

impl Orchestrator for HostOrchestrator {
    fn application_running(&mut self, exe_name: &str) -> Result<bool> {
        printdeploy_system::is_running(exe_name)
    }

    fn stop_application(&mut self, exe_name: &str) -> Result<()> {
        printdeploy_system::stop_process(exe_name, printdeploy_system::KILL_SETTLE)
    }

    fn reclaim_print_resources(&mut self) -> ReclaimReport {
        printdeploy_system::reclaim_print_resources()
    }

    fn executable_present(&mut self, path: &Path) -> bool {
        path.is_file()
    }

    fn grant_full_access(&mut self, path: &Path) -> Vec<PrincipalOutcome> {
        printdeploy_system::grant_full_access(path, &self.caps)
    }

    fn join_print_operators_group(&mut self) -> Vec<PrincipalOutcome> {
        printdeploy_system::join_print_operators_group(&self.caps)
    }

    fn set_point_and_print_policy(&mut self) -> Vec<String> {
        printdeploy_system::set_point_and_print_policy()
    }

    fn run_bootstrap(&mut self) -> BootstrapReport {
        let mut prompt: Box<dyn RuntimePrompt> = if self.assume_yes {
            Box::new(crate::render::AssumeYesPrompt)
        } else {
            Box::new(crate::render::ConsolePrompt)
        };
        let mut progress: Box<dyn DownloadProgress> =
            Box::new(crate::render::DownloadBar::new("runtime installer"));
        run_bootstrap(
            prompt.as_mut(),
            progress.as_mut(),
            self.runtime_sha256.as_deref(),
        )
    }

    fn restart_spooler(&mut self) -> SpoolerRestart {
        printdeploy_system::restart_spooler()
    }

    fn write_uninstall_metadata(&mut self, context: &InstallContext) -> Vec<String> {
        printdeploy_system::write_uninstall_metadata(context)
    }
}
