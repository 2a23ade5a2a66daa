use std::process::Command;
use std::time::Duration;

use anyhow::Result;
use printdeploy_core::SPOOLER_SERVICE;

use crate::exec::run_command;

// Applied after each transition; the service manager reports back before the
// spooler has finished loading its policy state.
pub const SERVICE_SETTLE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpoolerRestart {
    pub stopped: bool,
    pub started: bool,
    pub warnings: Vec<String>,
}

impl SpoolerRestart {
    pub fn succeeded(&self) -> bool {
        self.started
    }
}

pub fn restart_spooler() -> SpoolerRestart {
    restart_spooler_with_executor(run_command, std::thread::sleep)
}

pub(crate) fn restart_spooler_with_executor<Run, Sleep>(
    mut run: Run,
    mut sleep: Sleep,
) -> SpoolerRestart
where
    Run: FnMut(&mut Command, &str) -> Result<()>,
    Sleep: FnMut(Duration),
{
    let mut report = SpoolerRestart::default();

    let mut stop = Command::new("net");
    stop.arg("stop").arg(SPOOLER_SERVICE);
    match run(&mut stop, "failed to stop the print spooler") {
        Ok(()) => report.stopped = true,
        // A stopped spooler is fine; the start below is what matters.
        Err(err) => report.warnings.push(err.to_string()),
    }
    sleep(SERVICE_SETTLE);

    let mut start = Command::new("net");
    start.arg("start").arg(SPOOLER_SERVICE);
    match run(&mut start, "failed to start the print spooler") {
        Ok(()) => report.started = true,
        Err(err) => report.warnings.push(err.to_string()),
    }
    sleep(SERVICE_SETTLE);

    report
}
