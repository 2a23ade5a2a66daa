use std::process::Command;
use std::time::Duration;

use anyhow::Result;

use crate::exec::{run_command, run_command_capture};

// Settle time after a kill; the process table is not re-checked afterwards.
pub const KILL_SETTLE: Duration = Duration::from_secs(1);

pub fn is_running(exe_name: &str) -> Result<bool> {
    is_running_with_executor(exe_name, run_command_capture)
}

pub(crate) fn is_running_with_executor<Capture>(exe_name: &str, mut capture: Capture) -> Result<bool>
where
    Capture: FnMut(&mut Command, &str) -> Result<String>,
{
    let mut command = Command::new("tasklist");
    command
        .arg("/FI")
        .arg(format!("IMAGENAME eq {exe_name}"))
        .arg("/NH");
    let listing = capture(&mut command, "failed to query the process list")?;
    Ok(process_list_contains(&listing, exe_name))
}

pub fn stop_process(exe_name: &str, settle: Duration) -> Result<()> {
    stop_process_with_executor(exe_name, settle, run_command, std::thread::sleep)
}

pub(crate) fn stop_process_with_executor<Run, Sleep>(
    exe_name: &str,
    settle: Duration,
    mut run: Run,
    mut sleep: Sleep,
) -> Result<()>
where
    Run: FnMut(&mut Command, &str) -> Result<()>,
    Sleep: FnMut(Duration),
{
    let mut command = Command::new("taskkill");
    command.arg("/F").arg("/T").arg("/IM").arg(exe_name);
    run(&mut command, "failed to terminate the application process")?;
    sleep(settle);
    Ok(())
}

pub(crate) fn process_list_contains(listing: &str, exe_name: &str) -> bool {
    listing
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .any(|image| image.eq_ignore_ascii_case(exe_name))
}
