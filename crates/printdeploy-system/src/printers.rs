use std::process::Command;
use std::time::Duration;

use anyhow::Result;
use printdeploy_core::{LOOPBACK_HOST, RESERVED_PRINTER_NAMES, RESERVED_PRINTER_PREFIX};

use crate::exec::{escape_ps_single_quote, run_command, run_command_capture};

// The spooler commits printer/port deletions asynchronously.
pub const PRINTER_SETTLE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReclaimReport {
    pub removed_printers: Vec<String>,
    pub removed_ports: Vec<String>,
    pub warnings: Vec<String>,
}

pub fn find_reserved_printers() -> Result<Vec<String>> {
    enumerate_reserved_printers(&mut run_command_capture)
}

pub fn find_reserved_ports() -> Result<Vec<String>> {
    let ports = enumerate_printer_ports(&mut run_command_capture)?;
    Ok(ports
        .into_iter()
        .filter(|(name, address)| port_is_reserved(name, address))
        .map(|(name, _)| name)
        .collect())
}

pub fn reclaim_print_resources() -> ReclaimReport {
    reclaim_print_resources_with_executors(
        run_command,
        run_command_capture,
        std::thread::sleep,
    )
}

pub(crate) fn reclaim_print_resources_with_executors<Run, Capture, Sleep>(
    mut run: Run,
    mut capture: Capture,
    mut sleep: Sleep,
) -> ReclaimReport
where
    Run: FnMut(&mut Command, &str) -> Result<()>,
    Capture: FnMut(&mut Command, &str) -> Result<String>,
    Sleep: FnMut(Duration),
{
    let mut report = ReclaimReport::default();

    match enumerate_reserved_printers(&mut capture) {
        Ok(names) => {
            for name in names {
                let mut command = Command::new("powershell");
                command.arg("-NoProfile").arg("-Command").arg(format!(
                    "Remove-Printer -Name '{}'",
                    escape_ps_single_quote(&name)
                ));
                match run(&mut command, "failed to remove printer") {
                    Ok(()) => report.removed_printers.push(name),
                    Err(err) => report.warnings.push(format!("printer '{name}': {err}")),
                }
            }
        }
        Err(err) => report
            .warnings
            .push(format!("printer enumeration failed: {err}")),
    }

    // Second mechanism: some spooler states leave objects the CIM
    // enumeration misses; deleting an absent printer here is not an error.
    for name in RESERVED_PRINTER_NAMES {
        let mut command = Command::new("rundll32");
        command
            .arg("printui.dll,PrintUIEntry")
            .arg("/dl")
            .arg("/n")
            .arg(name);
        let _ = run(&mut command, "failed to remove printer via printui");
    }

    match enumerate_printer_ports(&mut capture) {
        Ok(ports) => {
            for (name, address) in ports {
                if !port_is_reserved(&name, &address) {
                    continue;
                }
                if let Err(err) = remove_printer_port(&name, &mut run) {
                    report.warnings.push(format!("port '{name}': {err}"));
                } else {
                    report.removed_ports.push(name);
                }
            }
        }
        Err(err) => report
            .warnings
            .push(format!("printer port enumeration failed: {err}")),
    }

    if !report.removed_printers.is_empty() || !report.removed_ports.is_empty() {
        sleep(PRINTER_SETTLE);
    }

    report
}

fn enumerate_reserved_printers<Capture>(capture: &mut Capture) -> Result<Vec<String>>
where
    Capture: FnMut(&mut Command, &str) -> Result<String>,
{
    let mut command = Command::new("powershell");
    command.arg("-NoProfile").arg("-Command").arg(format!(
        "Get-Printer | Where-Object {{ $_.Name -like '{}*' }} | Select-Object -ExpandProperty Name",
        escape_ps_single_quote(RESERVED_PRINTER_PREFIX)
    ));
    let listing = capture(&mut command, "failed to enumerate printers")?;
    Ok(parse_name_lines(&listing))
}

fn enumerate_printer_ports<Capture>(capture: &mut Capture) -> Result<Vec<(String, String)>>
where
    Capture: FnMut(&mut Command, &str) -> Result<String>,
{
    let mut command = Command::new("powershell");
    command.arg("-NoProfile").arg("-Command").arg(
        "Get-PrinterPort | ForEach-Object { \"$($_.Name)`t$($_.PrinterHostAddress)\" }",
    );
    let listing = capture(&mut command, "failed to enumerate printer ports")?;
    Ok(parse_port_rows(&listing))
}

fn remove_printer_port<Run>(name: &str, run: &mut Run) -> Result<()>
where
    Run: FnMut(&mut Command, &str) -> Result<()>,
{
    let mut command = Command::new("powershell");
    command.arg("-NoProfile").arg("-Command").arg(format!(
        "Remove-PrinterPort -Name '{}'",
        escape_ps_single_quote(name)
    ));
    if run(&mut command, "failed to remove printer port").is_ok() {
        return Ok(());
    }

    let mut fallback = Command::new("cscript");
    fallback
        .arg(r"C:\Windows\System32\Printing_Admin_Scripts\en-US\prnport.vbs")
        .arg("-d")
        .arg("-r")
        .arg(name);
    run(&mut fallback, "failed to remove printer port via prnport")
}

pub(crate) fn parse_name_lines(listing: &str) -> Vec<String> {
    listing
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

pub(crate) fn parse_port_rows(listing: &str) -> Vec<(String, String)> {
    listing
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| match line.split_once('\t') {
            Some((name, address)) => (name.trim().to_string(), address.trim().to_string()),
            None => (line.to_string(), String::new()),
        })
        .collect()
}

pub(crate) fn port_is_reserved(name: &str, address: &str) -> bool {
    name.starts_with(RESERVED_PRINTER_PREFIX) || address == LOOPBACK_HOST
}
